//! Plain-text rendering of the view for the terminal.

use std::collections::HashSet;

use cinedex_core::query::ListQuery;
use cinedex_core::record::Record;
use cinedex_core::types::RecordId;
use cinedex_sync::ViewState;

/// Render the current view as an aligned table plus a status line.
/// Favorited records are marked with `*`.
pub fn view_table(view: &ViewState, favorites: &HashSet<RecordId>, query: &ListQuery) -> String {
    if view.loading {
        return "loading...".to_string();
    }
    if view.records.is_empty() {
        return "no records on this page".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:>5}   {:<32} {:>5}  {:<24} {:>6}\n",
        "id", "title", "year", "director", "rating"
    ));
    for record in &view.records {
        let marker = if favorites.contains(&record.id) { "*" } else { " " };
        out.push_str(&format!(
            "{:>5} {} {:<32} {:>5}  {:<24} {:>6.1}\n",
            record.id,
            marker,
            truncate(&record.title, 32),
            record.year,
            truncate(&record.director, 24),
            record.rating,
        ));
    }
    out.push_str(&format!(
        "page {} (size {}){}",
        query.page,
        query.page_size,
        if view.has_more { " -- more available" } else { "" }
    ));
    out
}

/// One-line detail view for a single record.
pub fn record_details(record: &Record) -> String {
    format!(
        "#{} {} ({}) -- directed by {}, rated {:.1}",
        record.id, record.title, record.year, record.director, record.rating
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max - 3).collect();
        format!("{kept}...")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
