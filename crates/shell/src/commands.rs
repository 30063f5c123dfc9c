//! Line-oriented command parsing for the shell.

use cinedex_core::query::{Filter, SortKey, SortOrder};
use cinedex_core::record::{Record, RecordDraft};
use cinedex_core::types::RecordId;

pub const HELP: &str = "\
commands:
  register <user> <pass>      create an account and sign in
  login <user> <pass>         sign in
  logout                      sign out
  list                        fetch the current page
  filter [title=..] [director=..] [year=..] [min_rating=..] [sort_by=..] [order=..]
                              apply filters (restarts at page 1)
  reset                       restore the default view
  next / prev                 page navigation
  pagesize <5|10|20|50>       records per page (restarts at page 1)
  show <id>                   record details
  add <title> | <year> | <director> | <rating>
  edit <id> | <title> | <year> | <director> | <rating>
  rm <id>                     delete a record
  fav <id>                    toggle a favorite
  favs                        list favorited ids
  export <file>               save the whole collection
  import <file>               load records from a file
  quit";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    List,
    Filter(Filter),
    Reset,
    Next,
    Prev,
    PageSize(u32),
    Show(RecordId),
    Add(RecordDraft),
    Edit(Record),
    Rm(RecordId),
    Fav(RecordId),
    Favs,
    Export(String),
    Import(String),
    Help,
    Quit,
}

/// Parse one input line. Errors are usage messages for the user.
pub fn parse(line: &str) -> Result<Command, String> {
    let (word, rest) = split_word(line);
    match word {
        "register" | "login" => {
            let (username, rest) = split_word(rest);
            let (password, _) = split_word(rest);
            if username.is_empty() || password.is_empty() {
                return Err(format!("usage: {word} <username> <password>"));
            }
            let username = username.to_string();
            let password = password.to_string();
            Ok(if word == "register" {
                Command::Register { username, password }
            } else {
                Command::Login { username, password }
            })
        }
        "logout" => Ok(Command::Logout),
        "list" => Ok(Command::List),
        "filter" => parse_filter(rest),
        "reset" => Ok(Command::Reset),
        "next" => Ok(Command::Next),
        "prev" => Ok(Command::Prev),
        "pagesize" => rest
            .trim()
            .parse()
            .map(Command::PageSize)
            .map_err(|_| "usage: pagesize <5|10|20|50>".to_string()),
        "show" => parse_id(rest, "show").map(Command::Show),
        "rm" => parse_id(rest, "rm").map(Command::Rm),
        "fav" => parse_id(rest, "fav").map(Command::Fav),
        "favs" => Ok(Command::Favs),
        "add" => parse_add(rest),
        "edit" => parse_edit(rest),
        "export" => parse_path(rest, "export").map(Command::Export),
        "import" => parse_path(rest, "import").map(Command::Import),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}` -- type `help`")),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (input, ""),
    }
}

fn parse_id(rest: &str, usage: &str) -> Result<RecordId, String> {
    rest.trim()
        .parse()
        .map_err(|_| format!("usage: {usage} <id>"))
}

fn parse_path(rest: &str, usage: &str) -> Result<String, String> {
    let path = rest.trim();
    if path.is_empty() {
        Err(format!("usage: {usage} <file>"))
    } else {
        Ok(path.to_string())
    }
}

fn parse_filter(rest: &str) -> Result<Command, String> {
    let mut filter = Filter::default();
    for token in rest.split_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{token}`"))?;
        match key {
            "title" => filter.title = value.to_string(),
            "director" => filter.director = value.to_string(),
            "year" => {
                filter.year =
                    Some(value.parse().map_err(|_| format!("`{value}` is not a year"))?);
            }
            "min_rating" => {
                filter.min_rating = Some(
                    value
                        .parse()
                        .map_err(|_| format!("`{value}` is not a rating"))?,
                );
            }
            "sort_by" => {
                filter.sort_by = SortKey::parse(value)
                    .ok_or_else(|| format!("`{value}` is not a sort field"))?;
            }
            "order" => {
                filter.order = SortOrder::parse(value)
                    .ok_or_else(|| format!("`{value}` is not a sort order"))?;
            }
            other => return Err(format!("unknown filter key `{other}`")),
        }
    }
    Ok(Command::Filter(filter))
}

/// `<title> | <year> | <director> | <rating>` into a validated draft.
fn parse_draft(rest: &str) -> Result<RecordDraft, String> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    if parts.len() != 4 {
        return Err("expected: <title> | <year> | <director> | <rating>".to_string());
    }
    let draft = RecordDraft {
        title: parts[0].to_string(),
        year: parts[1]
            .parse()
            .map_err(|_| format!("`{}` is not a year", parts[1]))?,
        director: parts[2].to_string(),
        rating: parts[3]
            .parse()
            .map_err(|_| format!("`{}` is not a rating", parts[3]))?,
    };
    draft.check()?;
    Ok(draft)
}

fn parse_add(rest: &str) -> Result<Command, String> {
    parse_draft(rest).map(Command::Add)
}

fn parse_edit(rest: &str) -> Result<Command, String> {
    let (id, rest) = split_word(rest);
    let id: RecordId = id
        .parse()
        .map_err(|_| "usage: edit <id> | <title> | <year> | <director> | <rating>".to_string())?;

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('|').unwrap_or(rest);
    let draft = parse_draft(rest)?;

    Ok(Command::Edit(Record {
        id,
        title: draft.title,
        year: draft.year,
        director: draft.director,
        rating: draft.rating,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
