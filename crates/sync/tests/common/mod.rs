//! Shared test doubles for the sync crate: an in-memory stand-in for the
//! remote collection service with real filter/sort/pagination semantics.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use cinedex_core::api::CollectionApi;
use cinedex_core::error::ApiError;
use cinedex_core::query::{ListQuery, SortKey, SortOrder};
use cinedex_core::record::{Record, RecordDraft};
use cinedex_core::transfer::ImportReceipt;
use cinedex_core::types::RecordId;

/// Shorthand record constructor.
pub fn record(id: RecordId, title: &str, year: i32, director: &str, rating: f64) -> Record {
    Record {
        id,
        title: title.to_string(),
        year,
        director: director.to_string(),
        rating,
    }
}

/// Mutable state behind [`StubApi`].
#[derive(Default)]
pub struct StubState {
    pub records: Vec<Record>,
    pub favorite_ids: HashSet<RecordId>,
    /// Next id handed out by create/import.
    pub next_id: RecordId,
    /// While set, every operation fails unauthorized (expired credential).
    pub reject_all: bool,
    pub fail_next_list: bool,
    pub fail_next_favorites: bool,
    pub fail_next_favorite_mutation: bool,
    pub list_calls: usize,
    pub import_calls: usize,
    pub add_calls: Vec<RecordId>,
    pub remove_calls: Vec<RecordId>,
}

/// In-memory stand-in for the remote service.
///
/// Implements the same filter/sort/pagination semantics the real server
/// applies, idempotent favorite add/remove, and injectable failures. Every
/// operation starts with a cooperative suspension point so concurrent
/// callers interleave the way they would at real network boundaries.
pub struct StubApi {
    pub state: Mutex<StubState>,
    /// When armed, the next favorite add/remove parks here until the test
    /// releases it.
    mutation_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl StubApi {
    pub fn new(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StubState {
                next_id: 1000,
                records,
                ..StubState::default()
            }),
            mutation_gate: Mutex::new(None),
        })
    }

    /// Park the next favorite add/remove until the returned sender fires.
    pub async fn arm_mutation_gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.mutation_gate.lock().await = Some(rx);
        tx
    }

    /// Block until the armed gate has been picked up, i.e. a favorite
    /// mutation is parked on it.
    pub async fn wait_until_gate_taken(&self) {
        for _ in 0..2000 {
            if self.mutation_gate.lock().await.is_none() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        panic!("no favorite mutation picked up the gate");
    }

    async fn wait_on_gate(&self) {
        let gate = self.mutation_gate.lock().await.take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

fn stub_failure() -> ApiError {
    ApiError::request_failed(500, "stub failure")
}

fn matches(record: &Record, query: &ListQuery) -> bool {
    let filter = &query.filter;
    if !filter.title.is_empty()
        && !record
            .title
            .to_lowercase()
            .contains(&filter.title.to_lowercase())
    {
        return false;
    }
    if !filter.director.is_empty()
        && !record
            .director
            .to_lowercase()
            .contains(&filter.director.to_lowercase())
    {
        return false;
    }
    if let Some(year) = filter.year {
        if record.year != year {
            return false;
        }
    }
    if let Some(min_rating) = filter.min_rating {
        if record.rating < min_rating {
            return false;
        }
    }
    true
}

fn sort_records(records: &mut [Record], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let by_key = match key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        };
        match order {
            SortOrder::Asc => by_key,
            SortOrder::Desc => by_key.reverse(),
        }
    });
}

#[async_trait]
impl CollectionApi for StubApi {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>, ApiError> {
        tokio::task::yield_now().await;
        query.validate()?;

        let mut state = self.state.lock().await;
        state.list_calls += 1;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        if state.fail_next_list {
            state.fail_next_list = false;
            return Err(stub_failure());
        }

        let mut hits: Vec<Record> = state
            .records
            .iter()
            .filter(|r| matches(r, query))
            .cloned()
            .collect();
        sort_records(&mut hits, query.filter.sort_by, query.filter.order);

        let start = ((query.page - 1) * query.page_size) as usize;
        Ok(hits
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect())
    }

    async fn get(&self, id: RecordId) -> Result<Record, ApiError> {
        tokio::task::yield_now().await;
        let state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ApiError::request_failed(404, "record not found"))
    }

    async fn create(&self, draft: &RecordDraft) -> Result<Record, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        let record = Record {
            id: state.next_id,
            title: draft.title.clone(),
            year: draft.year,
            director: draft.director.clone(),
            rating: draft.rating,
        };
        state.next_id += 1;
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: &Record) -> Result<Record, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        match state.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(ApiError::request_failed(404, "record not found")),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        state.records.retain(|r| r.id != id);
        state.favorite_ids.remove(&id);
        Ok(())
    }

    async fn export(&self) -> Result<Vec<u8>, ApiError> {
        tokio::task::yield_now().await;
        let state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        serde_json::to_vec(&state.records)
            .map_err(|e| ApiError::transport(e.to_string()))
    }

    async fn import(&self, drafts: &[RecordDraft]) -> Result<ImportReceipt, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        state.import_calls += 1;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        for draft in drafts {
            let id = state.next_id;
            state.next_id += 1;
            state.records.push(Record {
                id,
                title: draft.title.clone(),
                year: draft.year,
                director: draft.director.clone(),
                rating: draft.rating,
            });
        }
        Ok(ImportReceipt {
            count: drafts.len() as u64,
            message: "import complete".to_string(),
        })
    }

    async fn favorites(&self) -> Result<Vec<Record>, ApiError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        if state.fail_next_favorites {
            state.fail_next_favorites = false;
            return Err(stub_failure());
        }
        let favorite_ids = state.favorite_ids.clone();
        Ok(state
            .records
            .iter()
            .filter(|r| favorite_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn favorite_add(&self, id: RecordId) -> Result<(), ApiError> {
        tokio::task::yield_now().await;
        self.wait_on_gate().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        if state.fail_next_favorite_mutation {
            state.fail_next_favorite_mutation = false;
            return Err(stub_failure());
        }
        state.add_calls.push(id);
        state.favorite_ids.insert(id);
        Ok(())
    }

    async fn favorite_remove(&self, id: RecordId) -> Result<(), ApiError> {
        tokio::task::yield_now().await;
        self.wait_on_gate().await;
        let mut state = self.state.lock().await;
        if state.reject_all {
            return Err(ApiError::Unauthorized);
        }
        if state.fail_next_favorite_mutation {
            state.fail_next_favorite_mutation = false;
            return Err(stub_failure());
        }
        state.remove_calls.push(id);
        state.favorite_ids.remove(&id);
        Ok(())
    }
}
