//! In-process mock of the remote collection service.
//!
//! A scripted axum router bound to an ephemeral port: tests choose the
//! response bodies, which bearer token counts as valid, and an optional
//! blanket failure, and can inspect every request the client sent.

use std::sync::Arc;

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// One request as the mock server saw it.
pub struct RecordedRequest {
    pub path: String,
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// Raw query string, if any.
    pub query: Option<String>,
}

/// Scripted behavior plus the request log.
pub struct MockState {
    /// When set, protected endpoints require exactly this bearer token and
    /// answer 401 otherwise.
    pub valid_token: Option<String>,
    /// When set, every protected endpoint answers with this status/body.
    pub fail: Option<(u16, Value)>,
    /// Body served by `GET /collection`.
    pub list_body: Value,
    /// Body served by `GET /collection/{id}`.
    pub record_body: Value,
    /// Body served by `GET /collection/export`.
    pub export_body: Value,
    /// Body served by `GET /favorites`.
    pub favorites_body: Value,
    pub requests: Vec<RecordedRequest>,
    /// Batch sizes received by `POST /collection/import`.
    pub import_sizes: Vec<usize>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            valid_token: None,
            fail: None,
            list_body: json!([]),
            record_body: json!(null),
            export_body: json!([]),
            favorites_body: json!(null),
            requests: Vec::new(),
            import_sizes: Vec::new(),
        }
    }
}

pub type Shared = Arc<Mutex<MockState>>;

/// Start the mock server and return its base URL plus the shared state.
pub async fn mock_server() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let app = router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("bound socket has an address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server crashed");
    });

    (format!("http://{addr}"), state)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/collection", get(list).post(create))
        .route("/collection/export", get(export))
        .route("/collection/import", post(import))
        .route("/collection/{id}", get(get_record).put(update).delete(remove))
        .route("/favorites", get(favorites))
        .route("/favorites/{id}", post(favorite_add).delete(favorite_remove))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()
        .map(str::to_string)
}

type Reply = (StatusCode, Json<Value>);

/// Record the request and apply the scripted auth check / failure.
async fn guard(
    state: &Shared,
    headers: &HeaderMap,
    path: &str,
    query: Option<String>,
) -> Result<(), Reply> {
    let mut state = state.lock().await;
    let authorization = bearer(headers);
    state.requests.push(RecordedRequest {
        path: path.to_string(),
        authorization: authorization.clone(),
        query,
    });

    if let Some(expected) = &state.valid_token {
        let presented = authorization
            .as_deref()
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid or expired token"})),
            ));
        }
    }

    if let Some((status, body)) = &state.fail {
        let status =
            StatusCode::from_u16(*status).expect("scripted status must be valid");
        return Err((status, Json(body.clone())));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Collection handlers
// ---------------------------------------------------------------------------

async fn list(
    State(state): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, "/collection", query).await {
        return reply;
    }
    let body = state.lock().await.list_body.clone();
    (StatusCode::OK, Json(body))
}

async fn get_record(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, &format!("/collection/{id}"), None).await {
        return reply;
    }
    let body = state.lock().await.record_body.clone();
    (StatusCode::OK, Json(body))
}

async fn create(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, "/collection", None).await {
        return reply;
    }
    if let Some(object) = body.as_object_mut() {
        object.insert("id".to_string(), json!(100));
    }
    (StatusCode::CREATED, Json(body))
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, &format!("/collection/{id}"), None).await {
        return reply;
    }
    (StatusCode::OK, Json(body))
}

async fn remove(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, &format!("/collection/{id}"), None).await {
        return reply;
    }
    (StatusCode::OK, Json(json!({"message": "record deleted"})))
}

async fn export(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    if let Err(reply) = guard(&state, &headers, "/collection/export", None).await {
        return reply;
    }
    let body = state.lock().await.export_body.clone();
    (StatusCode::OK, Json(body))
}

async fn import(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(batch): Json<Vec<Value>>,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, "/collection/import", None).await {
        return reply;
    }
    let count = batch.len();
    state.lock().await.import_sizes.push(count);
    (
        StatusCode::OK,
        Json(json!({"message": "import complete", "count": count})),
    )
}

// ---------------------------------------------------------------------------
// Favorites handlers
// ---------------------------------------------------------------------------

async fn favorites(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    if let Err(reply) = guard(&state, &headers, "/favorites", None).await {
        return reply;
    }
    let body = state.lock().await.favorites_body.clone();
    (StatusCode::OK, Json(body))
}

async fn favorite_add(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, &format!("/favorites/{id}"), None).await {
        return reply;
    }
    (StatusCode::CREATED, Json(json!({"message": "added to favorites"})))
}

async fn favorite_remove(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = guard(&state, &headers, &format!("/favorites/{id}"), None).await {
        return reply;
    }
    (StatusCode::OK, Json(json!({"message": "removed from favorites"})))
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Reply {
    state.lock().await.requests.push(RecordedRequest {
        path: "/auth/login".to_string(),
        authorization: bearer(&headers),
        query: None,
    });

    if credentials.password == "correct-horse" {
        (StatusCode::OK, Json(json!({"token": "issued-token"})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid username or password"})),
        )
    }
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Reply {
    state.lock().await.requests.push(RecordedRequest {
        path: "/auth/register".to_string(),
        authorization: bearer(&headers),
        query: None,
    });

    if credentials.username == "taken" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "username already exists"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"token": "fresh-token"})))
    }
}
