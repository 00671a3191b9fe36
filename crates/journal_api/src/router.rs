//! HTTP surface for the entries API.
//!
//! # Responsibility
//! - Map verbs and paths onto the access-controlled endpoint functions.
//! - Resolve the caller before any entry operation runs.
//! - Run blocking SQLite work off the async executor.
//!
//! # Invariants
//! - Every `/api/entries` route requires a resolved caller.
//! - Each request builds its own store and manager over the shared
//!   connection and drops them before responding.

use crate::endpoints;
use crate::error::{json_error, EndpointError, EndpointResult};
use crate::identity::{AuthError, CallerId, IdentityResolver};
use crate::wire::{CreatedResponse, EntryResponse, MessageResponse};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use journal_core::{EntryManager, SqliteEntryStore};
use log::{error, info, warn};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Takes ownership of a migrated connection and the identity capability.
    pub fn new(conn: Connection, identity: impl IdentityResolver + 'static) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            identity: Arc::new(identity),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/", get(list_entries).post(create_entry))
        .route(
            "/api/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .with_state(state)
}

enum ApiError {
    Unauthorized(AuthError),
    Endpoint(EndpointError),
    Runtime(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(err) => err.into_response(),
            Self::Endpoint(err) => err.into_response(),
            Self::Runtime(_) => {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn ping() -> &'static str {
    journal_core::ping()
}

async fn create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    handle(&state, &headers, "entry_create", move |manager, caller| {
        endpoints::create_entry(manager, caller, &body)
    })
    .await
    .map(|created| (StatusCode::CREATED, Json(created)))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<EntryResponse>> {
    handle(&state, &headers, "entry_get", move |manager, caller| {
        endpoints::get_entry(manager, caller, &id)
    })
    .await
    .map(Json)
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    handle(&state, &headers, "entry_update", move |manager, caller| {
        endpoints::update_entry(manager, caller, &id, &body)
    })
    .await
    .map(Json)
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    handle(&state, &headers, "entry_delete", move |manager, caller| {
        endpoints::delete_entry(manager, caller, &id)
    })
    .await
    .map(Json)
}

async fn list_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<EntryResponse>>> {
    handle(&state, &headers, "entry_list", |manager, caller| {
        endpoints::list_entries(manager, caller)
    })
    .await
    .map(Json)
}

/// Resolves the caller, runs `op` against a per-request manager and logs the
/// outcome under `event`.
async fn handle<T, F>(
    state: &AppState,
    headers: &HeaderMap,
    event: &'static str,
    op: F,
) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&EntryManager<SqliteEntryStore<'_>>, &CallerId) -> EndpointResult<T>
        + Send
        + 'static,
{
    let started_at = Instant::now();
    let outcome = match authenticate(state, headers) {
        Ok(caller) => run_blocking(state, move |manager| op(manager, &caller)).await,
        Err(err) => Err(err),
    };
    log_outcome(event, started_at, &outcome);
    outcome
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<CallerId> {
    state
        .identity
        .resolve(headers)
        .map_err(ApiError::Unauthorized)
}

async fn run_blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&EntryManager<SqliteEntryStore<'_>>) -> EndpointResult<T> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    tokio::task::spawn_blocking(move || {
        let conn = lock_db(&db);
        let manager = EntryManager::new(SqliteEntryStore::new(&conn));
        op(&manager).map_err(ApiError::Endpoint)
    })
    .await
    .map_err(|err| ApiError::Runtime(format!("blocking task failed: {err}")))?
}

/// Locks the shared connection, recovering from a panic in an earlier holder.
///
/// Each store call is one statement, so a poisoned guard still wraps a
/// consistent connection.
fn lock_db(db: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    db.lock().unwrap_or_else(|poisoned| {
        warn!("event=db_lock module=api status=recovered reason=poisoned");
        PoisonError::into_inner(poisoned)
    })
}

fn log_outcome<T>(event: &str, started_at: Instant, outcome: &ApiResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(_) => info!("event={event} module=api status=ok duration_ms={duration_ms}"),
        Err(ApiError::Unauthorized(err)) => warn!(
            "event={event} module=api status=error duration_ms={duration_ms} error_code=unauthorized error={err}"
        ),
        Err(ApiError::Endpoint(err @ EndpointError::Persistence { .. })) => error!(
            "event={event} module=api status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        Err(ApiError::Endpoint(err)) => warn!(
            "event={event} module=api status=error duration_ms={duration_ms} error_code={}",
            err.code()
        ),
        Err(ApiError::Runtime(message)) => error!(
            "event={event} module=api status=error duration_ms={duration_ms} error_code=runtime error={message}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{lock_db, run_blocking, AppState};
    use crate::identity::HeaderIdentityResolver;
    use journal_core::db::open_db_in_memory;
    use std::sync::Arc;

    fn state() -> AppState {
        let conn = open_db_in_memory().unwrap();
        AppState::new(conn, HeaderIdentityResolver::new("x-user-id", None).unwrap())
    }

    fn poison(state: &AppState) {
        let db = Arc::clone(&state.db);
        let joined = std::thread::spawn(move || {
            let _guard = db.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(joined.is_err());
        assert!(state.db.is_poisoned());
    }

    #[test]
    fn lock_db_recovers_poisoned_connection() {
        let state = state();
        poison(&state);

        let conn = lock_db(&state.db);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn requests_still_run_after_a_poisoning_panic() {
        let state = state();
        poison(&state);

        let listed = run_blocking(&state, |manager| Ok(manager.list_entries().unwrap().len()))
            .await;
        assert!(matches!(listed, Ok(0)));
    }
}
