//! Endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tracing::{info, warn};

use super::{AppState, pages};
use crate::error::Error;
use crate::model::{ItemId, MoveRequest, Stage};

/// `302 Found` to `location`.
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found(what))).into_response()
}

/// Where to send the reviewer next.
fn next_location(state: &AppState) -> String {
    match state.engine.pick_any(Stage::Review) {
        Some(id) => format!("/view/{id}"),
        None => "/".to_string(),
    }
}

pub async fn root_handler(State(state): State<AppState>) -> Response {
    match state.engine.pick_any(Stage::Review) {
        Some(id) => found(format!("/view/{id}")),
        None => Html(pages::nothing_to_review()).into_response(),
    }
}

pub async fn view_handler(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Ok(id) = raw.parse::<ItemId>() else {
        warn!(id = %raw, "view: bad item id");
        return not_found(&raw);
    };

    match state.engine.load(id, Stage::Review).await {
        Ok(item) => Html(pages::view(&item)).into_response(),
        Err(e) if e.is_not_found() => {
            info!(%id, "view: item not in review");
            not_found(&raw)
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::error(&e.to_string())),
        )
            .into_response(),
    }
}

pub async fn accept_handler(state: State<AppState>, raw: Path<String>) -> Response {
    decide(state, raw, MoveRequest::accept).await
}

pub async fn reject_handler(state: State<AppState>, raw: Path<String>) -> Response {
    decide(state, raw, MoveRequest::reject).await
}

/// Queue the move and redirect immediately; the move lands asynchronously.
async fn decide(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    request: fn(ItemId) -> MoveRequest,
) -> Response {
    let Ok(id) = raw.parse::<ItemId>() else {
        warn!(id = %raw, "decision: bad item id");
        return not_found(&raw);
    };

    let req = request(id);
    match state.engine.submit(req).await {
        Ok(()) => {
            info!(%id, to = %req.to, "move queued");
            found(next_location(&state))
        }
        Err(Error::QueueClosed) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(pages::error("server is shutting down")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::error(&e.to_string())),
        )
            .into_response(),
    }
}

pub async fn exit_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("exit requested");
    state.engine.shutdown();
    "Terminating server..."
}
