//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::{
    domain::{JoinRejection, View, validate_join},
    infrastructure::dto::http::{ChatQuery, ParticipantDto, PresenceDto},
    ui::state::AppState,
};

/// Login form page (`/` and `/login`)
pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, &View::Login)
}

/// Chat shell for a validated name and category
///
/// A request sent by HTMX (`HX-Request: true`) gets the fragment only.
pub async fn chat_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ChatQuery>,
) -> Response {
    let request = match validate_join(&query.name, &query.gender) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejected chat page request: {}", e);
            let rejection = JoinRejection::from(e);
            return (StatusCode::BAD_REQUEST, rejection.wire_message()).into_response();
        }
    };

    let partial = headers
        .get("HX-Request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    render_page(
        &state,
        &View::ChatShell {
            name: &request.display_name,
            category: request.category,
            partial,
        },
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Currently joined participants, in join order
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let participants = state.get_presence_usecase.execute().await;

    // Domain Model から DTO への変換
    let participants: Vec<ParticipantDto> = participants
        .iter()
        .map(|p| ParticipantDto::from(p.as_ref()))
        .collect();

    Json(PresenceDto {
        count: participants.len(),
        participants,
    })
}

/// Prometheus text exposition
pub async fn metrics_exposition(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            crate::metrics::render(handle),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn render_page(state: &AppState, view: &View<'_>) -> Response {
    match state.renderer.render(view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render {}: {}", view.name(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
