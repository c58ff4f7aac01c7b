//! Axum route handlers for wizard sessions and the cached essay draft.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::profile::{essay_length_violation, word_count, RECOMMENDED_ESSAY_WORDS};
use crate::session::store::ESSAY_KEY;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SaveEssayRequest {
    pub essay: String,
}

#[derive(Debug, Serialize)]
pub struct EssayDraftResponse {
    pub essay: String,
    pub word_count: usize,
    pub within_recommended_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl EssayDraftResponse {
    fn new(essay: String, saved_at: Option<DateTime<Utc>>) -> Self {
        let words = word_count(&essay);
        Self {
            essay,
            word_count: words,
            within_recommended_range: RECOMMENDED_ESSAY_WORDS.contains(&words),
            saved_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Registers a fresh session. Only registered sessions accept drafts.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let session_id = Uuid::new_v4();
    state.sessions.create(session_id).await?;
    info!("Started wizard session {session_id}");

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse { session_id }),
    ))
}

/// PUT /api/v1/sessions/:id/essay
pub async fn handle_save_essay(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<SaveEssayRequest>,
) -> Result<Json<EssayDraftResponse>, AppError> {
    if let Some(message) = essay_length_violation(&request.essay) {
        return Err(AppError::Validation(message));
    }

    let saved_at = state
        .sessions
        .put(session_id, ESSAY_KEY, request.essay.clone())
        .await?
        .ok_or_else(|| unknown_session(session_id))?;

    Ok(Json(EssayDraftResponse::new(request.essay, Some(saved_at))))
}

/// GET /api/v1/sessions/:id/essay
pub async fn handle_get_essay(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<Json<EssayDraftResponse>, AppError> {
    let stored = state
        .sessions
        .get(session_id, ESSAY_KEY)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No essay saved for session {session_id}")))?;

    Ok(Json(EssayDraftResponse::new(
        stored.value,
        Some(stored.saved_at),
    )))
}

/// DELETE /api/v1/sessions/:id
///
/// Restart: forgets the session and everything cached for it. Idempotent.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.clear(session_id).await? {
        info!("Cleared wizard session {session_id}");
    }
    Ok(StatusCode::NO_CONTENT)
}

fn unknown_session(session_id: Uuid) -> AppError {
    AppError::NotFound(format!(
        "Session {session_id} does not exist or has expired"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_response_counts_words() {
        let short = EssayDraftResponse::new("one two three".to_string(), None);
        assert_eq!(short.word_count, 3);
        assert!(!short.within_recommended_range);

        let essay = vec!["word"; 200].join(" ");
        let good = EssayDraftResponse::new(essay, None);
        assert_eq!(good.word_count, 200);
        assert!(good.within_recommended_range);
    }

    #[test]
    fn test_draft_response_omits_missing_saved_at() {
        let value = serde_json::to_value(EssayDraftResponse::new("hi".to_string(), None)).unwrap();
        assert!(value.get("saved_at").is_none());
    }
}
