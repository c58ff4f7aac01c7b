//! Axum route handlers for the Advisor API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::advisor::catalog::{
    score_selections, AptitudeQuestion, QuizSelection, Sector, APTITUDE_QUESTIONS, SECTORS,
};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::profile::{essay_length_violation, AptitudeResponses, Grade, UserProfile};
use crate::models::recommendation::RecommendationResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub grades: Vec<Grade>,
    pub sectors: &'static [Sector],
    pub aptitude_questions: &'static [AptitudeQuestion],
}

#[derive(Debug, Deserialize)]
pub struct ScoreAptitudeRequest {
    pub answers: Vec<QuizSelection>,
}

#[derive(Debug, Serialize)]
pub struct ScoreAptitudeResponse {
    pub aptitude: AptitudeResponses,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/catalog
///
/// Grades, interest sectors and quiz questions the wizard renders.
pub async fn handle_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        grades: Grade::all().collect(),
        sectors: &SECTORS,
        aptitude_questions: &APTITUDE_QUESTIONS,
    })
}

/// POST /api/v1/aptitude/score
///
/// Converts option picks into the `aptitude` map expected in a profile.
pub async fn handle_score_aptitude(
    AppJson(request): AppJson<ScoreAptitudeRequest>,
) -> Result<Json<ScoreAptitudeResponse>, AppError> {
    let aptitude =
        score_selections(&request.answers).map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(ScoreAptitudeResponse { aptitude }))
}

/// POST /api/v1/recommendations
///
/// Always answers 200 with a renderable result once the profile itself is
/// well-formed; provider failures come back as the advisory result.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> Result<Json<RecommendationResult>, AppError> {
    if let Some(message) = profile.essay.as_deref().and_then(essay_length_violation) {
        return Err(AppError::Validation(message));
    }

    let result = state.advisor.request_recommendations(&profile).await;
    Ok(Json(result))
}
