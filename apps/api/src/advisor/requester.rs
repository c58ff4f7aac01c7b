//! Recommendation Requester — profile in, recommendations out, never an error.
//!
//! Flow: build prompt → primary model → (404 only) fallback model →
//!       sanitize + parse → result.
//!
//! Every failure collapses into the fixed "service unavailable" result. The
//! caller can tell failures apart only by `overall_advice`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::advisor::prompts::{build_recommendation_prompt, recommendation_response_schema};
use crate::advisor::sanitize::{parse_recommendations, FormatError};
use crate::config::Config;
use crate::llm_client::{GeminiClient, LlmBackend, LlmError};
use crate::models::profile::UserProfile;
use crate::models::recommendation::{Recommendation, RecommendationResult};

pub const MISSING_CONFIGURATION_ADVICE: &str = "The AI recommendation service is not configured yet. \
    Ask the site administrator to set a Gemini API key, then try again.";
pub const NETWORK_FAILURE_ADVICE: &str = "We could not reach the AI recommendation service. \
    Check your internet connection and try again in a moment.";
pub const CREDENTIAL_FAILURE_ADVICE: &str = "The AI recommendation service rejected our credentials. \
    The site administrator needs to check the configured API key.";
pub const GENERIC_FAILURE_ADVICE: &str = "We could not generate personalised recommendations right now. \
    Please try again shortly, or talk to your school career counsellor in the meantime.";

pub const UNAVAILABLE_SECTOR: &str = "Service Unavailable";

// ────────────────────────────────────────────────────────────────────────────
// Failure taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// Why a request fell back to the error result. Internal only; it is logged
/// and then turned into advisory text.
#[derive(Debug, Error)]
pub enum RecommendationFailure {
    #[error("no Gemini API key configured")]
    MissingCredential,

    #[error("network failure: {0}")]
    Network(String),

    #[error("provider rejected credentials (status {status}): {message}")]
    Credential { status: u16, message: String },

    #[error("provider error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("provider returned an empty payload")]
    EmptyPayload,

    #[error("malformed payload: {0}")]
    Format(#[from] FormatError),
}

impl From<LlmError> for RecommendationFailure {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => RecommendationFailure::Network(e.to_string()),
            LlmError::Api { status, message } if is_credential_error(status, &message) => {
                RecommendationFailure::Credential { status, message }
            }
            LlmError::Api { status, message } => RecommendationFailure::Upstream { status, message },
            LlmError::Parse(e) => RecommendationFailure::Format(FormatError::InvalidJson(e)),
            LlmError::EmptyContent => RecommendationFailure::EmptyPayload,
        }
    }
}

/// 401/403, or a 400 whose message blames the API key (Gemini's answer to an
/// invalid key).
fn is_credential_error(status: u16, message: &str) -> bool {
    match status {
        401 | 403 => true,
        400 => message.to_ascii_lowercase().contains("api key"),
        _ => false,
    }
}

impl RecommendationFailure {
    pub fn advisory(&self) -> &'static str {
        match self {
            RecommendationFailure::MissingCredential => MISSING_CONFIGURATION_ADVICE,
            RecommendationFailure::Network(_) => NETWORK_FAILURE_ADVICE,
            RecommendationFailure::Credential { .. } => CREDENTIAL_FAILURE_ADVICE,
            RecommendationFailure::Upstream { .. }
            | RecommendationFailure::EmptyPayload
            | RecommendationFailure::Format(_) => GENERIC_FAILURE_ADVICE,
        }
    }

    pub fn into_result(self) -> RecommendationResult {
        RecommendationResult {
            overall_advice: self.advisory().to_string(),
            recommendations: vec![unavailable_recommendation()],
        }
    }
}

/// The single placeholder card shown whenever real recommendations are
/// missing. `match_percentage` is always 0.
pub fn unavailable_recommendation() -> Recommendation {
    Recommendation {
        sector: UNAVAILABLE_SECTOR.to_string(),
        match_percentage: 0,
        explanation: "Personalised career pathway recommendations are temporarily unavailable."
            .to_string(),
        cbc_subjects: vec![],
        skills_to_develop: vec![],
        resources: vec![],
        next_steps: vec![
            "Try again in a few minutes".to_string(),
            "Talk to your school career counsellor".to_string(),
        ],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Requester
// ────────────────────────────────────────────────────────────────────────────

/// Holds the LLM backend (absent when no key is configured) and the two
/// model ids. Cheap to clone; carried in `AppState`.
#[derive(Clone)]
pub struct RecommendationRequester {
    backend: Option<Arc<dyn LlmBackend>>,
    primary_model: String,
    fallback_model: String,
    response_schema: Arc<Value>,
}

impl RecommendationRequester {
    pub fn new(
        backend: Option<Arc<dyn LlmBackend>>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
            response_schema: Arc::new(recommendation_response_schema()),
        }
    }

    /// Builds a Gemini-backed requester, or an unconfigured one when
    /// `GEMINI_API_KEY` is absent.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let backend = match &config.gemini_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    key.clone(),
                    config.gemini_base_url.clone(),
                    config.generation.clone(),
                )?;
                Some(Arc::new(client) as Arc<dyn LlmBackend>)
            }
            None => None,
        };

        Ok(Self::new(
            backend,
            config.gemini_model.clone(),
            config.gemini_fallback_model.clone(),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn primary_model(&self) -> &str {
        &self.primary_model
    }

    /// Always returns a result with at least one recommendation.
    pub async fn request_recommendations(&self, profile: &UserProfile) -> RecommendationResult {
        match self.try_request(profile).await {
            Ok(result) => {
                info!(
                    "Generated {} recommendations for grade {} student ({} aptitude answers)",
                    result.recommendations.len(),
                    profile.grade,
                    profile.aptitude.len()
                );
                result
            }
            Err(failure) => {
                warn!("Recommendation request failed, returning fallback result: {failure}");
                failure.into_result()
            }
        }
    }

    async fn try_request(
        &self,
        profile: &UserProfile,
    ) -> Result<RecommendationResult, RecommendationFailure> {
        let backend = self
            .backend
            .as_deref()
            .ok_or(RecommendationFailure::MissingCredential)?;

        let prompt = build_recommendation_prompt(profile);
        let text = self.generate_with_model_fallback(backend, &prompt).await?;

        Ok(parse_recommendations(&text)?)
    }

    /// One call to the primary model. Only a 404 from it earns exactly one
    /// call to the fallback model; whatever that returns is final.
    async fn generate_with_model_fallback(
        &self,
        backend: &dyn LlmBackend,
        prompt: &str,
    ) -> Result<String, RecommendationFailure> {
        let schema = Some(self.response_schema.as_ref());

        match backend.generate(&self.primary_model, prompt, schema).await {
            Err(err) if err.is_model_not_found() => {
                warn!(
                    "Model {} not found ({err}), trying fallback model {}",
                    self.primary_model, self.fallback_model
                );
                Ok(backend
                    .generate(&self.fallback_model, prompt, schema)
                    .await?)
            }
            other => Ok(other?),
        }
    }
}
