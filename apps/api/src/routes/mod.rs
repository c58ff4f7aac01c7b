pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::advisor::handlers as advisor;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Wizard catalogs and scoring
        .route("/api/v1/catalog", get(advisor::handle_catalog))
        .route(
            "/api/v1/aptitude/score",
            post(advisor::handle_score_aptitude),
        )
        // Recommendations
        .route(
            "/api/v1/recommendations",
            post(advisor::handle_recommendations),
        )
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            delete(session::handle_clear_session),
        )
        .route(
            "/api/v1/sessions/:id/essay",
            put(session::handle_save_essay).get(session::handle_get_essay),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::advisor::requester::{RecommendationRequester, MISSING_CONFIGURATION_ADVICE};
    use crate::config::{Config, GenerationSettings};
    use crate::session::store::{InMemorySessionStore, SessionStore};

    fn test_state() -> AppState {
        let config = Config {
            gemini_api_key: None,
            gemini_model: "primary-model".to_string(),
            gemini_fallback_model: "fallback-model".to_string(),
            gemini_base_url: "http://127.0.0.1:9/v1beta".to_string(),
            generation: GenerationSettings::default(),
            session_idle_ttl: Duration::from_secs(60),
            session_sweep_interval: Duration::from_secs(10),
            port: 0,
            rust_log: "info".to_string(),
        };
        AppState {
            advisor: RecommendationRequester::from_config(&config).unwrap(),
            sessions: Arc::new(InMemorySessionStore::new()),
            config,
        }
    }

    async fn send(
        router: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_unconfigured_llm() {
        let (status, body) = send(build_router(test_state()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm_configured"], false);
    }

    #[tokio::test]
    async fn test_catalog_lists_everything() {
        let (status, body) =
            send(build_router(test_state()), Method::GET, "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grades"], json!(["7", "8", "9", "10", "11", "12"]));
        assert_eq!(body["sectors"].as_array().unwrap().len(), 6);
        assert_eq!(body["sectors"][0]["id"], "tech");
        assert_eq!(body["aptitude_questions"][0]["id"], "problem_solving");
        assert_eq!(
            body["aptitude_questions"][0]["options"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_score_aptitude() {
        let request = json!({"answers": [
            {"question_id": "creativity", "option_index": 0},
            {"question_id": "problem_solving", "option_index": 2}
        ]});
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/aptitude/score",
            Some(request),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["aptitude"]["creativity"]["score"], 2);
        assert_eq!(
            body["aptitude"]["problem_solving"]["response"],
            "Break it into smaller parts and solve each"
        );
    }

    #[tokio::test]
    async fn test_score_aptitude_rejects_unknown_question() {
        let request = json!({"answers": [{"question_id": "juggling", "option_index": 0}]});
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/aptitude/score",
            Some(request),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommendations_without_key_returns_advisory_result() {
        let profile = json!({
            "name": "Achieng",
            "grade": "9",
            "interests": ["creative"],
            "aptitude": {},
            "essay": ""
        });
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(profile),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_advice"], MISSING_CONFIGURATION_ADVICE);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
        assert_eq!(body["recommendations"][0]["match_percentage"], 0);
    }

    #[tokio::test]
    async fn test_recommendations_rejects_bad_grade() {
        let profile = json!({"name": "x", "grade": "13"});
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(profile),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("between 7 and 12"));
    }

    #[tokio::test]
    async fn test_malformed_json_body_uses_error_envelope() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/recommendations")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": \"x\", \"grade\":"))
            .unwrap();

        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_bad_session_id_uses_error_envelope() {
        let (status, body) = send(
            build_router(test_state()),
            Method::GET,
            "/api/v1/sessions/not-a-uuid/essay",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_recommendations_rejects_oversized_essay() {
        let profile = json!({"name": "x", "grade": 8, "essay": "a".repeat(2001)});
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(profile),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_essay_session_lifecycle() {
        let router = build_router(test_state());

        let (status, body) = send(router.clone(), Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let session_id = body["session_id"].as_str().unwrap().to_string();
        let essay_uri = format!("/api/v1/sessions/{session_id}/essay");

        let (status, _) = send(router.clone(), Method::GET, &essay_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            router.clone(),
            Method::PUT,
            &essay_uri,
            Some(json!({"essay": "I love building robots"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["word_count"], 4);
        assert_eq!(body["within_recommended_range"], false);
        assert!(body["saved_at"].is_string());

        let saved_at = body["saved_at"].clone();

        let (status, body) = send(router.clone(), Method::GET, &essay_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["essay"], "I love building robots");
        assert_eq!(body["saved_at"], saved_at);

        let (status, _) = send(
            router.clone(),
            Method::DELETE,
            &format!("/api/v1/sessions/{session_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(router.clone(), Method::GET, &essay_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            router,
            Method::PUT,
            &essay_uri,
            Some(json!({"essay": "after restart"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_essay_to_unissued_session_is_not_found() {
        let state = test_state();
        let sessions = state.sessions.clone();
        let router = build_router(state);

        for _ in 0..20 {
            let uri = format!("/api/v1/sessions/{}/essay", uuid::Uuid::new_v4());
            let (status, body) = send(
                router.clone(),
                Method::PUT,
                &uri,
                Some(json!({"essay": "filler"})),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }

        assert_eq!(
            sessions.evict_idle(Duration::ZERO).await.unwrap(),
            0,
            "no session should have been created by rejected writes"
        );
    }

    #[tokio::test]
    async fn test_save_essay_rejects_over_limit() {
        let uri = format!("/api/v1/sessions/{}/essay", uuid::Uuid::new_v4());
        let (status, _) = send(
            build_router(test_state()),
            Method::PUT,
            &uri,
            Some(json!({"essay": "x".repeat(2001)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
