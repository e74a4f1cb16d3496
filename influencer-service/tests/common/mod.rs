//! Common test utilities for influencer-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use influencer_service::config::CorsConfig;
use influencer_service::services::InMemoryInfluencerRepository;
use influencer_service::startup::build_router;
use influencer_service::AppState;
use serde_json::{json, Value};
use std::sync::{Arc, Once};
use tower::util::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,influencer_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Rows shaped like the ones the analysis pipeline writes.
pub fn fixture_records() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "username": "wanderlust.maya",
            "account_tier": "micro",
            "robust_tier_adjusted_engagement_rate": 4.2,
            "credibility_score": { "value": 8.1, "analysis": "Organic growth" },
            "total_posts_analyzed": 60,
            "risk_level": "Low",
            "risk_score": 14,
            "risk_factors": [],
            "hashtag_frequency": { "#travel": 22 },
            "ai_analysis": "```json\n{\"profile_analysis\":{\"profile_summary\":{\"follower_count\":48200,\"is_verified\":false},\"content_analysis\":{\"primary_categories\":[\"travel\",\"food\"]},\"brand_safety\":{\"risk_level\":{\"explanation\":\"No flagged content\"}}},\"executive_summary\":{\"value_proposition\":\"Authentic travel storytelling\"}}\n```"
        }),
        json!({
            "id": 2,
            "username": "fitwithraj",
            "risk_level": "Medium",
            "ai_analysis": "{\"a\":1}"
        }),
        json!({
            "id": 3,
            "username": "chef.lucia",
            "risk_level": "high",
            "ai_analysis": "```json\n{invalid}\n```"
        }),
        json!({
            "id": 4,
            "username": "no.analysis.yet",
            "ai_analysis": null
        }),
    ]
}

pub fn repository() -> Arc<InMemoryInfluencerRepository> {
    Arc::new(InMemoryInfluencerRepository::from_values(fixture_records()))
}

pub fn router_with(repository: Arc<InMemoryInfluencerRepository>) -> Router {
    init_tracing();
    let state = AppState::new(repository, "influencer-service-test");
    build_router(state, &CorsConfig::default())
}

pub fn router() -> Router {
    router_with(repository())
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("request should run");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

/// `/api/influencers?id=<value>` with the value form-encoded.
pub fn detail_uri(id: &str) -> String {
    let query = serde_urlencoded::to_string([("id", id)]).expect("id should encode");
    format!("/api/influencers?{}", query)
}
