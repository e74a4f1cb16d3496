//! Integration tests for the dashboard summary endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{get, repository, router, router_with, send};
use serde_json::json;

#[tokio::test]
async fn summary_projects_overview_metrics() {
    let (status, body) = get(router(), "/api/influencers/1/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["username"], "wanderlust.maya");
    assert_eq!(body["follower_count"], 48200);
    assert_eq!(body["follower_count_display"], "48.2K");
    assert_eq!(body["is_verified"], false);
    assert_eq!(body["account_tier"], "micro");
    assert_eq!(body["engagement_rate"], 4.2);
    assert_eq!(
        body["credibility"],
        json!({ "value": 8.1, "display": "8.1", "category": "excellent" })
    );
    assert_eq!(body["total_posts_analyzed"], 60);
    assert_eq!(body["risk"]["level"], "low");
    assert_eq!(body["risk"]["score"], 14);
    assert_eq!(body["risk"]["factors"], json!([]));
    assert_eq!(body["risk"]["explanation"], "No flagged content");
    assert_eq!(body["primary_categories"], json!(["travel", "food"]));
}

#[tokio::test]
async fn summary_of_unparsed_analysis_uses_placeholders() {
    for id in [2, 3, 4] {
        let (status, body) = get(router(), &format!("/api/influencers/{id}/summary")).await;

        assert_eq!(status, StatusCode::OK, "id {id}");
        assert!(body["follower_count"].is_null());
        assert_eq!(body["follower_count_display"], "N/A");
        assert_eq!(body["credibility"]["display"], "N/A");
        assert_eq!(body["credibility"]["category"], "unknown");
        assert_eq!(body["primary_categories"], json!([]));
    }
}

#[tokio::test]
async fn summary_normalizes_risk_level_case() {
    let (_, body) = get(router(), "/api/influencers/3/summary").await;
    assert_eq!(body["risk"]["level"], "high");

    let (_, body) = get(router(), "/api/influencers/2/summary").await;
    assert_eq!(body["risk"]["level"], "medium");
}

#[tokio::test]
async fn summary_for_unknown_or_malformed_id_is_not_found() {
    for uri in [
        "/api/influencers/999/summary",
        "/api/influencers/abc/summary",
        "/api/influencers/1%3B%20DROP%20TABLE%20x%3B/summary",
    ] {
        let (status, body) = get(router(), uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "error": "Influencer not found" }));
    }
}

#[tokio::test]
async fn summary_rejects_other_methods() {
    let (status, body) = send(
        router(),
        Request::builder()
            .method("DELETE")
            .uri("/api/influencers/1/summary")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn summary_database_failure_is_a_generic_500() {
    let repo = repository();
    repo.set_unavailable(true);

    let (status, body) = get(router_with(repo), "/api/influencers/1/summary").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
