//! The `/api/influencers` resource.
//!
//! Without `id` the resource lists every profile as `{id, username}`; with
//! `id` it returns the full record with `ai_analysis` normalized. A repeated
//! `id` key resolves to its first value.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

use crate::{
    models::{InfluencerRecord, RecordId},
    services::{normalize_record, DashboardSummary},
    AppState,
};

const ID_PARAM: &str = "id";

/// Value of the first `id` pair in request order; an empty value counts as absent.
fn requested_id(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == ID_PARAM)
        .map(|(_, value)| value.as_str())
        .filter(|id| !id.is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Influencer not found"))
}

/// GET `/api/influencers[?id=<id>]`.
pub async fn get_influencers(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    match requested_id(&params) {
        None => {
            tracing::info!("Listing influencers");
            let influencers = state.repository.list_influencers().await?;
            tracing::debug!(count = influencers.len(), "Influencers listed");
            Ok(Json(influencers).into_response())
        }
        Some(raw_id) => {
            let record = fetch_normalized(&state, parse_id(raw_id)?).await?;
            Ok(Json(record).into_response())
        }
    }
}

/// GET `/api/influencers/:id/summary`.
pub async fn get_influencer_summary(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DashboardSummary>, AppError> {
    let id = parse_id(&raw_id)?;
    let record = fetch_normalized(&state, id).await?;
    Ok(Json(DashboardSummary::from_record(id, &record)))
}

/// Any method other than GET on an influencer resource, HEAD included.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// A non-integer id can never match a row, so it is answered like a miss
/// without touching the database.
fn parse_id(raw_id: &str) -> Result<RecordId, AppError> {
    raw_id.parse().map_err(|_| {
        tracing::info!(id = %raw_id, "Influencer id is not an integer");
        not_found()
    })
}

async fn fetch_normalized(state: &AppState, id: RecordId) -> Result<InfluencerRecord, AppError> {
    tracing::info!(id = %id, "Fetching influencer");

    let mut record = state
        .repository
        .get_influencer(id)
        .await?
        .ok_or_else(not_found)?;

    normalize_record(&mut record);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_id_wins() {
        assert_eq!(requested_id(&pairs(&[("id", "1"), ("id", "2")])), Some("1"));
        assert_eq!(requested_id(&pairs(&[("page", "3"), ("id", "7")])), Some("7"));
    }

    #[test]
    fn empty_or_missing_id_means_list() {
        assert_eq!(requested_id(&pairs(&[])), None);
        assert_eq!(requested_id(&pairs(&[("id", "")])), None);
        assert_eq!(requested_id(&pairs(&[("username", "maya")])), None);
    }
}
