//! Influencer Service - read-only API over precomputed influencer analytics.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use std::sync::Arc;

use services::InfluencerRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn InfluencerRepository>,
    pub service_name: String,
}

impl AppState {
    pub fn new(repository: Arc<dyn InfluencerRepository>, service_name: impl Into<String>) -> Self {
        Self {
            repository,
            service_name: service_name.into(),
        }
    }
}
