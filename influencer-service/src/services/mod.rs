//! Services module for influencer-service.

pub mod metrics;
pub mod normalizer;
pub mod repository;
pub mod summary;

pub use self::metrics::{get_metrics, init_metrics};
pub use normalizer::normalize_record;
pub use repository::{InMemoryInfluencerRepository, InfluencerRepository, PgInfluencerRepository};
pub use summary::DashboardSummary;
