//! Domain models for influencer-service.

pub mod analysis;
pub mod influencer;

pub use analysis::AiAnalysis;
pub use influencer::{InfluencerRecord, InfluencerSummary, RecordId};
