//! In-place normalization of the `ai_analysis` field of a fetched record.

use crate::models::{AiAnalysis, InfluencerRecord};
use crate::services::metrics::record_normalization;
use serde_json::Value;

pub const AI_ANALYSIS_FIELD: &str = "ai_analysis";

/// Replace a fenced `ai_analysis` string with the document it contains.
///
/// Only the response object is touched. Unfenced text, nulls and values that
/// are already structured are left alone; fenced text that fails to parse is
/// logged and kept verbatim.
pub fn normalize_record(record: &mut InfluencerRecord) {
    let record_id = record.get("id").cloned().unwrap_or(Value::Null);

    let Some(Value::String(text)) = record.get_mut(AI_ANALYSIS_FIELD) else {
        return;
    };

    let analysis = AiAnalysis::from_text(std::mem::take(text));
    match &analysis {
        AiAnalysis::Parsed(_) => record_normalization("parsed"),
        AiAnalysis::RawText(_) => record_normalization("unfenced"),
        AiAnalysis::Unparseable { error, .. } => {
            tracing::warn!(
                record_id = %record_id,
                error = %error,
                "Error parsing AI analysis, returning stored text"
            );
            record_normalization("unparseable");
        }
    }

    record.insert(AI_ANALYSIS_FIELD.to_string(), analysis.into_value());
}
