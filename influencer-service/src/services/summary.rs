//! Overview metrics the dashboard shows for one influencer.
//!
//! Every field is read by a dotted path into the normalized record. A missing
//! segment anywhere along a path is not an error: the field comes back empty
//! and its display form falls back to [`PLACEHOLDER`].

use crate::models::{InfluencerRecord, RecordId};
use serde::Serialize;
use serde_json::Value;

pub const PLACEHOLDER: &str = "N/A";

const FOLLOWER_COUNT: &str = "ai_analysis.profile_analysis.profile_summary.follower_count";
const IS_VERIFIED: &str = "ai_analysis.profile_analysis.profile_summary.is_verified";
const RISK_EXPLANATION: &str = "ai_analysis.profile_analysis.brand_safety.risk_level.explanation";
const PRIMARY_CATEGORIES: &str = "ai_analysis.profile_analysis.content_analysis.primary_categories";

/// Follow `path` (dot-separated object keys or array indices) from `root`.
/// Nulls count as missing.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|value| !value.is_null())
}

fn lookup_record<'a>(record: &'a InfluencerRecord, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = record.get(head)?;
    match rest {
        Some(rest) => lookup_path(value, rest),
        None => Some(value).filter(|value| !value.is_null()),
    }
}

/// One fraction digit, with exact ties rounded away from zero.
fn one_decimal(n: f64) -> String {
    format!("{:.1}", (n * 10.0).round() / 10.0)
}

/// Compact display of a count: `1.2M`, `45.3K`, `999`.
pub fn format_number(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(n) if n >= 1_000_000.0 => format!("{}M", one_decimal(n / 1_000_000.0)),
            Some(n) if n >= 1_000.0 => format!("{}K", one_decimal(n / 1_000.0)),
            Some(n) => group_thousands(n),
            None => PLACEHOLDER.to_string(),
        },
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Plain number with at most three fraction digits and `,` grouping.
fn group_thousands(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    let text = rounded.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// One-decimal score, or the placeholder for anything non-numeric.
pub fn format_score(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map(one_decimal)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl ScoreCategory {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= 7.0 => Self::Excellent,
            Some(s) if s >= 5.0 => Self::Good,
            Some(s) if s >= 3.0 => Self::Fair,
            Some(_) => Self::Poor,
            None => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("low") => Self::Low,
            Some("medium") => Self::Medium,
            Some("high") => Self::High,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredibilitySummary {
    pub value: Option<f64>,
    pub display: String,
    pub category: ScoreCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub level: RiskLevel,
    pub score: Option<Value>,
    pub factors: Option<Value>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub id: i64,
    pub username: Option<String>,
    pub follower_count: Option<Value>,
    pub follower_count_display: String,
    pub is_verified: Option<bool>,
    pub account_tier: Option<Value>,
    pub engagement_rate: Option<Value>,
    pub credibility: CredibilitySummary,
    pub total_posts_analyzed: Option<Value>,
    pub risk: RiskSummary,
    pub primary_categories: Vec<Value>,
}

impl DashboardSummary {
    /// Project a normalized record. `ai_analysis` paths only resolve when the
    /// analysis was parsed; otherwise those fields stay empty.
    pub fn from_record(id: RecordId, record: &InfluencerRecord) -> Self {
        let get = |path: &str| lookup_record(record, path);
        let credibility = get("credibility_score.value").and_then(Value::as_f64);
        let follower_count = get(FOLLOWER_COUNT);

        Self {
            id: id.get(),
            username: get("username").and_then(Value::as_str).map(str::to_string),
            follower_count_display: format_number(follower_count),
            follower_count: follower_count.cloned(),
            is_verified: get(IS_VERIFIED).and_then(Value::as_bool),
            account_tier: get("account_tier").cloned(),
            engagement_rate: get("robust_tier_adjusted_engagement_rate").cloned(),
            credibility: CredibilitySummary {
                value: credibility,
                display: format_score(get("credibility_score.value")),
                category: ScoreCategory::from_score(credibility),
            },
            total_posts_analyzed: get("total_posts_analyzed").cloned(),
            risk: RiskSummary {
                level: RiskLevel::parse(get("risk_level").and_then(Value::as_str)),
                score: get("risk_score").cloned(),
                factors: get("risk_factors").cloned(),
                explanation: get(RISK_EXPLANATION)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            primary_categories: get(PRIMARY_CATEGORIES)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
