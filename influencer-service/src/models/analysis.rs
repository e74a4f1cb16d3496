use serde_json::Value;

/// Opening marker of a fenced JSON block.
pub const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// The `ai_analysis` column after inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum AiAnalysis {
    /// Not fenced; returned exactly as stored.
    RawText(String),
    /// Fenced JSON that parsed.
    Parsed(Value),
    /// Fenced but not valid JSON; the stored text is kept.
    Unparseable { raw: String, error: String },
}

impl AiAnalysis {
    /// Classify stored text. Only text starting with ```` ```json ```` is
    /// parsed; unfenced text is never parsed, even when it is valid JSON.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let Some(body) = strip_fence(&text) else {
            return Self::RawText(text);
        };

        match serde_json::from_str(body) {
            Ok(parsed) => Self::Parsed(parsed),
            Err(e) => Self::Unparseable {
                error: e.to_string(),
                raw: text,
            },
        }
    }

    /// The value placed in the response body.
    pub fn into_value(self) -> Value {
        match self {
            Self::RawText(raw) | Self::Unparseable { raw, .. } => Value::String(raw),
            Self::Parsed(value) => value,
        }
    }
}

/// Body of a fenced block, or `None` when `text` does not open with the
/// fence marker. The trailing fence is optional.
pub fn strip_fence(text: &str) -> Option<&str> {
    let body = text.strip_prefix(JSON_FENCE)?.trim_start();
    let body = body.trim_end();
    let body = body.strip_suffix(FENCE).unwrap_or(body);
    Some(body.trim_end())
}
