use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured answer from `/chat`. Every field may be absent, and a field
/// of the wrong JSON type counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub cached: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cache_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_response_time")]
    pub response_time: Option<ResponseTime>,
    #[serde(default, deserialize_with = "lenient_texts")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient_texts")]
    pub specific_articles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_texts")]
    pub exact_quotes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub missing_info: Option<String>,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: Vec<Source>,
    #[serde(default, deserialize_with = "lenient_texts")]
    pub cross_references: Vec<String>,
}

impl ChatResponse {
    pub fn is_cached(&self) -> bool {
        self.cached == Some(true)
    }

    /// `missing_info` with blank values treated as absent.
    pub fn missing_info(&self) -> Option<&str> {
        self.missing_info.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Server-reported latency: either display text such as `"1.42s"` or bare
/// seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseTime {
    Seconds(f64),
    Text(String),
}

impl ResponseTime {
    /// Seconds as the leading number of the text, like JavaScript `parseFloat`.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(s) => Some(*s),
            Self::Text(t) => parse_leading_float(t),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Seconds(s) => s.to_string(),
            Self::Text(t) => t.clone(),
        }
    }
}

/// A retrieved passage backing the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text_snippet: Option<String>,
}

impl Source {
    pub fn identifier(&self) -> &str {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.source_id.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("unknown")
    }

    /// Displayed relevance, `round(100 / (1 + score))`. Lower raw scores are
    /// closer matches.
    pub fn relevance_percent(&self) -> Option<i64> {
        self.score.map(|score| (100.0 / (1.0 + score)).round() as i64)
    }
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            '+' | '-' if i == 0 => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Strings as they are, numbers and booleans in their text form.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_response_time<'de, D>(deserializer: D) -> Result<Option<ResponseTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(ResponseTime::Seconds),
        Value::String(s) => Some(ResponseTime::Text(s)),
        _ => None,
    })
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Non-array values become an empty list instead of a decode failure.
fn lenient_texts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(value_text).collect(),
        _ => Vec::new(),
    })
}

fn lenient_sources<'de, D>(deserializer: D) -> Result<Vec<Source>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_is_optional() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, ChatResponse::default());
    }

    #[test]
    fn non_array_sequences_are_absent() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"key_points":"not a list","sources":null,"exact_quotes":[1,"two"],"cross_references":{}}"#,
        )
        .unwrap();
        assert!(response.key_points.is_empty());
        assert!(response.sources.is_empty());
        assert!(response.cross_references.is_empty());
        assert_eq!(response.exact_quotes, ["1", "two"]);
    }

    #[test]
    fn blank_missing_info_is_absent() {
        let mut response = ChatResponse { missing_info: Some("  \n".into()), ..Default::default() };
        assert_eq!(response.missing_info(), None);
        response.missing_info = Some("fecha".into());
        assert_eq!(response.missing_info(), Some("fecha"));
    }

    #[test]
    fn odd_scalar_fields_do_not_fail_the_answer() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"response":"9 a 5","confidence":0.8,"cached":"true","cache_type":7,
                "missing_info":["fecha"],"response_time":{"secs":1},"sources":[]}"#,
        )
        .unwrap();
        assert_eq!(response.response.as_deref(), Some("9 a 5"));
        assert_eq!(response.confidence.as_deref(), Some("0.8"));
        assert!(response.is_cached());
        assert_eq!(response.cache_type.as_deref(), Some("7"));
        assert_eq!(response.missing_info(), None);
        assert_eq!(response.response_time, None);
    }

    #[test]
    fn sources_with_odd_fields_are_kept() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"sources":[{"source":"ley.pdf","score":"0.5"},{"source_id":42,"score":"alta","page":null},"texto suelto"]}"#,
        )
        .unwrap();
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.sources[0].identifier(), "ley.pdf");
        assert_eq!(response.sources[0].relevance_percent(), Some(67));
        assert_eq!(response.sources[1].identifier(), "42");
        assert_eq!(response.sources[1].score, None);
    }

    #[test]
    fn relevance_percent() {
        let with = |score| Source { score: Some(score), ..Default::default() };
        assert_eq!(with(0.0).relevance_percent(), Some(100));
        assert_eq!(with(1.0).relevance_percent(), Some(50));
        assert_eq!(with(3.0).relevance_percent(), Some(25));
        assert_eq!(Source::default().relevance_percent(), None);
    }

    #[test]
    fn identifier_falls_back() {
        let source: Source = serde_json::from_str(r#"{"source_id":"ley-1.pdf","page":4}"#).unwrap();
        assert_eq!(source.identifier(), "ley-1.pdf");
        assert_eq!(source.page, Some(4));
        assert_eq!(Source::default().identifier(), "unknown");
        let source: Source = serde_json::from_str(r#"{"source":"a","page":"12"}"#).unwrap();
        assert_eq!(source.page, Some(12));
    }

    #[test]
    fn response_time_accepts_text_or_number() {
        let response: ChatResponse = serde_json::from_str(r#"{"response_time":"1.42s"}"#).unwrap();
        assert_eq!(response.response_time.as_ref().and_then(ResponseTime::seconds), Some(1.42));
        let response: ChatResponse = serde_json::from_str(r#"{"response_time":3.5}"#).unwrap();
        assert_eq!(response.response_time.unwrap().seconds(), Some(3.5));
    }

    #[test]
    fn leading_float_parsing() {
        assert_eq!(parse_leading_float("0.85s"), Some(0.85));
        assert_eq!(parse_leading_float(" 12 segundos"), Some(12.0));
        assert_eq!(parse_leading_float("4."), Some(4.0));
        assert_eq!(parse_leading_float("1.2.3"), Some(1.2));
        assert_eq!(parse_leading_float("rápido"), None);
    }
}
