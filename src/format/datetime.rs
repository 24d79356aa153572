use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{Format, FormatContext, FormatKind};
use crate::errors::FormatError;
use crate::value::to_text;

const DATETIME_INPUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_INPUTS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse the textual date and time representations found in submitted and stored data
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }

    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_INPUTS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Renders dates and timestamps with a `strftime` pattern
#[derive(Clone, Debug)]
pub struct FormatDateTime {
    pattern: String,
}

impl Default for FormatDateTime {
    fn default() -> Self {
        FormatDateTime {
            pattern: "%-m/%-d/%Y %I:%M %p".to_string(),
        }
    }
}

impl FormatDateTime {
    pub fn new(pattern: impl Into<String>) -> Self {
        FormatDateTime {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Format for FormatDateTime {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let text = to_text(value);
        if text.is_empty() {
            return Ok(Value::Null);
        }

        let parsed =
            parse_datetime(&text).ok_or_else(|| anyhow!("invalid time `{text}` passed to formatter"))?;
        Ok(Value::from(parsed.format(&self.pattern).to_string()))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{apply, FormatMode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    #[test]
    fn it_parses_common_representations() {
        assert!(parse_datetime("2024-03-05 14:30:00").is_some());
        assert!(parse_datetime("2024-03-05T14:30:00+02:00").is_some());
        assert!(parse_datetime("3/5/2024").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn it_formats_dates() {
        let map = Map::new();
        let ctx = FormatContext::new(&map);

        let f = FormatDateTime::default();
        assert_eq!(
            apply(&f, &json!("2024-03-05 14:30:00"), FormatMode::Html, &ctx),
            json!("3/5/2024 02:30 PM")
        );
        assert_eq!(apply(&f, &json!(""), FormatMode::Raw, &ctx), Value::Null);

        let f = FormatDateTime::new("%Y");
        assert_eq!(apply(&f, &json!("gibberish"), FormatMode::Raw, &ctx), Value::Null);
        assert_eq!(apply(&f, &json!("2024-03-05"), FormatMode::Raw, &ctx), json!("2024"));
    }
}
