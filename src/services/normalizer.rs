//! Normalization boundary between upstream classifier output and the scorers.
//!
//! Labels are closed to three values here: anything unrecognized becomes
//! NEUTRAL with zero confidence and is counted. Out-of-range confidence is
//! clamped to [0, 1] and counted. Non-numeric confidence or an unparseable
//! timestamp rejects the whole batch, so no partial result is ever scored.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{ArticleSentiment, NormalizedArticles, RawSentimentRecord, SentimentLabel};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Read a JSON file of classifier records and normalize it.
/// Fails with `Io` when the file cannot be read and `Json` when it is not JSON.
pub async fn load_path(path: &Path) -> Result<NormalizedArticles, AppError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let payload: Value = serde_json::from_str(&raw)?;
    debug!("Loaded {} bytes of sentiment records from {}", raw.len(), path.display());
    normalize_value(&payload)
}

/// Normalize an untyped JSON payload. Anything other than an array is a
/// precondition violation.
pub fn normalize_value(payload: &Value) -> Result<NormalizedArticles, AppError> {
    let items = payload.as_array().ok_or_else(|| {
        AppError::Validation(format!(
            "expected a list of sentiment records, got {}",
            json_kind(payload)
        ))
    })?;

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawSentimentRecord>(item.clone())
                .map_err(|e| AppError::Validation(format!("record {}: {}", index, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    normalize(&records)
}

/// Validate and normalize typed raw records. Duplicates are kept; each record
/// counts independently.
pub fn normalize(records: &[RawSentimentRecord]) -> Result<NormalizedArticles, AppError> {
    let mut normalized = NormalizedArticles {
        articles: Vec::with_capacity(records.len()),
        ..NormalizedArticles::default()
    };

    for (index, record) in records.iter().enumerate() {
        let confidence = parse_confidence(&record.confidence)
            .map_err(|msg| AppError::Validation(format!("record {}: {}", index, msg)))?;
        let published_at = record
            .published_at
            .as_deref()
            .ok_or_else(|| format!("record {}: missing published_at", index))
            .and_then(|raw| {
                parse_timestamp(raw).ok_or_else(|| {
                    format!("record {}: unparseable published_at {:?}", index, raw)
                })
            })?;

        let article = match record.label.as_deref().and_then(SentimentLabel::parse) {
            Some(label) => {
                let clamped = confidence.clamp(0.0, 1.0);
                if clamped != confidence {
                    warn!(
                        "Record {} confidence {} outside [0, 1], clamped to {}",
                        index, confidence, clamped
                    );
                    normalized.clamped_confidences += 1;
                }
                ArticleSentiment {
                    label,
                    confidence: clamped,
                    published_at,
                }
            }
            None => {
                warn!(
                    "Record {} has unrecognized label {:?}, treating as NEUTRAL",
                    index, record.label
                );
                normalized.unrecognized_labels += 1;
                ArticleSentiment {
                    label: SentimentLabel::Neutral,
                    confidence: 0.0,
                    published_at,
                }
            }
        };
        normalized.articles.push(article);
    }

    debug!(
        "Normalized {} records ({} unrecognized labels, {} clamped confidences)",
        normalized.len(),
        normalized.unrecognized_labels,
        normalized.clamped_confidences
    );
    Ok(normalized)
}

fn parse_confidence(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("confidence {} is not a finite number", n)),
        Value::Null => Err("missing confidence".to_string()),
        other => Err(format!("confidence must be numeric, got {}", json_kind(other))),
    }
}

/// RFC 3339, or a naive date/datetime interpreted as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_rejects_non_list_payload() {
        let err = normalize_value(&Value::Null).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("got null"));

        assert!(normalize_value(&json!({"label": "positive"})).is_err());
    }

    #[test]
    fn test_empty_list_is_valid() {
        let normalized = normalize_value(&json!([])).unwrap();
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let normalized = normalize_value(&json!([
            {"label": "Positive", "confidence": 0.9, "published_at": "2024-05-01T12:00:00Z"},
            {"label": "NEGATIVE", "confidence": 0.8, "published_at": "2024-05-01T12:00:00Z"},
            {"label": "neutral", "confidence": 0.7, "published_at": "2024-05-01T12:00:00Z"},
        ]))
        .unwrap();

        let labels: Vec<_> = normalized.articles.iter().map(|a| a.label).collect();
        assert_eq!(
            labels,
            vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]
        );
        assert_eq!(normalized.unrecognized_labels, 0);
    }

    #[test]
    fn test_unknown_label_becomes_zero_confidence_neutral() {
        let normalized = normalize_value(&json!([
            {"label": "bullish", "confidence": 0.99, "published_at": "2024-05-01T12:00:00Z"},
            {"confidence": 0.5, "published_at": "2024-05-01T12:00:00Z"},
        ]))
        .unwrap();

        assert_eq!(normalized.unrecognized_labels, 2);
        for article in &normalized.articles {
            assert_eq!(article.label, SentimentLabel::Neutral);
            assert_eq!(article.confidence, 0.0);
        }
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped_and_flagged() {
        let normalized = normalize_value(&json!([
            {"label": "positive", "confidence": 1.4, "published_at": "2024-05-01T12:00:00Z"},
            {"label": "negative", "confidence": -0.2, "published_at": "2024-05-01T12:00:00Z"},
            {"label": "negative", "confidence": 0.4, "published_at": "2024-05-01T12:00:00Z"},
        ]))
        .unwrap();

        assert_eq!(normalized.clamped_confidences, 2);
        assert_eq!(normalized.articles[0].confidence, 1.0);
        assert_eq!(normalized.articles[1].confidence, 0.0);
        assert_eq!(normalized.articles[2].confidence, 0.4);
    }

    #[test]
    fn test_non_numeric_confidence_rejects_batch() {
        let err = normalize_value(&json!([
            {"label": "positive", "confidence": 0.9, "published_at": "2024-05-01T12:00:00Z"},
            {"label": "positive", "confidence": "high", "published_at": "2024-05-01T12:00:00Z"},
        ]))
        .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_bad_timestamp_rejects_batch() {
        let err = normalize_value(&json!([
            {"label": "positive", "confidence": 0.9, "published_at": "yesterday"},
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("unparseable published_at"));

        let err = normalize_value(&json!([
            {"label": "positive", "confidence": 0.9},
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("missing published_at"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let record = json!({"label": "positive", "confidence": 0.9, "published_at": "2024-05-01T12:00:00Z"});
        let normalized = normalize_value(&json!([record.clone(), record])).unwrap();
        assert_eq!(normalized.len(), 2);
    }

    #[tokio::test]
    async fn test_load_path_reports_io_and_json_errors() {
        let dir = std::env::temp_dir().join(format!("sentiment-signal-load-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let missing = load_path(&dir.join("does-not-exist.json")).await;
        assert!(matches!(missing, Err(AppError::Io(_))));

        let garbled = dir.join("garbled.json");
        tokio::fs::write(&garbled, "[{not json").await.unwrap();
        assert!(matches!(load_path(&garbled).await, Err(AppError::Json(_))));

        let valid = dir.join("valid.json");
        tokio::fs::write(
            &valid,
            r#"[{"label": "positive", "confidence": 0.9, "published_at": "2024-05-01T12:00:00Z"}]"#,
        )
        .await
        .unwrap();
        let normalized = load_path(&valid).await.unwrap();
        assert_eq!(normalized.len(), 1);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 12:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("01/05/2024"), None);
    }
}
