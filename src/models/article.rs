use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Sentiment classification assigned to a single article
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Case-insensitive parse of the label names classifiers commonly emit.
    /// Returns `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Some(SentimentLabel::Positive),
            "negative" | "neg" | "label_0" => Some(SentimentLabel::Negative),
            "neutral" | "neu" | "label_1" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    /// POSITIVE and NEGATIVE swap, NEUTRAL stays
    pub fn mirrored(self) -> Self {
        match self {
            SentimentLabel::Positive => SentimentLabel::Negative,
            SentimentLabel::Negative => SentimentLabel::Positive,
            SentimentLabel::Neutral => SentimentLabel::Neutral,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// A classified article in the shape the scorers consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSentiment {
    pub label: SentimentLabel,

    /// Classifier confidence (0.0 to 1.0)
    pub confidence: f64,

    pub published_at: DateTime<Utc>,
}

impl ArticleSentiment {
    /// Strict constructor: confidence outside [0, 1] is rejected, never clamped.
    pub fn new(
        label: SentimentLabel,
        confidence: f64,
        published_at: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(AppError::Validation(format!(
                "confidence must be between 0 and 1, got {}",
                confidence
            )));
        }
        Ok(Self {
            label,
            confidence,
            published_at,
        })
    }
}

/// Classifier output as it arrives from upstream, before validation.
///
/// Field names vary between sources, so the common spellings are accepted as
/// aliases. Confidence is kept as a raw JSON value so that non-numeric input
/// can be reported instead of failing deserialization opaquely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSentimentRecord {
    #[serde(default, alias = "sentiment", alias = "combined_sentiment_label")]
    pub label: Option<String>,

    #[serde(default, alias = "score", alias = "combined_sentiment_confidence")]
    pub confidence: serde_json::Value,

    #[serde(default, alias = "publishedAt", alias = "publication_date")]
    pub published_at: Option<String>,
}

impl RawSentimentRecord {
    pub fn new(label: &str, confidence: f64, published_at: DateTime<Utc>) -> Self {
        Self {
            label: Some(label.to_string()),
            confidence: serde_json::json!(confidence),
            published_at: Some(published_at.to_rfc3339()),
        }
    }
}

/// Output of normalization: validated articles plus what had to be coerced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedArticles {
    pub articles: Vec<ArticleSentiment>,

    /// Records whose label was unrecognized and were coerced to NEUTRAL with zero confidence
    pub unrecognized_labels: usize,

    /// Records whose confidence was outside [0, 1] and was clamped
    pub clamped_confidences: usize,
}

impl NormalizedArticles {
    /// Wrap already-validated articles
    pub fn from_articles(articles: Vec<ArticleSentiment>) -> Self {
        Self {
            articles,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
