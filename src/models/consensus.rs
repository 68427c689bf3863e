use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{ScorerResult, Signal};

/// How the three method signals related to each other
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    /// Fewer articles than `min_articles`; no method was trusted
    InsufficientEvidence,
    /// All three methods produced the same signal
    Full,
    /// Two of three methods matched
    Partial,
    /// BUY, SELL and HOLD each appeared once
    NoMajority,
}

impl std::fmt::Display for Agreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agreement::InsufficientEvidence => write!(f, "insufficient evidence"),
            Agreement::Full => write!(f, "full agreement"),
            Agreement::Partial => write!(f, "partial agreement"),
            Agreement::NoMajority => write!(f, "no majority"),
        }
    }
}

/// Label distribution of the normalized article set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub total_articles: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,

    /// Rounded to one decimal; the three sum to exactly 100.0 when there are articles
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
}

/// Final recommendation for one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub signal: Signal,

    /// 0.0 to 100.0
    pub confidence: f64,

    pub reason: String,
    pub agreement: Agreement,
    pub breakdown: SentimentBreakdown,

    /// Basic, weighted and time-weighted signals, in that order
    pub method_signals: Vec<Signal>,

    /// Full scorer outputs in the same order as `method_signals`
    pub method_results: Vec<ScorerResult>,

    pub warnings: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl ConsensusResult {
    pub fn is_insufficient_evidence(&self) -> bool {
        self.agreement == Agreement::InsufficientEvidence
    }
}
