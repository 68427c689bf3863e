//! Sentiment-driven trading signals.
//!
//! Takes a finite list of already-classified news articles about one company
//! and derives a single BUY/SELL/HOLD recommendation with a confidence score
//! and a human-readable justification. Three independent scoring methods
//! (raw counts, classifier confidence, recency) vote, and a consensus
//! resolver combines them under minimum-evidence and tie-break rules.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{AnalysisWindow, SignalConfig};
pub use errors::AppError;
pub use models::{
    Agreement, ArticleSentiment, ConsensusResult, LabelTally, NormalizedArticles, RawSentimentRecord,
    ScoreDetail, ScorerResult, ScoringMethod, SentimentBreakdown, SentimentLabel, Signal,
};
pub use services::consensus::ConsensusResolver;
pub use services::report::render_summary;
pub use services::signal_engine::SignalEngine;
