mod article;
mod consensus;
mod signal;

pub use article::{ArticleSentiment, NormalizedArticles, RawSentimentRecord, SentimentLabel};
pub use consensus::{Agreement, ConsensusResult, SentimentBreakdown};
pub use signal::{LabelTally, ScoreDetail, ScorerResult, ScoringMethod, Signal};
