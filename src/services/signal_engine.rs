use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SignalConfig;
use crate::errors::AppError;
use crate::models::{ArticleSentiment, ConsensusResult, NormalizedArticles, RawSentimentRecord, ScoringMethod};
use crate::services::consensus::ConsensusResolver;
use crate::services::normalizer;
use crate::services::scoring::score_method;

/// Turns one classified article set into one recommendation.
///
/// Holds only immutable configuration, so a single engine can serve
/// concurrent analyses for different companies.
pub struct SignalEngine {
    config: SignalConfig,
    resolver: ConsensusResolver,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Result<Self, AppError> {
        let resolver = ConsensusResolver::new(config)?;
        info!(
            "Signal engine ready (thresholds {}/{}, min_articles {}, window {} days)",
            config.positive_threshold,
            config.negative_threshold,
            config.window.min_articles,
            config.window.days_back
        );
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn analyze(&self, normalized: &NormalizedArticles) -> Result<ConsensusResult, AppError> {
        self.analyze_at(normalized, Utc::now())
    }

    /// Analyze as if the current time were `as_of`. Deterministic for a given input.
    pub fn analyze_at(
        &self,
        normalized: &NormalizedArticles,
        as_of: DateTime<Utc>,
    ) -> Result<ConsensusResult, AppError> {
        self.check_window(&normalized.articles, as_of)?;

        let results = ScoringMethod::ALL
            .map(|method| score_method(method, &normalized.articles, &self.config, as_of));

        Ok(self.resolver.resolve(results, normalized, as_of))
    }

    /// Normalize raw classifier records, then analyze them
    pub fn analyze_records_at(
        &self,
        records: &[RawSentimentRecord],
        as_of: DateTime<Utc>,
    ) -> Result<ConsensusResult, AppError> {
        let normalized = normalizer::normalize(records)?;
        self.analyze_at(&normalized, as_of)
    }

    /// Normalize an untyped JSON payload, then analyze it
    pub fn analyze_value_at(
        &self,
        payload: &Value,
        as_of: DateTime<Utc>,
    ) -> Result<ConsensusResult, AppError> {
        let normalized = normalizer::normalize_value(payload)?;
        self.analyze_at(&normalized, as_of)
    }

    /// Same result as [`SignalEngine::analyze_at`], with the three scorers
    /// running on the blocking pool in parallel.
    pub async fn analyze_concurrent_at(
        &self,
        normalized: &NormalizedArticles,
        as_of: DateTime<Utc>,
    ) -> Result<ConsensusResult, AppError> {
        self.check_window(&normalized.articles, as_of)?;

        let articles: Arc<[ArticleSentiment]> = Arc::from(normalized.articles.clone());
        let [basic, weighted, time_weighted] = ScoringMethod::ALL.map(|method| {
            let articles = Arc::clone(&articles);
            let config = self.config;
            tokio::task::spawn_blocking(move || score_method(method, &articles, &config, as_of))
        });

        let (basic, weighted, time_weighted) = tokio::try_join!(basic, weighted, time_weighted)?;
        debug!("Concurrent scoring finished for {} articles", articles.len());

        Ok(self.resolver.resolve([basic, weighted, time_weighted], normalized, as_of))
    }

    /// The article set must fit the configured window. Age is measured in
    /// whole days, and future-dated articles are allowed.
    fn check_window(&self, articles: &[ArticleSentiment], as_of: DateTime<Utc>) -> Result<(), AppError> {
        let window = &self.config.window;
        if articles.len() > window.max_articles {
            return Err(AppError::Validation(format!(
                "received {} articles but max_articles is {}",
                articles.len(),
                window.max_articles
            )));
        }
        if let Some((index, age_days)) = articles
            .iter()
            .map(|a| (as_of - a.published_at).num_days())
            .enumerate()
            .find(|(_, age_days)| *age_days > window.days_back)
        {
            return Err(AppError::Validation(format!(
                "article {} was published {} days ago, outside the {}-day window",
                index, age_days, window.days_back
            )));
        }
        Ok(())
    }
}
