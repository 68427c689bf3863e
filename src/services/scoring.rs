//! The three scoring methods. Each is a pure function of the article slice and
//! configuration, so they can run in any order or in parallel.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::SignalConfig;
use crate::models::{
    ArticleSentiment, LabelTally, ScoreDetail, ScorerResult, ScoringMethod, SentimentLabel, Signal,
};

const RECENT_WEIGHT: f64 = 2.0;
const OLDER_WEIGHT: f64 = 1.0;

/// Signal from raw label counts, ignoring confidence and recency
pub fn basic_signal(articles: &[ArticleSentiment], config: &SignalConfig) -> ScorerResult {
    let tally = tally_by(articles, |_| 1.0);
    build_result(ScoringMethod::Basic, tally, config, None)
}

/// Signal from label counts weighted by classifier confidence
pub fn weighted_signal(articles: &[ArticleSentiment], config: &SignalConfig) -> ScorerResult {
    let tally = tally_by(articles, |article| article.confidence);
    build_result(ScoringMethod::Weighted, tally, config, None)
}

/// Signal from label counts weighted by recency.
///
/// Articles no older than half of `days_back` weigh 2.0, older ones 1.0.
/// Articles dated after `as_of` count as age zero.
pub fn time_weighted_signal(
    articles: &[ArticleSentiment],
    config: &SignalConfig,
    as_of: DateTime<Utc>,
) -> ScorerResult {
    let cutoff = config.window.recent_cutoff();
    let recent_articles = articles
        .iter()
        .filter(|article| is_recent(article, as_of, cutoff))
        .count();
    let tally = tally_by(articles, |article| {
        if is_recent(article, as_of, cutoff) {
            RECENT_WEIGHT
        } else {
            OLDER_WEIGHT
        }
    });
    build_result(ScoringMethod::TimeWeighted, tally, config, Some(recent_articles))
}

/// Run one method by name
pub fn score_method(
    method: ScoringMethod,
    articles: &[ArticleSentiment],
    config: &SignalConfig,
    as_of: DateTime<Utc>,
) -> ScorerResult {
    match method {
        ScoringMethod::Basic => basic_signal(articles, config),
        ScoringMethod::Weighted => weighted_signal(articles, config),
        ScoringMethod::TimeWeighted => time_weighted_signal(articles, config, as_of),
    }
}

/// Threshold rule shared by all methods.
///
/// BUY when positive >= positive_threshold * negative, else SELL when
/// negative >= negative_threshold * positive, else HOLD. With no directional
/// weight at all both comparisons would hold trivially, so that case is HOLD.
pub fn decide(tally: &LabelTally, config: &SignalConfig) -> Signal {
    if tally.positive + tally.negative <= 0.0 {
        return Signal::Hold;
    }
    if tally.positive >= config.positive_threshold * tally.negative {
        Signal::Buy
    } else if tally.negative >= config.negative_threshold * tally.positive {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

fn is_recent(article: &ArticleSentiment, as_of: DateTime<Utc>, cutoff: Duration) -> bool {
    let age = (as_of - article.published_at).max(Duration::zero());
    age <= cutoff
}

fn tally_by<F>(articles: &[ArticleSentiment], weight: F) -> LabelTally
where
    F: Fn(&ArticleSentiment) -> f64,
{
    articles.iter().fold(LabelTally::default(), |mut tally, article| {
        let w = weight(article);
        match article.label {
            SentimentLabel::Positive => tally.positive += w,
            SentimentLabel::Negative => tally.negative += w,
            SentimentLabel::Neutral => tally.neutral += w,
        }
        tally
    })
}

fn build_result(
    method: ScoringMethod,
    tally: LabelTally,
    config: &SignalConfig,
    recent_articles: Option<usize>,
) -> ScorerResult {
    let signal = decide(&tally, config);
    let mut detail = ScoreDetail::from_tally(tally);
    detail.recent_articles = recent_articles;
    let reason = explain(method, signal, &detail);

    debug!(
        "{} scorer: {} (positive={:.2}, negative={:.2}, neutral={:.2})",
        method, signal, tally.positive, tally.negative, tally.neutral
    );

    ScorerResult {
        method,
        signal,
        score: tally.positive - tally.negative,
        detail,
        reason,
    }
}

fn explain(method: ScoringMethod, signal: Signal, detail: &ScoreDetail) -> String {
    let tally = &detail.tally;
    if tally.positive + tally.negative <= 0.0 {
        return format!("{}: no clear sentiment direction detected", method.title());
    }

    match method {
        ScoringMethod::Basic => match signal {
            Signal::Buy if tally.negative == 0.0 => format!(
                "No negative sentiment detected, {} positive articles",
                tally.positive
            ),
            Signal::Sell if tally.positive == 0.0 => format!(
                "No positive sentiment detected, {} negative articles",
                tally.negative
            ),
            Signal::Buy => format!(
                "Positive articles ({}) are {:.1}x more than negative ({})",
                tally.positive, detail.positive_to_negative_ratio, tally.negative
            ),
            Signal::Sell => format!(
                "Negative articles ({}) are {:.1}x more than positive ({})",
                tally.negative, detail.negative_to_positive_ratio, tally.positive
            ),
            Signal::Hold => format!(
                "Sentiment is mixed - positive: {}, negative: {} (ratio: {:.1})",
                tally.positive, tally.negative, detail.positive_to_negative_ratio
            ),
        },
        ScoringMethod::Weighted => format!(
            "Weighted analysis favors {}: {:.1}% positive vs {:.1}% negative",
            signal, detail.positive_percentage, detail.negative_percentage
        ),
        ScoringMethod::TimeWeighted => format!(
            "Time-weighted analysis favors {}: {:.1}% positive vs {:.1}% negative (recent articles weighted 2x)",
            signal, detail.positive_percentage, detail.negative_percentage
        ),
    }
}
