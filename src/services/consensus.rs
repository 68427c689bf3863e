//! Combines the three method signals into one recommendation.
//!
//! Confidence tiers (0 to 100). `s` is the time-weighted net strength as a
//! percentage: aligned with the signal for BUY/SELL, absolute for HOLD.
//!
//! | outcome                | confidence      | range      |
//! |------------------------|-----------------|------------|
//! | insufficient evidence  | 0               | 0          |
//! | full, directional      | 70 + 0.30 * s   | 70 to 100  |
//! | full, HOLD             | 45 - 0.04 * s   | 41 to 45   |
//! | partial, directional   | 25 + 0.15 * s   | 25 to 40   |
//! | partial, HOLD          | 20 - 0.08 * s   | 12 to 20   |
//! | no majority (HOLD)     | 10 - 0.05 * s   | 5 to 10    |
//!
//! Tiers are ordered by agreement first and signal second: any full agreement
//! outranks any partial agreement, which outranks no majority.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::SignalConfig;
use crate::errors::AppError;
use crate::models::{
    Agreement, ConsensusResult, NormalizedArticles, ScorerResult, ScoringMethod, SentimentBreakdown,
    SentimentLabel, Signal,
};

pub struct ConsensusResolver {
    config: SignalConfig,
}

impl ConsensusResolver {
    /// Fails with a configuration error instead of falling back to defaults
    pub fn new(config: SignalConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Resolve basic, weighted and time-weighted results (in that order) into
    /// a single recommendation for `normalized`.
    pub fn resolve(
        &self,
        results: [ScorerResult; 3],
        normalized: &NormalizedArticles,
        analyzed_at: DateTime<Utc>,
    ) -> ConsensusResult {
        let breakdown = sentiment_breakdown(normalized);
        let method_signals: Vec<Signal> = results.iter().map(|r| r.signal).collect();
        let min_articles = self.config.window.min_articles;
        let mut warnings = normalization_warnings(normalized);

        let (signal, confidence, reason, agreement) = if breakdown.total_articles < min_articles {
            warnings.push("Low confidence: Limited news data available".to_string());
            (
                Signal::Hold,
                0.0,
                format!(
                    "Insufficient articles for reliable signal: need at least {}, got {}",
                    min_articles, breakdown.total_articles
                ),
                Agreement::InsufficientEvidence,
            )
        } else {
            if breakdown.total_articles < min_articles * 2 {
                warnings.push(format!(
                    "Limited evidence: only {} articles analyzed",
                    breakdown.total_articles
                ));
            }
            self.vote(&results)
        };

        info!(
            "Consensus {} ({}) with confidence {:.1} from {} articles [{}]",
            signal,
            agreement,
            confidence,
            breakdown.total_articles,
            method_signals
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        ConsensusResult {
            signal,
            confidence,
            reason,
            agreement,
            breakdown,
            method_signals,
            method_results: results.to_vec(),
            warnings,
            analyzed_at,
        }
    }

    fn vote(&self, results: &[ScorerResult; 3]) -> (Signal, f64, String, Agreement) {
        let time_weighted = &results[2];
        let net_strength = time_weighted.detail.tally.net_strength() * 100.0;

        if let Some((signal, agreeing)) = majority(results) {
            let full = agreeing.len() == results.len();
            let agreement = if full { Agreement::Full } else { Agreement::Partial };
            let confidence = agreement_confidence(signal, full, net_strength);
            let reason = if full {
                format!(
                    "All three methods (basic, weighted, time-weighted) agree on {}. {}",
                    signal, time_weighted.reason
                )
            } else {
                let dissent = results
                    .iter()
                    .find(|r| r.signal != signal)
                    .map(|r| format!("; {} method signals {}", r.method, r.signal))
                    .unwrap_or_default();
                format!(
                    "{} and {} methods agree on {}{}",
                    agreeing[0].title(),
                    agreeing[1],
                    signal,
                    dissent
                )
            };
            (signal, round1(confidence), reason, agreement)
        } else {
            let reason = format!(
                "Methods disagree ({}); defaulting to HOLD",
                results
                    .iter()
                    .map(|r| format!("{}: {}", r.method, r.signal))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            let confidence = 10.0 - 0.05 * net_strength.abs();
            (Signal::Hold, round1(confidence), reason, Agreement::NoMajority)
        }
    }
}

/// The signal shared by at least two methods, with the methods that voted for it.
/// With three voters and three possible values, no majority means BUY, SELL
/// and HOLD each appeared once, which resolves to HOLD upstream.
fn majority(results: &[ScorerResult; 3]) -> Option<(Signal, Vec<ScoringMethod>)> {
    [Signal::Buy, Signal::Sell, Signal::Hold]
        .into_iter()
        .map(|signal| {
            let agreeing: Vec<ScoringMethod> = results
                .iter()
                .filter(|r| r.signal == signal)
                .map(|r| r.method)
                .collect();
            (signal, agreeing)
        })
        .find(|(_, agreeing)| agreeing.len() >= 2)
}

fn agreement_confidence(signal: Signal, full: bool, net_strength: f64) -> f64 {
    let confidence = match (signal, full) {
        (Signal::Buy, true) => 70.0 + 0.30 * net_strength.max(0.0),
        (Signal::Sell, true) => 70.0 + 0.30 * (-net_strength).max(0.0),
        (Signal::Hold, true) => 45.0 - 0.04 * net_strength.abs(),
        (Signal::Buy, false) => 25.0 + 0.15 * net_strength.max(0.0),
        (Signal::Sell, false) => 25.0 + 0.15 * (-net_strength).max(0.0),
        (Signal::Hold, false) => 20.0 - 0.08 * net_strength.abs(),
    };
    confidence.clamp(0.0, 100.0)
}

/// Label counts and percentages. Percentages are rounded to one decimal with
/// the largest-remainder method so that they always total exactly 100.0.
pub fn sentiment_breakdown(normalized: &NormalizedArticles) -> SentimentBreakdown {
    let count = |label: SentimentLabel| {
        normalized
            .articles
            .iter()
            .filter(|a| a.label == label)
            .count()
    };
    let counts = [
        count(SentimentLabel::Positive),
        count(SentimentLabel::Negative),
        count(SentimentLabel::Neutral),
    ];
    let total = normalized.len();
    let tenths = distribute_tenths(counts, total);

    SentimentBreakdown {
        total_articles: total,
        positive_count: counts[0],
        negative_count: counts[1],
        neutral_count: counts[2],
        positive_percentage: tenths[0] as f64 / 10.0,
        negative_percentage: tenths[1] as f64 / 10.0,
        neutral_percentage: tenths[2] as f64 / 10.0,
    }
}

fn distribute_tenths(counts: [usize; 3], total: usize) -> [usize; 3] {
    if total == 0 {
        return [0; 3];
    }
    let mut tenths = counts.map(|c| c * 1000 / total);
    let remainders = counts.map(|c| c * 1000 % total);
    let leftover = 1000 - tenths.iter().sum::<usize>();

    let mut order = [0usize, 1, 2];
    // Stable sort keeps positive, negative, neutral order among equal remainders
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for &index in order.iter().take(leftover) {
        tenths[index] += 1;
    }
    tenths
}

fn normalization_warnings(normalized: &NormalizedArticles) -> Vec<String> {
    let mut warnings = Vec::new();
    if normalized.unrecognized_labels > 0 {
        warnings.push(format!(
            "{} article(s) had unrecognized sentiment labels and were treated as neutral",
            normalized.unrecognized_labels
        ));
    }
    if normalized.clamped_confidences > 0 {
        warnings.push(format!(
            "{} confidence value(s) were outside [0, 1] and were clamped",
            normalized.clamped_confidences
        ));
    }
    warnings
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
