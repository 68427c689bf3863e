use crate::models::{Agreement, ConsensusResult, ScoringMethod, Signal};

const RULE_WIDTH: usize = 60;

fn signal_marker(signal: Signal, agreement: Agreement) -> &'static str {
    match (signal, agreement) {
        (_, Agreement::InsufficientEvidence) => "⚪",
        (Signal::Buy, _) => "🟢 📈",
        (Signal::Sell, _) => "🔴 📉",
        (Signal::Hold, _) => "🟡 ➡️",
    }
}

/// Plain-text report of a consensus result for terminals and logs
pub fn render_summary(result: &ConsensusResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let breakdown = &result.breakdown;

    let mut lines = vec![
        rule.clone(),
        "🚦 TRADING SIGNAL ANALYSIS".to_string(),
        rule.clone(),
        format!("Signal: {} {}", signal_marker(result.signal, result.agreement), result.signal),
        format!("Confidence: {:.1}%", result.confidence),
        format!("Agreement: {}", result.agreement),
        format!("Reason: {}", result.reason),
        String::new(),
        "📊 SENTIMENT BREAKDOWN:".to_string(),
        format!("Total Articles: {}", breakdown.total_articles),
        format!("Positive: {} ({:.1}%)", breakdown.positive_count, breakdown.positive_percentage),
        format!("Negative: {} ({:.1}%)", breakdown.negative_count, breakdown.negative_percentage),
        format!("Neutral: {} ({:.1}%)", breakdown.neutral_count, breakdown.neutral_percentage),
        String::new(),
        "🧮 METHODS:".to_string(),
    ];

    lines.extend(result.method_results.iter().map(|method_result| {
        format!(
            "{:<14} {:<4}  score {:+.2}  {}",
            method_result.method.title(),
            method_result.signal,
            method_result.score,
            method_result.reason
        )
    }));

    if let Some(basic) = result
        .method_results
        .iter()
        .find(|r| r.method == ScoringMethod::Basic)
    {
        lines.push(String::new());
        lines.push("📈 RATIOS:".to_string());
        lines.push(format!("Positive/Negative Ratio: {:.2}", basic.detail.positive_to_negative_ratio));
        lines.push(format!("Negative/Positive Ratio: {:.2}", basic.detail.negative_to_positive_ratio));
    }

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push("⚠️  WARNINGS:".to_string());
        lines.extend(result.warnings.iter().map(|warning| format!("- {}", warning)));
    }

    lines.push(String::new());
    lines.push(format!("⏰ Generated: {}", result.analyzed_at.to_rfc3339()));
    lines.push(rule);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;
    use crate::models::{ArticleSentiment, NormalizedArticles, SentimentLabel};
    use crate::services::signal_engine::SignalEngine;
    use chrono::Utc;

    fn analyzed(labels: &[SentimentLabel]) -> ConsensusResult {
        let now = Utc::now();
        let normalized = NormalizedArticles::from_articles(
            labels
                .iter()
                .map(|&label| ArticleSentiment {
                    label,
                    confidence: 0.9,
                    published_at: now,
                })
                .collect(),
        );
        SignalEngine::new(SignalConfig::default())
            .unwrap()
            .analyze_at(&normalized, now)
            .unwrap()
    }

    #[test]
    fn test_summary_contains_sections() {
        let result = analyzed(&[SentimentLabel::Positive; 6]);
        let summary = render_summary(&result);

        assert!(summary.contains("TRADING SIGNAL ANALYSIS"));
        assert!(summary.contains("Signal: 🟢 📈 BUY"));
        assert!(summary.contains("Total Articles: 6"));
        assert!(summary.contains("Positive: 6 (100.0%)"));
        assert!(summary.contains("Time-weighted"));
        assert!(summary.contains("Positive/Negative Ratio: 6.00"));
        assert!(summary.contains("Basic          BUY   score"));
        assert!(summary.ends_with("=\n"));
    }

    #[test]
    fn test_summary_marks_insufficient_evidence() {
        let result = analyzed(&[SentimentLabel::Negative; 2]);
        let summary = render_summary(&result);

        assert!(summary.contains("Signal: ⚪ HOLD"));
        assert!(summary.contains("Confidence: 0.0%"));
        assert!(summary.contains("WARNINGS"));
    }
}
