use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::AppError;

pub const MIN_MAX_ARTICLES: usize = 5;
pub const MAX_MAX_ARTICLES: usize = 100;
pub const MIN_DAYS_BACK: i64 = 1;
pub const MAX_DAYS_BACK: i64 = 90;
/// Thresholds must be strictly above this ratio
pub const MIN_THRESHOLD: f64 = 1.0;

/// Bounds of the article set handed to the scorers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    /// Upper bound on the number of articles (5 to 100)
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,

    /// How far back articles may be published, in days (1 to 90)
    #[serde(default = "default_days_back")]
    pub days_back: i64,

    /// Below this many articles the analysis reports insufficient evidence
    #[serde(default = "default_min_articles")]
    pub min_articles: usize,
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            max_articles: default_max_articles(),
            days_back: default_days_back(),
            min_articles: default_min_articles(),
        }
    }
}

fn default_max_articles() -> usize {
    30
}

fn default_days_back() -> i64 {
    30
}

fn default_min_articles() -> usize {
    5
}

impl AnalysisWindow {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_MAX_ARTICLES..=MAX_MAX_ARTICLES).contains(&self.max_articles) {
            return Err(AppError::Configuration(format!(
                "max_articles must be between {} and {}, got {}",
                MIN_MAX_ARTICLES, MAX_MAX_ARTICLES, self.max_articles
            )));
        }
        if !(MIN_DAYS_BACK..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(AppError::Configuration(format!(
                "days_back must be between {} and {}, got {}",
                MIN_DAYS_BACK, MAX_DAYS_BACK, self.days_back
            )));
        }
        if self.min_articles < 1 {
            return Err(AppError::Configuration(
                "min_articles must be at least 1".to_string(),
            ));
        }
        if self.min_articles > self.max_articles {
            return Err(AppError::Configuration(format!(
                "min_articles ({}) cannot exceed max_articles ({})",
                self.min_articles, self.max_articles
            )));
        }
        Ok(())
    }

    /// Articles at most this old fall into the recent half of the window
    pub fn recent_cutoff(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.days_back * 86_400 / 2)
    }
}

/// Thresholds and window shared by the scorers and the consensus resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// positive/negative ratio that triggers BUY. Must exceed 1.0.
    #[serde(default = "default_threshold")]
    pub positive_threshold: f64,

    /// negative/positive ratio that triggers SELL. Must exceed 1.0.
    #[serde(default = "default_threshold")]
    pub negative_threshold: f64,

    /// Reserved for blending classifier confidence into the recency scorer (0.0 to 1.0)
    #[serde(default = "default_confidence_weight")]
    pub confidence_weight: f64,

    #[serde(default)]
    pub window: AnalysisWindow,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            positive_threshold: default_threshold(),
            negative_threshold: default_threshold(),
            confidence_weight: default_confidence_weight(),
            window: AnalysisWindow::default(),
        }
    }
}

fn default_threshold() -> f64 {
    2.0
}

fn default_confidence_weight() -> f64 {
    0.3
}

impl SignalConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys take their
    /// defaults; present but unparseable values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            positive_threshold: parse_or(&lookup, "SIGNAL_POSITIVE_THRESHOLD", defaults.positive_threshold)?,
            negative_threshold: parse_or(&lookup, "SIGNAL_NEGATIVE_THRESHOLD", defaults.negative_threshold)?,
            confidence_weight: parse_or(&lookup, "SIGNAL_CONFIDENCE_WEIGHT", defaults.confidence_weight)?,
            window: AnalysisWindow {
                max_articles: parse_or(&lookup, "SIGNAL_MAX_ARTICLES", defaults.window.max_articles)?,
                days_back: parse_or(&lookup, "SIGNAL_DAYS_BACK", defaults.window.days_back)?,
                min_articles: parse_or(&lookup, "SIGNAL_MIN_ARTICLES", defaults.window.min_articles)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("positive_threshold", self.positive_threshold),
            ("negative_threshold", self.negative_threshold),
        ] {
            if !value.is_finite() || value <= MIN_THRESHOLD {
                return Err(AppError::Configuration(format!(
                    "{} must be greater than 1.0, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence_weight) {
            return Err(AppError::Configuration(format!(
                "confidence_weight must be between 0 and 1, got {}",
                self.confidence_weight
            )));
        }
        self.window.validate()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SignalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.positive_threshold, 2.0);
        assert_eq!(config.negative_threshold, 2.0);
        assert_eq!(config.window.min_articles, 5);
    }

    #[test]
    fn test_rejects_non_positive_thresholds() {
        let config = SignalConfig {
            positive_threshold: 0.0,
            ..SignalConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

        let config = SignalConfig {
            negative_threshold: -1.5,
            ..SignalConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));

        let config = SignalConfig {
            positive_threshold: f64::NAN,
            ..SignalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_thresholds_must_exceed_one() {
        for value in [0.5, 1.0] {
            let config = SignalConfig {
                positive_threshold: value,
                ..SignalConfig::default()
            };
            assert!(matches!(config.validate(), Err(AppError::Configuration(_))), "{}", value);

            let config = SignalConfig {
                negative_threshold: value,
                ..SignalConfig::default()
            };
            assert!(config.validate().is_err());
        }

        let config = SignalConfig {
            positive_threshold: 1.01,
            negative_threshold: 1.01,
            ..SignalConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_min_articles() {
        let mut config = SignalConfig::default();
        config.window.min_articles = 0;
        assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_window_bounds() {
        let mut window = AnalysisWindow::default();
        window.max_articles = 4;
        assert!(window.validate().is_err());
        window.max_articles = 101;
        assert!(window.validate().is_err());
        window.max_articles = 100;
        window.days_back = 91;
        assert!(window.validate().is_err());
        window.days_back = 0;
        assert!(window.validate().is_err());
        window.days_back = 90;
        assert!(window.validate().is_ok());
    }

    #[test]
    fn test_confidence_weight_range() {
        let config = SignalConfig {
            confidence_weight: 1.2,
            ..SignalConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_defaults_when_missing() {
        let config = SignalConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, SignalConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = SignalConfig::from_lookup(lookup_from(&[
            ("SIGNAL_POSITIVE_THRESHOLD", "1.5"),
            ("SIGNAL_MIN_ARTICLES", " 8 "),
            ("SIGNAL_DAYS_BACK", "14"),
        ]))
        .unwrap();
        assert_eq!(config.positive_threshold, 1.5);
        assert_eq!(config.negative_threshold, 2.0);
        assert_eq!(config.window.min_articles, 8);
        assert_eq!(config.window.days_back, 14);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = SignalConfig::from_lookup(lookup_from(&[("SIGNAL_MAX_ARTICLES", "lots")]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_recent_cutoff_is_half_window() {
        let window = AnalysisWindow {
            days_back: 7,
            ..AnalysisWindow::default()
        };
        assert_eq!(window.recent_cutoff(), chrono::Duration::hours(84));
    }
}
