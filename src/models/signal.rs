use serde::{Deserialize, Serialize};

/// Directional trading recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn is_directional(self) -> bool {
        !matches!(self, Signal::Hold)
    }

    /// BUY and SELL swap, HOLD stays
    pub fn mirrored(self) -> Self {
        match self {
            Signal::Buy => Signal::Sell,
            Signal::Sell => Signal::Buy,
            Signal::Hold => Signal::Hold,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        })
    }
}

/// The three independent ways of scoring an article set, in consensus order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Raw label counts
    Basic,

    /// Label counts weighted by classifier confidence
    Weighted,

    /// Label counts weighted by recency
    TimeWeighted,
}

impl ScoringMethod {
    pub const ALL: [ScoringMethod; 3] = [
        ScoringMethod::Basic,
        ScoringMethod::Weighted,
        ScoringMethod::TimeWeighted,
    ];

    /// Sentence-case name for the start of a message
    pub fn title(self) -> &'static str {
        match self {
            ScoringMethod::Basic => "Basic",
            ScoringMethod::Weighted => "Weighted",
            ScoringMethod::TimeWeighted => "Time-weighted",
        }
    }
}

impl std::fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            ScoringMethod::Basic => "basic",
            ScoringMethod::Weighted => "weighted",
            ScoringMethod::TimeWeighted => "time-weighted",
        })
    }
}

/// Per-label totals. Plain counts for the basic method, summed weights otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelTally {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl LabelTally {
    pub fn total(&self) -> f64 {
        self.positive + self.negative + self.neutral
    }

    /// positive / max(negative, 1). The floor of 1 is a cap on the ratio, not infinity.
    pub fn positive_to_negative_ratio(&self) -> f64 {
        self.positive / self.negative.max(1.0)
    }

    /// negative / max(positive, 1)
    pub fn negative_to_positive_ratio(&self) -> f64 {
        self.negative / self.positive.max(1.0)
    }

    /// Share of each label in the total, as percentages. All zero for an empty tally.
    pub fn percentages(&self) -> (f64, f64, f64) {
        let total = self.total();
        if total <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (
            self.positive / total * 100.0,
            self.negative / total * 100.0,
            self.neutral / total * 100.0,
        )
    }

    /// Net directional weight as a share of all weight, from -1.0 to 1.0
    pub fn net_strength(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        (self.positive - self.negative) / total
    }
}

/// Breakdown behind a scorer decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub tally: LabelTally,
    pub positive_to_negative_ratio: f64,
    pub negative_to_positive_ratio: f64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,

    /// Articles inside the recent half of the window (time-weighted method only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_articles: Option<usize>,
}

impl ScoreDetail {
    pub fn from_tally(tally: LabelTally) -> Self {
        let (positive_percentage, negative_percentage, neutral_percentage) = tally.percentages();
        Self {
            tally,
            positive_to_negative_ratio: tally.positive_to_negative_ratio(),
            negative_to_positive_ratio: tally.negative_to_positive_ratio(),
            positive_percentage,
            negative_percentage,
            neutral_percentage,
            recent_articles: None,
        }
    }
}

/// Output of one scoring method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerResult {
    pub method: ScoringMethod,
    pub signal: Signal,

    /// Directional magnitude: positive minus negative (counts or weights)
    pub score: f64,

    pub detail: ScoreDetail,

    /// Human-readable interpretation
    pub reason: String,
}
