//! Sample-size confidence tiers.

use serde::{Deserialize, Serialize};

/// Default match count below which an entity is flagged as low sample.
pub const DEFAULT_LOW_SAMPLE_THRESHOLD: u32 = 20;

/// How much an entity's derived rates can be trusted, by match count.
///
/// Variants are ordered from least to most reliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    /// Fewer than 5 matches
    #[default]
    VeryLow,
    /// 5 to 9 matches
    Limited,
    /// 10 to 19 matches
    SmallSample,
    /// 20 to 49 matches
    Moderate,
    /// 50 matches or more
    Reliable,
}

impl ConfidenceLabel {
    /// Classify a match count.
    pub fn from_matches(matches: u32) -> Self {
        if matches < 5 {
            ConfidenceLabel::VeryLow
        } else if matches < 10 {
            ConfidenceLabel::Limited
        } else if matches < 20 {
            ConfidenceLabel::SmallSample
        } else if matches < 50 {
            ConfidenceLabel::Moderate
        } else {
            ConfidenceLabel::Reliable
        }
    }
}

/// Returns true when `matches` falls under the low-sample `threshold`.
pub fn is_low_sample(matches: u32, threshold: u32) -> bool {
    matches < threshold
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLabel::VeryLow => write!(f, "very low"),
            ConfidenceLabel::Limited => write!(f, "limited"),
            ConfidenceLabel::SmallSample => write!(f, "small sample"),
            ConfidenceLabel::Moderate => write!(f, "moderate"),
            ConfidenceLabel::Reliable => write!(f, "reliable"),
        }
    }
}
