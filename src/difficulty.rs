use serde::{Deserialize, Serialize};

/// Per-student difficulty category of a problem, derived from the predicted
/// success probability. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    /// Step function over the success probability, lower bound inclusive:
    /// ≥0.80 very easy, ≥0.65 easy, ≥0.50 medium, ≥0.35 hard, else very hard.
    pub fn classify(probability: f64) -> Self {
        if probability >= 0.80 {
            Self::VeryEasy
        } else if probability >= 0.65 {
            Self::Easy
        } else if probability >= 0.50 {
            Self::Medium
        } else if probability >= 0.35 {
            Self::Hard
        } else {
            Self::VeryHard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryEasy => "very_easy",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::VeryHard => "very_hard",
        }
    }
}
