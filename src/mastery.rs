use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::InteractionRecord;

/// Confidence tier of a mastery estimate, by attempt count:
/// ≥10 high, ≥5 medium, else low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_attempts(attempts: usize) -> Self {
        if attempts >= 10 {
            Self::High
        } else if attempts >= 5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Mastery of one concept: blended score, confidence tier and the raw
/// statistics behind it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryEstimate {
    pub concept_id: String,
    /// `[0, 1]`; 0.5 is the neutral prior when nothing was observed.
    pub score: f64,
    pub confidence: Confidence,
    pub attempts: usize,
    pub correct: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_probability: Option<f64>,
    /// Whether the predictor contributed to the score.
    pub predictor_based: bool,
}

impl MasteryEstimate {
    /// Neutral prior for a concept with no observed attempts.
    pub(crate) fn neutral(concept_id: &str) -> Self {
        Self {
            concept_id: concept_id.to_string(),
            score: 0.5,
            confidence: Confidence::Low,
            attempts: 0,
            correct: 0,
            historical_accuracy: None,
            predicted_probability: None,
            predictor_based: false,
        }
    }
}

/// The problem attempted most often within the given records. Ties are
/// broken by first-seen order, not by map iteration order.
pub(crate) fn most_frequent_problem<'a>(records: &[&'a InteractionRecord]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for record in records {
        let entry = counts.entry(record.problem_id.as_str()).or_insert(0);
        if *entry == 0 {
            first_seen.push(record.problem_id.as_str());
        }
        *entry += 1;
    }

    // Strict > keeps the earliest problem on equal counts.
    let mut best: Option<(&str, usize)> = None;
    for problem in first_seen {
        let count = counts[problem];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((problem, count));
        }
    }
    best.map(|(problem, _)| problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_tiers() {
        assert_eq!(Confidence::from_attempts(0), Confidence::Low);
        assert_eq!(Confidence::from_attempts(4), Confidence::Low);
        assert_eq!(Confidence::from_attempts(5), Confidence::Medium);
        assert_eq!(Confidence::from_attempts(9), Confidence::Medium);
        assert_eq!(Confidence::from_attempts(10), Confidence::High);
    }

    #[test]
    fn neutral_estimate_shape() {
        let estimate = MasteryEstimate::neutral("algebra");
        assert_eq!(estimate.score, 0.5);
        assert_eq!(estimate.confidence, Confidence::Low);
        assert_eq!(estimate.attempts, 0);
        assert!(!estimate.predictor_based);
    }

    #[test]
    fn most_frequent_problem_counts() {
        let records = vec![
            InteractionRecord::new("c", "p1", true),
            InteractionRecord::new("c", "p2", false),
            InteractionRecord::new("c", "p2", true),
        ];
        let refs: Vec<&InteractionRecord> = records.iter().collect();
        assert_eq!(most_frequent_problem(&refs), Some("p2"));
    }

    #[test]
    fn most_frequent_problem_tie_breaks_first_seen() {
        let records = vec![
            InteractionRecord::new("c", "p2", true),
            InteractionRecord::new("c", "p1", true),
            InteractionRecord::new("c", "p1", false),
            InteractionRecord::new("c", "p2", false),
        ];
        let refs: Vec<&InteractionRecord> = records.iter().collect();
        assert_eq!(most_frequent_problem(&refs), Some("p2"));
    }

    #[test]
    fn most_frequent_problem_empty() {
        assert_eq!(most_frequent_problem(&[]), None);
    }
}
