use crate::config::ModelDims;
use crate::mapping::{IdKind, IdentifierMap};
use crate::types::InteractionRecord;

/// Index substituted when neither the history nor the pending query maps to
/// anything known, so the predictor still receives one valid step.
const SENTINEL_INDEX: i64 = 1;

/// Three parallel fixed-length integer sequences consumable by the predictor.
///
/// Invariant: all three channels have identical length and identical
/// zero-padding positions. Padding is prepended, never appended, so the
/// last valid step is always right-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    /// Concept indices.
    pub q: Vec<i64>,
    /// Concept index plus `n_concepts` when the step was answered correctly.
    pub qa: Vec<i64>,
    /// Problem indices.
    pub pid: Vec<i64>,
}

impl EncodedSequence {
    pub fn window_len(&self) -> usize {
        self.q.len()
    }

    /// Position of the last non-padding step; 0 when everything is padding.
    pub fn last_valid_position(&self) -> usize {
        self.q.iter().rposition(|&idx| idx != 0).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub seq: EncodedSequence,
    /// History records dropped because their concept or problem was unknown.
    pub dropped: usize,
    /// Whether the pending query itself could be encoded.
    pub pending_encoded: bool,
}

/// Encode an ordered history plus one pending (concept, problem) query into
/// predictor input of exactly `dims.window_len` steps per channel.
///
/// Unknown identifiers never abort the encoding: affected history records
/// are skipped with a warning, and an unmappable pending query on an
/// otherwise empty sequence degrades to a single sentinel step.
pub fn encode(
    map: &IdentifierMap,
    dims: &ModelDims,
    history: &[InteractionRecord],
    pending_concept: &str,
    pending_problem: &str,
) -> EncodeOutcome {
    let mut q = Vec::with_capacity(history.len() + 1);
    let mut qa = Vec::with_capacity(history.len() + 1);
    let mut pid = Vec::with_capacity(history.len() + 1);
    let mut dropped = 0usize;

    for record in history {
        let concept_idx = map.to_index(IdKind::Concept, &record.concept_id);
        let problem_idx = map.to_index(IdKind::Problem, &record.problem_id);
        let (Some(concept_idx), Some(problem_idx)) = (concept_idx, problem_idx) else {
            tracing::warn!(
                concept = %record.concept_id,
                problem = %record.problem_id,
                "skipping interaction with unknown identifier"
            );
            dropped += 1;
            continue;
        };

        q.push(concept_idx as i64);
        qa.push(concept_idx as i64 + record.correct as i64 * dims.n_concepts as i64);
        pid.push(problem_idx as i64);
    }

    let pending_encoded = match (
        map.to_index(IdKind::Concept, pending_concept),
        map.to_index(IdKind::Problem, pending_problem),
    ) {
        (Some(concept_idx), Some(problem_idx)) => {
            q.push(concept_idx as i64);
            // No outcome term: the unanswered query sits on the incorrect
            // branch of the qa encoding, matching the model's training data.
            qa.push(concept_idx as i64);
            pid.push(problem_idx as i64);
            true
        }
        _ => {
            tracing::warn!(
                concept = %pending_concept,
                problem = %pending_problem,
                "pending query has unknown identifier"
            );
            if q.is_empty() {
                q.push(SENTINEL_INDEX);
                qa.push(SENTINEL_INDEX);
                pid.push(SENTINEL_INDEX);
            }
            false
        }
    };

    let window = dims.window_len;
    if q.len() > window {
        // Keep the most recent steps; truncation wins over padding.
        q.drain(..q.len() - window);
        qa.drain(..qa.len() - window);
        pid.drain(..pid.len() - window);
    } else if q.len() < window {
        let pad = window - q.len();
        q.splice(0..0, std::iter::repeat(0).take(pad));
        qa.splice(0..0, std::iter::repeat(0).take(pad));
        pid.splice(0..0, std::iter::repeat(0).take(pad));
    }

    EncodeOutcome {
        seq: EncodedSequence { q, qa, pid },
        dropped,
        pending_encoded,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::ModelDims;
    use crate::mapping::IdentifierMap;
    use crate::types::InteractionRecord;

    fn sample_map() -> IdentifierMap {
        let concepts = HashMap::from([("algebra".to_string(), 1), ("geometry".to_string(), 2)]);
        let problems = HashMap::from([
            ("p1".to_string(), 1),
            ("p2".to_string(), 2),
            ("p3".to_string(), 3),
        ]);
        IdentifierMap::from_tables(concepts, problems).unwrap()
    }

    fn dims(window: usize) -> ModelDims {
        ModelDims::new(10, 10, window).unwrap()
    }

    #[test]
    fn left_pads_short_history() {
        let map = sample_map();
        let outcome = encode(
            &map,
            &dims(5),
            &[InteractionRecord::new("algebra", "p1", true)],
            "geometry",
            "p2",
        );
        assert_eq!(outcome.seq.q, vec![0, 0, 0, 1, 2]);
        assert_eq!(outcome.seq.qa, vec![0, 0, 0, 11, 2]);
        assert_eq!(outcome.seq.pid, vec![0, 0, 0, 1, 2]);
        assert_eq!(outcome.dropped, 0);
        assert!(outcome.pending_encoded);
    }

    #[test]
    fn incorrect_answer_has_no_outcome_term() {
        let map = sample_map();
        let outcome = encode(
            &map,
            &dims(3),
            &[InteractionRecord::new("algebra", "p1", false)],
            "algebra",
            "p1",
        );
        assert_eq!(outcome.seq.qa, vec![0, 1, 1]);
    }

    #[test]
    fn truncation_keeps_most_recent() {
        let map = sample_map();
        let history: Vec<InteractionRecord> = (0..4)
            .map(|i| InteractionRecord::new("algebra", "p1", i % 2 == 0))
            .collect();
        let outcome = encode(&map, &dims(3), &history, "geometry", "p3");
        // 5 entries total (4 history + pending), only the last 3 survive.
        assert_eq!(outcome.seq.window_len(), 3);
        assert_eq!(outcome.seq.q, vec![1, 1, 2]);
        assert_eq!(outcome.seq.pid, vec![1, 1, 3]);
    }

    #[test]
    fn unknown_history_records_are_dropped_not_fatal() {
        let map = sample_map();
        let history = vec![
            InteractionRecord::new("calculus", "p1", true),
            InteractionRecord::new("algebra", "p9", true),
            InteractionRecord::new("algebra", "p1", true),
        ];
        let outcome = encode(&map, &dims(4), &history, "algebra", "p2");
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.seq.q, vec![0, 0, 1, 1]);
    }

    #[test]
    fn unknown_pending_with_history_keeps_history_only() {
        let map = sample_map();
        let outcome = encode(
            &map,
            &dims(4),
            &[InteractionRecord::new("algebra", "p1", true)],
            "calculus",
            "p9",
        );
        assert!(!outcome.pending_encoded);
        assert_eq!(outcome.seq.q, vec![0, 0, 0, 1]);
    }

    #[test]
    fn unknown_pending_with_empty_history_yields_sentinel() {
        let map = sample_map();
        let outcome = encode(&map, &dims(4), &[], "calculus", "p9");
        assert!(!outcome.pending_encoded);
        assert_eq!(outcome.seq.q, vec![0, 0, 0, 1]);
        assert_eq!(outcome.seq.qa, vec![0, 0, 0, 1]);
        assert_eq!(outcome.seq.pid, vec![0, 0, 0, 1]);
    }

    #[test]
    fn last_valid_position_is_right_aligned() {
        let map = sample_map();
        let outcome = encode(&map, &dims(6), &[], "algebra", "p1");
        assert_eq!(outcome.seq.last_valid_position(), 5);

        let all_padding = EncodedSequence {
            q: vec![0; 4],
            qa: vec![0; 4],
            pid: vec![0; 4],
        };
        assert_eq!(all_padding.last_valid_position(), 0);
    }

    #[test]
    fn window_of_one_holds_only_the_pending_step() {
        let map = sample_map();
        let outcome = encode(
            &map,
            &dims(1),
            &[InteractionRecord::new("algebra", "p1", true)],
            "geometry",
            "p2",
        );
        assert_eq!(outcome.seq.q, vec![2]);
        assert_eq!(outcome.seq.pid, vec![2]);
    }
}
