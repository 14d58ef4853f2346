use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Index 0 is the padding sentinel; real entries occupy `[1, n)`.
pub const PADDING_INDEX: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Concept,
    Problem,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concept => f.write_str("concept"),
            Self::Problem => f.write_str("problem"),
        }
    }
}

/// On-disk shape of the mapping table.
#[derive(Debug, Deserialize)]
struct MappingTable {
    concepts: HashMap<String, usize>,
    problems: HashMap<String, usize>,
}

/// Bidirectional lookup between externally-visible concept/problem ids and
/// the dense indices the predictor expects.
///
/// Built once at startup and shared read-only for the process lifetime.
/// Unknown identifiers are a recoverable condition: lookups return `None`
/// and callers decide whether to skip the record or fail the request.
#[derive(Debug)]
pub struct IdentifierMap {
    concept_to_idx: HashMap<String, usize>,
    problem_to_idx: HashMap<String, usize>,
    idx_to_concept: HashMap<usize, String>,
    idx_to_problem: HashMap<usize, String>,
    concept_bound: usize,
    problem_bound: usize,
}

impl IdentifierMap {
    pub fn from_tables(
        concepts: HashMap<String, usize>,
        problems: HashMap<String, usize>,
    ) -> Result<Self, MapError> {
        let (idx_to_concept, concept_bound) = invert(IdKind::Concept, &concepts)?;
        let (idx_to_problem, problem_bound) = invert(IdKind::Problem, &problems)?;

        tracing::info!(
            concepts = concepts.len(),
            problems = problems.len(),
            "identifier map loaded"
        );

        Ok(Self {
            concept_to_idx: concepts,
            problem_to_idx: problems,
            idx_to_concept,
            idx_to_problem,
            concept_bound,
            problem_bound,
        })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, MapError> {
        let table: MappingTable = serde_json::from_reader(reader)?;
        Self::from_tables(table.concepts, table.problems)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// External id → dense index. `None` means unknown.
    pub fn to_index(&self, kind: IdKind, external_id: &str) -> Option<usize> {
        match kind {
            IdKind::Concept => self.concept_to_idx.get(external_id).copied(),
            IdKind::Problem => self.problem_to_idx.get(external_id).copied(),
        }
    }

    /// Dense index → external id. `None` for padding or unassigned indices.
    pub fn from_index(&self, kind: IdKind, index: usize) -> Option<&str> {
        match kind {
            IdKind::Concept => self.idx_to_concept.get(&index).map(String::as_str),
            IdKind::Problem => self.idx_to_problem.get(&index).map(String::as_str),
        }
    }

    /// Exclusive upper bound of assigned concept indices.
    pub fn concept_bound(&self) -> usize {
        self.concept_bound
    }

    /// Exclusive upper bound of assigned problem indices.
    pub fn problem_bound(&self) -> usize {
        self.problem_bound
    }
}

fn invert(
    kind: IdKind,
    forward: &HashMap<String, usize>,
) -> Result<(HashMap<usize, String>, usize), MapError> {
    if forward.is_empty() {
        return Err(MapError::Empty(kind));
    }

    let mut inverse = HashMap::with_capacity(forward.len());
    let mut bound = 0usize;
    for (id, &index) in forward {
        if index == PADDING_INDEX {
            return Err(MapError::ReservedIndex {
                kind,
                id: id.clone(),
            });
        }
        if let Some(existing) = inverse.insert(index, id.clone()) {
            return Err(MapError::DuplicateIndex {
                kind,
                index,
                first: existing,
                second: id.clone(),
            });
        }
        bound = bound.max(index + 1);
    }
    Ok((inverse, bound))
}
