use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::classify::LabelMap;
use crate::error::LinkageError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Comparable text fields, in the fixed order patterns are built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    City,
    Address,
}

pub const FIELDS: [Field; 3] = [Field::Name, Field::City, Field::Address];

impl Field {
    /// CSV header for this field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single entity observation from one source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub index: u32,
    pub name: String,
    pub city: String,
    pub address: String,
}

impl Record {
    pub fn new(index: u32, name: &str, city: &str, address: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            city: city.to_string(),
            address: address.to_string(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::City => &self.city,
            Field::Address => &self.address,
        }
    }
}

/// All records of one source, kept in ascending index order.
#[derive(Debug, Clone)]
pub struct RecordTable {
    role: String,
    records: Vec<Record>,
}

impl RecordTable {
    /// Build a table. Indices must be unique within the table.
    pub fn new(role: &str, mut records: Vec<Record>) -> Result<Self, LinkageError> {
        records.sort_by_key(|r| r.index);
        if let Some(w) = records.windows(2).find(|w| w[0].index == w[1].index) {
            return Err(LinkageError::DuplicateIndex {
                role: role.to_string(),
                index: w[0].index,
            });
        }
        Ok(Self {
            role: role.to_string(),
            records,
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn get(&self, index: u32) -> Result<&Record, LinkageError> {
        self.records
            .binary_search_by_key(&index, |r| r.index)
            .map(|pos| &self.records[pos])
            .map_err(|_| LinkageError::UnknownIndex {
                role: self.role.clone(),
                index,
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Discretized similarity of one field. Declaration order is strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityCategory {
    High,
    Medium,
    Low,
}

pub const CATEGORIES: [SimilarityCategory; 3] = [
    SimilarityCategory::High,
    SimilarityCategory::Medium,
    SimilarityCategory::Low,
];

impl fmt::Display for SimilarityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// One category per field, in `FIELDS` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pattern(pub [SimilarityCategory; 3]);

/// Size of the pattern space: 3 fields x 3 categories.
pub const PATTERN_COUNT: usize = 27;

impl Pattern {
    pub fn category(&self, field: Field) -> SimilarityCategory {
        self.0[field as usize]
    }

    /// Position of this pattern in `all_patterns()` order.
    pub fn ordinal(&self) -> usize {
        self.0.iter().fold(0, |acc, c| acc * 3 + *c as usize)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.0[0], self.0[1], self.0[2])
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Match,
    Unmatch,
    PossibleMatch,
}

pub const LABELS: [Label; 3] = [Label::Match, Label::Unmatch, Label::PossibleMatch];

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Unmatch => write!(f, "unmatch"),
            Self::PossibleMatch => write!(f, "possible-match"),
        }
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Which side of the classifier a training set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Match,
    Unmatch,
}

impl fmt::Display for TrainingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Unmatch => write!(f, "unmatch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPair {
    pub index_a: u32,
    pub index_b: u32,
}

/// Pairs asserted (not verified) to all be matches, or all be non-matches.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub kind: TrainingKind,
    pub pairs: Vec<TrainingPair>,
}

impl TrainingSet {
    pub fn new(kind: TrainingKind, pairs: &[(u32, u32)]) -> Self {
        Self {
            kind,
            pairs: pairs
                .iter()
                .map(|&(index_a, index_b)| TrainingPair { index_a, index_b })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything a run needs, loaded up front.
pub struct LinkageInput {
    pub table_a: RecordTable,
    pub table_b: RecordTable,
    pub matches: TrainingSet,
    pub unmatches: TrainingSet,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredPair {
    pub index_a: u32,
    pub index_b: u32,
    pub pattern: Pattern,
    pub label: Label,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkageSummary {
    pub total_pairs: usize,
    pub matches: usize,
    pub unmatches: usize,
    pub possible_matches: usize,
    pub blocked_pairs: usize,
    /// Number of patterns in the label map carrying each label.
    pub label_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkageMeta {
    pub config_name: String,
    pub mu: f64,
    pub lambda: f64,
    pub block_on_city: bool,
    pub match_pairs: usize,
    pub unmatch_pairs: usize,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkageResult {
    pub meta: LinkageMeta,
    pub summary: LinkageSummary,
    pub labels: LabelMap,
    pub pairs: Vec<ScoredPair>,
}
