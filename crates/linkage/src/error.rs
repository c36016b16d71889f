use std::fmt;

use crate::model::TrainingKind;

#[derive(Debug)]
pub enum LinkageError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty path, etc.).
    ConfigValidation(String),
    /// IO error (reading an input table, writing the output artifact).
    Io(String),
    /// Missing required column in a record table header.
    MissingColumn { role: String, column: String },
    /// Record index cell that is not a non-negative integer.
    IndexParse { role: String, line: u64, value: String },
    /// Two records in one table share an index.
    DuplicateIndex { role: String, index: u32 },
    /// Training pair cell that is not a non-negative integer.
    PairParse { kind: TrainingKind, line: u64, value: String },
    /// A training set with no pairs cannot produce frequencies.
    EmptyTrainingSet { kind: TrainingKind },
    /// Index referenced by a training pair (or scoring) not present in its table.
    UnknownIndex { role: String, index: u32 },
    /// Error bound outside [0, 1].
    InvalidBound { name: &'static str, value: f64 },
}

impl fmt::Display for LinkageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::MissingColumn { role, column } => {
                write!(f, "table '{role}': missing column '{column}'")
            }
            Self::IndexParse { role, line, value } => {
                write!(f, "table '{role}', line {line}: cannot parse index '{value}'")
            }
            Self::DuplicateIndex { role, index } => {
                write!(f, "table '{role}': duplicate index {index}")
            }
            Self::PairParse { kind, line, value } => {
                write!(f, "{kind} training set, line {line}: cannot parse index '{value}'")
            }
            Self::EmptyTrainingSet { kind } => {
                write!(f, "{kind} training set is empty; at least one pair is required")
            }
            Self::UnknownIndex { role, index } => {
                write!(f, "table '{role}': no record with index {index}")
            }
            Self::InvalidBound { name, value } => {
                write!(f, "{name} must be a probability in [0, 1], got {value}")
            }
        }
    }
}

impl std::error::Error for LinkageError {}

impl From<csv::Error> for LinkageError {
    fn from(e: csv::Error) -> Self {
        Self::Io(e.to_string())
    }
}
