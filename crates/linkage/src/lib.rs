//! `reclink-linkage`: Fellegi-Sunter record linkage engine.
//!
//! Trains a pattern label map from labeled example pairs, then classifies
//! every pair of two record tables as match, unmatch or possible match.
//! Pure engine crate plus CSV loaders; no CLI dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod io;
pub mod model;
pub mod pattern;
pub mod similarity;
pub mod summary;

pub use classify::{classify, LabelMap};
pub use config::LinkageConfig;
pub use engine::{run, score, train, TrainedModel};
pub use error::LinkageError;
pub use estimate::{estimate, FrequencyTable};
pub use model::{
    Label, LinkageInput, LinkageResult, Pattern, Record, RecordTable, ScoredPair,
    SimilarityCategory, TrainingKind, TrainingSet,
};
pub use pattern::{all_patterns, build_pattern};
pub use similarity::SimilarityScorer;
