use crate::error::LinkageError;
use crate::model::{Pattern, RecordTable, TrainingKind, TrainingSet, PATTERN_COUNT};
use crate::pattern::{all_patterns, build_pattern};
use crate::similarity::SimilarityScorer;

/// Empirical pattern frequencies of one training set.
///
/// Holds exact occurrence counts; `frequency` is `count / total`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    kind: TrainingKind,
    counts: [usize; PATTERN_COUNT],
    total: usize,
}

impl FrequencyTable {
    /// Build from per-pattern counts. The total is the sum of the counts.
    pub fn from_counts(
        kind: TrainingKind,
        counts: impl IntoIterator<Item = (Pattern, usize)>,
    ) -> Result<Self, LinkageError> {
        let mut table = [0usize; PATTERN_COUNT];
        for (pattern, count) in counts {
            table[pattern.ordinal()] += count;
        }
        let total = table.iter().sum();
        if total == 0 {
            return Err(LinkageError::EmptyTrainingSet { kind });
        }
        Ok(Self { kind, counts: table, total })
    }

    pub fn kind(&self) -> TrainingKind {
        self.kind
    }

    pub fn count(&self, pattern: &Pattern) -> usize {
        self.counts[pattern.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn frequency(&self, pattern: &Pattern) -> f64 {
        self.count(pattern) as f64 / self.total as f64
    }

    /// `(pattern, frequency)` over the whole pattern space.
    pub fn iter(&self) -> impl Iterator<Item = (Pattern, f64)> + '_ {
        all_patterns().into_iter().map(move |p| (p, self.frequency(&p)))
    }
}

/// Estimate how often each pattern occurs in a training set.
pub fn estimate(
    training: &TrainingSet,
    table_a: &RecordTable,
    table_b: &RecordTable,
    scorer: &SimilarityScorer,
) -> Result<FrequencyTable, LinkageError> {
    if training.is_empty() {
        return Err(LinkageError::EmptyTrainingSet { kind: training.kind });
    }

    let mut counts = [0usize; PATTERN_COUNT];
    for pair in &training.pairs {
        let pattern = build_pattern(pair.index_a, pair.index_b, table_a, table_b, scorer)?;
        counts[pattern.ordinal()] += 1;
    }

    let table = FrequencyTable {
        kind: training.kind,
        counts,
        total: training.len(),
    };

    for (pattern, freq) in table.iter().filter(|(_, f)| *f > 0.0) {
        log::debug!("{} training: {pattern} -> {freq:.4}", training.kind);
    }

    Ok(table)
}
