use crate::error::LinkageError;
use crate::model::{Pattern, Record, RecordTable, CATEGORIES, FIELDS, PATTERN_COUNT};
use crate::similarity::SimilarityScorer;

/// Similarity pattern of the records at `index_a` in A and `index_b` in B.
pub fn build_pattern(
    index_a: u32,
    index_b: u32,
    table_a: &RecordTable,
    table_b: &RecordTable,
    scorer: &SimilarityScorer,
) -> Result<Pattern, LinkageError> {
    let a = table_a.get(index_a)?;
    let b = table_b.get(index_b)?;
    Ok(pattern_for(a, b, scorer))
}

/// Similarity pattern of two already-resolved records.
pub fn pattern_for(a: &Record, b: &Record, scorer: &SimilarityScorer) -> Pattern {
    Pattern(FIELDS.map(|field| scorer.compare(a.field(field), b.field(field))))
}

/// The fixed pattern space, in lexicographic order (high/high/high first).
pub fn all_patterns() -> Vec<Pattern> {
    let mut out = Vec::with_capacity(PATTERN_COUNT);
    for name in CATEGORIES {
        for city in CATEGORIES {
            for address in CATEGORIES {
                out.push(Pattern([name, city, address]));
            }
        }
    }
    out
}
