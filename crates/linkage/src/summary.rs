use std::collections::BTreeMap;

use crate::classify::LabelMap;
use crate::model::{Label, LinkageSummary, ScoredPair, LABELS};

/// Compute summary statistics from scored pairs and the label map.
pub fn compute_summary(pairs: &[ScoredPair], labels: &LabelMap, blocked: usize) -> LinkageSummary {
    let mut matches = 0;
    let mut unmatches = 0;
    let mut possible_matches = 0;

    for p in pairs {
        match p.label {
            Label::Match => matches += 1,
            Label::Unmatch => unmatches += 1,
            Label::PossibleMatch => possible_matches += 1,
        }
    }

    let label_counts: BTreeMap<String, usize> = LABELS
        .iter()
        .map(|l| (l.to_string(), labels.count(*l)))
        .collect();

    LinkageSummary {
        total_pairs: pairs.len(),
        matches,
        unmatches,
        possible_matches,
        blocked_pairs: blocked,
        label_counts,
    }
}
