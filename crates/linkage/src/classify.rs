use std::cmp::Ordering;

use serde::ser::{Serialize, Serializer};

use crate::config::check_bound;
use crate::error::LinkageError;
use crate::estimate::FrequencyTable;
use crate::model::{Label, Pattern, PATTERN_COUNT};
use crate::pattern::all_patterns;

/// Label for every pattern of the 27-element space. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: [Label; PATTERN_COUNT],
}

#[derive(serde::Serialize)]
struct LabelEntry {
    pattern: Pattern,
    label: Label,
}

impl LabelMap {
    pub fn get(&self, pattern: &Pattern) -> Label {
        self.labels[pattern.ordinal()]
    }

    /// Number of patterns carrying `label`.
    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|l| **l == label).count()
    }

    /// `(pattern, label)` in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (Pattern, Label)> + '_ {
        all_patterns().into_iter().map(move |p| (p, self.get(&p)))
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(pattern, label)| LabelEntry { pattern, label }))
    }
}

/// A pattern with evidence on at least one side, as raw training counts.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    pattern: Pattern,
    m: usize,
    u: usize,
}

/// Descending likelihood ratio m/u. Both sides share their denominators, so
/// comparing `m1*u2` against `m2*u1` on counts is exact; u = 0 ranks as +inf
/// and m = 0 as 0. Ties fall back to pattern order.
fn by_ratio_desc(a: &Ranked, b: &Ranked) -> Ordering {
    let lhs = a.m as u128 * b.u as u128;
    let rhs = b.m as u128 * a.u as u128;
    rhs.cmp(&lhs).then_with(|| a.pattern.cmp(&b.pattern))
}

/// Label the longest prefix of `ranked` whose accumulated error mass
/// (`cost` counts over `total`) stays within `budget`. Returns how many
/// entries were labeled.
///
/// Mass is an exact count ratio, so a borderline sum such as 3 x 0.1
/// against a budget of 0.3 is admitted rather than lost to float drift.
fn label_prefix<'a>(
    ranked: impl Iterator<Item = &'a Ranked>,
    cost: impl Fn(&Ranked) -> usize,
    total: usize,
    budget: f64,
    label: Label,
    labels: &mut [Option<Label>; PATTERN_COUNT],
) -> usize {
    let mass = |count: usize| count as f64 / total as f64;
    let mut spent = 0usize;
    let mut taken = 0;
    for r in ranked {
        let next = spent + cost(r);
        if mass(next) > budget {
            break;
        }
        spent = next;
        labels[r.pattern.ordinal()] = Some(label);
        taken += 1;
    }
    log::debug!("{label}: {taken} pattern(s), error mass {:.6} of {budget}", mass(spent));
    taken
}

/// Partition the pattern space into match / unmatch / possible-match regions.
///
/// Patterns are ranked by decreasing m/u. The match region is the longest
/// prefix whose unmatch mass stays within `mu`; the unmatch region is the
/// longest suffix of the remainder whose match mass stays within `lambda`.
/// Everything else, including patterns never seen in either training set,
/// is a possible match. Patterns missing from `patterns` are possible
/// matches too, so the result always covers the full space.
pub fn classify(
    patterns: &[Pattern],
    match_freq: &FrequencyTable,
    unmatch_freq: &FrequencyTable,
    mu: f64,
    lambda: f64,
) -> Result<LabelMap, LinkageError> {
    check_bound("mu", mu)?;
    check_bound("lambda", lambda)?;

    let mut labels: [Option<Label>; PATTERN_COUNT] = [None; PATTERN_COUNT];
    let mut ranked: Vec<Ranked> = Vec::with_capacity(patterns.len());
    let mut seen = [false; PATTERN_COUNT];

    for &pattern in patterns {
        if std::mem::replace(&mut seen[pattern.ordinal()], true) {
            continue;
        }
        let m = match_freq.count(&pattern);
        let u = unmatch_freq.count(&pattern);
        if m == 0 && u == 0 {
            labels[pattern.ordinal()] = Some(Label::PossibleMatch);
        } else {
            ranked.push(Ranked { pattern, m, u });
        }
    }

    ranked.sort_by(by_ratio_desc);

    let matched = label_prefix(
        ranked.iter(),
        |r| r.u,
        unmatch_freq.total(),
        mu,
        Label::Match,
        &mut labels,
    );
    label_prefix(
        ranked[matched..].iter().rev(),
        |r| r.m,
        match_freq.total(),
        lambda,
        Label::Unmatch,
        &mut labels,
    );

    Ok(LabelMap {
        labels: labels.map(|l| l.unwrap_or(Label::PossibleMatch)),
    })
}
