use crate::classify::{classify, LabelMap};
use crate::config::LinkageConfig;
use crate::error::LinkageError;
use crate::estimate::{estimate, FrequencyTable};
use crate::model::{
    Label, LinkageInput, LinkageMeta, LinkageResult, Record, RecordTable, ScoredPair, TrainingSet,
};
use crate::pattern::{all_patterns, pattern_for};
use crate::similarity::SimilarityScorer;
use crate::summary::compute_summary;

/// Pair filter applied before any similarity work. `false` skips the pair.
pub type BlockPredicate<'a> = &'a dyn Fn(&Record, &Record) -> bool;

/// Output of one training run. Read-only once built.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub match_freq: FrequencyTable,
    pub unmatch_freq: FrequencyTable,
    pub labels: LabelMap,
}

#[derive(Debug, Clone)]
pub struct ScoreOutput {
    pub pairs: Vec<ScoredPair>,
    /// Pairs rejected by the blocking predicate.
    pub blocked: usize,
}

/// Estimate both frequency tables and classify the pattern space.
pub fn train(
    matches: &TrainingSet,
    unmatches: &TrainingSet,
    table_a: &RecordTable,
    table_b: &RecordTable,
    scorer: &SimilarityScorer,
    mu: f64,
    lambda: f64,
) -> Result<TrainedModel, LinkageError> {
    let match_freq = estimate(matches, table_a, table_b, scorer)?;
    let unmatch_freq = estimate(unmatches, table_a, table_b, scorer)?;
    let labels = classify(&all_patterns(), &match_freq, &unmatch_freq, mu, lambda)?;

    log::info!(
        "trained on {} match / {} unmatch pair(s): {} match, {} unmatch, {} possible-match pattern(s)",
        matches.len(),
        unmatches.len(),
        labels.count(Label::Match),
        labels.count(Label::Unmatch),
        labels.count(Label::PossibleMatch),
    );

    Ok(TrainedModel {
        match_freq,
        unmatch_freq,
        labels,
    })
}

/// Label every pair of A x B, A-index ascending then B-index ascending.
pub fn score(
    table_a: &RecordTable,
    table_b: &RecordTable,
    labels: &LabelMap,
    scorer: &SimilarityScorer,
    block: Option<BlockPredicate<'_>>,
) -> ScoreOutput {
    let mut pairs = Vec::new();
    let mut blocked = 0;

    for a in table_a.iter() {
        for b in table_b.iter() {
            if let Some(admit) = block {
                if !admit(a, b) {
                    blocked += 1;
                    continue;
                }
            }
            let pattern = pattern_for(a, b, scorer);
            pairs.push(ScoredPair {
                index_a: a.index,
                index_b: b.index,
                pattern,
                label: labels.get(&pattern),
            });
        }
    }

    log::info!("scored {} pair(s), {} blocked", pairs.len(), blocked);
    ScoreOutput { pairs, blocked }
}

/// Blocking predicate: city fields must be identical.
pub fn same_city(a: &Record, b: &Record) -> bool {
    a.city == b.city
}

/// Train on the input's training sets, then score A x B per config.
pub fn run(config: &LinkageConfig, input: &LinkageInput) -> Result<LinkageResult, LinkageError> {
    let scorer = SimilarityScorer::new(&config.similarity);
    let mu = config.bounds.mu;
    let lambda = config.bounds.lambda;

    let model = train(
        &input.matches,
        &input.unmatches,
        &input.table_a,
        &input.table_b,
        &scorer,
        mu,
        lambda,
    )?;

    let block: Option<BlockPredicate<'_>> = if config.blocking.on_city {
        Some(&same_city)
    } else {
        None
    };
    let scored = score(&input.table_a, &input.table_b, &model.labels, &scorer, block);

    let summary = compute_summary(&scored.pairs, &model.labels, scored.blocked);

    Ok(LinkageResult {
        meta: LinkageMeta {
            config_name: config.name.clone(),
            mu,
            lambda,
            block_on_city: config.blocking.on_city,
            match_pairs: input.matches.len(),
            unmatch_pairs: input.unmatches.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        labels: model.labels,
        pairs: scored.pairs,
    })
}
