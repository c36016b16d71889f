//! `reclink run|train|validate`: config-driven record linkage.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use reclink_linkage::config::LinkageConfig;
use reclink_linkage::engine::train;
use reclink_linkage::io::{load_input, write_all_atomic, write_pairs};
use reclink_linkage::model::Label;
use reclink_linkage::SimilarityScorer;

use crate::exit_codes::EXIT_LINK_OUTPUT;
use crate::CliError;

/// Error-bound overrides shared by `run` and `train`.
#[derive(Args, Debug, Default)]
pub struct BoundsArgs {
    /// Maximum false positive rate (overrides bounds.mu)
    #[arg(long)]
    pub mu: Option<f64>,

    /// Maximum false negative rate (overrides bounds.lambda)
    #[arg(long)]
    pub lambda: Option<f64>,
}

fn output_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_LINK_OUTPUT, message: msg.into(), hint: None }
}

/// Read, parse, apply overrides and validate.
fn load_config(config_path: &Path, bounds: &BoundsArgs) -> Result<LinkageConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::args(format!("cannot read config {}: {e}", config_path.display()))
    })?;

    let mut config = LinkageConfig::from_toml(&config_str).map_err(CliError::linkage)?;
    if let Some(mu) = bounds.mu {
        config.bounds.mu = mu;
    }
    if let Some(lambda) = bounds.lambda {
        config.bounds.lambda = lambda;
    }
    config.validate().map_err(CliError::linkage)?;
    Ok(config)
}

/// Input and output paths are relative to the config file's directory.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(
    config_path: PathBuf,
    bounds: BoundsArgs,
    block_on_city: bool,
    output: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let mut config = load_config(&config_path, &bounds)?;
    if block_on_city {
        config.blocking.on_city = true;
    }
    let base = base_dir(&config_path);

    // All inputs are loaded before training starts.
    let input = load_input(&config, base).map_err(CliError::linkage)?;
    let result = reclink_linkage::run(&config, &input).map_err(CliError::linkage)?;

    let csv_path = output.or_else(|| config.output.csv.as_ref().map(|p| base.join(p)));
    let json_path = config.output.json.as_ref().map(|p| base.join(p));

    // Render everything before touching a destination.
    let csv_bytes = write_pairs(&result.pairs).map_err(|e| output_err(e.to_string()))?;
    let json_str = if json_output || json_path.is_some() {
        Some(
            serde_json::to_string_pretty(&result)
                .map_err(|e| output_err(format!("JSON serialization error: {e}")))?,
        )
    } else {
        None
    };

    let mut files: Vec<(&Path, &[u8])> = Vec::new();
    if let Some(path) = &csv_path {
        files.push((path.as_path(), csv_bytes.as_slice()));
    }
    if let (Some(path), Some(json)) = (&json_path, &json_str) {
        files.push((path.as_path(), json.as_bytes()));
    }
    write_all_atomic(&files).map_err(|e| output_err(e.to_string()))?;
    for (path, _) in &files {
        eprintln!("wrote {}", path.display());
    }

    let mut stdout = std::io::stdout().lock();
    let write_err = |e: std::io::Error| output_err(format!("cannot write output: {e}"));
    if csv_path.is_none() && !json_output {
        stdout.write_all(&csv_bytes).map_err(write_err)?;
    }
    if let (true, Some(json)) = (json_output, &json_str) {
        writeln!(stdout, "{json}").map_err(write_err)?;
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "linkage '{}': {} pair(s): {} match, {} unmatch, {} possible-match, {} blocked",
        result.meta.config_name,
        s.total_pairs,
        s.matches,
        s.unmatches,
        s.possible_matches,
        s.blocked_pairs,
    );

    Ok(())
}

#[derive(serde::Serialize)]
struct PatternRow {
    pattern: reclink_linkage::Pattern,
    match_freq: f64,
    unmatch_freq: f64,
    label: Label,
}

pub fn cmd_train(config_path: PathBuf, bounds: BoundsArgs, json_output: bool) -> Result<(), CliError> {
    let config = load_config(&config_path, &bounds)?;
    let input = load_input(&config, base_dir(&config_path)).map_err(CliError::linkage)?;
    let scorer = SimilarityScorer::new(&config.similarity);

    let model = train(
        &input.matches,
        &input.unmatches,
        &input.table_a,
        &input.table_b,
        &scorer,
        config.bounds.mu,
        config.bounds.lambda,
    )
    .map_err(CliError::linkage)?;

    let rows: Vec<PatternRow> = model
        .labels
        .iter()
        .map(|(pattern, label)| PatternRow {
            pattern,
            match_freq: model.match_freq.frequency(&pattern),
            unmatch_freq: model.unmatch_freq.frequency(&pattern),
            label,
        })
        .collect();

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let write_err = |e: std::io::Error| output_err(format!("cannot write output: {e}"));

    if json_output {
        let json_str = serde_json::to_string_pretty(&rows)
            .map_err(|e| output_err(format!("JSON serialization error: {e}")))?;
        writeln!(handle, "{json_str}").map_err(write_err)?;
    } else {
        writeln!(handle, "pattern,match_freq,unmatch_freq,label").map_err(write_err)?;
        for r in &rows {
            writeln!(handle, "{},{},{},{}", r.pattern, r.match_freq, r.unmatch_freq, r.label)
                .map_err(write_err)?;
        }
    }

    eprintln!(
        "trained on {} match / {} unmatch pair(s) (mu={}, lambda={}): {} match, {} unmatch, {} possible-match pattern(s)",
        input.matches.len(),
        input.unmatches.len(),
        config.bounds.mu,
        config.bounds.lambda,
        model.labels.count(Label::Match),
        model.labels.count(Label::Unmatch),
        model.labels.count(Label::PossibleMatch),
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path, &BoundsArgs::default())?;
    eprintln!(
        "valid: linkage '{}' (mu={}, lambda={}, block_on_city={}, metric={})",
        config.name,
        config.bounds.mu,
        config.bounds.lambda,
        config.blocking.on_city,
        config.similarity.metric,
    );
    Ok(())
}
