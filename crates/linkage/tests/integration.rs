use std::path::PathBuf;

use reclink_linkage::config::LinkageConfig;
use reclink_linkage::engine::{run, score, train};
use reclink_linkage::io::{load_input, write_pairs_to};
use reclink_linkage::model::{
    Label, LinkageResult, Pattern, Record, RecordTable, SimilarityCategory, TrainingKind,
    TrainingSet,
};
use reclink_linkage::{LinkageError, SimilarityScorer};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> LinkageConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("restaurants.link.toml")).unwrap();
    LinkageConfig::from_toml(&toml).unwrap()
}

fn load_and_run(config: &LinkageConfig) -> LinkageResult {
    let input = load_input(config, &fixtures_dir()).unwrap();
    run(config, &input).unwrap()
}

const HHH: Pattern = Pattern([
    SimilarityCategory::High,
    SimilarityCategory::High,
    SimilarityCategory::High,
]);

// -------------------------------------------------------------------------
// Two-row scenario
// -------------------------------------------------------------------------

#[test]
fn two_row_scenario() {
    let a = RecordTable::new(
        "a",
        vec![
            Record::new(0, "Joe's Diner", "Chicago", "1 Main St"),
            Record::new(1, "Café Roma", "Boston", "2 Elm St"),
        ],
    )
    .unwrap();
    let b = RecordTable::new(
        "b",
        vec![
            Record::new(0, "Joes Diner", "Chicago", "1 Main Street"),
            Record::new(1, "Unrelated", "NYC", "9 Oak Ave"),
        ],
    )
    .unwrap();
    let scorer = SimilarityScorer::default();
    let matches = TrainingSet::new(TrainingKind::Match, &[(0, 0)]);
    let unmatches = TrainingSet::new(TrainingKind::Unmatch, &[(1, 1)]);

    let model = train(&matches, &unmatches, &a, &b, &scorer, 0.1, 0.1).unwrap();
    let out = score(&a, &b, &model.labels, &scorer, None);

    let got: Vec<(u32, u32, Label)> = out.pairs.iter().map(|p| (p.index_a, p.index_b, p.label)).collect();
    assert_eq!(got.len(), 4);
    assert_eq!(got[0], (0, 0, Label::Match));
    assert_eq!(got[3], (1, 1, Label::Unmatch));
    for (i, j, label) in &got[1..3] {
        assert_ne!(*label, Label::Match, "cross pair ({i}, {j}) must not match");
    }
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn fixture_run_labels_known_links() {
    let config = fixture_config();
    let result = load_and_run(&config);

    assert_eq!(result.meta.config_name, "Zagat vs Fodor's");
    assert_eq!(result.meta.match_pairs, 4);
    assert_eq!(result.meta.unmatch_pairs, 3);
    assert_eq!(result.summary.total_pairs, 36);
    assert_eq!(result.summary.blocked_pairs, 0);
    assert_eq!(
        result.summary.matches + result.summary.unmatches + result.summary.possible_matches,
        36
    );

    let matched: Vec<(u32, u32)> = result
        .pairs
        .iter()
        .filter(|p| p.label == Label::Match)
        .map(|p| (p.index_a, p.index_b))
        .collect();
    assert_eq!(matched, vec![(0, 0), (2, 2), (3, 3), (4, 4)]);

    for p in &result.pairs {
        assert_eq!(p.label == Label::Match, p.pattern == HHH, "({}, {})", p.index_a, p.index_b);
    }

    assert_eq!((result.pairs[7].index_a, result.pairs[7].index_b), (1, 1));
    assert_eq!(result.pairs[7].label, Label::Unmatch);
}

#[test]
fn fixture_run_output_order() {
    let result = load_and_run(&fixture_config());
    let order: Vec<(u32, u32)> = result.pairs.iter().map(|p| (p.index_a, p.index_b)).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn fixture_run_blocked_on_city() {
    let mut config = fixture_config();
    config.blocking.on_city = true;
    let result = load_and_run(&config);

    assert!(result.meta.block_on_city);
    assert_eq!(result.summary.total_pairs, 4);
    assert_eq!(result.summary.blocked_pairs, 32);

    let input = load_input(&config, &fixtures_dir()).unwrap();
    for p in &result.pairs {
        let a = input.table_a.get(p.index_a).unwrap();
        let b = input.table_b.get(p.index_b).unwrap();
        assert_eq!(a.city, b.city);
    }
}

#[test]
fn zero_bounds_still_label_free_patterns() {
    let mut config = fixture_config();
    config.bounds.mu = 0.0;
    config.bounds.lambda = 0.0;
    let result = load_and_run(&config);
    // HHH carries no unmatch mass, so it stays a match even at mu = 0.
    assert_eq!(result.summary.matches, 4);
}

#[test]
fn result_serializes_to_json() {
    let result = load_and_run(&fixture_config());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["total_pairs"], 36);
    assert_eq!(json["labels"].as_array().unwrap().len(), 27);
    assert_eq!(json["pairs"][0]["label"], "match");
    assert_eq!(json["pairs"][0]["pattern"], serde_json::json!(["high", "high", "high"]));
}

#[test]
fn writes_output_csv() {
    let result = load_and_run(&fixture_config());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.csv");
    write_pairs_to(&path, &result.pairs).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("index_a,index_b,label"));
    assert_eq!(lines.next(), Some("0,0,match"));
    assert_eq!(written.lines().count(), 37);
}

// -------------------------------------------------------------------------
// Failures
// -------------------------------------------------------------------------

#[test]
fn empty_training_set_fails_fast() {
    let mut config = fixture_config();
    config.inputs.matches = "empty_links.csv".into();
    let input = load_input(&config, &fixtures_dir()).unwrap();
    let err = run(&config, &input).unwrap_err();
    assert!(matches!(err, LinkageError::EmptyTrainingSet { kind: TrainingKind::Match }));
}

#[test]
fn unknown_training_index_fails() {
    let mut config = fixture_config();
    config.inputs.matches = "bad_links.csv".into();
    let input = load_input(&config, &fixtures_dir()).unwrap();
    let err = run(&config, &input).unwrap_err();
    assert!(matches!(err, LinkageError::UnknownIndex { index: 9, .. }));
}

#[test]
fn missing_input_file_is_io_error() {
    let mut config = fixture_config();
    config.inputs.table_b = "no_such_table.csv".into();
    let err = load_input(&config, &fixtures_dir()).err().unwrap();
    assert!(matches!(err, LinkageError::Io(ref msg) if msg.contains("no_such_table.csv")));
}
