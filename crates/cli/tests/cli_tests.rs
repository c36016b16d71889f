// Integration tests for `reclink run`, `reclink train` and `reclink validate`.
// Run with: cargo test -p reclink-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn reclink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reclink"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const TABLE_A: &str = "\
index,name,city,address
0,Joe's Diner,Chicago,1 Main St
1,Café Roma,Boston,2 Elm St
";

const TABLE_B: &str = "\
index,name,city,address
0,Joes Diner,Chicago,1 Main Street
1,Unrelated,NYC,9 Oak Ave
";

const CONFIG: &str = r#"
name = "two-row"

[inputs]
table_a   = "a.csv"
table_b   = "b.csv"
matches   = "matches.csv"
unmatches = "unmatches.csv"

[bounds]
mu = 0.1
lambda = 0.1
"#;

/// Scratch dir with the two-row tables, one training pair per side.
fn workspace(matches: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", TABLE_A);
    write(dir.path(), "b.csv", TABLE_B);
    write(dir.path(), "matches.csv", matches);
    write(dir.path(), "unmatches.csv", "1,1\n");
    let config = write(dir.path(), "link.toml", CONFIG);
    (dir, config)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    reclink().args(args).output().expect("spawn reclink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_csv_to_stdout() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["run", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "index_a,index_b,label");
    assert_eq!(lines[1], "0,0,match");
    assert_eq!(lines[4], "1,1,unmatch");
    assert!(!lines[2].ends_with(",match"));
    assert!(!lines[3].ends_with(",match"));
    assert!(stderr(&output).contains("4 pair(s)"));
}

#[test]
fn run_writes_output_file() {
    let (dir, config) = workspace("0,0\n");
    let out_path = dir.path().join("links.csv");
    let output = run(&["run", config.to_str().unwrap(), "--output", out_path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.starts_with("index_a,index_b,label\n0,0,match\n"));
}

#[test]
fn run_block_on_city_flag() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["run", config.to_str().unwrap(), "--block-on-city"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "index_a,index_b,label\n0,0,match\n");
    assert!(stderr(&output).contains("3 blocked"));
}

#[test]
fn run_json_result() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["run", config.to_str().unwrap(), "--json", "--mu", "0.05"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["meta"]["config_name"], "two-row");
    assert_eq!(json["meta"]["mu"], 0.05);
    assert_eq!(json["summary"]["total_pairs"], 4);
    assert_eq!(json["summary"]["matches"], 1);
    assert_eq!(json["pairs"][0]["label"], "match");
    assert_eq!(json["labels"].as_array().unwrap().len(), 27);
}

#[test]
fn run_empty_training_set_fails() {
    let (dir, config) = workspace("");
    let out_path = dir.path().join("links.csv");
    let output = run(&["run", config.to_str().unwrap(), "-o", out_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("match training set is empty"));
    assert!(!out_path.exists(), "no partial output on failure");
}

#[test]
fn run_unknown_index_fails() {
    let (_dir, config) = workspace("0,0\n0,5\n");
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("no record with index 5"));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn run_rejects_bad_bound_flag() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["run", config.to_str().unwrap(), "--lambda", "1.5"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("lambda"));
}

#[test]
fn run_missing_input_file() {
    let (dir, config) = workspace("0,0\n");
    std::fs::remove_file(dir.path().join("b.csv")).unwrap();
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("b.csv"));
}

#[test]
fn run_unwritable_output() {
    let (dir, config) = workspace("0,0\n");
    let out_path = dir.path().join("missing/links.csv");
    let output = run(&["run", config.to_str().unwrap(), "-o", out_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(63));
    assert!(!out_path.exists());
}

#[test]
fn run_failed_json_write_leaves_no_csv() {
    let (dir, _) = workspace("0,0\n");
    let config = write(
        dir.path(),
        "link.toml",
        &format!("{CONFIG}\n[output]\ncsv = \"links.csv\"\njson = \"missing/dir/summary.json\"\n"),
    );
    let output = run(&["run", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(63));
    assert!(stderr(&output).contains("summary.json"));
    assert!(!dir.path().join("links.csv").exists());
}

#[test]
fn run_writes_csv_and_json_files() {
    let (dir, _) = workspace("0,0\n");
    let config = write(
        dir.path(),
        "link.toml",
        &format!("{CONFIG}\n[output]\ncsv = \"links.csv\"\njson = \"summary.json\"\n"),
    );
    let output = run(&["run", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let csv = std::fs::read_to_string(dir.path().join("links.csv")).unwrap();
    assert_eq!(csv.lines().count(), 5);
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_pairs"], 4);
}

#[test]
fn run_verbose_logs_to_stderr() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["run", config.to_str().unwrap(), "-v"]);
    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("match training set: loaded 1 pair(s)"), "stderr: {err}");
    assert!(!err.contains("logging disabled"));
    assert!(stdout(&output).starts_with("index_a,index_b,label\n"));
}

// ---------------------------------------------------------------------------
// train
// ---------------------------------------------------------------------------

#[test]
fn train_prints_every_pattern() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["train", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 28);
    assert_eq!(lines[0], "pattern,match_freq,unmatch_freq,label");
    assert_eq!(lines[1], "high/high/high,1,0,match");
    assert_eq!(lines[27], "low/low/low,0,1,unmatch");
}

#[test]
fn train_json() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["train", config.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let rows: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows.len(), 27);
    assert_eq!(rows[0]["label"], "match");
    assert_eq!(rows[1]["label"], "possible-match");
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_ok() {
    let (_dir, config) = workspace("0,0\n");
    let output = run(&["validate", config.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("valid: linkage 'two-row'"));
}

#[test]
fn validate_missing_config() {
    let output = run(&["validate", "no/such/config.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("error: cannot read config"));
}

#[test]
fn validate_bad_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "link.toml",
        &format!("{CONFIG}\n[similarity]\nhigh = 0.3\nmedium = 0.6\n"),
    );
    let output = run(&["validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
}
