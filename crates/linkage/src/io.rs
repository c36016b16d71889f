//! CSV loading for record tables and training pairs, and the output writer.

use std::io::Write;
use std::path::Path;

use crate::config::LinkageConfig;
use crate::error::LinkageError;
use crate::model::{
    LinkageInput, Record, RecordTable, ScoredPair, TrainingKind, TrainingPair, TrainingSet, FIELDS,
};

const INDEX_COLUMN: &str = "index";

fn line_of(record: &csv::ByteRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Load a record table: header row, then `index,name,city,address` in any
/// column order. Extra columns are ignored.
///
/// Missing or non-UTF-8 field values become empty strings; a bad index is
/// an error.
pub fn load_records(role: &str, csv_data: impl AsRef<[u8]>) -> Result<RecordTable, LinkageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_ref());

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, LinkageError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            LinkageError::MissingColumn {
                role: role.into(),
                column: name.into(),
            }
        })
    };

    let index_idx = idx(INDEX_COLUMN)?;
    let field_idx = [idx(FIELDS[0].column())?, idx(FIELDS[1].column())?, idx(FIELDS[2].column())?];

    let mut records = Vec::new();
    let mut degraded = 0usize;

    for record in reader.byte_records() {
        let record = record?;
        let line = line_of(&record);

        let raw_index = record.get(index_idx).unwrap_or_default();
        let index_str = String::from_utf8_lossy(raw_index);
        let index: u32 = index_str.trim().parse().map_err(|_| LinkageError::IndexParse {
            role: role.into(),
            line,
            value: index_str.to_string(),
        })?;

        let [name, city, address] = field_idx.map(|i| {
            match record.get(i).map(std::str::from_utf8) {
                Some(Ok(value)) => value.to_string(),
                _ => {
                    degraded += 1;
                    String::new()
                }
            }
        });

        records.push(Record { index, name, city, address });
    }

    if degraded > 0 {
        log::warn!("table '{role}': {degraded} missing or unreadable field value(s) treated as empty");
    }
    log::info!("table '{role}': loaded {} record(s)", records.len());

    RecordTable::new(role, records)
}

/// Load a training set: two columns `index_a,index_b`, no header required.
/// A leading row is a header only when neither cell is an index.
pub fn load_training_pairs(
    kind: TrainingKind,
    csv_data: impl AsRef<[u8]>,
) -> Result<TrainingSet, LinkageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_data.as_ref());

    let mut pairs = Vec::new();

    for (row, record) in reader.byte_records().enumerate() {
        let record = record?;
        let line = line_of(&record);

        let cell = |i: usize| String::from_utf8_lossy(record.get(i).unwrap_or_default()).trim().to_string();
        let (a, b) = (cell(0), cell(1));

        match (a.parse::<u32>(), b.parse::<u32>()) {
            (Ok(index_a), Ok(index_b)) => pairs.push(TrainingPair { index_a, index_b }),
            (Err(_), Err(_)) if row == 0 => log::debug!("{kind} training set: skipping header row"),
            (Err(_), _) => return Err(LinkageError::PairParse { kind, line, value: a }),
            (_, Err(_)) => return Err(LinkageError::PairParse { kind, line, value: b }),
        }
    }

    log::info!("{kind} training set: loaded {} pair(s)", pairs.len());
    Ok(TrainingSet { kind, pairs })
}

fn read_input(path: &Path) -> Result<Vec<u8>, LinkageError> {
    std::fs::read(path).map_err(|e| LinkageError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Load every input named by `config`, resolving paths against `base_dir`.
pub fn load_input(config: &LinkageConfig, base_dir: &Path) -> Result<LinkageInput, LinkageError> {
    let inputs = &config.inputs;
    let table_a = load_records("table_a", read_input(&base_dir.join(&inputs.table_a))?)?;
    let table_b = load_records("table_b", read_input(&base_dir.join(&inputs.table_b))?)?;
    let matches = load_training_pairs(TrainingKind::Match, read_input(&base_dir.join(&inputs.matches))?)?;
    let unmatches =
        load_training_pairs(TrainingKind::Unmatch, read_input(&base_dir.join(&inputs.unmatches))?)?;

    Ok(LinkageInput {
        table_a,
        table_b,
        matches,
        unmatches,
    })
}

/// Render scored pairs as CSV (`index_a,index_b,label`).
pub fn write_pairs(pairs: &[ScoredPair]) -> Result<Vec<u8>, LinkageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["index_a", "index_b", "label"])?;
    for pair in pairs {
        writer.write_record([
            pair.index_a.to_string(),
            pair.index_b.to_string(),
            pair.label.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| LinkageError::Io(e.to_string()))
}

/// Write bytes to `path` through a temp file in the same directory, so a
/// failed write never leaves a partial artifact behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LinkageError> {
    write_all_atomic(&[(path, bytes)])
}

/// Write several artifacts so that either all of them land or none do.
/// Every temp file is created and filled before the first one is persisted.
pub fn write_all_atomic(outputs: &[(&Path, &[u8])]) -> Result<(), LinkageError> {
    let mut staged = Vec::with_capacity(outputs.len());
    for &(path, bytes) in outputs {
        staged.push((stage(path, bytes)?, path));
    }
    for (tmp, path) in staged {
        tmp.persist(path).map_err(|e| write_err(path, e.error))?;
    }
    Ok(())
}

fn write_err(path: &Path, e: std::io::Error) -> LinkageError {
    LinkageError::Io(format!("cannot write {}: {e}", path.display()))
}

fn stage(path: &Path, bytes: &[u8]) -> Result<tempfile::NamedTempFile, LinkageError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |e: std::io::Error| write_err(path, e);

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    Ok(tmp)
}

/// Render and atomically write scored pairs to `path`.
pub fn write_pairs_to(path: &Path, pairs: &[ScoredPair]) -> Result<(), LinkageError> {
    let bytes = write_pairs(pairs)?;
    write_atomic(path, &bytes)?;
    log::info!("wrote {} pair(s) to {}", pairs.len(), path.display());
    Ok(())
}
