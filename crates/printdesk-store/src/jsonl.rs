//! JSONL storage: one line per ledger record.
//!
//! The portable interchange format. Every record is a single JSON line
//! tagged with its `kind`.

use crate::catalog::{PaperSize, PaperType, PaperWeight, ProductType, ProductTypeSpecification};
use crate::counter::DocketCounter;
use crate::job::Job;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One persisted ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Counter(DocketCounter),
    ProductType(ProductType),
    PaperType(PaperType),
    PaperWeight(PaperWeight),
    PaperSize(PaperSize),
    Specification(ProductTypeSpecification),
    Job(Job),
}

/// Read records from a JSONL reader.
pub fn read_records(reader: impl BufRead) -> Result<Vec<Record>, JsonlError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: Record = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Write records to a JSONL writer.
pub fn write_records(writer: &mut impl Write, records: &[Record]) -> Result<(), JsonlError> {
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| JsonlError::Io(0, e.to_string()))?;
    }
    Ok(())
}

/// Read records from a JSONL file path.
///
/// The whole file is checked for NUL bytes and invalid UTF-8 before any line
/// is parsed, so a torn or foreign file is reported as corrupt.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>, JsonlError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_at(path))?;
    reject_corrupt_bytes(path, &bytes)?;
    read_records(BufReader::new(bytes.as_slice()))
}

/// Write records to a JSONL file path, replacing it atomically.
///
/// Records go to a sibling temp file which is synced, renamed over `path`,
/// and followed by a sync of the parent directory.
pub fn write_records_to_path(path: impl AsRef<Path>, records: &[Record]) -> Result<(), JsonlError> {
    let path = path.as_ref();
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(io_at(dir))?;
    }

    let tmp_path = tmp_write_path(path);
    if let Err(err) = write_synced(&tmp_path, records) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(JsonlError::Io(
            0,
            format!("{} -> {}: {err}", tmp_path.display(), path.display()),
        ));
    }

    if let Some(dir) = parent {
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(io_at(dir))?;
    }
    Ok(())
}

fn write_synced(tmp_path: &Path, records: &[Record]) -> Result<(), JsonlError> {
    let mut writer = BufWriter::new(File::create(tmp_path).map_err(io_at(tmp_path))?);
    write_records(&mut writer, records)?;
    let file = writer
        .into_inner()
        .map_err(|e| JsonlError::Io(0, format!("{}: {}", tmp_path.display(), e.error())))?;
    file.sync_all().map_err(io_at(tmp_path))
}

fn io_at(path: &Path) -> impl Fn(std::io::Error) -> JsonlError + '_ {
    move |err| JsonlError::Io(0, format!("{}: {err}", path.display()))
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".{}-{nanos}.tmp", std::process::id()));
    PathBuf::from(tmp)
}

fn reject_corrupt_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    let problem = if bytes.contains(&0) {
        "contains NUL byte(s)"
    } else if std::str::from_utf8(bytes).is_err() {
        "is not valid UTF-8"
    } else {
        return Ok(());
    };
    Err(JsonlError::Corrupt(format!("{}: {problem}", path.display())))
}

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted ledger: {0}")]
    Corrupt(String),
}

impl JsonlError {
    /// I/O failures may clear up; bad content will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(..))
    }
}
