//! Persistent per-day error log.
//!
//! Layout: `root/YYYY-MM-DD/HH_MM_SS`. Every event sharing a second lands in
//! the same file. A record is the [`SEPARATOR`] line, one line of JSON and a
//! trailing CRLF; reading treats each separator as a record boundary.
//!
//! Appends go through a single `write_all` on an `O_APPEND` handle. There is
//! no locking: concurrent writers sharing a directory rely on the append
//! atomicity of the filesystem.

use crate::error::LogError;
use chrono::{DateTime, Local};
use faultline_common::event::{Context, ErrorEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Record boundary line.
pub const SEPARATOR: &str = "##########----------LOGSEPARATOR----------##########";

/// Field names owned by [`LogRecord`]; snapshot keys may not shadow them.
const RESERVED: [&str; 6] = ["severity", "message", "filename", "line", "context", "backtrace"];

/// One stored error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub severity: u32,
    pub message: String,
    pub filename: String,
    pub line: u32,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub backtrace: String,
    /// Ambient snapshot entries, stored as top-level string fields.
    #[serde(flatten)]
    pub ambient: BTreeMap<String, String>,
}

impl LogRecord {
    pub fn from_event(event: &ErrorEvent, snapshot: &BTreeMap<String, String>) -> Self {
        let ambient = snapshot
            .iter()
            .filter(|(key, _)| !RESERVED.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self {
            severity: event.severity,
            message: event.message.clone(),
            filename: event.location.file.clone(),
            line: event.location.line,
            context: event.context.clone(),
            backtrace: event.backtrace.clone(),
            ambient,
        }
    }

    /// Rebuild the event this record was written from.
    pub fn to_event(&self) -> ErrorEvent {
        ErrorEvent::new(self.severity, self.message.clone(), self.filename.clone(), self.line)
            .with_context(self.context.clone())
            .with_backtrace(self.backtrace.clone())
    }
}

/// Root directory of a day-rotated error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStore {
    root: PathBuf,
}

impl LogStore {
    /// Store rooted at `root`. Nothing is touched until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root if needed and resolve it to a canonical path.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LogError> {
        let root = root.as_ref();
        ensure_dir(root)?;
        let root = fs::canonicalize(root).map_err(|source| LogError::Read {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append `event` to the file for the current second.
    pub fn save(
        &self,
        event: &ErrorEvent,
        snapshot: &BTreeMap<String, String>,
    ) -> Result<PathBuf, LogError> {
        self.save_at(event, snapshot, Local::now())
    }

    /// Append `event` to the file for `at`. Returns the file path.
    pub fn save_at(
        &self,
        event: &ErrorEvent,
        snapshot: &BTreeMap<String, String>,
        at: DateTime<Local>,
    ) -> Result<PathBuf, LogError> {
        ensure_dir(&self.root)?;
        let day = self.root.join(at.format("%Y-%m-%d").to_string());
        ensure_dir(&day)?;
        let path = day.join(at.format("%H_%M_%S").to_string());

        let json = serde_json::to_string(&LogRecord::from_event(event, snapshot))?;
        let entry = format!("{SEPARATOR}\r\n{json}\r\n");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Write {
                path: path.clone(),
                source,
            })?;
        file.write_all(entry.as_bytes())
            .map_err(|source| LogError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Records of `root/day/file`, in write order.
    pub fn read(&self, day: &str, file: &str) -> Result<Vec<LogRecord>, LogError> {
        read_file(&self.root.join(day).join(file))
    }

    /// Day directories, sorted.
    pub fn list_days(&self) -> Result<Vec<String>, LogError> {
        list_entries(&self.root, |kind| kind.is_dir())
    }

    /// Log files of one day, sorted.
    pub fn list_files(&self, day: &str) -> Result<Vec<String>, LogError> {
        list_entries(&self.root.join(day), |kind| kind.is_file())
    }
}

/// Parse a log file. A missing file has no records.
pub fn read_file(path: &Path) -> Result<Vec<LogRecord>, LogError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LogError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut records: Vec<LogRecord> = Vec::new();
    let mut boundary = false;
    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line == SEPARATOR {
            boundary = true;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let record: LogRecord =
            serde_json::from_str(line).map_err(|source| LogError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        // A second JSON line inside one record replaces the first.
        match records.last_mut() {
            Some(last) if !boundary => *last = record,
            _ => records.push(record),
        }
        boundary = false;
    }
    Ok(records)
}

fn ensure_dir(path: &Path) -> Result<(), LogError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(LogError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path).map_err(|source| LogError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;

    if !path.is_dir() {
        return Err(LogError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn list_entries(dir: &Path, keep: impl Fn(&fs::FileType) -> bool) -> Result<Vec<String>, LogError> {
    let read_err = |source| LogError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let kind = entry.file_type().map_err(read_err)?;
        if keep(&kind) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    fn event(msg: &str) -> ErrorEvent {
        let mut ctx = Context::new();
        ctx.insert("id".into(), json!([1, 2]));
        ErrorEvent::new(8, msg, "f.rs", 10)
            .with_context(ctx)
            .with_backtrace("0: main\n1: start")
    }

    #[test]
    fn save_creates_day_and_second_file() {
        let tmp = TempDir::new().unwrap();
        let store = LogStore::new(tmp.path().join("logs"));

        let path = store.save_at(&event("m"), &BTreeMap::new(), at(14, 5, 7)).unwrap();
        assert_eq!(path, tmp.path().join("logs/2024-03-09/14_05_07"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with(&format!("{SEPARATOR}\r\n{{")));
        assert!(raw.ends_with("}\r\n"));
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn same_second_appends_in_order() {
        let tmp = TempDir::new().unwrap();
        let store = LogStore::new(tmp.path());
        let snapshot = BTreeMap::from([("PID".to_string(), "7".to_string())]);

        for msg in ["first", "second", "third"] {
            store.save_at(&event(msg), &snapshot, at(9, 0, 0)).unwrap();
        }

        let records = store.read("2024-03-09", "09_00_00").unwrap();
        let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(records[0].to_event(), event("first"));
        assert_eq!(records[0].ambient["PID"], "7");
    }

    #[test]
    fn reserved_snapshot_keys_are_dropped() {
        let snapshot = BTreeMap::from([
            ("message".to_string(), "shadow".to_string()),
            ("HOSTNAME".to_string(), "box".to_string()),
        ]);
        let record = LogRecord::from_event(&event("real"), &snapshot);
        assert_eq!(record.message, "real");
        assert_eq!(record.ambient.len(), 1);
    }

    #[test]
    fn listings_are_sorted() {
        let tmp = TempDir::new().unwrap();
        let store = LogStore::new(tmp.path());
        store.save_at(&event("a"), &BTreeMap::new(), at(23, 0, 1)).unwrap();
        store.save_at(&event("b"), &BTreeMap::new(), at(1, 2, 3)).unwrap();
        store
            .save_at(
                &event("c"),
                &BTreeMap::new(),
                Local.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap(),
            )
            .unwrap();

        assert_eq!(store.list_days().unwrap(), ["2024-03-08", "2024-03-09"]);
        assert_eq!(store.list_files("2024-03-09").unwrap(), ["01_02_03", "23_00_01"]);
    }

    #[test]
    fn missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_file(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn malformed_line_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad");
        fs::write(&path, format!("{SEPARATOR}\r\nnot json\r\n")).unwrap();
        assert!(matches!(read_file(&path), Err(LogError::Malformed { .. })));
    }

    #[test]
    fn root_that_is_a_file_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("occupied");
        fs::write(&file, "x").unwrap();

        let store = LogStore::new(&file);
        let result = store.save_at(&event("m"), &BTreeMap::new(), at(1, 1, 1));
        assert!(matches!(result, Err(LogError::NotADirectory { .. })));
    }

    #[test]
    fn open_canonicalizes_root() {
        let tmp = TempDir::new().unwrap();
        let store = LogStore::open(tmp.path().join("x/y")).unwrap();
        assert!(tmp.path().join("x/y").is_dir());
        assert_eq!(store.root(), fs::canonicalize(tmp.path().join("x/y")).unwrap());
    }
}
