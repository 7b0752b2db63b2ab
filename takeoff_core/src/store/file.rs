//! # JSON File Report Store
//!
//! All reports live in one JSON document:
//!
//! ```text
//! { "version": "0.1.0", "reports": [ CostReport, ... ] }
//! ```
//!
//! Safety features:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the document
//! - **File locking**: an exclusive OS lock on `<file>.lock` (via fs2) around
//!   each read-modify-write, plus an in-process mutex
//! - **Version validation**: documents from a newer schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use takeoff_core::store::{FileReportStore, ReportFilter, ReportStore};
//!
//! let store = FileReportStore::new("reports.json");
//! let reports = store.query(&ReportFilter::Engineer("eng-1".to_string()))?;
//! # Ok::<(), takeoff_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::report::CostReport;

use super::{select_newest_first, ReportFilter, ReportStore};

/// Current schema version of the report document
pub const SCHEMA_VERSION: &str = "0.1.0";

/// On-disk layout of the report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub version: String,
    pub reports: Vec<CostReport>,
}

impl Default for ReportDocument {
    fn default() -> Self {
        ReportDocument {
            version: SCHEMA_VERSION.to_string(),
            reports: Vec::new(),
        }
    }
}

/// Lock file metadata, for telling the user who holds the lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        LockInfo {
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on the report document, released when dropped.
struct StoreLock {
    _lock_file: File,
}

impl StoreLock {
    fn acquire(path: &Path) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        // Not truncated on open: the current holder's info must survive until
        // we actually own the lock.
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::store_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        if lock_file.try_lock_exclusive().is_err() {
            let (locked_by, locked_at) = match read_lock_info(&lock_path) {
                Ok(info) => (format!("{} (pid {})", info.machine, info.pid), info.locked_at.to_rfc3339()),
                Err(_) => ("another process".to_string(), "unknown".to_string()),
            };
            return Err(CalcError::store_locked(path.display().to_string(), locked_by, locked_at));
        }

        let lock_json = serde_json::to_string_pretty(&LockInfo::current())
            .map_err(|e| CalcError::serialization(e.to_string()))?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::store_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(StoreLock { _lock_file: lock_file })
    }
}

/// Get the lock file path for a report document
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Get the temp file path used during atomic saves
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_path = path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path)
        .map_err(|e| CalcError::store_error("read lock", lock_path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CalcError::serialization(e.to_string()))
}

/// Report store backed by one JSON file.
#[derive(Debug)]
pub struct FileReportStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl FileReportStore {
    /// Open a store at `path`. The file is created on the first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileReportStore {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document. A missing file is an empty document.
    pub fn load(&self) -> CalcResult<ReportDocument> {
        if !self.path.exists() {
            return Ok(ReportDocument::default());
        }

        let mut file = File::open(&self.path)
            .map_err(|e| CalcError::store_error("open", self.path.display().to_string(), e.to_string()))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CalcError::store_error("read", self.path.display().to_string(), e.to_string()))?;

        let document: ReportDocument = serde_json::from_str(&contents)
            .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", self.path.display(), e)))?;

        validate_version(&document.version)?;
        Ok(document)
    }

    /// Save the whole document with atomic write semantics.
    ///
    /// 1. Serialize to JSON
    /// 2. Write to a temporary file
    /// 3. Sync to disk (fsync)
    /// 4. Rename over the document (atomic on most filesystems)
    fn save(&self, document: &ReportDocument) -> CalcResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(|e| CalcError::serialization(e.to_string()))?;

        let tmp_path = tmp_path_for(&self.path);

        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            CalcError::store_error("create temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            CalcError::store_error("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        tmp_file.sync_all().map_err(|e| {
            CalcError::store_error("sync temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CalcError::store_error("rename to final", self.path.display().to_string(), e.to_string())
        })?;

        Ok(())
    }
}

impl ReportStore for FileReportStore {
    fn insert(&self, report: &CostReport) -> CalcResult<()> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| CalcError::store_error("insert", self.path.display().to_string(), "writer mutex poisoned"))?;
        let _lock = StoreLock::acquire(&self.path)?;

        let mut document = self.load()?;
        document.version = SCHEMA_VERSION.to_string();
        document.reports.push(report.clone());
        self.save(&document)?;

        debug!(
            report_id = %report.id,
            path = %self.path.display(),
            stored = document.reports.len(),
            "report inserted"
        );
        Ok(())
    }

    fn query(&self, filter: &ReportFilter) -> CalcResult<Vec<CostReport>> {
        let document = self.load()?;
        let selected = select_newest_first(document.reports.iter(), filter);
        debug!(?filter, path = %self.path.display(), matched = selected.len(), "reports queried");
        Ok(selected)
    }
}

/// Validate that a document version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // In 0.x a newer minor version may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectRef;
    use crate::report::{build_report, CreateReportRequest, NewCostReportItem};
    use chrono::Duration;
    use std::env::temp_dir;

    fn temp_store_path(name: &str) -> PathBuf {
        temp_dir().join(format!("takeoff_test_{}_{}.json", name, std::process::id()))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
        let _ = fs::remove_file(lock_path_for(path));
    }

    fn report(project: &str, minutes_ago: i64) -> CostReport {
        let request = CreateReportRequest::new(ProjectRef::canonical(project), "eng-1")
            .with_item(NewCostReportItem::new("c1", "Concrete", 10.0, "m³", 500.0));
        build_report(request, Utc::now() - Duration::minutes(minutes_ago)).unwrap()
    }

    #[test]
    fn test_lock_and_tmp_paths() {
        let path = Path::new("/data/reports.json");
        assert_eq!(lock_path_for(path), Path::new("/data/reports.json.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/reports.json.tmp"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_store_path("missing");
        cleanup(&path);
        let store = FileReportStore::new(&path);
        assert!(store.query(&ReportFilter::Engineer("eng-1".to_string())).unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_query_roundtrip() {
        let path = temp_store_path("roundtrip");
        cleanup(&path);
        let store = FileReportStore::new(&path);

        let older = report("p-1", 5);
        let newer = report("p-1", 1);
        let other = report("p-2", 0);
        store.insert(&older).unwrap();
        store.insert(&newer).unwrap();
        store.insert(&other).unwrap();

        // A fresh handle sees the same data
        let reopened = FileReportStore::new(&path);
        let listed = reopened.query(&ReportFilter::Project(vec!["p-1".to_string()])).unwrap();
        assert_eq!(listed, vec![newer, older]);

        let document = reopened.load().unwrap();
        assert_eq!(document.version, SCHEMA_VERSION);
        assert_eq!(document.reports.len(), 3);

        cleanup(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_store_path("atomic");
        cleanup(&path);
        let store = FileReportStore::new(&path);
        store.insert(&report("p-1", 0)).unwrap();

        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());

        cleanup(&path);
    }

    #[test]
    fn test_lock_released_after_insert() {
        let path = temp_store_path("lock");
        cleanup(&path);
        let store = FileReportStore::new(&path);
        store.insert(&report("p-1", 0)).unwrap();

        let lock = StoreLock::acquire(&path).unwrap();
        drop(lock);
        store.insert(&report("p-1", 0)).unwrap();
        assert_eq!(store.load().unwrap().reports.len(), 2);

        cleanup(&path);
    }

    #[test]
    fn test_corrupt_file_is_persistence_error() {
        let path = temp_store_path("corrupt");
        cleanup(&path);
        fs::write(&path, "{ not json").unwrap();

        let store = FileReportStore::new(&path);
        let err = store.query(&ReportFilter::Engineer("eng-1".to_string())).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Persistence);

        cleanup(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
