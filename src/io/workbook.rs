//! Append-only workbook sink.
//!
//! A workbook is a directory; each sheet is one CSV file inside it, easy to open
//! in a spreadsheet or load from scripts. Sheets are never overwritten: writing
//! a name that already exists is a `SinkConflict`. Writers take a lock file for
//! the duration of a write, and a sheet only appears once it is fully written
//! (temp file + hard link, which never replaces an existing sheet).

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::ResultTable;
use crate::error::{EstimateError, Result};

const LOCK_FILE: &str = ".gapfill.lock";
const SHEET_EXT: &str = "csv";

/// Destination accepting named tables.
pub trait TableSink {
    /// Add a new sheet. Fails if `name` already exists.
    fn append_sheet(&mut self, name: &str, table: &ResultTable) -> Result<()>;
}

/// A directory of CSV sheets.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    root: PathBuf,
}

impl CsvWorkbook {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{SHEET_EXT}", sanitize_sheet_name(name)))
    }

    /// Sheet names currently in the workbook, sorted.
    pub fn list_sheets(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root).map_err(|e| EstimateError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| EstimateError::io(&self.root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SHEET_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read a sheet back as a header row plus data rows.
    pub fn read_sheet(&self, name: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let path = self.sheet_path(name);
        let file = File::open(&path).map_err(|e| EstimateError::io(&path, e))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok((headers, rows))
    }

    fn write_table(path: &Path, table: &ResultTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.cells())?;
        }
        writer.flush().map_err(|e| EstimateError::io(path, e))?;
        Ok(())
    }

    /// Link a fully written temp file into place. The link fails instead of
    /// clobbering a sheet that appeared after the existence check.
    fn publish(&self, tmp: &Path, path: &Path, name: &str) -> Result<()> {
        let linked = fs::hard_link(tmp, path);
        let _ = fs::remove_file(tmp);
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(EstimateError::SinkConflict {
                sheet: name.to_string(),
                path: self.root.clone(),
            }),
            Err(e) => Err(EstimateError::io(path, e)),
        }
    }
}

impl TableSink for CsvWorkbook {
    fn append_sheet(&mut self, name: &str, table: &ResultTable) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| EstimateError::io(&self.root, e))?;
        let _lock = WorkbookLock::acquire(&self.root)?;

        let path = self.sheet_path(name);
        if path.exists() {
            return Err(EstimateError::SinkConflict {
                sheet: name.to_string(),
                path: self.root.clone(),
            });
        }

        let tmp = self
            .root
            .join(format!(".{}.{SHEET_EXT}.tmp", sanitize_sheet_name(name)));
        if let Err(e) = Self::write_table(&tmp, table) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        self.publish(&tmp, &path, name)?;

        debug!(sheet = name, rows = table.rows.len(), path = %path.display(), "sheet written");
        Ok(())
    }
}

/// Exclusive lock on a workbook directory, released on drop.
struct WorkbookLock {
    path: PathBuf,
}

impl WorkbookLock {
    fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(EstimateError::SinkLocked {
                path: root.to_path_buf(),
            }),
            Err(e) => Err(EstimateError::io(&path, e)),
        }
    }
}

impl Drop for WorkbookLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Replace characters spreadsheets reject in sheet names (`[]:*?/\`).
pub fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultRow;

    fn table(n: usize) -> ResultTable {
        ResultTable {
            headers: ["Date", "V Capital Gains Yield", "Adjusted R-squared", "Intercept", "a", "b"]
                .map(String::from)
                .to_vec(),
            rows: (0..n)
                .map(|i| ResultRow {
                    date: format!("2024-{:02}-01", i + 1),
                    estimate: 0.01 * i as f64,
                    adjusted_r_squared: 0.5,
                    intercept: 0.001,
                    coef_ref1: 0.7,
                    coef_ref2: 0.2,
                })
                .collect(),
        }
    }

    #[test]
    fn appends_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path().join("book"));

        wb.append_sheet("V Estimation", &table(3)).unwrap();
        let (headers, rows) = wb.read_sheet("V Estimation").unwrap();

        assert_eq!(headers.len(), 6);
        assert_eq!(headers[1], "V Capital Gains Yield");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "2024-02-01");
        assert_eq!(wb.list_sheets().unwrap(), vec!["V Estimation"]);
    }

    #[test]
    fn existing_sheet_is_a_conflict_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path());

        wb.append_sheet("V Estimation", &table(2)).unwrap();
        let err = wb.append_sheet("V Estimation", &table(5)).unwrap_err();

        assert!(matches!(err, EstimateError::SinkConflict { .. }));
        assert_eq!(wb.read_sheet("V Estimation").unwrap().1.len(), 2);
    }

    #[test]
    fn publish_never_replaces_a_sheet_written_behind_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let wb = CsvWorkbook::new(dir.path());
        let path = wb.sheet_path("V Estimation");
        let tmp = dir.path().join(".V Estimation.csv.tmp");
        fs::write(&path, "Date\n2020-01-01\n").unwrap();
        fs::write(&tmp, "Date\n2099-01-01\n").unwrap();

        let err = wb.publish(&tmp, &path, "V Estimation").unwrap_err();

        assert!(matches!(err, EstimateError::SinkConflict { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Date\n2020-01-01\n");
        assert!(!tmp.exists());
    }

    #[test]
    fn no_temp_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path());
        wb.append_sheet("V Estimation", &table(2)).unwrap();

        let names: Vec<_> = fs::read_dir(wb.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["V Estimation.csv"]);
    }

    #[test]
    fn different_sheets_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path());
        wb.append_sheet("V Estimation", &table(1)).unwrap();
        wb.append_sheet("MA Estimation", &table(1)).unwrap();
        assert_eq!(wb.list_sheets().unwrap(), vec!["MA Estimation", "V Estimation"]);
    }

    #[test]
    fn held_lock_reports_locked() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path());
        let _held = WorkbookLock::acquire(dir.path()).unwrap();

        let err = wb.append_sheet("V Estimation", &table(1)).unwrap_err();
        assert!(matches!(err, EstimateError::SinkLocked { .. }));
        assert!(!wb.sheet_path("V Estimation").exists());
    }

    #[test]
    fn lock_is_released_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut wb = CsvWorkbook::new(dir.path());
        wb.append_sheet("A", &table(1)).unwrap();
        assert!(!dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sanitize_sheet_name("BRK/B Estimation"), "BRK_B Estimation");
        assert_eq!(sanitize_sheet_name("^GSPC"), "^GSPC");
    }
}
