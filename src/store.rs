//! Files on disk: raw snapshots, their transformed siblings and the marker
//! that points at the newest snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::types::ProblemDetail;
use crate::export::{CSV_COLUMNS, to_csv, to_json};
use crate::model::CanonicalProblem;
use crate::select::Selection;

pub const MARKER_FILE: &str = "latest_scrape_file.txt";
const RANGE_PREFIX: &str = "leetcode_problems_";
const LATEST_PREFIX: &str = "leetcode_latest_problems_";
const TRANSFORMED_SUFFIX: &str = "_transformed";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;

/// Handle to a raw snapshot file, passed from the fetch pass to the transform pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    pub path: PathBuf,
}

impl SnapshotRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn with_suffix(&self, ext: &str) -> PathBuf {
        let name = self.file_name();
        let base = name.strip_suffix(".json").unwrap_or(&name);
        self.path.with_file_name(format!("{base}{TRANSFORMED_SUFFIX}.{ext}"))
    }

    pub fn transformed_json_path(&self) -> PathBuf {
        self.with_suffix("json")
    }

    pub fn transformed_csv_path(&self) -> PathBuf {
        self.with_suffix("csv")
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        let name = self.file_name();
        let base = name.strip_suffix(".json")?;
        let stamp = base.get(base.len().checked_sub(STAMP_LEN)?..)?;
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
    }
}

/// A snapshot element that could not be read as a problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct SnapshotRecords {
    pub details: Vec<ProblemDetail>,
    pub rejected: Vec<RejectedRecord>,
}

/// Paths produced by one transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutputs {
    pub json: PathBuf,
    /// `None` when there were no records and no CSV was written.
    pub csv: Option<PathBuf>,
    /// Snapshot elements left out of the outputs.
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_name<Tz>(selection: &Selection, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let stamp = at.format(STAMP_FORMAT);
        match selection {
            Selection::Range { low, high } => format!("{RANGE_PREFIX}{low}_to_{high}_{stamp}.json"),
            Selection::Latest(_) => format!("{LATEST_PREFIX}{stamp}.json"),
        }
    }

    pub fn is_raw_snapshot(name: &str) -> bool {
        (name.starts_with(RANGE_PREFIX) || name.starts_with(LATEST_PREFIX))
            && name.ends_with(".json")
            && !name.ends_with(&format!("{TRANSFORMED_SUFFIX}.json"))
    }

    /// Persist the raw details under a timestamped name.
    pub fn write_snapshot<Tz>(
        &self,
        selection: &Selection,
        at: &DateTime<Tz>,
        details: &[ProblemDetail],
    ) -> Result<SnapshotRef>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let path = self.root.join(Self::snapshot_name(selection, at));
        let json = serde_json::to_string_pretty(details).context("Failed to serialize snapshot")?;
        self.write_atomic(&path, json.as_bytes())?;
        info!(path = %path.display(), problems = details.len(), "saved raw snapshot");
        Ok(SnapshotRef::new(path))
    }

    /// Load a snapshot one element at a time. Elements that are not problem
    /// objects are logged and reported instead of failing the whole file.
    pub fn read_snapshot(&self, snapshot: &SnapshotRef) -> Result<SnapshotRecords> {
        let text = fs::read_to_string(&snapshot.path)
            .with_context(|| format!("Failed to read snapshot {}", snapshot.path.display()))?;
        let values: Vec<Value> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse snapshot {}", snapshot.path.display()))?;

        let mut records = SnapshotRecords::default();
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<ProblemDetail>(value) {
                Ok(detail) => records.details.push(detail),
                Err(err) => {
                    warn!(index, error = %err, "skipping unreadable snapshot record");
                    records.rejected.push(RejectedRecord {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(records)
    }

    pub fn write_marker(&self, snapshot: &SnapshotRef) -> Result<()> {
        self.write_atomic(&self.root.join(MARKER_FILE), snapshot.file_name().as_bytes())
    }

    /// The snapshot named by the marker file, if the marker exists and the
    /// file it names is still there.
    pub fn marked_snapshot(&self) -> Option<SnapshotRef> {
        let marker = self.root.join(MARKER_FILE);
        let name = match fs::read_to_string(&marker) {
            Ok(name) => name.trim().to_string(),
            Err(err) => {
                debug!(error = %err, "no marker file");
                return None;
            }
        };
        let path = self.root.join(&name);
        if path.is_file() {
            Some(SnapshotRef::new(path))
        } else {
            warn!(file = %name, "marker points at a missing snapshot");
            None
        }
    }

    /// Every raw snapshot in the directory, newest first.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotRef>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read directory {}", self.root.display()))?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if Self::is_raw_snapshot(&name) && entry.path().is_file() {
                snapshots.push(SnapshotRef::new(entry.path()));
            }
        }
        snapshots.sort_by(|a, b| {
            (b.timestamp(), b.file_name()).cmp(&(a.timestamp(), a.file_name()))
        });
        Ok(snapshots)
    }

    /// Delete all but the `keep` newest snapshots, along with their
    /// transformed outputs. `keep == 0` leaves everything in place.
    pub fn prune(&self, keep: usize) -> Result<Vec<PathBuf>> {
        if keep == 0 {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for snapshot in self.list_snapshots()?.into_iter().skip(keep) {
            for path in [
                snapshot.transformed_json_path(),
                snapshot.transformed_csv_path(),
                snapshot.path.clone(),
            ] {
                if path.exists() {
                    fs::remove_file(&path)
                        .with_context(|| format!("Failed to remove {}", path.display()))?;
                    debug!(path = %path.display(), "removed old output");
                    removed.push(path);
                }
            }
        }
        if !removed.is_empty() {
            info!(files = removed.len(), keep, "pruned old outputs");
        }
        Ok(removed)
    }

    /// Write the canonical JSON and, for a non-empty set, the CSV projection
    /// next to the snapshot they came from.
    pub fn write_transformed(
        &self,
        snapshot: &SnapshotRef,
        records: &[CanonicalProblem],
    ) -> Result<TransformOutputs> {
        let json_path = snapshot.transformed_json_path();
        self.write_atomic(&json_path, to_json(records)?.as_bytes())?;
        info!(path = %json_path.display(), records = records.len(), "saved transformed JSON");

        let csv = match to_csv(records, &CSV_COLUMNS)? {
            Some(document) => {
                let csv_path = snapshot.transformed_csv_path();
                self.write_atomic(&csv_path, document.as_bytes())?;
                info!(path = %csv_path.display(), "saved CSV");
                Some(csv_path)
            }
            None => {
                warn!("no data to export to CSV, skipping");
                None
            }
        };

        Ok(TransformOutputs {
            json: json_path,
            csv,
            rejected: Vec::new(),
        })
    }

    /// Write through a temp file in the same directory and rename it into place.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

        if let Err(err) = fs::write(&temp_path, bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(err).with_context(|| format!("Failed to write {}", temp_path.display()));
        }
        if let Err(err) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            let (from, to) = (temp_path.display(), path.display());
            return Err(err).with_context(|| format!("Failed to rename {from} -> {to}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(stamp: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).unwrap().and_utc()
    }

    #[test]
    fn snapshot_names_follow_the_selection() {
        let when = at("20240102_030405");
        assert_eq!(
            OutputStore::snapshot_name(&Selection::Range { low: 2200, high: 2210 }, &when),
            "leetcode_problems_2200_to_2210_20240102_030405.json"
        );
        assert_eq!(
            OutputStore::snapshot_name(&Selection::Latest(50), &when),
            "leetcode_latest_problems_20240102_030405.json"
        );
    }

    #[test]
    fn transformed_paths_sit_next_to_the_snapshot() {
        let snap = SnapshotRef::new("/tmp/out/leetcode_problems_1_to_2_20240102_030405.json");
        assert_eq!(
            snap.transformed_json_path(),
            PathBuf::from("/tmp/out/leetcode_problems_1_to_2_20240102_030405_transformed.json")
        );
        assert_eq!(
            snap.transformed_csv_path(),
            PathBuf::from("/tmp/out/leetcode_problems_1_to_2_20240102_030405_transformed.csv")
        );
    }

    #[test]
    fn recognises_raw_snapshots_only() {
        assert!(OutputStore::is_raw_snapshot("leetcode_latest_problems_20240102_030405.json"));
        assert!(OutputStore::is_raw_snapshot("leetcode_problems_1_to_9_20240102_030405.json"));
        assert!(!OutputStore::is_raw_snapshot(
            "leetcode_problems_1_to_9_20240102_030405_transformed.json"
        ));
        assert!(!OutputStore::is_raw_snapshot("latest_scrape_file.txt"));
        assert!(!OutputStore::is_raw_snapshot("notes.json"));
    }

    #[test]
    fn snapshot_and_marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        let details = vec![ProblemDetail {
            question_frontend_id: Some("7".into()),
            stats: Some(r#"{"acRate":"1%"}"#.into()),
            ..Default::default()
        }];

        let snap = store
            .write_snapshot(&Selection::Latest(1), &at("20240102_030405"), &details)
            .unwrap();
        store.write_marker(&snap).unwrap();

        assert_eq!(store.marked_snapshot(), Some(snap.clone()));
        assert_eq!(store.read_snapshot(&snap).unwrap().details, details);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn unreadable_elements_are_rejected_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leetcode_latest_problems_20240101_000000.json");
        fs::write(
            &path,
            r#"[
                {"questionFrontendId": "1", "codeSnippets": [{"lang": "Rust", "langSlug": "rust", "code": null}]},
                "not a problem",
                {"questionFrontendId": "2", "likes": "many"}
            ]"#,
        )
        .unwrap();

        let records = OutputStore::new(dir.path())
            .read_snapshot(&SnapshotRef::new(path))
            .unwrap();

        let ids: Vec<_> = records
            .details
            .iter()
            .map(|d| d.question_frontend_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(records.details[1].likes, None);
        assert_eq!(records.rejected.len(), 1);
        assert_eq!(records.rejected[0].index, 1);
    }

    #[test]
    fn snapshot_that_is_not_an_array_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leetcode_latest_problems_20240101_000000.json");
        fs::write(&path, "{}").unwrap();
        assert!(
            OutputStore::new(dir.path())
                .read_snapshot(&SnapshotRef::new(path))
                .is_err()
        );
    }

    #[test]
    fn stale_marker_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MARKER_FILE), "leetcode_problems_gone.json").unwrap();
        assert_eq!(OutputStore::new(dir.path()).marked_snapshot(), None);
    }

    #[test]
    fn prune_keeps_the_newest_snapshots_and_their_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        let sel = Selection::Latest(1);
        let old = store.write_snapshot(&sel, &at("20240101_000000"), &[]).unwrap();
        store.write_transformed(&old, &[]).unwrap();
        let mid = store.write_snapshot(&sel, &at("20240102_000000"), &[]).unwrap();
        let new = store
            .write_snapshot(&Selection::Range { low: 1, high: 2 }, &at("20240103_000000"), &[])
            .unwrap();

        let removed = store.prune(2).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!old.path.exists());
        assert!(!old.transformed_json_path().exists());
        assert!(mid.path.exists());
        assert!(new.path.exists());
        assert_eq!(store.list_snapshots().unwrap(), vec![new, mid]);
        assert!(store.prune(0).unwrap().is_empty());
    }

    #[test]
    fn empty_transform_writes_json_but_no_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        let snap = store
            .write_snapshot(&Selection::Latest(0), &at("20240101_000000"), &[])
            .unwrap();

        let outputs = store.write_transformed(&snap, &[]).unwrap();

        assert_eq!(fs::read_to_string(&outputs.json).unwrap(), "[]");
        assert_eq!(outputs.csv, None);
        assert!(!snap.transformed_csv_path().exists());
    }
}
