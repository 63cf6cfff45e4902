//! Orchestration: listing -> selection -> detail fetch -> snapshot, then
//! snapshot -> canonical records -> JSON/CSV. Each pass hands the next an
//! explicit value instead of relying on what happens to be in the directory.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tracing::{error, info, warn};

use crate::fetch::{DetailSource, FetchReport, ListingSource, fetch_details};
use crate::normalize::normalize_all;
use crate::select::Selection;
use crate::store::{OutputStore, SnapshotRef, TransformOutputs};

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub delay: Duration,
    pub keep_recent: usize,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub selected: usize,
    pub report: FetchReport,
    /// `None` when there was nothing to fetch.
    pub snapshot: Option<SnapshotRef>,
}

pub async fn fetch_pass<S>(
    source: &S,
    selection: Selection,
    store: &OutputStore,
    options: FetchOptions,
) -> Result<FetchOutcome>
where
    S: ListingSource + DetailSource,
{
    let listing = match source.fetch_listing().await {
        Ok(listing) => listing,
        Err(err) => {
            error!(error = %format!("{err:#}"), "could not retrieve problem list");
            Vec::new()
        }
    };
    if listing.is_empty() {
        warn!("no problem list retrieved, nothing to fetch");
        return Ok(FetchOutcome::default());
    }

    let selected = selection.apply(&listing);
    info!(%selection, selected = selected.len(), "selected problems");
    if selected.is_empty() {
        return Ok(FetchOutcome::default());
    }

    let report = fetch_details(source, &selected, options.delay).await;
    for item in &report.skipped {
        warn!(slug = %item.slug, title = %item.title, reason = %item.reason, "skipped");
    }

    let snapshot = store.write_snapshot(&selection, &Local::now(), &report.details)?;
    store.write_marker(&snapshot)?;
    store.prune(options.keep_recent)?;

    Ok(FetchOutcome {
        selected: selected.len(),
        report,
        snapshot: Some(snapshot),
    })
}

pub fn transform_pass(store: &OutputStore, snapshot: &SnapshotRef) -> Result<TransformOutputs> {
    info!(path = %snapshot.path.display(), "transforming snapshot");
    let snapshot_records = store.read_snapshot(snapshot)?;
    let records = normalize_all(snapshot_records.details);
    let mut outputs = store.write_transformed(snapshot, &records)?;
    outputs.rejected = snapshot_records.rejected;
    Ok(outputs)
}

/// Transform the snapshot named by the marker file, or every raw snapshot in
/// the store when there is no usable marker.
pub fn transform_latest(store: &OutputStore) -> Result<Vec<TransformOutputs>> {
    if let Some(snapshot) = store.marked_snapshot() {
        info!(file = %snapshot.file_name(), "found marker file");
        return Ok(vec![transform_pass(store, &snapshot)?]);
    }

    warn!("no usable marker file, processing every snapshot");
    let snapshots = store.list_snapshots()?;
    if snapshots.is_empty() {
        warn!(dir = %store.root().display(), "no LeetCode snapshots found");
    }
    snapshots
        .iter()
        .map(|snapshot| transform_pass(store, snapshot))
        .collect()
}

/// Fetch then transform in one go. Returns `None` when nothing was fetched.
pub async fn run<S>(
    source: &S,
    selection: Selection,
    store: &OutputStore,
    options: FetchOptions,
) -> Result<Option<TransformOutputs>>
where
    S: ListingSource + DetailSource,
{
    let outcome = fetch_pass(source, selection, store, options).await?;
    match outcome.snapshot {
        Some(snapshot) => Ok(Some(transform_pass(store, &snapshot)?)),
        None => Ok(None),
    }
}
