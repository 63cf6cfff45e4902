use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::types::{ProblemDetail, ProblemSummary};

/// Per-item failure while retrieving a problem detail. None of these abort a
/// run; the fetch loop records them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no question data returned for {slug}")]
    NotFound { slug: String },
    #[error("LeetCode returned HTTP {status} for {slug}")]
    Status { slug: String, status: StatusCode },
    #[error("request for {slug} failed")]
    Transport {
        slug: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode detail response for {slug}")]
    Decode {
        slug: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Anything that can turn a slug into a raw problem detail.
#[allow(async_fn_in_trait)]
pub trait DetailSource {
    async fn fetch_detail(&self, slug: &str) -> Result<ProblemDetail, FetchError>;
}

/// Source of the full problem listing used for selection.
#[allow(async_fn_in_trait)]
pub trait ListingSource {
    async fn fetch_listing(&self) -> anyhow::Result<Vec<ProblemSummary>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub slug: String,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub details: Vec<ProblemDetail>,
    pub skipped: Vec<SkippedItem>,
}

/// Fetch every selected problem in order, one request at a time, waiting
/// `delay` between consecutive requests.
pub async fn fetch_details<S: DetailSource>(
    source: &S,
    selected: &[ProblemSummary],
    delay: Duration,
) -> FetchReport {
    let mut report = FetchReport::default();
    let mut requested = false;

    for summary in selected {
        let title = if summary.title.is_empty() {
            "Unknown Problem"
        } else {
            summary.title.as_str()
        };

        if summary.title_slug.is_empty() {
            warn!(title, "problem has no titleSlug, skipping");
            report.skipped.push(SkippedItem {
                slug: String::new(),
                title: title.to_string(),
                reason: "missing titleSlug".to_string(),
            });
            continue;
        }

        if requested {
            tokio::time::sleep(delay).await;
        }
        requested = true;

        info!(id = %summary.question_frontend_id, title, "fetching problem detail");
        match source.fetch_detail(&summary.title_slug).await {
            Ok(detail) => report.details.push(detail),
            Err(err) => {
                warn!(slug = %summary.title_slug, error = %err, "failed to fetch problem detail");
                report.skipped.push(SkippedItem {
                    slug: summary.title_slug.clone(),
                    title: title.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        fetched = report.details.len(),
        skipped = report.skipped.len(),
        "detail fetch finished"
    );
    report
}
