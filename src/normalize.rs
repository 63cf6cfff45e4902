//! Reshape raw problem details into [`CanonicalProblem`] records.
//!
//! Several detail fields are JSON documents shipped as strings. Every one of
//! them goes through [`parse_embedded`], which logs a failure and falls back
//! to a default instead of rejecting the record.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::types::{ProblemDetail, TopicTag};
use crate::model::{CanonicalProblem, Difficulty, ProblemStats, problem_url, sort_canonical};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStats {
    ac_rate: Option<Value>,
    total_submission_raw: Option<i64>,
    total_accepted_raw: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawCompanyTag {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSimilarQuestion {
    title: Option<String>,
    difficulty: Option<String>,
    title_slug: Option<String>,
}

/// Decode a stringified JSON document of shape `T` and map it with `shape`.
/// Absent or empty input yields `default()` quietly; malformed input is
/// logged and also yields `default()`.
pub fn parse_embedded<T, R>(
    field: &str,
    blob: Option<&str>,
    shape: impl FnOnce(T) -> R,
    default: impl FnOnce() -> R,
) -> R
where
    T: DeserializeOwned,
{
    let Some(raw) = blob.filter(|b| !b.trim().is_empty()) else {
        return default();
    };

    match serde_json::from_str::<T>(raw) {
        Ok(parsed) => shape(parsed),
        Err(err) => {
            warn!(field, error = %err, raw = %raw, "could not parse embedded document");
            default()
        }
    }
}

pub fn extract_stats(blob: Option<&str>) -> ProblemStats {
    parse_embedded(
        "stats",
        blob,
        |raw: RawStats| ProblemStats {
            acceptance_rate: Some(parse_ac_rate(raw.ac_rate.as_ref())),
            total_submissions: Some(raw.total_submission_raw.unwrap_or(0)),
            total_accepted: Some(raw.total_accepted_raw.unwrap_or(0)),
        },
        ProblemStats::default,
    )
}

/// `"21.7%"` -> `21.7`. Anything unreadable counts as `0.0`.
fn parse_ac_rate(value: Option<&Value>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let parsed = value
        .as_str()
        .and_then(|s| s.trim().trim_matches('%').trim().parse::<f64>().ok());
    match parsed {
        Some(rate) => rate,
        None => {
            warn!(ac_rate = %value, "unreadable acRate, using 0.0");
            0.0
        }
    }
}

pub fn extract_company_tags(blob: Option<&str>) -> Vec<String> {
    parse_embedded(
        "companyTagStats",
        blob,
        |raw: Vec<RawCompanyTag>| raw.into_iter().filter_map(|c| c.name).collect(),
        Vec::new,
    )
}

pub fn extract_similar_questions(blob: Option<&str>) -> Vec<String> {
    parse_embedded(
        "similarQuestions",
        blob,
        |raw: Vec<RawSimilarQuestion>| raw.into_iter().map(format_similar).collect(),
        Vec::new,
    )
}

fn format_similar(q: RawSimilarQuestion) -> String {
    let title = q.title.unwrap_or_default();
    let difficulty = q.difficulty.unwrap_or_default();
    match q.title_slug.filter(|s| !s.is_empty()) {
        Some(slug) => format!("{title} [{difficulty}]: {}", problem_url(&slug)),
        None => format!("{title} [{difficulty}]"),
    }
}

pub fn extract_tags(topic_tags: Option<&[TopicTag]>) -> Vec<String> {
    topic_tags
        .unwrap_or_default()
        .iter()
        .filter_map(|t| t.name.clone())
        .collect()
}

fn parse_difficulty(raw: Option<&str>) -> Option<Difficulty> {
    let raw = raw?;
    match raw.parse() {
        Ok(d) => Some(d),
        Err(err) => {
            warn!(error = %err, "unrecognised difficulty");
            None
        }
    }
}

pub fn normalize(raw: ProblemDetail) -> CanonicalProblem {
    let stats = extract_stats(raw.stats.as_deref());
    let companies = extract_company_tags(raw.company_tag_stats.as_deref());
    let similar_questions = extract_similar_questions(raw.similar_questions.as_deref());
    let tags = extract_tags(raw.topic_tags.as_deref());
    let slug = raw.title_slug.unwrap_or_default();

    let record = CanonicalProblem {
        id: raw.question_frontend_id.unwrap_or_default(),
        name: raw.title.unwrap_or_default(),
        tags,
        difficulty: parse_difficulty(raw.difficulty.as_deref()),
        acceptance_rate: stats.acceptance_rate,
        total_submissions: stats.total_submissions,
        total_accepted: stats.total_accepted,
        companies,
        discussion_count: raw.discussion_count.unwrap_or(0),
        likes: raw.likes.unwrap_or(0),
        dislikes: raw.dislikes.unwrap_or(0),
        similar_questions,
        url: problem_url(&slug),
        content: raw.content,
        code_snippets: raw.code_snippets,
    };
    debug!(id = %record.id, name = %record.name, "normalized problem");
    record
}

/// Normalize every detail and return the records in canonical id order.
pub fn normalize_all(details: Vec<ProblemDetail>) -> Vec<CanonicalProblem> {
    let mut records: Vec<_> = details.into_iter().map(normalize).collect();
    sort_canonical(&mut records);
    records
}
