use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::types::CodeSnippet;

pub const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty {other:?}")),
        }
    }
}

/// Counters pulled out of the stringified `stats` document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProblemStats {
    pub acceptance_rate: Option<f64>,
    pub total_submissions: Option<i64>,
    pub total_accepted: Option<i64>,
}

/// Flat, output-ready view of one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProblem {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub acceptance_rate: Option<f64>,
    pub total_submissions: Option<i64>,
    pub total_accepted: Option<i64>,
    pub companies: Vec<String>,
    pub discussion_count: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub similar_questions: Vec<String>,
    pub url: String,
    pub content: Option<String>,
    pub code_snippets: Option<Vec<CodeSnippet>>,
}

impl CanonicalProblem {
    /// The first run of digits in `id`, without leading zeros.
    pub fn sort_key(&self) -> Option<&str> {
        leading_digits(&self.id)
    }
}

pub fn problem_url(slug: &str) -> String {
    format!("{PROBLEM_URL_BASE}{slug}/")
}

/// Order records by the number embedded in their id, ascending. Ids without
/// any digits go last, keeping their relative order.
pub fn sort_canonical(records: &mut [CanonicalProblem]) {
    records.sort_by(|a, b| match (a.sort_key(), b.sort_key()) {
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

// Compared as digit strings so ids of any length order numerically.
fn leading_digits(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    Some(rest[..end].trim_start_matches('0'))
}
