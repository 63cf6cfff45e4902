use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

// Listing types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllQuestionsData {
    pub all_questions: Option<Vec<ProblemSummary>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemSummary {
    #[serde(deserialize_with = "or_default")]
    pub question_id: String,
    #[serde(deserialize_with = "or_default")]
    pub question_frontend_id: String,
    #[serde(deserialize_with = "or_default")]
    pub title: String,
    #[serde(deserialize_with = "or_default")]
    pub title_slug: String,
    #[serde(deserialize_with = "or_default")]
    pub difficulty: String,
    #[serde(deserialize_with = "or_default")]
    pub is_paid_only: bool,
}

impl ProblemSummary {
    /// Internal numeric id, `None` when the upstream value is not an integer.
    pub fn primary_id(&self) -> Option<u64> {
        self.question_id.trim().parse().ok()
    }

    pub fn frontend_id(&self) -> Option<u64> {
        self.question_frontend_id.trim().parse().ok()
    }
}

// Detail types
#[derive(Debug, Deserialize)]
pub struct QuestionDetailData {
    pub question: Option<ProblemDetail>,
}

/// One problem exactly as the detail query returns it. The `stats`,
/// `company_tag_stats` and `similar_questions` fields are JSON documents
/// encoded as strings. A field of the wrong type reads as `None` rather than
/// rejecting the whole problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemDetail {
    #[serde(deserialize_with = "lenient")]
    pub question_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub question_frontend_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title_slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub difficulty: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub is_paid_only: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub stats: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub company_tag_stats: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub topic_tags: Option<Vec<TopicTag>>,
    #[serde(deserialize_with = "lenient")]
    pub similar_questions: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code_snippets: Option<Vec<CodeSnippet>>,
    #[serde(deserialize_with = "lenient")]
    pub sample_test_case: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub likes: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub dislikes: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub discussion_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicTag {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeSnippet {
    #[serde(deserialize_with = "lenient")]
    pub lang: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub lang_slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code: Option<String>,
}

/// Read any JSON value, keeping it only if it has the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!(error = %err, %value, "ignoring field with unexpected type");
            Ok(None)
        }
    }
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}
