use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, RequestBuilder, cookie::Jar};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::queries::{ALL_QUESTIONS_QUERY, QUESTION_DETAIL_QUERY};
use super::types::*;
use crate::fetch::{DetailSource, FetchError, ListingSource};

const LEETCODE_BASE: &str = "https://leetcode.com";
const LEETCODE_GRAPHQL: &str = "https://leetcode.com/graphql";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.131 Safari/537.36";

#[derive(Clone)]
pub struct LeetCodeClient {
    client: Client,
    csrf_token: Option<String>,
}

impl LeetCodeClient {
    pub fn new(session: Option<&str>, csrf: Option<&str>) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let url = LEETCODE_BASE.parse().context("Invalid LeetCode base url")?;

        if let Some(session) = session {
            if !session.is_empty() {
                jar.add_cookie_str(&format!("LEETCODE_SESSION={session}"), &url);
            }
        }
        let csrf = csrf.filter(|c| !c.is_empty());
        if let Some(csrf) = csrf {
            jar.add_cookie_str(&format!("csrftoken={csrf}"), &url);
        }

        let client = Client::builder()
            .cookie_provider(jar)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            csrf_token: csrf.map(String::from),
        })
    }

    fn auth_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("Content-Type", "application/json")
            .header("Origin", LEETCODE_BASE)
            .header("Referer", LEETCODE_BASE);
        if let Some(ref token) = self.csrf_token {
            builder.header("x-csrftoken", token)
        } else {
            builder
        }
    }

    /// Fetch the lightweight listing of every problem. A response without the
    /// `allQuestions` payload is an empty listing, not an error.
    pub async fn fetch_all_problems(&self) -> Result<Vec<ProblemSummary>> {
        let body = json!({
            "query": ALL_QUESTIONS_QUERY,
            "variables": {}
        });

        info!("fetching problem list");
        let resp = self
            .auth_request(self.client.post(LEETCODE_GRAPHQL))
            .json(&body)
            .send()
            .await
            .context("Failed to send problem list request")?;

        let status = resp.status();
        debug!(%status, "problem list response");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("LeetCode returned HTTP {status}: {}", preview(&body));
        }

        let data: GraphQLResponse<AllQuestionsData> = resp
            .json()
            .await
            .context("Failed to parse problem list response")?;
        Ok(listing_from(data))
    }

    pub async fn fetch_problem_detail(&self, slug: &str) -> Result<ProblemDetail, FetchError> {
        let body = json!({
            "query": QUESTION_DETAIL_QUERY,
            "variables": {
                "titleSlug": slug,
            }
        });

        let resp = self
            .auth_request(self.client.post(LEETCODE_GRAPHQL))
            .header("Referer", format!("{LEETCODE_BASE}/problems/{slug}/"))
            .json(&body)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                slug: slug.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                slug: slug.to_string(),
                status,
            });
        }

        let data: GraphQLResponse<QuestionDetailData> =
            resp.json().await.map_err(|source| FetchError::Decode {
                slug: slug.to_string(),
                source,
            })?;
        detail_from(slug, data)
    }
}

impl ListingSource for LeetCodeClient {
    async fn fetch_listing(&self) -> Result<Vec<ProblemSummary>> {
        self.fetch_all_problems().await
    }
}

impl DetailSource for LeetCodeClient {
    async fn fetch_detail(&self, slug: &str) -> Result<ProblemDetail, FetchError> {
        self.fetch_problem_detail(slug).await
    }
}

/// Read `LEETCODE_SESSION` and `csrftoken` from the local browser cookie stores.
pub fn browser_session() -> Result<(Option<String>, Option<String>)> {
    let cookies = rookie::load(Some(vec!["leetcode.com".to_string()]))
        .map_err(|e| anyhow!("Failed to read browser cookies: {e}"))?;

    let mut session = None;
    let mut csrf = None;
    for cookie in cookies {
        match cookie.name.as_str() {
            "LEETCODE_SESSION" => session = Some(cookie.value),
            "csrftoken" => csrf = Some(cookie.value),
            _ => {}
        }
    }
    Ok((session, csrf))
}

/// The listing carried by a decoded response. A missing payload path is an
/// empty listing.
pub fn listing_from(resp: GraphQLResponse<AllQuestionsData>) -> Vec<ProblemSummary> {
    log_graphql_errors(resp.errors.as_deref());
    match resp.data.and_then(|d| d.all_questions) {
        Some(questions) => {
            info!(count = questions.len(), "retrieved problem list");
            questions
        }
        None => {
            warn!("problem list data not found in response");
            Vec::new()
        }
    }
}

pub fn detail_from(
    slug: &str,
    resp: GraphQLResponse<QuestionDetailData>,
) -> Result<ProblemDetail, FetchError> {
    log_graphql_errors(resp.errors.as_deref());
    resp.data.and_then(|d| d.question).ok_or_else(|| FetchError::NotFound {
        slug: slug.to_string(),
    })
}

fn log_graphql_errors(errors: Option<&[GraphQLError]>) {
    for err in errors.unwrap_or_default() {
        warn!(message = %err.message, "GraphQL error in response");
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(body: &str) -> Vec<ProblemSummary> {
        listing_from(serde_json::from_str(body).unwrap())
    }

    fn detail(body: &str) -> Result<ProblemDetail, FetchError> {
        detail_from("two-sum", serde_json::from_str(body).unwrap())
    }

    #[test]
    fn listing_without_payload_is_empty() {
        assert!(listing(r#"{"data":null}"#).is_empty());
        assert!(listing(r#"{"data":{"allQuestions":null}}"#).is_empty());
        assert!(listing(r#"{"data":{}}"#).is_empty());
        assert!(listing(r#"{"errors":[{"message":"rate limited"}]}"#).is_empty());
    }

    #[test]
    fn listing_payload_is_returned_alongside_errors() {
        let questions = listing(
            r#"{
                "data": {"allQuestions": [
                    {"questionId": "1", "questionFrontendId": "1", "title": "Two Sum",
                     "titleSlug": "two-sum", "difficulty": "Easy", "isPaidOnly": false}
                ]},
                "errors": [{"message": "partial"}]
            }"#,
        );
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].title_slug, "two-sum");
    }

    #[test]
    fn missing_question_is_not_found() {
        for body in [
            r#"{"data":null}"#,
            r#"{"data":{"question":null}}"#,
            r#"{"errors":[{"message":"That question does not exist"}]}"#,
        ] {
            match detail(body) {
                Err(FetchError::NotFound { slug }) => assert_eq!(slug, "two-sum"),
                other => panic!("expected NotFound for {body}, got {other:?}"),
            }
        }
    }

    #[test]
    fn present_question_is_returned() {
        let found = detail(
            r#"{"data":{"question":{
                "questionFrontendId": "1",
                "likes": 5,
                "codeSnippets": [{"lang": "Rust", "langSlug": "rust", "code": null}]
            }}}"#,
        )
        .unwrap();
        assert_eq!(found.question_frontend_id.as_deref(), Some("1"));
        assert_eq!(found.likes, Some(5));
        assert_eq!(found.code_snippets.unwrap()[0].code, None);
    }
}
