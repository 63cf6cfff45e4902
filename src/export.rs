use anyhow::{Context, Result};

use crate::model::CanonicalProblem;

pub const LIST_DELIMITER: &str = ", ";
pub const SIMILAR_DELIMITER: &str = " | ";

/// A CSV column. `content` and `code_snippets` have no column on purpose;
/// they only exist in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Difficulty,
    AcceptanceRate,
    TotalSubmissions,
    TotalAccepted,
    Tags,
    Companies,
    DiscussionCount,
    Likes,
    Dislikes,
    SimilarQuestions,
    Url,
}

pub const CSV_COLUMNS: [Column; 13] = [
    Column::Id,
    Column::Name,
    Column::Difficulty,
    Column::AcceptanceRate,
    Column::TotalSubmissions,
    Column::TotalAccepted,
    Column::Tags,
    Column::Companies,
    Column::DiscussionCount,
    Column::Likes,
    Column::Dislikes,
    Column::SimilarQuestions,
    Column::Url,
];

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Difficulty => "difficulty",
            Column::AcceptanceRate => "acceptance_rate",
            Column::TotalSubmissions => "total_submissions",
            Column::TotalAccepted => "total_accepted",
            Column::Tags => "tags",
            Column::Companies => "companies",
            Column::DiscussionCount => "discussion_count",
            Column::Likes => "likes",
            Column::Dislikes => "dislikes",
            Column::SimilarQuestions => "similar_questions",
            Column::Url => "url",
        }
    }

    pub fn value(&self, record: &CanonicalProblem) -> String {
        fn opt<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }

        match self {
            Column::Id => record.id.clone(),
            Column::Name => record.name.clone(),
            Column::Difficulty => opt(record.difficulty),
            Column::AcceptanceRate => record.acceptance_rate.map(json_number).unwrap_or_default(),
            Column::TotalSubmissions => opt(record.total_submissions),
            Column::TotalAccepted => opt(record.total_accepted),
            Column::Tags => record.tags.join(LIST_DELIMITER),
            Column::Companies => record.companies.join(LIST_DELIMITER),
            Column::DiscussionCount => record.discussion_count.to_string(),
            Column::Likes => record.likes.to_string(),
            Column::Dislikes => record.dislikes.to_string(),
            Column::SimilarQuestions => record.similar_questions.join(SIMILAR_DELIMITER),
            Column::Url => record.url.clone(),
        }
    }
}

/// Render a float the way the JSON output does, so `50.0` stays `50.0`.
fn json_number(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|n| n.to_string())
        .unwrap_or_default()
}

/// Pretty-printed JSON array of the full records.
pub fn to_json(records: &[CanonicalProblem]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")
}

/// CSV projection of `records` onto `columns`. Returns `None` for an empty
/// record set, in which case no CSV should be written at all.
pub fn to_csv(records: &[CanonicalProblem], columns: &[Column]) -> Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(Column::header))
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record(columns.iter().map(|c| c.value(record)))
            .with_context(|| format!("Failed to write CSV row for problem {}", record.id))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    let document = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;
    Ok(Some(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::CodeSnippet;
    use crate::model::Difficulty;

    fn sample() -> CanonicalProblem {
        CanonicalProblem {
            id: "1".into(),
            name: "Two Sum".into(),
            tags: vec!["Array".into(), "Hash Table".into()],
            difficulty: Some(Difficulty::Easy),
            acceptance_rate: Some(49.5),
            total_submissions: Some(200),
            total_accepted: None,
            companies: vec!["Google".into()],
            discussion_count: 3,
            likes: 10,
            dislikes: 1,
            similar_questions: vec!["3Sum [Medium]".into(), "4Sum [Medium]".into()],
            url: "https://leetcode.com/problems/two-sum/".into(),
            content: Some("<p>Given an array…</p>".into()),
            code_snippets: Some(vec![CodeSnippet {
                lang: Some("Rust".into()),
                lang_slug: Some("rust".into()),
                code: Some("impl Solution {}".into()),
            }]),
        }
    }

    #[test]
    fn csv_has_header_and_flattened_lists() {
        let csv = to_csv(&[sample()], &CSV_COLUMNS).unwrap().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,name,difficulty,acceptance_rate,total_submissions,total_accepted,tags,companies,discussion_count,likes,dislikes,similar_questions,url"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,Two Sum,Easy,49.5,200,,\"Array, Hash Table\",Google,3,10,1,3Sum [Medium] | 4Sum [Medium],https://leetcode.com/problems/two-sum/"
        );
        assert!(lines.next().is_none());
        assert!(!csv.contains("impl Solution"));
    }

    #[test]
    fn whole_number_rates_match_the_json_rendering() {
        let mut record = sample();
        record.acceptance_rate = Some(50.0);
        let csv = to_csv(std::slice::from_ref(&record), &[Column::AcceptanceRate])
            .unwrap()
            .unwrap();
        assert_eq!(csv, "acceptance_rate\n50.0\n");

        let json: serde_json::Value = serde_json::from_str(&to_json(&[record]).unwrap()).unwrap();
        assert_eq!(json[0]["acceptance_rate"].to_string(), "50.0");
    }

    #[test]
    fn empty_record_set_produces_no_csv() {
        assert!(to_csv(&[], &CSV_COLUMNS).unwrap().is_none());
    }

    #[test]
    fn custom_column_selection_is_respected() {
        let csv = to_csv(&[sample()], &[Column::Url, Column::Id]).unwrap().unwrap();
        assert_eq!(csv, "url,id\nhttps://leetcode.com/problems/two-sum/,1\n");
    }

    #[test]
    fn json_keeps_nested_fields_and_unicode() {
        let json = to_json(&[sample()]).unwrap();
        assert!(json.contains("\n  {\n"));
        assert!(json.contains("Given an array…"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["code_snippets"][0]["langSlug"], "rust");
        assert_eq!(value[0]["total_accepted"], serde_json::Value::Null);
        assert_eq!(value[0]["difficulty"], "Easy");
    }
}
