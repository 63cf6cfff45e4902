pub const ALL_QUESTIONS_QUERY: &str = r#"
query allQuestions {
  allQuestions {
    questionId
    questionFrontendId
    title
    titleSlug
    difficulty
    isPaidOnly
  }
}
"#;

pub const QUESTION_DETAIL_QUERY: &str = r#"
query questionData($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
    questionFrontendId
    title
    titleSlug
    content
    difficulty
    isPaidOnly
    stats
    companyTagStats
    topicTags {
      name
      slug
    }
    similarQuestions
    codeSnippets {
      lang
      langSlug
      code
    }
    sampleTestCase
    likes
    dislikes
    discussionCount
  }
}
"#;
