use std::cmp::Reverse;
use std::fmt;

use crate::api::types::ProblemSummary;

/// Which problems a run should fetch in detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Frontend ids in `low..=high`.
    Range { low: u64, high: u64 },
    /// The `n` problems with the highest internal id.
    Latest(usize),
}

impl Selection {
    pub fn apply(&self, summaries: &[ProblemSummary]) -> Vec<ProblemSummary> {
        match *self {
            Selection::Range { low, high } => select_by_range(summaries, low, high),
            Selection::Latest(n) => select_top_n(summaries, n),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Range { low, high } => write!(f, "ids {low}..={high}"),
            Selection::Latest(n) => write!(f, "latest {n}"),
        }
    }
}

/// Keep summaries whose frontend id parses and lies in `low..=high`, in input order.
pub fn select_by_range(summaries: &[ProblemSummary], low: u64, high: u64) -> Vec<ProblemSummary> {
    summaries
        .iter()
        .filter(|s| s.frontend_id().is_some_and(|id| (low..=high).contains(&id)))
        .cloned()
        .collect()
}

/// The `n` summaries with the largest internal id, largest first. Summaries
/// whose id does not parse sort after every numeric one.
pub fn select_top_n(summaries: &[ProblemSummary], n: usize) -> Vec<ProblemSummary> {
    let mut sorted = summaries.to_vec();
    sorted.sort_by_key(|s| {
        let id = s.primary_id();
        (id.is_none(), Reverse(id))
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, frontend: &str, slug: &str) -> ProblemSummary {
        ProblemSummary {
            question_id: id.into(),
            question_frontend_id: frontend.into(),
            title: slug.into(),
            title_slug: slug.into(),
            difficulty: "Easy".into(),
            is_paid_only: false,
        }
    }

    fn slugs(items: &[ProblemSummary]) -> Vec<&str> {
        items.iter().map(|s| s.title_slug.as_str()).collect()
    }

    #[test]
    fn range_is_inclusive_and_keeps_order() {
        let all = vec![
            summary("1", "5", "e"),
            summary("2", "1", "a"),
            summary("3", "3", "c"),
            summary("4", "6", "f"),
            summary("5", "LCP 01", "lcp"),
            summary("6", "1", "a2"),
        ];
        assert_eq!(slugs(&select_by_range(&all, 1, 5)), vec!["e", "a", "c", "a2"]);
        assert_eq!(slugs(&select_by_range(&all, 3, 3)), vec!["c"]);
        assert!(select_by_range(&all, 7, 10).is_empty());
        assert!(select_by_range(&all, 5, 1).is_empty());
    }

    #[test]
    fn top_n_orders_by_primary_id_descending() {
        let all = vec![
            summary("10", "100", "ten"),
            summary("30", "1", "thirty"),
            summary("20", "2", "twenty"),
        ];
        assert_eq!(slugs(&select_top_n(&all, 2)), vec!["thirty", "twenty"]);
        assert_eq!(slugs(&select_top_n(&all, 10)), vec!["thirty", "twenty", "ten"]);
        assert!(select_top_n(&all, 0).is_empty());
    }

    #[test]
    fn top_n_ties_keep_input_order_and_bad_ids_sort_last() {
        let all = vec![
            summary("", "1", "blank"),
            summary("5", "2", "first"),
            summary("5", "3", "second"),
            summary("9", "4", "nine"),
        ];
        assert_eq!(
            slugs(&select_top_n(&all, 4)),
            vec!["nine", "first", "second", "blank"]
        );
    }

    #[test]
    fn empty_listing_selects_nothing() {
        assert!(select_by_range(&[], 1, 10).is_empty());
        assert!(select_top_n(&[], 10).is_empty());
        assert!(Selection::Latest(3).apply(&[]).is_empty());
    }
}
