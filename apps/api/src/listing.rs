//! Sorting and offset pagination shared by the list endpoints.

use std::cmp::Ordering;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` (case-insensitive) sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Slices `items` to `[offset, offset + limit)` and reports the page shape.
pub fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> (Vec<T>, OffsetPage) {
    let total = items.len();
    let page: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
    (
        page,
        OffsetPage {
            total,
            limit,
            offset,
            has_more: offset.saturating_add(limit) < total,
        },
    )
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
    }

    #[test]
    fn test_paginate_middle_page() {
        let (page, meta) = paginate((1..=10).collect::<Vec<_>>(), 3, 3);
        assert_eq!(page, vec![4, 5, 6]);
        assert_eq!(meta.total, 10);
        assert!(meta.has_more);
    }

    #[test]
    fn test_paginate_past_end() {
        let (page, meta) = paginate(vec![1, 2], 5, 10);
        assert!(page.is_empty());
        assert!(!meta.has_more);
    }
}
