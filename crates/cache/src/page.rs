//! Page slicing

use crate::errors::{CacheError, Result};
use serde::Serialize;
use serde_json::Value;

/// One page of a cached result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub records: Vec<Value>,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    /// Size of the whole result set, regardless of the page requested
    pub total: usize,
}

impl PageView {
    /// Number of pages needed to show `total` records
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

/// Slice `records` into page `page` of `page_size` rows.
///
/// A page past the end yields an empty slice; `total` is still reported.
pub fn paginate(records: &[Value], page: usize, page_size: usize) -> Result<PageView> {
    if page == 0 || page_size == 0 {
        return Err(CacheError::InvalidPage { page, page_size });
    }
    let total = records.len();
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    Ok(PageView {
        records: records[start..end].to_vec(),
        page,
        page_size,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({ "a": i })).collect()
    }

    #[test]
    fn test_three_rows_in_pages_of_two() {
        let records = vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})];

        let first = paginate(&records, 1, 2).unwrap();
        assert_eq!(first.records, vec![json!({"a": 1}), json!({"a": 2})]);
        assert_eq!(first.total, 3);

        let second = paginate(&records, 2, 2).unwrap();
        assert_eq!(second.records, vec![json!({"a": 3})]);
        assert_eq!(second.total, 3);

        let third = paginate(&records, 3, 2).unwrap();
        assert!(third.records.is_empty());
        assert_eq!(third.total, 3);
    }

    #[test]
    fn test_zero_page_or_size_is_rejected() {
        assert_eq!(
            paginate(&rows(3), 0, 10),
            Err(CacheError::InvalidPage { page: 0, page_size: 10 })
        );
        assert!(matches!(
            paginate(&rows(3), 1, 0),
            Err(CacheError::InvalidPage { .. })
        ));
    }

    #[test]
    fn test_empty_result_set_is_a_valid_page() {
        let view = paginate(&[], 1, 50).unwrap();
        assert!(view.records.is_empty());
        assert_eq!(view.total, 0);
        assert_eq!(view.page_count(), 0);
        assert!(!view.has_next());
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let view = paginate(&rows(5), usize::MAX, usize::MAX).unwrap();
        assert!(view.records.is_empty());
        assert_eq!(view.total, 5);
    }

    proptest! {
        #[test]
        fn prop_pages_partition_the_records(total in 0usize..200, size in 1usize..40) {
            let records = rows(total);
            let mut seen = Vec::new();
            let mut page = 1;
            loop {
                let view = paginate(&records, page, size).unwrap();
                prop_assert_eq!(view.total, total);
                prop_assert!(view.records.len() <= size);
                if view.records.is_empty() {
                    break;
                }
                seen.extend(view.records);
                page += 1;
            }
            prop_assert_eq!(seen, records);
        }

        #[test]
        fn prop_first_page_is_prefix(total in 0usize..100, size in 1usize..100) {
            let records = rows(total);
            let view = paginate(&records, 1, size).unwrap();
            prop_assert_eq!(view.records.len(), size.min(total));
            prop_assert_eq!(&view.records[..], &records[..size.min(total)]);
        }
    }
}
