//! Cursor bookkeeping for a refined page.
//!
//! `has_more` is decided from the *refined* page size: a page the refiner
//! shrank below `limit` is reported as the last page even when the store has
//! further rows. That is the accepted trade-off of fetching exactly one native
//! page per search; callers that need exhaustive paging must not rely on it
//! when nested-field criteria are active.
//!
//! The cursor handed out is the id of the last document of the *native*
//! page, so the next search resumes where the store stopped, not where an
//! in-memory re-sort happened to leave the last item.

use crate::models::Pagination;

pub fn paginate(refined_len: usize, native_last_id: Option<&str>, limit: usize, total: u64) -> Pagination {
    let has_more = refined_len == limit && native_last_id.is_some();
    Pagination {
        total,
        has_more,
        next_cursor: if has_more { native_last_id.map(str::to_string) } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_has_more() {
        let p = paginate(12, Some("car-12"), 12, 40);
        assert!(p.has_more);
        assert_eq!(p.next_cursor.as_deref(), Some("car-12"));
        assert_eq!(p.total, 40);
    }

    #[test]
    fn short_page_is_last() {
        let p = paginate(11, Some("car-12"), 12, 40);
        assert!(!p.has_more);
        assert_eq!(p.next_cursor, None);
    }

    #[test]
    fn empty_result_is_last() {
        let p = paginate(0, None, 12, 0);
        assert_eq!(p, Pagination { total: 0, has_more: false, next_cursor: None });
    }
}
