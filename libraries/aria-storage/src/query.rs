//! Shared query-engine primitives
//!
//! Pagination is always computed by fetching one row more than the page
//! limit and checking for its presence, never by a separate count query.

use aria_core::ClusterId;
use sqlx::{QueryBuilder, Sqlite};

/// An ordered pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: i64,
    pub limit: i64,
}

impl Range {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

/// One page of ids plus whether another page exists
///
/// Random-sorted queries retain no seed: requesting a second page of a
/// random ordering re-shuffles, so callers wanting random listings should
/// request one bounded batch.
#[derive(Debug, Clone)]
pub struct RangeResults<T> {
    pub results: Vec<T>,
    pub more_results: bool,
}

impl<T> RangeResults<T> {
    /// Build from rows fetched with `LIMIT limit + 1`
    pub(crate) fn from_rows(mut rows: Vec<T>, range: Option<Range>) -> Self {
        let more_results = match range {
            Some(range) => {
                if rows.len() as i64 > range.limit {
                    rows.truncate(range.limit as usize);
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        Self {
            results: rows,
            more_results,
        }
    }
}

/// Append `LIMIT`/`OFFSET`, over-fetching one row for `more_results`
pub(crate) fn push_range(qb: &mut QueryBuilder<'_, Sqlite>, range: Option<Range>) {
    if let Some(range) = range {
        qb.push(" LIMIT ");
        qb.push_bind(range.limit + 1);
        qb.push(" OFFSET ");
        qb.push_bind(range.offset);
    }
}

/// Tracks whether a WHERE clause has been started
#[derive(Default)]
pub(crate) struct WhereClause {
    started: bool,
}

impl WhereClause {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push `WHERE` or `AND` as appropriate
    pub(crate) fn push(&mut self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.started {
            qb.push(" AND ");
        } else {
            qb.push(" WHERE ");
            self.started = true;
        }
    }
}

/// Membership-of-all-clusters filter (AND semantics)
///
/// `id_column` must be the entity id to constrain; `membership_select` is a
/// SELECT yielding `(entity_id, cluster_id)` pairs named `eid`/`cid`.
pub(crate) fn push_cluster_filter(
    qb: &mut QueryBuilder<'_, Sqlite>,
    id_column: &str,
    membership_select: &str,
    clusters: &[ClusterId],
) {
    qb.push(id_column);
    qb.push(" IN (SELECT m.eid FROM (");
    qb.push(membership_select);
    qb.push(") m WHERE m.cid IN (");
    let mut separated = qb.separated(", ");
    for cluster_id in clusters {
        separated.push_bind(*cluster_id);
    }
    qb.push(") GROUP BY m.eid HAVING COUNT(DISTINCT m.cid) = ");
    qb.push_bind(clusters.len() as i64);
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_results_detects_extra_row() {
        let page = RangeResults::from_rows(vec![1, 2, 3], Some(Range::new(0, 2)));
        assert_eq!(page.results, vec![1, 2]);
        assert!(page.more_results);

        let last = RangeResults::from_rows(vec![3], Some(Range::new(2, 2)));
        assert_eq!(last.results, vec![3]);
        assert!(!last.more_results);

        let unbounded = RangeResults::from_rows(vec![1, 2, 3], None);
        assert_eq!(unbounded.results.len(), 3);
        assert!(!unbounded.more_results);
    }
}
