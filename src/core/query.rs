// RegSift - core/query.rs
//
// Query orchestration: search -> filter -> sort, always in that order.
// Pure recomputation over an immutable snapshot; callers re-run it whenever
// the dataset, the annotations, or any query input changes.

use crate::core::annotation::AnnotationLookup;
use crate::core::filter::{apply_filters, FilterState};
use crate::core::model::Record;
use crate::core::sort::{sort_indices, SortSpec};

/// Everything the user controls about which records are visible and how
/// they are ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Free-text search term. Empty = no constraint.
    pub search: String,
    pub filter: FilterState,
    pub sort: SortSpec,
}

/// Compute the ordered visible set as indices into `records`.
///
/// Never mutates `records` and never truncates: how much of the result to
/// render is the caller's decision.
pub fn visible_records<A: AnnotationLookup + ?Sized>(
    records: &[Record],
    annotations: &A,
    query: &Query,
) -> Vec<usize> {
    let mut indices = apply_filters(records, annotations, &query.filter, &query.search);
    sort_indices(&mut indices, records, &query.sort);

    tracing::trace!(
        total = records.len(),
        visible = indices.len(),
        sort = %query.sort,
        active_filters = query.filter.active_count(),
        "Query recomputed"
    );

    indices
}

/// Resolve indices from [`visible_records`] back to records.
pub fn resolve<'a>(records: &'a [Record], indices: &[usize]) -> Vec<&'a Record> {
    indices.iter().filter_map(|&i| records.get(i)).collect()
}
