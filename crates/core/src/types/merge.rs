//! Local-first union of two id-keyed collections.

use std::collections::HashSet;

use super::ProductId;

/// Anything stored once per product.
pub trait Keyed {
    fn product_id(&self) -> &ProductId;
}

/// Union `local` and `server` by product id.
///
/// Every local entry is kept as-is and in order; server entries whose id is
/// not present locally are appended in server order. When `local` is empty
/// the result is exactly `server`.
#[must_use]
pub fn merge_local_first<T: Keyed + Clone>(local: &[T], server: &[T]) -> Vec<T> {
    if local.is_empty() {
        return server.to_vec();
    }

    let local_ids: HashSet<&ProductId> = local.iter().map(Keyed::product_id).collect();
    let mut merged = local.to_vec();
    merged.extend(
        server
            .iter()
            .filter(|entry| !local_ids.contains(entry.product_id()))
            .cloned(),
    );
    merged
}

/// The first id that occurs more than once, if any.
pub(crate) fn first_duplicate<T: Keyed>(entries: &[T]) -> Option<&ProductId> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .map(Keyed::product_id)
        .find(|id| !seen.insert(*id))
}
