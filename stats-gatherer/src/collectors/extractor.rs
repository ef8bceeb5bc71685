use crate::metrics::Counter;

/// Walks a counter group in document order.
///
/// Every counter-bearing section of the tree goes through here so that the
/// same emission rule applies regardless of nesting depth. Duplicate names are
/// yielded individually.
pub fn extract(group: &[Counter]) -> impl Iterator<Item = &Counter> + Clone {
    group.iter()
}
