//! Splitting record lists into bounded, shape-consistent batches.

use crate::Record;
use indexmap::IndexMap;
use std::num::NonZeroUsize;

/// Default number of rows per request payload.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(n) => n,
    None => unreachable!(),
};

/// Split `items` into consecutive groups of at most `size`, in order.
///
/// Empty input yields no groups.
pub fn chunk<T>(items: &[T], size: NonZeroUsize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.get())
}

/// Partition records into groups with identical column sets.
///
/// Groups appear in order of their first record, and records keep their
/// relative order within a group. Sending one group as one columnar payload
/// never has to fill in cells a record did not specify.
pub fn group_by_shape(records: Vec<Record>) -> Vec<Vec<Record>> {
    let mut groups: IndexMap<Vec<String>, Vec<Record>> = IndexMap::new();
    for record in records {
        let shape = record.shape().into_iter().map(str::to_string).collect();
        groups.entry(shape).or_default().push(record);
    }
    groups.into_values().collect()
}
