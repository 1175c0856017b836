//! Sinks for loaded records: PostgreSQL rows and the Pinecone vector index.

pub mod pinecone;
pub mod postgres;

pub use pinecone::PineconeClient;
pub use postgres::PgStore;

use std::collections::HashSet;
use std::hash::Hash;

/// Split `records` into consecutive batches of at most `max_batch_size`.
///
/// A zero size is treated as one record per batch.
pub fn batch_records<T>(records: &[T], max_batch_size: usize) -> std::slice::Chunks<'_, T> {
    records.chunks(max_batch_size.max(1))
}

/// Drop rows whose key repeats later in `rows`, keeping the last occurrence.
///
/// A single `INSERT .. ON CONFLICT DO UPDATE` cannot touch the same key twice,
/// so rows are deduplicated before batching. Survivors keep their relative order.
pub fn dedupe_last_by_key<T, K, F>(rows: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept: Vec<T> = rows
        .iter()
        .rev()
        .filter(|row| seen.insert(key(*row)))
        .cloned()
        .collect();
    kept.reverse();
    kept
}
