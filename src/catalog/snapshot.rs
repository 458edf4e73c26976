use super::record::OrbitalElementRecord;
use itertools::Itertools;

/// An immutable, ordered set of element records captured at one fetch instant.
///
/// Catalog identifiers are unique within a snapshot. Should the source deliver the same
/// identifier twice, the later entry wins and takes the position of its last occurrence.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// The instant the records were fetched (or loaded from the cache).
    fetched_at: chrono::DateTime<chrono::Utc>,
    /// Records in source order.
    records: Vec<OrbitalElementRecord>,
}

impl CatalogSnapshot {
    pub fn new(
        fetched_at: chrono::DateTime<chrono::Utc>,
        records: Vec<OrbitalElementRecord>,
    ) -> Self {
        Self { fetched_at, records: Self::dedup_last_wins(records) }
    }

    /// A snapshot with no records, distinct from "no snapshot at all".
    pub fn empty(fetched_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self { fetched_at, records: Vec::new() }
    }

    fn dedup_last_wins(records: Vec<OrbitalElementRecord>) -> Vec<OrbitalElementRecord> {
        let mut deduped = records
            .into_iter()
            .rev()
            .unique_by(OrbitalElementRecord::catalog_id)
            .collect::<Vec<_>>();
        deduped.reverse();
        deduped
    }

    pub fn fetched_at(&self) -> chrono::DateTime<chrono::Utc> { self.fetched_at }
    pub fn records(&self) -> &[OrbitalElementRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
