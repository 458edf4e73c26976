mod record;
mod snapshot;
pub(crate) mod store;

pub use record::{OrbitalElementRecord, records_from_json};
pub use snapshot::CatalogSnapshot;
pub use store::{FileSnapshotStore, SnapshotStore, StoreError};
