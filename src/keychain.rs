use crate::catalog::SnapshotStore;
use crate::tracking::{PositionService, TrackingContext};
use std::sync::Arc;

/// Struct bundling the shared handles of the service: the catalog snapshot store
/// written by the refresh job and the position service answering queries.
///
/// Cloning is cheap, every field is reference counted.
#[derive(Clone)]
pub struct Keychain {
    /// The store holding the most recent catalog snapshot.
    store: Arc<dyn SnapshotStore>,
    /// The stateless parser/propagator/converter pipeline.
    service: Arc<PositionService>,
}

impl Keychain {
    /// Creates a new `Keychain` around `store`, propagating with `context`.
    pub fn new(store: Arc<dyn SnapshotStore>, context: TrackingContext) -> Self {
        Self { store, service: Arc::new(PositionService::new(context)) }
    }

    /// Provides a cloned reference to the snapshot store.
    pub fn store(&self) -> Arc<dyn SnapshotStore> { Arc::clone(&self.store) }

    /// Provides a cloned reference to the position service.
    pub fn service(&self) -> Arc<PositionService> { Arc::clone(&self.service) }
}
