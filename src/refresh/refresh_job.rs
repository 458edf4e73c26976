use crate::catalog::{CatalogSnapshot, SnapshotStore, StoreError};
use crate::config::{Credentials, ServiceConfig};
use crate::http_handler::{
    common::HTTPError,
    http_client::HTTPClient,
    http_request::{
        debris_catalog_get::DebrisCatalogRequest,
        login_post::LoginRequest,
        request_common::{FormBodyHTTPRequestType, NoBodyHTTPRequestType, RequestError},
    },
};
use crate::{error, info};
use std::{sync::Arc, time::Duration};
use strum_macros::Display;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display)]
pub enum RefreshError {
    /// The registry rejected the credentials.
    Auth,
    /// Network failure, unexpected status or malformed payload.
    Transport(HTTPError),
    /// The fetched snapshot could not be stored.
    Store(StoreError),
}

impl std::error::Error for RefreshError {}

impl From<HTTPError> for RefreshError {
    fn from(value: HTTPError) -> Self {
        if value.is_unauthorized() { RefreshError::Auth } else { RefreshError::Transport(value) }
    }
}

impl From<StoreError> for RefreshError {
    fn from(value: StoreError) -> Self { RefreshError::Store(value) }
}

/// Periodically replaces the catalog snapshot with a fresh download from the registry.
///
/// Every cycle logs in, runs the debris query and swaps the whole snapshot. A failed
/// cycle leaves the previous snapshot in place and does not affect the schedule.
pub struct RefreshJob {
    client: HTTPClient,
    credentials: Credentials,
    store: Arc<dyn SnapshotStore>,
    interval: Duration,
}

impl RefreshJob {
    /// # Errors
    /// [`RefreshError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        config: &ServiceConfig,
        credentials: Credentials,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self, RefreshError> {
        let client = HTTPClient::new(config.registry_url(), config.http_timeout())
            .map_err(|e| HTTPError::from(RequestError::from(e)))?;
        Ok(Self { client, credentials, store, interval: config.refresh_interval() })
    }

    pub fn interval(&self) -> Duration { self.interval }

    /// Logs in and downloads the current debris catalog.
    ///
    /// # Errors
    /// [`RefreshError::Auth`] on rejected credentials, [`RefreshError::Transport`] otherwise.
    pub async fn fetch_catalog(&self) -> Result<CatalogSnapshot, RefreshError> {
        LoginRequest {
            identity: self.credentials.username().to_string(),
            password: self.credentials.password().to_string(),
        }
        .send_request(&self.client)
        .await?;
        let records = DebrisCatalogRequest {}.send_request(&self.client).await?;
        Ok(CatalogSnapshot::new(chrono::Utc::now(), records))
    }

    /// Runs a single refresh cycle and returns the number of stored records.
    ///
    /// # Errors
    /// Any [`RefreshError`]; the store is untouched unless the whole cycle succeeded.
    pub async fn refresh_once(&self) -> Result<usize, RefreshError> {
        let snapshot = self.fetch_catalog().await?;
        let count = snapshot.len();
        self.store.replace(snapshot).await?;
        Ok(count)
    }

    async fn run_cycle(&self) {
        info!("Refreshing debris catalog from {}...", self.client.url());
        match self.refresh_once().await {
            Ok(count) => info!("Catalog refreshed, {count} debris objects stored."),
            Err(RefreshError::Auth) => {
                error!("Registry rejected the credentials, keeping previous snapshot.");
            }
            Err(e) => error!("Catalog refresh failed, keeping previous snapshot: {e:?}"),
        }
    }

    /// Refreshes immediately, then once per interval until `shutdown` is cancelled.
    /// Cycles never overlap: a slow cycle delays the next tick instead of stacking up.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = self.run_cycle() => {}
            }
            info!("Next catalog refresh in {}h.", self.interval.as_secs() / 3600);
        }
        info!("Refresh job stopped.");
    }
}
