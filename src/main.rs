#![allow(dead_code)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod catalog;
mod config;
mod http_handler;
mod keychain;
mod logger;
mod query;
mod refresh;
mod tracking;

use crate::catalog::{FileSnapshotStore, SnapshotStore};
use crate::config::{Credentials, ServiceConfig};
use crate::keychain::Keychain;
use crate::refresh::RefreshJob;
use crate::tracking::TrackingContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Number of records printed by the one-shot `fetch` mode.
const SAMPLE_SIZE: usize = 5;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = ServiceConfig::from_env();
    let store = Arc::new(FileSnapshotStore::open(config.cache_path()).await);

    if std::env::args().nth(1).as_deref() == Some("fetch") {
        fetch_once(&config, store).await;
        return;
    }

    let shutdown = CancellationToken::new();
    start_refresh_job(&config, Arc::clone(&store) as Arc<dyn SnapshotStore>, shutdown.clone());

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested.");
                ctrl_c_token.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {e}"),
        }
    });

    let keychain = Keychain::new(store, TrackingContext::system());
    info!("Serving debris positions on http://{}{}", config.api_addr(), query::POSITIONS_ROUTE);
    if let Err(e) = query::serve(config.api_addr(), keychain, shutdown.clone()).await {
        error!("Query interface stopped: {e}");
    }
    shutdown.cancel();
}

/// Spawns the periodic refresh. Without credentials only the query interface runs,
/// serving whatever snapshot is cached.
fn start_refresh_job(
    config: &ServiceConfig,
    store: Arc<dyn SnapshotStore>,
    shutdown: CancellationToken,
) {
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Catalog refresh disabled, {e:?} is not set.");
            return;
        }
    };
    match RefreshJob::new(config, credentials, store) {
        Ok(job) => {
            info!("Catalog refresh scheduled every {}h.", job.interval().as_secs() / 3600);
            tokio::spawn(job.run(shutdown));
        }
        Err(e) => error!("Catalog refresh disabled: {e:?}"),
    }
}

/// Single refresh cycle followed by a short listing of the stored records.
async fn fetch_once(config: &ServiceConfig, store: Arc<FileSnapshotStore>) {
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => fatal!("Cannot fetch without registry credentials: {e:?}"),
    };
    let job = match RefreshJob::new(config, credentials, Arc::clone(&store) as Arc<dyn SnapshotStore>) {
        Ok(job) => job,
        Err(e) => fatal!("Cannot reach the registry: {e:?}"),
    };
    match job.refresh_once().await {
        Ok(count) => info!("Fetched {count} debris objects into {}.", store.path().display()),
        Err(e) => {
            error!("Fetch failed: {e:?}");
            return;
        }
    }
    let Some(snapshot) = store.current().await else { return };
    println!("\n--- Sample of Fetched Debris Data ---");
    for (i, record) in snapshot.records().iter().take(SAMPLE_SIZE).enumerate() {
        println!("\nObject #{}: {} (NORAD ID: {})", i + 1, record.display_name(), record.catalog_id());
        println!("  L1: {}", record.line1());
        println!("  L2: {}", record.line2());
    }
}
