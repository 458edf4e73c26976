use super::refresh_job::{RefreshError, RefreshJob};
use crate::catalog::{
    CatalogSnapshot, OrbitalElementRecord, SnapshotStore, store::MemorySnapshotStore,
};
use crate::config::{Credentials, ServiceConfig};
use crate::http_handler::{common::HTTPError, http_response::response_common::ResponseError};
use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;

const CATALOG_BODY: &str = r#"[
    {"OBJECT_NAME": "COSMOS 2251 DEB", "NORAD_CAT_ID": "34454",
     "TLE_LINE1": "1 49863U 93036BX  24290.50000000  .00001234  00000-0  56789-4 0  9992",
     "TLE_LINE2": "2 49863  97.9500 120.0000 0010000  90.0000 270.0000 15.21000000123458"},
    {"OBJECT_NAME": null, "NORAD_CAT_ID": "25544",
     "TLE_LINE1": "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927",
     "TLE_LINE2": "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537"}

]"#;

/// One usable entry between two the registry delivered without element lines or id.
const PARTIAL_CATALOG_BODY: &str = r#"[
    {"OBJECT_NAME": "NO ELEMENTS", "NORAD_CAT_ID": "90001", "TLE_LINE1": null, "TLE_LINE2": null},
    {"OBJECT_NAME": "COSMOS 2251 DEB", "NORAD_CAT_ID": "34454",
     "TLE_LINE1": "1 49863U 93036BX  24290.50000000  .00001234  00000-0  56789-4 0  9992",
     "TLE_LINE2": "2 49863  97.9500 120.0000 0010000  90.0000 270.0000 15.21000000123458"},
    {"OBJECT_NAME": "NO ID", "NORAD_CAT_ID": null,
     "TLE_LINE1": "1 49863U 93036BX  24290.50000000  .00001234  00000-0  56789-4 0  9992",
     "TLE_LINE2": "2 49863  97.9500 120.0000 0010000  90.0000 270.0000 15.21000000123458"}
]"#;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoginMode {
    Accept,
    /// `200 OK` with a failure marker in the body.
    RejectInBody,
    Forbidden,
}

#[derive(Clone)]
struct MockRegistry {
    login_mode: LoginMode,
    catalog_status: StatusCode,
    catalog_body: &'static str,
    logins: Arc<AtomicUsize>,
    queries: Arc<AtomicUsize>,
}

impl MockRegistry {
    fn new(login_mode: LoginMode) -> Self {
        Self {
            login_mode,
            catalog_status: StatusCode::OK,
            catalog_body: CATALOG_BODY,
            logins: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_catalog(mut self, status: StatusCode, body: &'static str) -> Self {
        self.catalog_status = status;
        self.catalog_body = body;
        self
    }

    /// Serves the registry on an ephemeral local port and returns its base URL.
    async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/ajaxauth/login", post(login))
            .fallback(catalog)
            .with_state(self.clone());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }
}

async fn login(
    State(mock): State<MockRegistry>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    mock.logins.fetch_add(1, Ordering::SeqCst);
    let known = form.get("identity").map(String::as_str) == Some("ops")
        && form.get("password").map(String::as_str) == Some("secret");
    match mock.login_mode {
        LoginMode::Accept if known => (
            StatusCode::OK,
            [(header::SET_COOKIE, "chocolatechip=session; Path=/")],
            "\"\"",
        ),
        LoginMode::Forbidden => {
            (StatusCode::FORBIDDEN, [(header::SET_COOKIE, "chocolatechip=; Path=/")], "")
        }
        _ => (
            StatusCode::OK,
            [(header::SET_COOKIE, "chocolatechip=; Path=/")],
            r#"{"Login":"Failed"}"#,
        ),
    }
}

async fn catalog(State(mock): State<MockRegistry>) -> (StatusCode, &'static str) {
    mock.queries.fetch_add(1, Ordering::SeqCst);
    (mock.catalog_status, mock.catalog_body)
}

fn credentials() -> Credentials { Credentials::new("ops", "secret") }

fn previous_snapshot() -> CatalogSnapshot {
    CatalogSnapshot::new(
        chrono::Utc::now(),
        vec![OrbitalElementRecord::new(
            7,
            Some("PREVIOUS".to_string()),
            "1 49863U 93036BX  24290.50000000  .00001234  00000-0  56789-4 0  9992",
            "2 49863  97.9500 120.0000 0010000  90.0000 270.0000 15.21000000123458",
        )],
    )
}

fn job_against(url: &str, credentials: Credentials, store: &Arc<MemorySnapshotStore>) -> RefreshJob {
    let config = ServiceConfig::default().with_registry_url(url);
    RefreshJob::new(&config, credentials, store.clone()).unwrap()
}

#[tokio::test]
async fn test_refresh_replaces_snapshot() {
    let registry = MockRegistry::new(LoginMode::Accept);
    let url = registry.spawn().await;
    let store = Arc::new(MemorySnapshotStore::with_snapshot(previous_snapshot()));

    let count = job_against(&url, credentials(), &store).refresh_once().await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(registry.logins.load(Ordering::SeqCst), 1);
    assert_eq!(registry.queries.load(Ordering::SeqCst), 1);

    let snapshot = store.current().await.unwrap();
    let ids = snapshot.records().iter().map(OrbitalElementRecord::catalog_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![34454, 25544]);
    assert_eq!(snapshot.records()[0].display_name(), "COSMOS 2251 DEB");
    assert_eq!(snapshot.records()[1].object_name(), None);
}

#[tokio::test]
async fn test_broken_catalog_entries_do_not_discard_refresh() {
    let registry =
        MockRegistry::new(LoginMode::Accept).with_catalog(StatusCode::OK, PARTIAL_CATALOG_BODY);
    let url = registry.spawn().await;
    let store = Arc::new(MemorySnapshotStore::with_snapshot(previous_snapshot()));

    let count = job_against(&url, credentials(), &store).refresh_once().await.unwrap();
    assert_eq!(count, 1);
    let snapshot = store.current().await.unwrap();
    assert_eq!(snapshot.records()[0].catalog_id(), 34454);
    assert_eq!(snapshot.records()[0].display_name(), "COSMOS 2251 DEB");
}

#[tokio::test]
async fn test_rejected_login_keeps_snapshot() {
    for mode in [LoginMode::RejectInBody, LoginMode::Forbidden] {
        let registry = MockRegistry::new(mode);
        let url = registry.spawn().await;
        let store = Arc::new(MemorySnapshotStore::with_snapshot(previous_snapshot()));
        let before = store.current().await.unwrap();

        let result = job_against(&url, credentials(), &store).refresh_once().await;
        assert!(matches!(result, Err(RefreshError::Auth)), "{result:?}");
        assert_eq!(registry.queries.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&before, &store.current().await.unwrap()));
    }
}

#[tokio::test]
async fn test_wrong_credentials_are_auth_errors() {
    let registry = MockRegistry::new(LoginMode::Accept);
    let url = registry.spawn().await;
    let store = Arc::new(MemorySnapshotStore::new());
    let result =
        job_against(&url, Credentials::new("ops", "guess"), &store).refresh_once().await;
    assert!(matches!(result, Err(RefreshError::Auth)));
    assert!(store.current().await.is_none());
}

#[tokio::test]
async fn test_registry_errors_keep_snapshot() {
    let failing = [
        MockRegistry::new(LoginMode::Accept).with_catalog(StatusCode::INTERNAL_SERVER_ERROR, ""),
        MockRegistry::new(LoginMode::Accept).with_catalog(StatusCode::OK, "[{\"NORAD_CAT_ID\":"),
        MockRegistry::new(LoginMode::Accept).with_catalog(StatusCode::NOT_FOUND, "[]"),
    ];
    for registry in failing {
        let url = registry.spawn().await;
        let store = Arc::new(MemorySnapshotStore::with_snapshot(previous_snapshot()));
        let before = store.current().await.unwrap();

        let result = job_against(&url, credentials(), &store).refresh_once().await;
        assert!(
            matches!(result, Err(RefreshError::Transport(HTTPError::HTTPResponseError(_)))),
            "{result:?}"
        );
        assert!(Arc::ptr_eq(&before, &store.current().await.unwrap()));
    }
}

#[tokio::test]
async fn test_malformed_catalog_is_decode_error() {
    let registry =
        MockRegistry::new(LoginMode::Accept).with_catalog(StatusCode::OK, "{\"error\":\"none\"}");
    let url = registry.spawn().await;
    let store = Arc::new(MemorySnapshotStore::new());
    let result = job_against(&url, credentials(), &store).refresh_once().await;
    assert!(matches!(
        result,
        Err(RefreshError::Transport(HTTPError::HTTPResponseError(ResponseError::Decode)))
    ));
}

#[tokio::test]
async fn test_unreachable_registry_keeps_snapshot() {
    // bind and drop to get a local port nobody listens on
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let store = Arc::new(MemorySnapshotStore::with_snapshot(previous_snapshot()));
    let result = job_against(&format!("http://127.0.0.1:{port}"), credentials(), &store)
        .refresh_once()
        .await;
    assert!(matches!(result, Err(RefreshError::Transport(_))), "{result:?}");
    assert_eq!(store.current().await.unwrap().records()[0].display_name(), "PREVIOUS");
}

#[tokio::test]
async fn test_run_refreshes_immediately_and_stops() {
    let registry = MockRegistry::new(LoginMode::Accept);
    let url = registry.spawn().await;
    let store = Arc::new(MemorySnapshotStore::new());
    let job = job_against(&url, credentials(), &store);
    assert_eq!(job.interval(), Duration::from_secs(4 * 3600));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(job.run(shutdown.clone()));
    tokio::time::timeout(Duration::from_secs(10), async {
        while store.current().await.is_none() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(store.current().await.unwrap().len(), 2);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert_eq!(registry.logins.load(Ordering::SeqCst), 1);
}
