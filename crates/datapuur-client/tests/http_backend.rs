//! Job and admin stores against a live in-process HTTP backend.
//!
//! A small axum app stands in for the web tier so the HTTP clients, the
//! bearer token plumbing and the error mapping are exercised end to end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{Value, json};

use datapuur_client::{
    AdminStore, ApiConfig, ClientError, ClientStorage, HttpAdminApi, HttpJobsApi, JobId,
    JobStatus, JobStore, JobType, ManualClock, NewUser, RecordingNotifier, RestClient,
    StartJobOptions, StaticToken, StorageSnapshotStore,
};

#[derive(Default)]
struct Backend {
    jobs: Mutex<Vec<Value>>,
    next_id: Mutex<u32>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-token")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication required"})),
    )
        .into_response()
}

async fn list_jobs(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let jobs = backend.jobs.lock().unwrap().clone();
    Json(Value::Array(jobs)).into_response()
}

async fn create_job(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["schema_id"] == "locked" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Schema is locked"})),
        )
            .into_response();
    }

    let id = {
        let mut next = backend.next_id.lock().unwrap();
        *next += 1;
        format!("job-{next}")
    };
    let job = json!({
        "id": id,
        "schema_id": body["schema_id"],
        "type": body["job_type"],
        "status": "running",
        "progress": 5,
        "message": null,
        "created_at": "2026-10-19T10:00:00",
        "updated_at": "2026-10-19T10:00:00",
    });
    backend.jobs.lock().unwrap().push(job.clone());
    Json(job).into_response()
}

async fn cancel_job(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut jobs = backend.jobs.lock().unwrap();
    let Some(job) = jobs.iter_mut().find(|j| j["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))).into_response();
    };
    job["status"] = json!("cancelled");
    StatusCode::NO_CONTENT.into_response()
}

async fn create_user(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["username"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Username already registered"})),
        )
            .into_response();
    }
    Json(json!({
        "id": 7,
        "username": body["username"],
        "email": body["email"],
        "role": body["role"],
    }))
    .into_response()
}

async fn spawn_backend() -> (SocketAddr, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/processing-jobs", get(list_jobs).post(create_job))
        .route("/api/processing-jobs/{id}", delete(cancel_job))
        .route("/api/admin/users", axum::routing::post(create_user))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

fn rest(addr: SocketAddr, token: &str) -> RestClient {
    RestClient::new(
        ApiConfig::new(format!("http://{addr}")),
        Arc::new(StaticToken(token.to_string())),
    )
    .unwrap()
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        "2026-10-19T10:00:01Z".parse().unwrap(),
    ))
}

#[tokio::test]
async fn test_start_refresh_and_cancel_over_http() {
    let (addr, backend) = spawn_backend().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(JobStore::new(
        Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
        clock(),
        notifier.clone(),
    ));

    let job = store
        .start_job("42", StartJobOptions::new(JobType::CleanData))
        .await
        .unwrap()
        .expect("job should start");
    assert_eq!(job.id, JobId::new("job-1"));
    assert_eq!(job.job_type, JobType::CleanData);
    assert_eq!(job.message, "");
    assert!(store.is_polling());

    store.cancel_job(&job.id).await.unwrap();
    assert_eq!(
        backend.jobs.lock().unwrap()[0]["status"],
        json!("cancelled")
    );
    assert_eq!(
        store.get(&job.id).await.unwrap().status,
        JobStatus::Cancelled
    );
    assert!(notifier.titles().contains(&"Job cancelled".to_string()));
    store.stop_polling();
}

#[tokio::test]
async fn test_backend_detail_reaches_the_notice() {
    let (addr, _) = spawn_backend().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(JobStore::new(
        Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
        clock(),
        notifier.clone(),
    ));

    let err = store
        .start_load_data_job("locked")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 409, .. }));
    assert!(store.jobs().await.is_empty());

    let last = notifier.notices().pop().unwrap();
    assert_eq!(last.title, "Failed to start job");
    assert_eq!(last.message, "Schema is locked");
}

#[tokio::test]
async fn test_cancel_job_the_backend_forgot() {
    let (addr, backend) = spawn_backend().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(JobStore::new(
        Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
        clock(),
        notifier.clone(),
    ));

    let job = store
        .start_job("42", StartJobOptions::new(JobType::Transform))
        .await
        .unwrap()
        .unwrap();
    store.stop_polling();
    backend.jobs.lock().unwrap().clear();

    store.cancel_job(&job.id).await.unwrap();
    assert!(store.get(&job.id).await.is_none());
    assert_eq!(notifier.titles().last().unwrap(), "Job Removed");
}

#[tokio::test]
async fn test_refresh_skips_bad_records_and_cancel_encodes_id() {
    let (addr, backend) = spawn_backend().await;
    {
        let mut jobs = backend.jobs.lock().unwrap();
        jobs.push(json!({"id": "broken", "status": "exploded"}));
        jobs.push(json!({
            "id": "../admin/users/5",
            "resource_id": 12,
            "type": "ingestion",
            "status": "running",
            "progress": 40,
            "created_at": "2026-10-19T10:00:00",
            "updated_at": "2026-10-19T10:00:00",
        }));
    }
    let store = Arc::new(JobStore::new(
        Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
        clock(),
        Arc::new(RecordingNotifier::new()),
    ));

    store.refresh_jobs().await.unwrap();
    let jobs = store.jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].schema_id, "12");
    assert_eq!(jobs[0].job_type, JobType::Ingestion);

    // The id travels as one path segment and lands on the jobs item route.
    store.cancel_job(&jobs[0].id).await.unwrap();
    assert_eq!(
        backend.jobs.lock().unwrap()[1]["status"],
        json!("cancelled")
    );
    store.stop_polling();
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let (addr, _) = spawn_backend().await;
    let store = Arc::new(JobStore::new(
        Arc::new(HttpJobsApi::new(rest(addr, "stale"))),
        clock(),
        Arc::new(RecordingNotifier::new()),
    ));

    let err = store.refresh_jobs().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(msg) if msg == "Authentication required"));
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let (addr, _) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let storage = Arc::new(ClientStorage::open(&path).await.unwrap());
        let store = Arc::new(
            JobStore::new(
                Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
                clock(),
                Arc::new(RecordingNotifier::new()),
            )
            .with_snapshots(Arc::new(StorageSnapshotStore::new(storage))),
        );
        store.start_graph_job("9", json!({"depth": 2})).await.unwrap();
        store.stop_polling();
    }

    let storage = Arc::new(ClientStorage::open(&path).await.unwrap());
    let store = Arc::new(
        JobStore::new(
            Arc::new(HttpJobsApi::new(rest(addr, "test-token"))),
            clock(),
            Arc::new(RecordingNotifier::new()),
        )
        .with_snapshots(Arc::new(StorageSnapshotStore::new(storage))),
    );
    assert_eq!(store.restore().await.unwrap(), 1);
    assert_eq!(store.jobs().await[0].job_type, JobType::GenerateGraph);
    assert!(store.is_polling());
    store.stop_polling();
}

#[tokio::test]
async fn test_admin_create_user_over_http() {
    let (addr, _) = spawn_backend().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let admin = AdminStore::new(
        Arc::new(HttpAdminApi::new(rest(addr, "test-token"))),
        notifier.clone(),
    );

    let user = admin
        .create_user(NewUser {
            username: "grace".into(),
            email: "grace@example.com".into(),
            password: "Hopper#1952".into(),
            role: "Analyst".into(),
        })
        .await
        .unwrap();
    assert_eq!(user.id, 7);
    assert!(user.is_active);

    let err = admin
        .create_user(NewUser {
            username: "taken".into(),
            email: "t@example.com".into(),
            password: "Hopper#1952".into(),
            role: "Analyst".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Username already registered");
    assert_eq!(admin.users().await.len(), 1);
}
