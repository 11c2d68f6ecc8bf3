use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

use requester_api::create_app;
use requester_core::{DispatcherConfig, ReportConfig, ReportFormat, RetryConfig};
use requester_dispatcher::{DispatchOutcome, DispatchStatus, DispatcherService};
use requester_testing_utils::{
    pending_requests, MockAssignmentClient, MockGeneratorTrigger, MockRequestSource,
    MockTeamDirectory, TeamRecordBuilder, TestEnv,
};
use tempfile::TempDir;

struct TestApp {
    router: Router,
    dispatcher: Arc<DispatcherService>,
    teams: MockTeamDirectory,
    report_dir: TempDir,
    shutdown_tx: broadcast::Sender<()>,
}

fn test_app(teams: Vec<u64>, requests: usize) -> TestApp {
    let team_directory = MockTeamDirectory::with_teams(teams);
    let source = MockRequestSource::with_requests(pending_requests(1, requests));
    let report_dir = TempDir::new().unwrap();

    let config = DispatcherConfig {
        startup_delay_ms: 0,
        iteration_interval_ms: 0,
        idle_wait_ms: 10,
        retry: RetryConfig::fixed(10),
    };
    let report = ReportConfig {
        output_path: report_dir.path().join("statistics.json"),
        format: ReportFormat::Json,
    };

    let dispatcher = Arc::new(DispatcherService::new(
        Arc::new(team_directory.clone()),
        Arc::new(source),
        Arc::new(MockAssignmentClient::new()),
        Arc::new(MockGeneratorTrigger::new()),
        &config,
        report,
    ));
    let (shutdown_tx, _) = broadcast::channel(1);

    TestApp {
        router: create_app(dispatcher.clone(), shutdown_tx.clone()),
        dispatcher,
        teams: team_directory,
        report_dir,
        shutdown_tx,
    }
}

async fn call(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn wait_until_finished(dispatcher: &DispatcherService) -> bool {
    TestEnv::wait_for(
        || async move { matches!(dispatcher.status().await, DispatchStatus::Finished { .. }) },
        Duration::from_secs(5),
    )
    .await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(vec![7], 0);
    let (status, body) = call(&app.router, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "requester");
}

#[tokio::test]
async fn test_status_is_idle_before_launch() {
    let app = test_app(vec![7], 0);
    let (status, body) = call(&app.router, "GET", "/api/v1/dispatcher/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["phase"], "idle");
}

#[tokio::test]
async fn test_launch_then_conflict_then_stop() {
    // 没有空闲清洁队，调度会一直等待直到被停止
    let app = test_app(vec![], 1);

    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/launch").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["data"]["run_id"].is_string());

    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/launch").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "DISPATCH_IN_PROGRESS");

    let (status, _) = call(&app.router, "POST", "/api/v1/dispatcher/report").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stopped"], true);

    assert!(wait_until_finished(&app.dispatcher).await);
    let (_, body) = call(&app.router, "GET", "/api/v1/dispatcher/status").await;
    assert_eq!(body["data"]["phase"], "finished");
    assert_eq!(body["data"]["outcome"], "cancelled");
}

#[tokio::test]
async fn test_report_before_any_run_is_conflict() {
    let app = test_app(vec![7], 0);
    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/report").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "NO_COMPLETED_RUN");
}

#[tokio::test]
async fn test_launch_and_report() {
    let app = test_app(vec![7], 3);
    app.teams.set_stats(vec![TeamRecordBuilder::new(7)
        .with_processed_requests(3)
        .with_total_busy_time(0.0)
        .build()]);

    let (status, _) = call(&app.router, "POST", "/api/v1/dispatcher/launch").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(wait_until_finished(&app.dispatcher).await);

    let (_, body) = call(&app.router, "GET", "/api/v1/dispatcher/status").await;
    assert_eq!(body["data"]["outcome"], "buffer_exhausted");
    assert_eq!(body["data"]["assigned"], 3);

    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["requests"], 3);
    assert_eq!(body["data"]["teams"], 1);
    assert_eq!(body["data"]["format"], "json");
    assert!(app.report_dir.path().join("statistics.json").exists());
}

#[tokio::test]
async fn test_report_stats_failure_is_bad_gateway() {
    let app = test_app(vec![7], 0);
    app.teams.fail_stats("cleaner unavailable");

    call(&app.router, "POST", "/api/v1/dispatcher/launch").await;
    assert!(wait_until_finished(&app.dispatcher).await);

    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/report").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], "UPSTREAM_ERROR");
    assert!(!app.report_dir.path().join("statistics.json").exists());
}

#[tokio::test]
async fn test_stop_without_run() {
    let app = test_app(vec![7], 0);
    let (status, body) = call(&app.router, "POST", "/api/v1/dispatcher/stop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stopped"], false);
}

#[tokio::test]
async fn test_process_shutdown_cancels_api_run() {
    let app = test_app(vec![], 1);
    call(&app.router, "POST", "/api/v1/dispatcher/launch").await;

    app.shutdown_tx.send(()).unwrap();
    assert!(wait_until_finished(&app.dispatcher).await);

    let summary = app.dispatcher.last_summary().await.unwrap();
    assert_eq!(summary.outcome, DispatchOutcome::Cancelled);
}
