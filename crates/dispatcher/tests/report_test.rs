use std::time::Duration;

use requester_core::{
    models::{RequestRecord, UnassignedRequest},
    ReportFormat, RequesterError,
};
use requester_dispatcher::{write_report, DispatchStatistics, StatisticsReport};
use requester_testing_utils::{PendingRequestBuilder, TeamRecordBuilder};
use tempfile::TempDir;

async fn finished_statistics() -> DispatchStatistics {
    let mut stats = DispatchStatistics::new();
    stats.record_assignment(RequestRecord {
        id: 1,
        generator_id: 2,
        team_id: 7,
        priority: 5,
        time_in_cleaner: 2.0,
        time_in_buffer: 1.25,
    });
    stats.record_assignment(RequestRecord {
        id: 2,
        generator_id: 3,
        team_id: 9,
        priority: 1,
        time_in_cleaner: 4.5,
        time_in_buffer: 0.0,
    });
    let pending = PendingRequestBuilder::new().with_id(3).build();
    stats.record_unassigned(UnassignedRequest::new(&pending, vec![7, 9]));

    tokio::time::advance(Duration::from_secs(10)).await;
    stats.finalize();

    stats.set_team_snapshot(vec![
        TeamRecordBuilder::new(7)
            .with_speed(2)
            .with_processed_requests(1)
            .with_total_busy_time(2.5)
            .build(),
        TeamRecordBuilder::new(9)
            .with_speed(1)
            .with_processed_requests(1)
            .with_total_busy_time(10.0)
            .build(),
    ]);
    stats
}

#[tokio::test(start_paused = true)]
async fn test_build_computes_team_load() {
    let stats = finished_statistics().await;
    let report = StatisticsReport::build(&stats);

    assert_eq!(report.elapsed_seconds, 10.0);
    assert_eq!(report.teams.len(), 2);
    assert_eq!(report.teams[0].load_percent, 25.0);
    assert_eq!(report.teams[1].load_percent, 100.0);

    let ids: Vec<u64> = report.requests.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(report.unassigned.len(), 1);
}

#[tokio::test]
async fn test_load_is_zero_when_nothing_elapsed() {
    let mut stats = DispatchStatistics::new();
    stats.set_team_snapshot(vec![TeamRecordBuilder::new(1).with_total_busy_time(4.0).build()]);

    let report = StatisticsReport::build(&stats);
    assert_eq!(report.teams[0].load_percent, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_write_text_report() {
    let stats = finished_statistics().await;
    let report = StatisticsReport::build(&stats);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("statistics.txt");
    write_report(&report, &path, ReportFormat::Text).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(content.contains("Team Statistics"));
    assert!(content.contains("Request Statistics"));
    assert!(content.contains("Unassigned Requests"));
    assert!(content.contains("2.50sec"));
    assert!(content.contains("25.00"));
    assert!(content.contains("1.25sec"));
    assert!(content.contains("7, 9"));
}

#[tokio::test(start_paused = true)]
async fn test_write_json_report() {
    let stats = finished_statistics().await;
    let report = StatisticsReport::build(&stats);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("statistics.json");
    write_report(&report, &path, ReportFormat::Json).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed: StatisticsReport = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.teams, report.teams);
    assert_eq!(parsed.requests, report.requests);
}

#[tokio::test]
async fn test_write_to_unwritable_path_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    tokio::fs::write(&blocker, "not a directory").await.unwrap();

    let report = StatisticsReport::build(&DispatchStatistics::new());
    let result = write_report(&report, &blocker.join("statistics.txt"), ReportFormat::Text).await;
    assert!(matches!(result, Err(RequesterError::Io(_))));
}
