use std::time::Duration;

use requester_core::models::{RequestRecord, UnassignedRequest};
use requester_dispatcher::DispatchStatistics;
use requester_testing_utils::{PendingRequestBuilder, TeamRecordBuilder};

fn record(id: u64, team_id: u64) -> RequestRecord {
    RequestRecord {
        id,
        generator_id: 1,
        team_id,
        priority: 1,
        time_in_cleaner: 1.0,
        time_in_buffer: 0.5,
    }
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_is_zero_until_finalized() {
    let mut stats = DispatchStatistics::new();
    tokio::time::advance(Duration::from_secs(2)).await;

    assert!(!stats.is_finalized());
    assert_eq!(stats.elapsed(), Duration::ZERO);

    let elapsed = stats.finalize();
    assert_eq!(elapsed, Duration::from_secs(2));
    assert_eq!(stats.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_finalize_only_takes_effect_once() {
    let mut stats = DispatchStatistics::new();
    tokio::time::advance(Duration::from_secs(1)).await;
    let first = stats.finalize();

    tokio::time::advance(Duration::from_secs(5)).await;
    let second = stats.finalize();

    assert_eq!(first, second);
    assert_eq!(stats.elapsed(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_records_keep_assignment_order() {
    let mut stats = DispatchStatistics::new();
    stats.record_assignment(record(3, 7));
    stats.record_assignment(record(1, 9));
    stats.record_assignment(record(2, 7));

    let ids: Vec<u64> = stats.requests().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[tokio::test]
async fn test_team_snapshot_replaces_previous() {
    let mut stats = DispatchStatistics::new();
    stats.set_team_snapshot(vec![TeamRecordBuilder::new(1).build()]);
    stats.set_team_snapshot(vec![
        TeamRecordBuilder::new(7).with_total_busy_time(3.0).build(),
        TeamRecordBuilder::new(9).build(),
    ]);

    assert_eq!(stats.teams().len(), 2);
    assert_eq!(stats.teams()[0].id, 7);
}

#[tokio::test]
async fn test_unassigned_requests_are_tracked_separately() {
    let mut stats = DispatchStatistics::new();
    let pending = PendingRequestBuilder::new().with_id(5).build();
    stats.record_unassigned(UnassignedRequest::new(&pending, vec![7, 9]));

    assert!(stats.requests().is_empty());
    assert_eq!(stats.unassigned().len(), 1);
    assert_eq!(stats.unassigned()[0].attempted_teams, vec![7, 9]);
}
