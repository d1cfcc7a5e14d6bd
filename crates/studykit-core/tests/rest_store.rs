//! RestStore against a mocked hosted backend.

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use mockito::Matcher;
use studykit_core::error::CoreError;
use studykit_core::storage::ActivityStore;
use studykit_core::timer::{Phase, SessionLogEntry};
use studykit_core::RestStore;

fn store(server: &mockito::Server) -> RestStore {
    RestStore::new(&server.url(), "anon-key", Duration::from_secs(5)).unwrap()
}

#[test]
fn fetch_xp_stats_reads_total() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::UrlEncoded("select".into(), "total_xp".into()))
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .with_header("content-type", "application/json")
        .with_body(r#"[{"total_xp": 460}]"#)
        .create();

    let stats = store(&server).fetch_xp_stats().unwrap();
    assert_eq!(stats.current_level, 4);
    assert_eq!(stats.xp_in_level, 10);
    mock.assert();
}

#[test]
fn empty_stats_mean_level_one() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_body("[]")
        .create();

    let stats = store(&server).fetch_xp_stats().unwrap();
    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.xp_for_next, 100);
}

#[test]
fn server_error_is_remote_fetch_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_status(500)
        .create();

    let err = store(&server).fetch_xp_stats().unwrap_err();
    assert!(matches!(err, CoreError::RemoteFetch { .. }));
}

#[test]
fn log_session_posts_row() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/rest/v1/study_sessions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "phase": "work",
            "duration_minutes": 25,
        })))
        .with_status(201)
        .create();

    let started = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    store(&server)
        .log_session(&SessionLogEntry {
            phase: Phase::Work,
            duration_minutes: 25,
            started_at: started,
            completed_at: started + chrono::Duration::minutes(25),
        })
        .unwrap();
    mock.assert();
}

#[test]
fn rejected_log_is_remote_log_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/rest/v1/study_sessions")
        .with_status(401)
        .create();

    let started = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let err = store(&server)
        .log_session(&SessionLogEntry {
            phase: Phase::ShortBreak,
            duration_minutes: 5,
            started_at: started,
            completed_at: started,
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::RemoteLog { .. }));
}

#[test]
fn fetch_activity_recomputes_levels() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/v1/daily_activity")
        .match_query(Matcher::Any)
        .with_body(r#"[{"date": "2024-01-10", "minutes_studied": 45, "level": 4}]"#)
        .create();

    let days = store(&server).fetch_activity().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(days[0].level, Some(2));
}

#[test]
fn add_xp_posts_event_and_refetches() {
    let mut server = mockito::Server::new();
    let before = server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_body(r#"[{"total_xp": 90}]"#)
        .expect(1)
        .create();
    let post = server
        .mock("POST", "/rest/v1/xp_events")
        .match_body(Matcher::PartialJson(serde_json::json!({"amount": 50})))
        .with_status(201)
        .create();

    // Once the first read is used up, the refetch sees the new total.
    let after = server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_body(r#"[{"total_xp": 140}]"#)
        .expect(1)
        .create();

    let update = store(&server).add_xp(50, "manual").unwrap();
    assert!(update.leveled_up);
    assert_eq!(update.stats.total_xp, 140);
    assert_eq!(update.awarded, 50);
    before.assert();
    post.assert();
    after.assert();
}

#[test]
fn add_xp_survives_failed_refetch() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_body(r#"[{"total_xp": 90}]"#)
        .expect(1)
        .create();
    let post = server
        .mock("POST", "/rest/v1/xp_events")
        .with_status(201)
        .create();
    server
        .mock("GET", "/rest/v1/user_stats")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let update = store(&server).add_xp(50, "pomodoro_work").unwrap();
    assert_eq!(update.awarded, 50);
    assert_eq!(update.stats.total_xp, 140);
    assert!(update.leveled_up);
    post.assert();
}

#[test]
fn record_study_minutes_adds_to_existing_day() {
    let mut server = mockito::Server::new();
    let read = server
        .mock("GET", "/rest/v1/daily_activity")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "date,minutes_studied".into()),
            Matcher::UrlEncoded("date".into(), "eq.2024-02-29".into()),
        ]))
        .with_body(r#"[{"date": "2024-02-29", "minutes_studied": 10}]"#)
        .create();
    let write = server
        .mock("POST", "/rest/v1/daily_activity")
        .match_header("prefer", Matcher::Regex("merge-duplicates".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "date": "2024-02-29",
            "minutes_studied": 25,
        })))
        .with_status(201)
        .create();

    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    store(&server).record_study_minutes(date, 15).unwrap();
    read.assert();
    write.assert();
}

#[test]
fn record_study_minutes_starts_new_day_from_zero() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/v1/daily_activity")
        .match_query(Matcher::Any)
        .with_body("[]")
        .create();
    let write = server
        .mock("POST", "/rest/v1/daily_activity")
        .match_body(Matcher::PartialJson(serde_json::json!({"minutes_studied": 10})))
        .with_status(201)
        .create();

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    store(&server).record_study_minutes(date, 10).unwrap();
    write.assert();
}
