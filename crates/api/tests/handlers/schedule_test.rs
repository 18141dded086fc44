use axum::http::StatusCode;
use chrono::{Duration, Timelike};
use pretty_assertions::assert_eq;
use salonbook_core::config::SchedulingConfig;
use salonbook_core::models::leave::{LeaveStatus, NewLeaveRequest};
use salonbook_core::models::schedule::ScheduleResponse;
use salonbook_db::SalonStore;
use uuid::Uuid;

use crate::test_utils::{today, TestContext};

async fn get_schedules(ctx: &TestContext, stylist_id: Uuid, from: &str, to: &str) -> axum_test::TestResponse {
    ctx.server
        .get(&format!("/api/stylists/{}/schedules", stylist_id))
        .add_query_param("from", from)
        .add_query_param("to", to)
        .await
}

#[tokio::test]
async fn test_backfilled_week_is_listed_in_date_order() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;

    let response = get_schedules(&ctx, ctx.stylist.id, "2025-03-14", "2025-03-20").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let schedules: Vec<ScheduleResponse> = response.json();
    let dates: Vec<_> = schedules.iter().map(|s| s.working_date).collect();
    let expected: Vec<_> = (0..7).map(|d| today() + Duration::days(d)).collect();
    assert_eq!(dates, expected);
}

#[tokio::test]
async fn test_working_day_has_morning_and_afternoon_slots() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;

    let response = get_schedules(&ctx, ctx.stylist.id, "2025-03-15", "2025-03-15").await;
    let schedules: Vec<ScheduleResponse> = response.json();
    let slots = &schedules[0].slots;

    // 14 morning slots plus 26 afternoon slots
    assert_eq!(slots.len(), 40);
    assert_eq!(slots[13].end.time().hour(), 11);
    assert_eq!(slots[13].end.time().minute(), 30);
    assert_eq!(slots[14].start.time().hour(), 13);
    assert_eq!(slots[14].start.time().minute(), 30);
    assert!(slots.iter().all(|s| s.is_bookable));
    assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
}

#[tokio::test]
async fn test_day_off_schedule_reports_no_bookable_slots() {
    let ctx = TestContext::new().await;
    let day_off = today() + Duration::days(2);
    let leave = ctx
        .store
        .insert_leave_request(NewLeaveRequest {
            stylist_id: ctx.stylist.id,
            salon_id: ctx.salon_id,
            date: day_off,
            reason: None,
        })
        .await
        .unwrap();
    ctx.store
        .update_leave_status(leave.id, LeaveStatus::Pending, LeaveStatus::Approved)
        .await
        .unwrap();
    ctx.backfill().await;

    let response = get_schedules(&ctx, ctx.stylist.id, "2025-03-16", "2025-03-16").await;
    let schedules: Vec<ScheduleResponse> = response.json();

    assert!(schedules[0].is_day_off);
    assert!(schedules[0].slots.iter().all(|s| !s.is_bookable));
}

#[tokio::test]
async fn test_day_off_without_materialized_slots() {
    let config = SchedulingConfig {
        materialize_day_off_slots: false,
        ..SchedulingConfig::default()
    };
    let ctx = TestContext::with_config(config).await;
    let leave = ctx
        .store
        .insert_leave_request(NewLeaveRequest {
            stylist_id: ctx.stylist.id,
            salon_id: ctx.salon_id,
            date: today(),
            reason: None,
        })
        .await
        .unwrap();
    ctx.store
        .update_leave_status(leave.id, LeaveStatus::Pending, LeaveStatus::Approved)
        .await
        .unwrap();
    ctx.backfill().await;

    let response = get_schedules(&ctx, ctx.stylist.id, "2025-03-14", "2025-03-14").await;
    let schedules: Vec<ScheduleResponse> = response.json();

    assert!(schedules[0].is_day_off);
    assert!(schedules[0].slots.is_empty());
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let ctx = TestContext::new().await;

    let response = get_schedules(&ctx, ctx.stylist.id, "2025-03-20", "2025-03-14").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_stylist_is_not_found() {
    let ctx = TestContext::new().await;

    let response = get_schedules(&ctx, Uuid::new_v4(), "2025-03-14", "2025-03-20").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
