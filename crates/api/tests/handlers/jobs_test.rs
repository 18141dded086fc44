use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use salonbook_api::handlers::jobs::RunJobResponse;
use salonbook_api::jobs::{horizon::HorizonAdvancer, retention::RetentionSweeper, DailyJob, JobReport};
use salonbook_core::config::SchedulingConfig;
use salonbook_core::errors::SalonError;
use salonbook_core::models::actor::Role;
use salonbook_core::models::booking::Booking;
use salonbook_core::models::directory::Stylist;
use salonbook_core::models::leave::LeaveRequest;
use salonbook_core::models::schedule::WorkSchedule;
use salonbook_db::SalonStore;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{as_user, today, MockStore, TestContext};

#[test_log::test(tokio::test)]
async fn test_advancing_twice_keeps_one_schedule() {
    let ctx = TestContext::new().await;
    let target = today() + Duration::days(6);

    let first = ctx.state.horizon.advance(target).await.unwrap();
    let second = ctx.state.horizon.advance(target).await.unwrap();

    assert_eq!(first.succeeded, 1);
    assert_eq!(first.slots, 40);
    assert_eq!(
        second,
        JobReport {
            skipped: 1,
            ..JobReport::default()
        }
    );
    let schedules = ctx.store.list_schedules(ctx.stylist.id, target, target).await.unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].slots.len(), 40);
}

#[test_log::test(tokio::test)]
async fn test_daily_run_targets_the_horizon_date() {
    let ctx = TestContext::new().await;

    let report = ctx.state.horizon.run(today()).await.unwrap();

    assert_eq!(report.succeeded, 1);
    let horizon = today() + Duration::days(6);
    assert!(ctx.store.find_schedule(ctx.stylist.id, horizon).await.unwrap().is_some());
    assert!(ctx.store.find_schedule(ctx.stylist.id, today()).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_backfill_covers_every_day() {
    let ctx = TestContext::new().await;
    let colleague = ctx.store.add_stylist(ctx.salon_id).await;

    let report = ctx
        .state
        .horizon
        .backfill(today(), today() + Duration::days(6))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 14);
    assert_eq!(report.slots, 14 * 40);
    let schedules = ctx
        .store
        .list_schedules(colleague.id, today(), today() + Duration::days(6))
        .await
        .unwrap();
    assert_eq!(schedules.len(), 7);
}

#[test_log::test(tokio::test)]
async fn test_approved_leave_becomes_day_off() {
    let ctx = TestContext::new().await;
    let leave_date = today() + Duration::days(6);
    let leave: LeaveRequest = as_user(ctx.server.post("/api/leaves"), ctx.stylist.user_id, Role::Stylist)
        .json(&json!({ "date": leave_date }))
        .await
        .json();
    let approved = as_user(
        ctx.server.put(&format!("/api/leaves/{}/resolve", leave.id)),
        ctx.manager,
        Role::Manager,
    )
    .json(&json!({ "status": "APPROVED" }))
    .await;
    assert_eq!(approved.status_code(), StatusCode::OK);

    ctx.state.horizon.run(today()).await.unwrap();

    let schedules = ctx
        .store
        .list_schedules(ctx.stylist.id, leave_date, leave_date)
        .await
        .unwrap();
    assert!(schedules[0].schedule.is_day_off);
    assert_eq!(schedules[0].slots.len(), 40);
    assert_eq!(schedules[0].bookable_slots().count(), 0);
}

#[test_log::test(tokio::test)]
async fn test_retention_removes_only_old_slots() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;
    let cutoff = today() + Duration::days(2);

    let report = ctx.state.retention.sweep(cutoff).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.slots, 80);
    assert!(ctx.slots_on(today()).await.is_empty());
    assert!(ctx.slots_on(today() + Duration::days(1)).await.is_empty());
    assert_eq!(ctx.slots_on(cutoff).await.len(), 40);
    // Schedule rows survive the sweep
    assert!(ctx.store.find_schedule(ctx.stylist.id, today()).await.unwrap().is_some());

    let again = ctx.state.retention.sweep(cutoff).await.unwrap();
    assert_eq!(again, JobReport::default());
}

#[test_log::test(tokio::test)]
async fn test_admin_can_trigger_jobs() {
    let ctx = TestContext::new().await;

    let response = as_user(
        ctx.server.post("/api/admin/jobs/horizon/run"),
        Uuid::new_v4(),
        Role::Admin,
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: RunJobResponse = response.json();
    assert_eq!(body.job, "horizon-advance");
    assert_eq!(body.today, today());
    assert_eq!(body.report.succeeded, 1);
}

#[test_log::test(tokio::test)]
async fn test_job_date_override() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;
    ctx.clock.set(Utc.with_ymd_and_hms(2025, 5, 20, 6, 0, 0).unwrap());

    // Cutoff for 2025-05-15 is 2025-03-16
    let response = as_user(
        ctx.server.post("/api/admin/jobs/retention/run"),
        Uuid::new_v4(),
        Role::Admin,
    )
    .add_query_param("date", "2025-05-15")
    .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: RunJobResponse = response.json();
    assert_eq!(body.report.succeeded, 2);
}

#[test_log::test(tokio::test)]
async fn test_retention_rejects_future_dates() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;

    let response = as_user(
        ctx.server.post("/api/admin/jobs/retention/run"),
        Uuid::new_v4(),
        Role::Admin,
    )
    .add_query_param("date", "2099-01-01")
    .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.slots_on(ctx.tomorrow()).await.len(), 40);
}

#[test_log::test(tokio::test)]
async fn test_retention_keeps_slots_of_live_bookings() {
    let ctx = TestContext::new().await;
    ctx.backfill().await;
    let slots = ctx.slots_on(ctx.tomorrow()).await;
    let booking: Booking = as_user(ctx.server.post("/api/bookings"), ctx.customer.user_id, Role::Customer)
        .json(&json!({
            "stylist_id": ctx.stylist.id,
            "salon_id": ctx.salon_id,
            "slot_ids": [slots[0].id],
            "service_ids": [ctx.service.id],
        }))
        .await
        .json();
    ctx.clock.set(Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap());

    let response = as_user(
        ctx.server.post("/api/admin/jobs/retention/run"),
        Uuid::new_v4(),
        Role::Admin,
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: RunJobResponse = response.json();
    assert_eq!(body.report.succeeded, 6);
    assert!(ctx.slots_on(today()).await.is_empty());
    assert_eq!(ctx.slots_on(ctx.tomorrow()).await.len(), 40);
    let stored = ctx.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.slot_ids, vec![slots[0].id]);
}

#[test_log::test(tokio::test)]
async fn test_only_admins_trigger_jobs() {
    let ctx = TestContext::new().await;

    let manager = as_user(ctx.server.post("/api/admin/jobs/horizon/run"), ctx.manager, Role::Manager).await;
    let stylist = as_user(
        ctx.server.post("/api/admin/jobs/retention/run"),
        ctx.stylist.user_id,
        Role::Stylist,
    )
    .await;

    assert_eq!(manager.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(stylist.status_code(), StatusCode::FORBIDDEN);
}

fn stylist() -> Stylist {
    Stylist {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        salon_id: Uuid::new_v4(),
        is_active: true,
    }
}

#[test_log::test(tokio::test)]
async fn test_failing_stylist_does_not_stop_the_run() {
    let broken = stylist();
    let healthy = stylist();
    let broken_id = broken.id;
    let stylists = vec![broken, healthy];

    let mut store = MockStore::new();
    store
        .expect_list_active_stylists()
        .returning(move || Ok(stylists.clone()));
    store.expect_find_schedule().returning(move |stylist_id, _| {
        if stylist_id == broken_id {
            Err(SalonError::Database(eyre::eyre!("connection reset")))
        } else {
            Ok(None)
        }
    });
    store.expect_has_approved_leave().returning(|_, _| Ok(false));
    store
        .expect_create_schedule()
        .times(1)
        .returning(|schedule, _| {
            Ok(Some(WorkSchedule {
                id: Uuid::new_v4(),
                stylist_id: schedule.stylist_id,
                working_date: schedule.working_date,
                morning_start: schedule.morning_start,
                morning_end: schedule.morning_end,
                afternoon_start: schedule.afternoon_start,
                afternoon_end: schedule.afternoon_end,
                is_day_off: schedule.is_day_off,
                created_at: chrono::Utc::now(),
            }))
        });

    let advancer = HorizonAdvancer::new(Arc::new(store), Arc::new(SchedulingConfig::default()));
    let report = advancer.advance(today()).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.slots, 40);
}

#[test_log::test(tokio::test)]
async fn test_failing_schedule_does_not_stop_the_sweep() {
    let broken = Uuid::new_v4();
    let healthy = Uuid::new_v4();

    let mut store = MockStore::new();
    store
        .expect_stale_schedule_ids()
        .returning(move |_| Ok(vec![broken, healthy]));
    store.expect_delete_schedule_slots().returning(move |id| {
        if id == broken {
            Err(SalonError::Database(eyre::eyre!("lock timeout")))
        } else {
            Ok(40)
        }
    });

    let sweeper = RetentionSweeper::new(Arc::new(store), Arc::new(SchedulingConfig::default()));
    let report = sweeper.sweep(today()).await.unwrap();

    assert_eq!(
        report,
        JobReport {
            succeeded: 1,
            skipped: 0,
            failed: 1,
            slots: 40,
        }
    );
}
