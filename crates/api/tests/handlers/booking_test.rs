use axum::http::StatusCode;
use chrono::Duration;
use pretty_assertions::assert_eq;
use salonbook_core::models::actor::Role;
use salonbook_core::models::booking::{Booking, BookingStatus};
use salonbook_core::models::schedule::TimeSlot;
use salonbook_db::SalonStore;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{as_user, TestContext};

async fn setup() -> (TestContext, Vec<TimeSlot>) {
    let ctx = TestContext::new().await;
    ctx.backfill().await;
    let slots = ctx.slots_on(ctx.tomorrow()).await;
    (ctx, slots)
}

async fn book(ctx: &TestContext, slots: &[&TimeSlot]) -> axum_test::TestResponse {
    let slot_ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
    as_user(ctx.server.post("/api/bookings"), ctx.customer.user_id, Role::Customer)
        .json(&json!({
            "stylist_id": ctx.stylist.id,
            "salon_id": ctx.salon_id,
            "slot_ids": slot_ids,
            "service_ids": [ctx.service.id],
        }))
        .await
}

async fn set_status(ctx: &TestContext, booking_id: Uuid, user: Uuid, role: Role, status: &str) -> axum_test::TestResponse {
    as_user(
        ctx.server.put(&format!("/api/bookings/{}/status", booking_id)),
        user,
        role,
    )
    .json(&json!({ "status": status }))
    .await
}

async fn is_booked(ctx: &TestContext, slot: &TimeSlot) -> bool {
    ctx.store.get_slot(slot.id).await.map(|s| s.is_booked).unwrap_or(false)
}

#[tokio::test]
async fn test_create_booking_reserves_slots() {
    let (ctx, slots) = setup().await;

    let response = book(&ctx, &[&slots[0], &slots[1]]).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let booking: Booking = response.json();
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, 120_000);
    assert!(is_booked(&ctx, &slots[0]).await);
    assert!(is_booked(&ctx, &slots[1]).await);
}

#[tokio::test]
async fn test_overlapping_reservation_conflicts_and_holds_nothing() {
    let (ctx, slots) = setup().await;
    let first = book(&ctx, &[&slots[0], &slots[1]]).await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = book(&ctx, &[&slots[1], &slots[2]]).await;

    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    let body: serde_json::Value = second.json();
    assert!(body["error"].as_str().unwrap().contains("refresh availability"));
    assert!(is_booked(&ctx, &slots[0]).await);
    assert!(is_booked(&ctx, &slots[1]).await);
    assert!(!is_booked(&ctx, &slots[2]).await);
}

#[tokio::test]
async fn test_empty_slot_list_is_invalid() {
    let (ctx, _) = setup().await;

    let response = book(&ctx, &[]).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_started_slot_cannot_be_booked() {
    let (ctx, _) = setup().await;
    let today_slots = ctx.slots_on(crate::test_utils::today()).await;
    ctx.clock.advance(Duration::hours(3));

    // 09:00 UTC: the 08:00 slot has started
    let response = book(&ctx, &[&today_slots[0]]).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_service_of_another_salon_is_invalid() {
    let (ctx, slots) = setup().await;
    let foreign = ctx.store.add_service(Uuid::new_v4(), 50_000).await;

    let response = as_user(ctx.server.post("/api/bookings"), ctx.customer.user_id, Role::Customer)
        .json(&json!({
            "stylist_id": ctx.stylist.id,
            "salon_id": ctx.salon_id,
            "slot_ids": [slots[0].id],
            "service_ids": [foreign.id],
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!is_booked(&ctx, &slots[0]).await);
}

#[tokio::test]
async fn test_stylist_cannot_create_bookings() {
    let (ctx, slots) = setup().await;

    let response = as_user(ctx.server.post("/api/bookings"), ctx.stylist.user_id, Role::Stylist)
        .json(&json!({
            "stylist_id": ctx.stylist.id,
            "salon_id": ctx.salon_id,
            "slot_ids": [slots[0].id],
            "service_ids": [ctx.service.id],
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customer_cancel_releases_slots() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[4], &slots[5]]).await.json();

    let response = as_user(
        ctx.server.post(&format!("/api/bookings/{}/cancel", booking.id)),
        ctx.customer.user_id,
        Role::Customer,
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let cancelled: Booking = response.json();
    assert_eq!(cancelled.status, BookingStatus::CancelledEarly);
    assert!(!is_booked(&ctx, &slots[4]).await);
    assert!(!is_booked(&ctx, &slots[5]).await);

    // Released slots can be booked again
    assert_eq!(book(&ctx, &[&slots[4]]).await.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_terminal_booking_cannot_change() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();
    let cancel = as_user(
        ctx.server.post(&format!("/api/bookings/{}/cancel", booking.id)),
        ctx.customer.user_id,
        Role::Customer,
    )
    .await;
    assert_eq!(cancel.status_code(), StatusCode::OK);

    let response = set_status(&ctx, booking.id, ctx.manager, Role::Manager, "CONFIRMED").await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let stored = ctx.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CancelledEarly);
}

#[tokio::test]
async fn test_staff_confirm_then_complete_updates_loyalty() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();

    let confirmed = set_status(&ctx, booking.id, ctx.stylist.user_id, Role::Stylist, "CONFIRMED").await;
    assert_eq!(confirmed.status_code(), StatusCode::OK);
    let completed = set_status(&ctx, booking.id, ctx.manager, Role::Manager, "COMPLETED").await;
    assert_eq!(completed.status_code(), StatusCode::OK);

    let customer = ctx.store.get_customer(ctx.customer.id).await.unwrap().unwrap();
    assert_eq!(customer.total_completed, 1);
    assert_eq!(customer.total_spending, 120_000);
    assert!(is_booked(&ctx, &slots[0]).await, "completed bookings keep their slots");
}

#[tokio::test]
async fn test_pending_booking_cannot_complete() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();

    let response = set_status(&ctx, booking.id, ctx.manager, Role::Manager, "COMPLETED").await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_day_off_cancellation_by_staff_releases_without_penalty() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();

    let response = set_status(&ctx, booking.id, ctx.stylist.user_id, Role::Stylist, "CANCELLED_DAYOFF").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!is_booked(&ctx, &slots[0]).await);
    let customer = ctx.store.get_customer(ctx.customer.id).await.unwrap().unwrap();
    assert_eq!(customer.total_cancelled, 0);
}

#[tokio::test]
async fn test_manager_of_another_salon_is_forbidden() {
    let (ctx, slots) = setup().await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();
    let outsider = ctx.store.add_manager(Uuid::new_v4()).await;

    let response = set_status(&ctx, booking.id, outsider, Role::Manager, "CONFIRMED").await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_customer_reaching_suspension_gap_is_locked_out() {
    let (ctx, slots) = setup().await;
    ctx.store.set_customer_counters(ctx.customer.id, 0, 9).await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();

    set_status(&ctx, booking.id, ctx.manager, Role::Manager, "CONFIRMED").await;
    let completed = set_status(&ctx, booking.id, ctx.manager, Role::Manager, "COMPLETED").await;
    assert_eq!(completed.status_code(), StatusCode::OK);

    let customer = ctx.store.get_customer(ctx.customer.id).await.unwrap().unwrap();
    assert!(!customer.is_active);
    assert_eq!(book(&ctx, &[&slots[1]]).await.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_late_cancellation_below_gap_keeps_customer_active() {
    let (ctx, slots) = setup().await;
    ctx.store.set_customer_counters(ctx.customer.id, 14, 5).await;
    let booking: Booking = book(&ctx, &[&slots[0]]).await.json();
    // One hour before the 08:00 slot tomorrow
    ctx.clock.advance(Duration::hours(25));

    let response = as_user(
        ctx.server.post(&format!("/api/bookings/{}/cancel", booking.id)),
        ctx.customer.user_id,
        Role::Customer,
    )
    .await;

    let cancelled: Booking = response.json();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let customer = ctx.store.get_customer(ctx.customer.id).await.unwrap().unwrap();
    assert_eq!(customer.total_cancelled, 15);
    assert!(customer.is_active);
}
