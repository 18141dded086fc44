use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use salonbook_core::models::actor::Role;
use salonbook_core::models::leave::{LeaveRequest, LeaveStatus};
use salonbook_db::SalonStore;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{as_user, TestContext};

async fn request_leave(ctx: &TestContext, stylist_user: Uuid, date: &str) -> axum_test::TestResponse {
    as_user(ctx.server.post("/api/leaves"), stylist_user, Role::Stylist)
        .json(&json!({ "date": date, "reason": "family event" }))
        .await
}

async fn resolve(ctx: &TestContext, id: Uuid, user: Uuid, role: Role, status: &str) -> axum_test::TestResponse {
    as_user(ctx.server.put(&format!("/api/leaves/{}/resolve", id)), user, role)
        .json(&json!({ "status": status }))
        .await
}

#[tokio::test]
async fn test_stylist_files_pending_request() {
    let ctx = TestContext::new().await;

    let response = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let leave: LeaveRequest = response.json();
    assert_eq!(leave.status, LeaveStatus::Pending);
    assert_eq!(leave.stylist_id, ctx.stylist.id);
    assert_eq!(leave.salon_id, ctx.salon_id);
}

#[tokio::test]
async fn test_past_date_is_invalid_state() {
    let ctx = TestContext::new().await;

    let response = request_leave(&ctx, ctx.stylist.user_id, "2025-03-13").await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_today_is_still_allowed() {
    let ctx = TestContext::new().await;

    let response = request_leave(&ctx, ctx.stylist.user_id, "2025-03-14").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_open_duplicate_conflicts() {
    let ctx = TestContext::new().await;
    request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await;

    let response = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_request_can_be_refiled() {
    let ctx = TestContext::new().await;
    let leave: LeaveRequest = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await.json();
    resolve(&ctx, leave.id, ctx.manager, Role::Manager, "REJECTED").await;

    let response = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_customer_cannot_request_leave() {
    let ctx = TestContext::new().await;

    let response = as_user(ctx.server.post("/api/leaves"), ctx.customer.user_id, Role::Customer)
        .json(&json!({ "date": "2025-03-20" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_stylist_cancels_own_pending_request() {
    let ctx = TestContext::new().await;
    let leave: LeaveRequest = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await.json();

    let response = as_user(
        ctx.server.post(&format!("/api/leaves/{}/cancel", leave.id)),
        ctx.stylist.user_id,
        Role::Stylist,
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let canceled: LeaveRequest = response.json();
    assert_eq!(canceled.status, LeaveStatus::Canceled);
}

#[tokio::test]
async fn test_stylist_cannot_cancel_colleagues_request() {
    let ctx = TestContext::new().await;
    let colleague = ctx.store.add_stylist(ctx.salon_id).await;
    let leave: LeaveRequest = request_leave(&ctx, colleague.user_id, "2025-03-20").await.json();

    let response = as_user(
        ctx.server.post(&format!("/api/leaves/{}/cancel", leave.id)),
        ctx.stylist.user_id,
        Role::Stylist,
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approved_request_cannot_be_cancelled_or_resolved_again() {
    let ctx = TestContext::new().await;
    let leave: LeaveRequest = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await.json();
    let approved = resolve(&ctx, leave.id, ctx.manager, Role::Manager, "APPROVED").await;
    assert_eq!(approved.status_code(), StatusCode::OK);

    let cancel = as_user(
        ctx.server.post(&format!("/api/leaves/{}/cancel", leave.id)),
        ctx.stylist.user_id,
        Role::Stylist,
    )
    .await;
    let again = resolve(&ctx, leave.id, ctx.manager, Role::Manager, "REJECTED").await;

    assert_eq!(cancel.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(again.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_resolve_accepts_only_decisions() {
    let ctx = TestContext::new().await;
    let leave: LeaveRequest = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await.json();

    let response = resolve(&ctx, leave.id, ctx.manager, Role::Manager, "CANCELED").await;

    assert!(response.status_code().is_client_error());
    let stored = ctx.store.get_leave_request(leave.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Pending);
}

#[tokio::test]
async fn test_stylist_cannot_resolve() {
    let ctx = TestContext::new().await;
    let leave: LeaveRequest = request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await.json();

    let response = resolve(&ctx, leave.id, ctx.stylist.user_id, Role::Stylist, "APPROVED").await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_resolves_any_salon() {
    let ctx = TestContext::new().await;
    let elsewhere = ctx.store.add_stylist(Uuid::new_v4()).await;
    let leave: LeaveRequest = request_leave(&ctx, elsewhere.user_id, "2025-03-20").await.json();

    let response = resolve(&ctx, leave.id, Uuid::new_v4(), Role::Admin, "APPROVED").await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_listing_is_scoped_by_role() {
    let ctx = TestContext::new().await;
    let colleague = ctx.store.add_stylist(ctx.salon_id).await;
    let elsewhere = ctx.store.add_stylist(Uuid::new_v4()).await;
    request_leave(&ctx, ctx.stylist.user_id, "2025-03-20").await;
    request_leave(&ctx, colleague.user_id, "2025-03-21").await;
    request_leave(&ctx, elsewhere.user_id, "2025-03-22").await;

    let own: Vec<LeaveRequest> = as_user(ctx.server.get("/api/leaves"), ctx.stylist.user_id, Role::Stylist)
        .await
        .json();
    let salon: Vec<LeaveRequest> = as_user(ctx.server.get("/api/leaves"), ctx.manager, Role::Manager)
        .await
        .json();
    let all: Vec<LeaveRequest> = as_user(ctx.server.get("/api/leaves"), Uuid::new_v4(), Role::Admin)
        .await
        .json();

    assert_eq!(own.len(), 1);
    assert_eq!(salon.len(), 2);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].date.to_string(), "2025-03-22");
}
