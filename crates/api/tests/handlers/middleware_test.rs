use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use salonbook_api::middleware::error_handling::map_error;
use salonbook_core::errors::SalonError;
use salonbook_core::models::actor::Role;
use uuid::Uuid;

use crate::test_utils::{as_user, TestContext};

#[rstest]
#[case(SalonError::NotFound("booking".into()), StatusCode::NOT_FOUND)]
#[case(SalonError::Conflict("slot taken".into()), StatusCode::CONFLICT)]
#[case(SalonError::InvalidState("terminal".into()), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(SalonError::Forbidden("wrong salon".into()), StatusCode::FORBIDDEN)]
#[case(SalonError::Validation("empty".into()), StatusCode::BAD_REQUEST)]
#[case(SalonError::Authentication("no identity".into()), StatusCode::UNAUTHORIZED)]
#[case(SalonError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: SalonError, #[case] expected: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), expected);
}

#[test]
fn test_internal_error_maps_to_500() {
    let error = SalonError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/leaves").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/leaves")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        )
        .add_header(
            axum::http::HeaderName::from_static("x-user-role"),
            axum::http::HeaderValue::from_static("RECEPTIONIST"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_needs_no_identity() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_role_header_is_case_insensitive() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/leaves")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_str(&ctx.stylist.user_id.to_string()).unwrap(),
        )
        .add_header(
            axum::http::HeaderName::from_static("x-user-role"),
            axum::http::HeaderValue::from_static("stylist"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_customer_cannot_list_leaves() {
    let ctx = TestContext::new().await;

    let response = as_user(ctx.server.get("/api/leaves"), ctx.customer.user_id, Role::Customer).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
