//! Device token endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{delete, post};
use axum::{Json, Router};

use herald_common::protocol::{MessageResponse, TestResponse, TokenRequest, REMOVE_PATH, SAVE_PATH, TEST_PATH};

use super::auth_extractor::AuthUser;
use super::error::ApiError;
use crate::push::{self, redact};
use crate::state::AppState;
use crate::store::Upsert;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(SAVE_PATH, post(save))
        .route(REMOVE_PATH, delete(remove))
        .route(TEST_PATH, post(send_test))
}

fn validated(body: Result<Json<TokenRequest>, JsonRejection>) -> Result<TokenRequest, ApiError> {
    let Json(body) = body?;
    if body.token.trim().is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }
    Ok(body)
}

// ── Save ────────────────────────────────────────────────────────────

async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let body = validated(body)?;

    let outcome = state
        .store()
        .upsert(&user.user_id, user.role, &body.token, body.platform)
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        role = %user.role,
        platform = %body.platform,
        token = %redact(&body.token),
        ?outcome,
        "device token saved"
    );

    let message = match outcome {
        Upsert::Created => "token saved",
        Upsert::Updated => "token updated",
    };
    Ok(Json(MessageResponse {
        message: message.into(),
    }))
}

// ── Remove ──────────────────────────────────────────────────────────

async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let body = validated(body)?;

    if !state.store().remove(&user.user_id, &body.token).await? {
        return Err(ApiError::not_found("token not registered"));
    }

    tracing::info!(
        user_id = %user.user_id,
        token = %redact(&body.token),
        "device token removed"
    );
    Ok(Json(MessageResponse {
        message: "token removed".into(),
    }))
}

// ── Test notification ───────────────────────────────────────────────

async fn send_test(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TestResponse>, ApiError> {
    let bindings = state.store().tokens_for(&user.user_id).await?;
    if bindings.is_empty() {
        return Err(ApiError::not_found("no registered device tokens"));
    }

    let message = push::test_message();
    let mut delivered = 0;
    for binding in &bindings {
        match state.push().send(&binding.device_token, &message).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(
                user_id = %user.user_id,
                token = %redact(&binding.device_token),
                "test push failed: {e}"
            ),
        }
    }

    if delivered == 0 {
        return Err(ApiError::bad_gateway("push delivery failed"));
    }

    tracing::info!(user_id = %user.user_id, delivered, "test notification sent");
    Ok(Json(TestResponse {
        message: "test notification sent".into(),
        delivered,
    }))
}
