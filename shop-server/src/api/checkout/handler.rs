//! Checkout API Handlers

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode};
use shared::models::{CheckoutRequest, CheckoutResponse, Payment, WebhookPayload};

use crate::api::{ApiResult, json_body};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{checkout as checkout_service, payment as payment_service};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};

/// POST /api/v1/checkout
///
/// An absent body is the same as `{}`.
pub async fn checkout(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let request = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => CheckoutRequest::default(),
        other => json_body(other)?,
    };
    validate_optional_text(&request.shipping_method, "shippingMethod", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&request.note, "note", MAX_NOTE_LEN)?;

    let response = checkout_service::checkout(&state.pool, current_user.id, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/checkout/webhook
pub async fn webhook(
    State(state): State<ServerState>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> ApiResult<Json<Payment>> {
    let payload = json_body(payload)?;
    Ok(Json(payment_service::handle_webhook(&state.pool, &payload).await?))
}
