use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::validation::{RegisterForm, validate_registration};
use super::{ApiError, AppState, MessageResponse};
use crate::services::RegistrationError;

fn record_outcome(outcome: &'static str) {
    metrics::counter!("registrations_total", "outcome" => outcome).increment(1);
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn invalid_json(error: &serde_json::Error) -> ApiError {
    debug!(error = %error, "Rejected malformed registration body");
    ApiError::bad_request("Invalid JSON body")
}

/// Non-JSON and empty bodies read as an empty form, so the caller gets the
/// full list of missing fields instead of a content-type error. Fields are
/// looked up by name only: an array body has none of them.
fn parse_form(headers: &HeaderMap, body: &[u8]) -> Result<RegisterForm, ApiError> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RegisterForm::default());
    }

    match serde_json::from_slice::<Value>(body).map_err(|e| invalid_json(&e))? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(|e| invalid_json(&e)),
        Value::Array(_) => Ok(RegisterForm::default()),
        _ => Err(ApiError::bad_request("Invalid JSON body")),
    }
}

/// POST /register
/// Validate the form, reject known emails, then store the account with a hashed password
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let form = parse_form(&headers, &body).inspect_err(|_| record_outcome("invalid"))?;

    let new_user = match validate_registration(form) {
        Ok(user) => user,
        Err(errors) => {
            debug!(failed = errors.len(), "Registration failed validation");
            record_outcome("invalid");
            return Err(ApiError::ValidationError(errors));
        }
    };

    match state.registration_service().register(new_user).await {
        Ok(user) => {
            record_outcome("created");
            info!(user_id = user.id, "Registration complete");
            Ok(Json(MessageResponse::new("User registered successfully")))
        }
        Err(RegistrationError::UserExists) => {
            record_outcome("duplicate");
            info!("Registration rejected: user already exists");
            Err(ApiError::UserExists)
        }
        Err(err) => {
            record_outcome("error");
            Err(err.into())
        }
    }
}
