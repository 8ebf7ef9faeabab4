// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token required)
pub mod protected;
pub mod public;

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};

use crate::error::ApiError;

/// Map body-parsing failures onto the API error envelope.
pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => ApiError::unprocessable_entity(e.body_text()),
        JsonRejection::JsonSyntaxError(e) => ApiError::invalid_json(e.body_text()),
        other => ApiError::bad_request(other.body_text()),
    }
}

pub(crate) fn form_rejection(rejection: FormRejection) -> ApiError {
    ApiError::unprocessable_entity(rejection.body_text())
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}
