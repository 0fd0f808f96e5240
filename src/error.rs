// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission error taxonomy and its HTTP mapping.

use crate::config::ConfigError;
use crate::form::ValidationError;
use crate::mailer::DispatchError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Every way a submission can end without being dispatched.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Required mail configuration is absent or unusable
    #[error("Server configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Too many recent submissions from the same caller
    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// One or more fields failed validation
    #[error("Validation failed for {} field(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    /// The mail transport failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl SubmitError {
    /// Label of the terminal state this error represents.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "misconfigured",
            Self::RateLimited { .. } => "rate_limited",
            Self::Invalid(_) => "invalid",
            Self::Dispatch(_) => "dispatch_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Configuration(_) => (
                status,
                Json(ErrorResponse {
                    error: "Server configuration error",
                    message: Some("Email service not properly configured"),
                    errors: None,
                    retry_after_secs: None,
                }),
            )
                .into_response(),
            Self::RateLimited { retry_after } => {
                let secs = retry_after_secs(retry_after);
                let mut response = (
                    status,
                    Json(ErrorResponse {
                        error: "Too many requests",
                        message: Some("Too many submissions. Please try again later."),
                        errors: None,
                        retry_after_secs: Some(secs),
                    }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            Self::Invalid(errors) => (
                status,
                Json(ErrorResponse {
                    error: "Validation failed",
                    message: None,
                    errors: Some(errors),
                    retry_after_secs: None,
                }),
            )
                .into_response(),
            // Transport detail stays in the operator logs.
            Self::Dispatch(_) => (
                status,
                Json(ErrorResponse {
                    error: "Internal Server Error",
                    message: Some("Failed to process submission"),
                    errors: None,
                    retry_after_secs: None,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(45_001)), 46);
        assert_eq!(retry_after_secs(Duration::from_secs(45)), 45);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SubmitError::Configuration(ConfigError::Missing("MAIL_TO")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            SubmitError::RateLimited {
                retry_after: Duration::from_secs(1)
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            SubmitError::Invalid(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            SubmitError::Dispatch(DispatchError::Unknown("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dispatch_response_hides_detail() {
        let response =
            SubmitError::Dispatch(DispatchError::Authentication("535 5.7.8 bad password".into()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = SubmitError::RateLimited {
            retry_after: Duration::from_millis(1500),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }
}
