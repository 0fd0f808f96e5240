// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the form relay service.

use crate::config::Config;
use crate::form::{FormType, SubmissionRequest};
use crate::metrics::Metrics;
use crate::pipeline::SubmissionHandler;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Shared application state.
pub struct AppState {
    pub pipeline: SubmissionHandler,
    pub metrics: Option<Metrics>,
    pub config: Config,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Body for requests that use the wrong method.
#[derive(Debug, Serialize)]
struct MethodNotAllowedResponse {
    error: &'static str,
}

pub const CONTACT_PATH: &str = "/api/contact-submit";
pub const QUOTATION_PATH: &str = "/api/submit-quotation";
pub const HEALTH_PATHS: [&str; 2] = ["/health", "/healthz"];

/// Build the service router.
///
/// Every response carries permissive CORS headers; the submission paths
/// answer `OPTIONS` themselves.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(HEALTH_PATHS[0], get(health))
        .route(HEALTH_PATHS[1], get(health))
        .route(
            CONTACT_PATH,
            post(contact_submit)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            QUOTATION_PATH,
            post(submit_quotation)
                .options(preflight)
                .fallback(method_not_allowed),
        );

    if state.config.metrics.enabled && state.metrics.is_some() {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "form-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// CORS preflight. Touches no state.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(MethodNotAllowedResponse {
            error: "Method Not Allowed",
        }),
    )
        .into_response()
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    metrics.set_tracked_identifiers(state.pipeline.limiter().tracked_identifiers().await);

    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Contact form endpoint.
pub async fn contact_submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Response {
    submit(state, FormType::Contact, addr, &headers, body).await
}

/// Quotation form endpoint.
pub async fn submit_quotation(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Response {
    submit(state, FormType::Quotation, addr, &headers, body).await
}

async fn submit(
    state: Arc<AppState>,
    form: FormType,
    addr: SocketAddr,
    headers: &HeaderMap,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Response {
    let identifier = client_identifier(headers, addr);

    // Unreadable bodies are submissions with no fields.
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(%form, identifier, error = %rejection.body_text(), "Unreadable submission body");
            SubmissionRequest::new()
        }
    };

    debug!(%form, identifier, ?request, "Received submission");

    match state.pipeline.submit(form, &identifier, &request).await {
        Ok(_) => (
            StatusCode::OK,
            Json(SubmitResponse {
                success: true,
                message: success_message(form),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

fn success_message(form: FormType) -> &'static str {
    match form {
        FormType::Contact => "Contact form sent successfully",
        FormType::Quotation => "Quotation sent successfully",
    }
}

/// Rate limit key for a request: the first `X-Forwarded-For` hop when a
/// proxy supplied one, otherwise the peer address.
pub fn client_identifier(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}
