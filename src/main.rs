// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form Relay Service
//!
//! Serves the contact and quotation form endpoints and relays accepted
//! submissions to the operator mailbox over SMTP.
//!
//! ## Configuration
//!
//! Configuration is read from the environment, after loading a `.env` file
//! when one is present:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Submissions per window per client (default: 3)
//! - `RATE_LIMIT_WINDOW_MS`: Window length in milliseconds (default: 60000)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_TLS`: Mail transport (default: smtp.gmail.com:465, implicit TLS)
//! - `SMTP_USER`, `SMTP_PASS`: Transport credentials, also the sender address
//! - `MAIL_TO`: Operator mailbox receiving notifications
//!
//! Missing mail settings do not stop the service from starting; every
//! submission is refused with a configuration error until they are set.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use form_relay::{
    config::Config,
    handlers::{router, AppState},
    limiter::SlidingWindowLimiter,
    mailer::SmtpMailer,
    metrics::Metrics,
    pipeline::SubmissionHandler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(err) = dotenvy::dotenv() {
        debug!(error = %err, "No .env file loaded");
    }

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_ms = config.rate_limit.window_ms,
        smtp_host = %config.mail.smtp_host,
        smtp_port = config.mail.smtp_port,
        metrics = config.metrics.enabled,
        "Starting form relay"
    );

    if let Err(err) = config.mail.identity() {
        warn!(error = %err, "Mail settings incomplete, submissions will be refused");
    }

    let metrics = if config.metrics.enabled {
        Some(Metrics::new()?)
    } else {
        None
    };

    let limiter = Arc::new(SlidingWindowLimiter::new(config.rate_limit.clone()));
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);

    let mut pipeline = SubmissionHandler::new(&config, limiter.clone(), mailer);
    if let Some(metrics) = &metrics {
        pipeline = pipeline.with_metrics(metrics.clone());
    }

    let state = Arc::new(AppState {
        pipeline,
        metrics: metrics.clone(),
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_every = config.rate_limit.cleanup_interval().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let evicted = limiter.cleanup().await;
            let tracked = limiter.tracked_identifiers().await;
            if evicted > 0 {
                debug!(evicted, tracked, "Evicted idle rate limit entries");
            }
            if let Some(metrics) = &metrics {
                metrics.set_tracked_identifiers(tracked);
            }
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
