// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission orchestration.
//!
//! A submission moves through these states, never backwards and never
//! retried:
//!
//! ```text
//! Received ─┬─ Misconfigured
//!           └─ ConfigChecked ─┬─ RateLimited
//!                             └─ RateChecked ─┬─ Invalid
//!                                             └─ Validated ─┬─ DispatchFailed
//!                                                           └─ Dispatched
//! ```

use crate::composer::{MessageComposer, TimestampFormat};
use crate::config::{Config, MailConfig};
use crate::error::SubmitError;
use crate::form::{FormType, SubmissionRequest};
use crate::limiter::{RateLimitResult, SlidingWindowLimiter};
use crate::mailer::Mailer;
use crate::metrics::Metrics;
use crate::sanitizer::sanitize;
use crate::validator::FormValidator;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// A dispatched submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub form: FormType,
    /// Submissions the caller has left in the current window
    pub remaining: u32,
}

/// Runs submissions through rate limiting, validation, composition and
/// dispatch.
pub struct SubmissionHandler {
    limiter: Arc<SlidingWindowLimiter>,
    validator: FormValidator,
    composer: MessageComposer,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    metrics: Option<Metrics>,
}

impl SubmissionHandler {
    pub fn new(config: &Config, limiter: Arc<SlidingWindowLimiter>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            limiter,
            validator: FormValidator::new(config.validation.clone()),
            composer: MessageComposer::new(TimestampFormat::from_config(&config.mail)),
            mailer,
            mail: config.mail.clone(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }

    /// Process one submission from `identifier`.
    pub async fn submit(
        &self,
        form: FormType,
        identifier: &str,
        request: &SubmissionRequest,
    ) -> Result<Accepted, SubmitError> {
        let result = self.process(form, identifier, request).await;

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "dispatched",
                Err(err) => err.outcome(),
            };
            metrics.record_submission(form.as_str(), outcome);
        }

        result
    }

    async fn process(
        &self,
        form: FormType,
        identifier: &str,
        request: &SubmissionRequest,
    ) -> Result<Accepted, SubmitError> {
        let identity = self.mail.identity().map_err(|err| {
            error!(%form, error = %err, "Mail configuration incomplete, submission refused");
            SubmitError::from(err)
        })?;

        let remaining = match self.limiter.check(identifier).await {
            RateLimitResult::Allowed { remaining } => remaining,
            RateLimitResult::Limited { retry_after } => {
                warn!(
                    %form,
                    identifier,
                    retry_after_secs = retry_after.as_secs(),
                    "Submission rate limited"
                );
                return Err(SubmitError::RateLimited { retry_after });
            }
        };

        let validated = self
            .validator
            .validate(form, request)
            .into_result()
            .map_err(|errors| {
                info!(%form, identifier, errors = errors.len(), "Submission failed validation");
                SubmitError::Invalid(errors)
            })?;

        let sanitized = sanitize(&validated);
        let message = self
            .composer
            .compose(&validated, &sanitized, &identity, Utc::now());

        let started = Instant::now();
        let sent = self.mailer.send(&message).await;
        if let Some(metrics) = &self.metrics {
            metrics.observe_dispatch(started.elapsed().as_secs_f64());
        }

        if let Err(err) = sent {
            error!(
                %form,
                identifier,
                kind = err.kind(),
                error = %err,
                "Notification dispatch failed"
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_dispatch_failure(err.kind());
            }
            return Err(SubmitError::Dispatch(err));
        }

        info!(%form, identifier, to = %message.to, "Notification dispatched");
        Ok(Accepted { form, remaining })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RateLimitConfig;
    use crate::mailer::{DispatchError, MemoryMailer};

    fn config() -> Config {
        let mut config = Config::default();
        config.mail.smtp_user = Some("relay@gmail.com".to_string());
        config.mail.smtp_pass = Some("app-password".to_string());
        config.mail.recipient = Some("operator@example.com".to_string());
        config
    }

    fn handler(config: &Config, mailer: Arc<MemoryMailer>) -> SubmissionHandler {
        let limiter = SlidingWindowLimiter::with_clock(
            RateLimitConfig::default(),
            Arc::new(ManualClock::new()),
        );
        SubmissionHandler::new(config, Arc::new(limiter), mailer)
            .with_metrics(Metrics::new().unwrap())
    }

    fn quotation() -> SubmissionRequest {
        SubmissionRequest::new()
            .with("name", "Ravi Kumar")
            .with("phone", "9123456780")
            .with("email", "ravi@gmail.com")
    }

    #[tokio::test]
    async fn test_valid_submission_dispatched() {
        let mailer = Arc::new(MemoryMailer::new());
        let handler = handler(&config(), mailer.clone());

        let accepted = handler
            .submit(FormType::Quotation, "10.0.0.1", &quotation())
            .await
            .unwrap();

        assert_eq!(accepted, Accepted { form: FormType::Quotation, remaining: 2 });
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "operator@example.com");
        assert_eq!(sent[0].from, "relay@gmail.com");
        assert_eq!(sent[0].subject, "Quotation Request: Ravi Kumar");
    }

    #[tokio::test]
    async fn test_missing_config_short_circuits_before_validation() {
        let mailer = Arc::new(MemoryMailer::new());
        let handler = handler(&Config::default(), mailer.clone());

        let err = handler
            .submit(FormType::Quotation, "10.0.0.1", &SubmissionRequest::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Configuration(_)));
        assert_eq!(handler.limiter().tracked_identifiers().await, 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_submission_not_dispatched() {
        let mailer = Arc::new(MemoryMailer::new());
        let handler = handler(&config(), mailer.clone());

        let err = handler
            .submit(FormType::Quotation, "10.0.0.1", &quotation().with("phone", "12345"))
            .await
            .unwrap_err();

        match err {
            SubmitError::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "phone");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fourth_submission_rate_limited() {
        let mailer = Arc::new(MemoryMailer::new());
        let handler = handler(&config(), mailer.clone());

        for _ in 0..3 {
            handler
                .submit(FormType::Quotation, "10.0.0.1", &quotation())
                .await
                .unwrap();
        }

        let err = handler
            .submit(FormType::Quotation, "10.0.0.1", &quotation())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::RateLimited { .. }));

        handler
            .submit(FormType::Quotation, "10.0.0.2", &quotation())
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_terminal() {
        let mailer = Arc::new(MemoryMailer::failing(DispatchError::Connection(
            "connection refused".into(),
        )));
        let handler = handler(&config(), mailer.clone());

        let err = handler
            .submit(FormType::Quotation, "10.0.0.1", &quotation())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Dispatch(DispatchError::Connection(_))));
        assert_eq!(err.outcome(), "dispatch_failed");
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_outcomes_counted() {
        let mailer = Arc::new(MemoryMailer::new());
        let metrics = Metrics::new().unwrap();
        let handler = SubmissionHandler::new(
            &config(),
            Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default())),
            mailer,
        )
        .with_metrics(metrics.clone());

        handler
            .submit(FormType::Quotation, "a", &quotation())
            .await
            .unwrap();
        let _ = handler
            .submit(FormType::Quotation, "a", &SubmissionRequest::new())
            .await;

        assert_eq!(metrics.submission_count("quotation", "dispatched"), 1);
        assert_eq!(metrics.submission_count("quotation", "invalid"), 1);
    }
}
