// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification dispatch.
//!
//! A [`Mailer`] makes exactly one delivery attempt per notification and
//! reports failures as a [`DispatchError`]. The classification is meant for
//! operator logs; callers only ever learn that dispatch failed.

use crate::composer::NotificationMessage;
use crate::config::{MailConfig, SmtpTls};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Why a notification could not be handed to the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The transport rejected our credentials
    #[error("Mail transport rejected credentials: {0}")]
    Authentication(String),

    /// The transport could not be reached or timed out
    #[error("Could not reach mail transport: {0}")]
    Connection(String),

    /// Anything else
    #[error("Mail transport failure: {0}")]
    Unknown(String),
}

impl DispatchError {
    /// Metrics label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::Connection(_) => "connection",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Classify an SMTP failure.
    ///
    /// `reply_code` is the server's reply code, if it sent one.
    /// `unreachable` is set for timeouts and for failures below the SMTP
    /// dialogue (DNS, TCP, TLS).
    pub fn classify(reply_code: Option<u16>, unreachable: bool, detail: String) -> Self {
        match reply_code {
            // 530 auth required, 534 mechanism too weak, 535 credentials invalid
            Some(530 | 534 | 535) => Self::Authentication(detail),
            Some(_) => Self::Unknown(detail),
            None if unreachable => Self::Connection(detail),
            None => Self::Unknown(detail),
        }
    }
}

impl From<&lettre::transport::smtp::Error> for DispatchError {
    fn from(err: &lettre::transport::smtp::Error) -> Self {
        let reply_code = err.status().and_then(|code| code.to_string().parse().ok());
        let unreachable =
            err.is_timeout() || (reply_code.is_none() && !err.is_client() && !err.is_response());
        Self::classify(reply_code, unreachable, err.to_string())
    }
}

/// Outbound notification transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand one notification to the transport. No retries.
    async fn send(&self, message: &NotificationMessage) -> Result<(), DispatchError>;
}

/// SMTP transport built on lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build the transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, lettre::transport::smtp::Error> {
        let mut builder = match config.smtp_tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?,
            SmtpTls::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
        }
        .port(config.smtp_port)
        .timeout(Some(config.timeout()));

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            tls = ?config.smtp_tls,
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
            timeout: config.timeout(),
        })
    }

    fn build_message(message: &NotificationMessage) -> Result<Message, DispatchError> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| DispatchError::Unknown(format!("invalid sender address: {e}")))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| DispatchError::Unknown(format!("invalid recipient address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| DispatchError::Unknown(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DispatchError> {
        let email = Self::build_message(message)?;

        debug!(to = %message.to, subject = %message.subject, "Sending notification");

        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(response)) => {
                debug!(code = %response.code(), "Notification accepted by transport");
                Ok(())
            }
            Ok(Err(err)) => Err(DispatchError::from(&err)),
            Err(_) => Err(DispatchError::Connection(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// In-process mailer that keeps every notification it is given.
///
/// Can be told to fail, to exercise the error path without a server.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<NotificationMessage>>,
    failure: Mutex<Option<DispatchError>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with `error`.
    pub fn failing(error: DispatchError) -> Self {
        let mailer = Self::new();
        mailer.fail_with(Some(error));
        mailer
    }

    /// Set or clear the failure returned by subsequent sends.
    pub fn fail_with(&self, error: Option<DispatchError>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = error;
    }

    /// Notifications accepted so far.
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DispatchError> {
        if let Some(error) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(error);
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}
