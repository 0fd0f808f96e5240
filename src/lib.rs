// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form Relay
//!
//! Accepts contact and quotation form submissions over HTTP and relays each
//! accepted one to an operator mailbox as an email notification:
//!
//! - Sliding-window rate limiting per client (3 per minute default)
//! - Field validation with the first failing rule reported per field
//! - HTML escaping of every value placed in the notification body
//! - One SMTP delivery attempt per submission, no retries

pub mod clock;
pub mod composer;
pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod pipeline;
pub mod rules;
pub mod sanitizer;
pub mod validator;

pub use config::Config;
pub use error::SubmitError;
pub use form::{FormType, SubmissionRequest, ValidationError};
pub use limiter::{RateLimitResult, SlidingWindowLimiter};
pub use mailer::{DispatchError, Mailer, MemoryMailer, SmtpMailer};
pub use pipeline::{Accepted, SubmissionHandler};
pub use validator::{FormValidation, FormValidator};
