// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the form relay.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file). Missing mail credentials do not prevent startup; every
//! submission is then answered with a configuration error.

use crate::handlers::{CONTACT_PATH, HEALTH_PATHS, QUOTATION_PATH};
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration for the form relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per identifier inside one window (default: 3)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// How often stale identifiers are evicted, in seconds (default: 60)
    #[serde(default = "default_cleanup_secs")]
    pub cleanup_interval_secs: u64,
}

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Run the vowel plausibility heuristic (default: true)
    #[serde(default = "default_true")]
    pub plausibility_check: bool,
}

/// Which TLS mode the SMTP connection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// TLS from the first byte (port 465)
    Implicit,
    /// Plain connection upgraded with STARTTLS (port 587)
    Starttls,
}

impl FromStr for SmtpTls {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "implicit" | "tls" | "smtps" => Ok(Self::Implicit),
            "starttls" => Ok(Self::Starttls),
            other => Err(ConfigError::Invalid {
                key: "SMTP_TLS",
                value: other.to_string(),
            }),
        }
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host (default: smtp.gmail.com)
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP port (default: 465)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// TLS mode (default: implicit)
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: SmtpTls,

    /// SMTP username
    #[serde(default)]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[serde(default, skip_serializing)]
    pub smtp_pass: Option<String>,

    /// Send timeout in seconds (default: 10)
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,

    /// Operator mailbox receiving every notification
    #[serde(default)]
    pub recipient: Option<String>,

    /// Sender identity; falls back to `smtp_user`
    #[serde(default)]
    pub sender: Option<String>,

    /// Offset used when printing the submission time (default: +330, IST)
    #[serde(default = "default_display_offset")]
    pub display_utc_offset_minutes: i32,

    /// Label printed after the submission time (default: IST)
    #[serde(default = "default_zone_label")]
    pub display_zone_label: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Configuration problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Recipient and sender of every notification. Never derived from
/// submitted form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIdentity {
    pub to: String,
    pub from: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    3
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_cleanup_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_tls() -> SmtpTls {
    SmtpTls::Implicit
}

fn default_smtp_timeout_secs() -> u64 {
    10
}

fn default_display_offset() -> i32 {
    330
}

fn default_zone_label() -> String {
    "IST".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            cleanup_interval_secs: default_cleanup_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            plausibility_check: default_true(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_tls: default_smtp_tls(),
            smtp_user: None,
            smtp_pass: None,
            timeout_secs: default_smtp_timeout_secs(),
            recipient: None,
            sender: None,
            display_utc_offset_minutes: default_display_offset(),
            display_zone_label: default_zone_label(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the cleanup interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MailConfig {
    /// Get the send timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve who notifications go to and come from.
    ///
    /// Fails when credentials or the recipient are absent, or when an
    /// address does not parse as a mailbox.
    pub fn identity(&self) -> Result<MailIdentity, ConfigError> {
        let user = non_empty(self.smtp_user.as_deref()).ok_or(ConfigError::Missing("SMTP_USER"))?;
        non_empty(self.smtp_pass.as_deref()).ok_or(ConfigError::Missing("SMTP_PASS"))?;
        let to = non_empty(self.recipient.as_deref()).ok_or(ConfigError::Missing("MAIL_TO"))?;
        let from = non_empty(self.sender.as_deref()).unwrap_or(user);

        check_mailbox("MAIL_TO", to)?;
        check_mailbox("MAIL_FROM", from)?;

        Ok(MailIdentity {
            to: to.to_string(),
            from: from.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_mailbox(key: &'static str, value: &str) -> Result<(), ConfigError> {
    value
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let smtp_tls = match lookup("SMTP_TLS") {
            Some(v) => v.parse()?,
            None => defaults.mail.smtp_tls,
        };

        let metrics_path = match lookup("METRICS_PATH") {
            Some(path) => metrics_path(path)?,
            None => defaults.metrics.path,
        };

        Ok(Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&lookup, "RATE_LIMIT_MAX", defaults.rate_limit.max_requests)?,
                window_ms: parse_or(&lookup, "RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window_ms)?,
                cleanup_interval_secs: parse_or(
                    &lookup,
                    "RATE_LIMIT_CLEANUP_SECS",
                    defaults.rate_limit.cleanup_interval_secs,
                )?,
            },
            validation: ValidationConfig {
                plausibility_check: parse_or(
                    &lookup,
                    "PLAUSIBILITY_CHECK",
                    defaults.validation.plausibility_check,
                )?,
            },
            mail: MailConfig {
                smtp_host: lookup("SMTP_HOST").unwrap_or(defaults.mail.smtp_host),
                smtp_port: parse_or(&lookup, "SMTP_PORT", defaults.mail.smtp_port)?,
                smtp_tls,
                smtp_user: lookup("SMTP_USER"),
                smtp_pass: lookup("SMTP_PASS"),
                timeout_secs: parse_or(&lookup, "SMTP_TIMEOUT_SECS", defaults.mail.timeout_secs)?,
                recipient: lookup("MAIL_TO"),
                sender: lookup("MAIL_FROM"),
                display_utc_offset_minutes: parse_or(
                    &lookup,
                    "DISPLAY_UTC_OFFSET_MINUTES",
                    defaults.mail.display_utc_offset_minutes,
                )?,
                display_zone_label: lookup("DISPLAY_ZONE_LABEL")
                    .unwrap_or(defaults.mail.display_zone_label),
            },
            metrics: MetricsConfig {
                enabled: parse_or(&lookup, "METRICS_ENABLED", defaults.metrics.enabled)?,
                path: metrics_path,
            },
        })
    }
}

/// The metrics route must be an absolute path that no other route claims.
fn metrics_path(path: String) -> Result<String, ConfigError> {
    let reserved = [CONTACT_PATH, QUOTATION_PATH, HEALTH_PATHS[0], HEALTH_PATHS[1]];
    if !path.starts_with('/') || path.contains("//") || reserved.iter().any(|r| *r == path) {
        return Err(ConfigError::Invalid {
            key: "METRICS_PATH",
            value: path,
        });
    }
    Ok(path)
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
