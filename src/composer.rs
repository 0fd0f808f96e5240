// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification message composition.
//!
//! The plain-text body is built from the trimmed values, the HTML body only
//! from their escaped counterparts. Recipient and sender come from
//! configuration.

use crate::config::{MailConfig, MailIdentity};
use crate::form::{FormType, ValidatedSubmission};
use crate::sanitizer::SanitizedSubmission;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt::Write;

/// A fully composed notification, ready for the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub to: String,
    pub from: String,
}

/// How one form is laid out in a notification.
struct Layout {
    heading: &'static str,
    /// Table rows: field key and display label
    rows: &'static [(&'static str, &'static str)],
    /// Free-text field rendered below the table
    body: Option<(&'static str, &'static str)>,
    closing: Option<&'static str>,
}

const CONTACT_LAYOUT: Layout = Layout {
    heading: "New Contact Submission",
    rows: &[
        ("fullName", "Full Name"),
        ("email", "Email"),
        ("phone", "Phone"),
        ("location", "Location"),
        ("expertise", "Expertise"),
    ],
    body: Some(("message", "Message")),
    closing: None,
};

const QUOTATION_LAYOUT: Layout = Layout {
    heading: "New Quotation Request",
    rows: &[("name", "Name"), ("phone", "Phone"), ("email", "Email")],
    body: None,
    closing: Some("Thank you for choosing our services. We will reach out shortly."),
};

fn layout_for(form: FormType) -> &'static Layout {
    match form {
        FormType::Contact => &CONTACT_LAYOUT,
        FormType::Quotation => &QUOTATION_LAYOUT,
    }
}

const TH_STYLE: &str = "text-align:left;padding:12px;background:#f0f0f0;border:1px solid #ddd;width:30%;";
const TD_STYLE: &str = "padding:12px;border:1px solid #ddd;";

/// Renders submission times in a fixed display zone.
#[derive(Debug, Clone)]
pub struct TimestampFormat {
    offset: FixedOffset,
    label: String,
}

impl TimestampFormat {
    /// Falls back to UTC when the offset is out of range.
    pub fn new(offset_minutes: i32, label: impl Into<String>) -> Self {
        Self {
            offset: offset_minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .unwrap_or_else(|| Utc.fix()),
            label: label.into(),
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(
            config.display_utc_offset_minutes,
            config.display_zone_label.clone(),
        )
    }

    /// `M/D/YYYY, h:mm:ss AM LABEL`
    pub fn format(&self, at: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            at.with_timezone(&self.offset).format("%-m/%-d/%Y, %-I:%M:%S %p"),
            self.label
        )
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::new(330, "IST")
    }
}

/// Builds notifications from validated and sanitized submissions.
#[derive(Debug, Clone, Default)]
pub struct MessageComposer {
    timestamps: TimestampFormat,
}

impl MessageComposer {
    pub fn new(timestamps: TimestampFormat) -> Self {
        Self { timestamps }
    }

    /// Compose the notification for one submission.
    ///
    /// `sanitized` must be the escaped form of `validated`.
    pub fn compose(
        &self,
        validated: &ValidatedSubmission,
        sanitized: &SanitizedSubmission,
        identity: &MailIdentity,
        submitted_at: DateTime<Utc>,
    ) -> NotificationMessage {
        let form = validated.form();
        let layout = layout_for(form);
        let submitted = self.timestamps.format(submitted_at);

        NotificationMessage {
            subject: subject(validated),
            text_body: text_body(layout, validated, &submitted),
            html_body: html_body(layout, sanitized, &submitted),
            to: identity.to.clone(),
            from: identity.from.clone(),
        }
    }
}

fn subject(validated: &ValidatedSubmission) -> String {
    let value = |field| validated.get(field).unwrap_or_default();
    match validated.form() {
        FormType::Contact => format!("New Contact: {} - {}", value("fullName"), value("expertise")),
        FormType::Quotation => format!("Quotation Request: {}", value("name")),
    }
}

fn text_body(layout: &Layout, validated: &ValidatedSubmission, submitted: &str) -> String {
    let mut text = format!("{}\n\n", layout.heading);

    for (field, label) in layout.rows {
        let _ = writeln!(text, "{}: {}", label, validated.get(field).unwrap_or_default());
    }

    if let Some((field, label)) = layout.body {
        let _ = write!(text, "\n{}:\n{}\n", label, validated.get(field).unwrap_or_default());
    }

    if let Some(closing) = layout.closing {
        let _ = write!(text, "\n{}\n", closing);
    }

    let _ = write!(text, "\nSubmitted: {}", submitted);
    text
}

fn html_body(layout: &Layout, sanitized: &SanitizedSubmission, submitted: &str) -> String {
    let mut html = String::from(
        "<div style=\"font-family:Arial,sans-serif;color:#333;line-height:1.5;max-width:600px;\">\n",
    );
    let _ = writeln!(
        html,
        "  <h2 style=\"color:#2a6fad;border-bottom:2px solid #2a6fad;padding-bottom:10px;\">{}</h2>",
        layout.heading
    );

    html.push_str("  <table style=\"width:100%;border-collapse:collapse;margin-top:1rem;\">\n");
    for (field, label) in layout.rows {
        let _ = writeln!(
            html,
            "    <tr><th style=\"{TH_STYLE}\">{}</th><td style=\"{TD_STYLE}\">{}</td></tr>",
            label,
            sanitized.get(field).unwrap_or_default()
        );
    }
    html.push_str("  </table>\n");

    if let Some((field, label)) = layout.body {
        let _ = writeln!(
            html,
            "  <h4 style=\"margin-top:1.5rem;color:#2a6fad;border-bottom:1px solid #ddd;padding-bottom:5px;\">{}</h4>",
            label
        );
        let _ = writeln!(
            html,
            "  <div style=\"padding:12px;background:#f9f9f9;border:1px solid #ddd;border-radius:4px;white-space:pre-wrap;\">{}</div>",
            sanitized.get(field).unwrap_or_default()
        );
    }

    if let Some(closing) = layout.closing {
        let _ = writeln!(html, "  <p style=\"margin-top:1.5rem;\">{}</p>", closing);
    }

    let _ = writeln!(
        html,
        "  <p style=\"margin-top:1.5rem;font-size:0.9em;color:#666;\">Submitted: {}</p>",
        submitted
    );
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SubmissionRequest;
    use crate::sanitizer::{sanitize, unescape_html};
    use crate::validator::FormValidator;
    use chrono::TimeZone;

    fn identity() -> MailIdentity {
        MailIdentity {
            to: "operator@example.com".to_string(),
            from: "relay@gmail.com".to_string(),
        }
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 5).unwrap()
    }

    fn compose(form: FormType, request: SubmissionRequest) -> NotificationMessage {
        let validated = FormValidator::default()
            .validate(form, &request)
            .into_result()
            .unwrap();
        let sanitized = sanitize(&validated);
        MessageComposer::default().compose(&validated, &sanitized, &identity(), submitted_at())
    }

    fn contact(message: &str) -> NotificationMessage {
        compose(
            FormType::Contact,
            SubmissionRequest::new()
                .with("fullName", "Mary O'Neil")
                .with("email", "mary@example.com")
                .with("phone", "9876543210")
                .with("location", "Panaji, Goa")
                .with("expertise", "architecture")
                .with("message", message),
        )
    }

    #[test]
    fn test_timestamp_in_display_zone() {
        assert_eq!(
            TimestampFormat::default().format(submitted_at()),
            "3/14/2026, 3:00:05 PM IST"
        );
        assert_eq!(
            TimestampFormat::new(0, "UTC").format(submitted_at()),
            "3/14/2026, 9:30:05 AM UTC"
        );
    }

    #[test]
    fn test_contact_subject_and_addresses() {
        let message = contact("Please call me about a renovation.");

        assert_eq!(message.subject, "New Contact: Mary O'Neil - architecture");
        assert_eq!(message.to, "operator@example.com");
        assert_eq!(message.from, "relay@gmail.com");
    }

    #[test]
    fn test_contact_text_body() {
        let message = contact("Please call me about a renovation.");

        assert_eq!(
            message.text_body,
            "New Contact Submission\n\n\
             Full Name: Mary O'Neil\n\
             Email: mary@example.com\n\
             Phone: 9876543210\n\
             Location: Panaji, Goa\n\
             Expertise: architecture\n\
             \n\
             Message:\n\
             Please call me about a renovation.\n\
             \n\
             Submitted: 3/14/2026, 3:00:05 PM IST"
        );
    }

    #[test]
    fn test_html_body_uses_escaped_values() {
        let message = contact("<script>alert(1)</script> is fine");

        assert!(message.html_body.contains("&lt;script&gt;alert(1)&lt;/script&gt; is fine"));
        assert!(!message.html_body.contains("<script>"));
        assert!(message.html_body.contains("Mary O&#039;Neil"));
        assert!(message.text_body.contains("<script>alert(1)</script> is fine"));
    }

    #[test]
    fn test_html_body_round_trips_to_original_text() {
        let original = "Budget < 5 lakh & \"urgent\" - it's for my parents";
        let message = contact(original);

        let start = message.html_body.find("pre-wrap;\">").unwrap() + "pre-wrap;\">".len();
        let end = start + message.html_body[start..].find("</div>").unwrap();
        assert_eq!(unescape_html(&message.html_body[start..end]), original);
    }

    #[test]
    fn test_quotation_message() {
        let message = compose(
            FormType::Quotation,
            SubmissionRequest::new()
                .with("name", "Ravi Kumar")
                .with("phone", "9123456780")
                .with("email", "ravi@gmail.com"),
        );

        assert_eq!(message.subject, "Quotation Request: Ravi Kumar");
        assert_eq!(
            message.text_body,
            "New Quotation Request\n\n\
             Name: Ravi Kumar\n\
             Phone: 9123456780\n\
             Email: ravi@gmail.com\n\
             \n\
             Thank you for choosing our services. We will reach out shortly.\n\
             \n\
             Submitted: 3/14/2026, 3:00:05 PM IST"
        );
        assert!(message.html_body.contains("<td style=\"padding:12px;border:1px solid #ddd;\">Ravi Kumar</td>"));
        assert!(message.html_body.contains("Submitted: 3/14/2026, 3:00:05 PM IST"));
    }
}
