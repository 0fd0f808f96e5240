// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML escaping of validated form values.
//!
//! Escaping is not idempotent: `&amp;` escapes to `&amp;amp;`. Values are
//! escaped exactly once, after validation, when the notification is built.

use crate::form::{FormType, ValidatedSubmission};

/// Markup-significant characters and their entities, in lookup order.
const ENTITIES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#039;"),
];

/// Escape `& < > " '` so the text can be interpolated into HTML verbatim.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match ENTITIES.iter().find(|(raw, _)| *raw == c) {
            Some((_, entity)) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape_html`].
pub fn unescape_html(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        decoded.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES
            .iter()
            .find(|(_, entity)| rest.starts_with(entity))
        {
            Some((raw, entity)) => {
                decoded.push(*raw);
                rest = &rest[entity.len()..];
            }
            None => {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// A validated submission with every value HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    form: FormType,
    fields: Vec<(&'static str, String)>,
}

impl SanitizedSubmission {
    pub fn form(&self) -> FormType {
        self.form
    }

    /// Escaped value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }
}

/// Escape every value of a validated submission.
pub fn sanitize(validated: &ValidatedSubmission) -> SanitizedSubmission {
    SanitizedSubmission {
        form: validated.form(),
        fields: validated
            .fields()
            .map(|(name, value)| (name, escape_html(value)))
            .collect(),
    }
}
