// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submitted and validated form data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The kinds of form the relay accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// General contact form
    Contact,
    /// Service quotation request
    Quotation,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Quotation => "quotation",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw submission body: field name to whatever JSON the client sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SubmissionRequest {
    fields: HashMap<String, Value>,
}

impl SubmissionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a string field.
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.fields
            .insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    /// Builder-style insert of an arbitrary JSON value.
    pub fn with_value(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    /// String value of a field. Non-string values read as missing.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmissionRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A submission whose every field passed its rule, values trimmed.
///
/// Only the form validator constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    form: FormType,
    fields: Vec<(&'static str, String)>,
}

impl ValidatedSubmission {
    pub(crate) fn new(form: FormType, fields: Vec<(&'static str, String)>) -> Self {
        Self { form, fields }
    }

    pub fn form(&self) -> FormType {
        self.form
    }

    /// Trimmed value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Fields in rule order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value.as_str()))
    }
}
