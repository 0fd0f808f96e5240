// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Field and form validation.
//!
//! A field stops at its first failing check, in this order:
//! missing, too short, too long, pattern, email domain, plausibility,
//! digits. A form checks every field and reports every failing one.

use crate::config::ValidationConfig;
use crate::form::{FormType, SubmissionRequest, ValidatedSubmission, ValidationError};
use crate::rules::{rules_for, FieldRule};
use tracing::debug;

/// Check one raw value against its rule.
///
/// Returns the trimmed value on success.
pub fn validate_field<'a>(
    rule: &FieldRule,
    raw: Option<&'a str>,
    plausibility_check: bool,
) -> Result<&'a str, ValidationError> {
    let fail = |message: &str| Err(ValidationError::new(rule.field, message));

    if let Some(allowed) = rule.one_of {
        return match raw {
            Some(value) if allowed.iter().any(|a| *a == value) => Ok(value),
            _ => fail(rule.required),
        };
    }

    let value = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return fail(rule.required),
    };

    if let Some(length) = &rule.length {
        let len = value.chars().count();
        if len < length.min {
            return fail(length.too_short);
        }
        if len > length.max {
            return fail(length.too_long);
        }
    }

    let has_digit = value.chars().any(|c| c.is_ascii_digit());

    if let Some(pattern) = &rule.pattern {
        if !pattern.regex.is_match(value) {
            return match rule.no_digits {
                Some(message) if has_digit => fail(message),
                _ => fail(pattern.message),
            };
        }
    }

    if let Some(domains) = &rule.domains {
        let domain = value.rsplit_once('@').map(|(_, d)| d.to_ascii_lowercase());
        if !domain.is_some_and(|d| domains.domains.iter().any(|a| *a == d)) {
            return fail(domains.message);
        }
    }

    if plausibility_check {
        if let Some(plausibility) = &rule.plausibility {
            if !plausibility.mode.accepts(value) {
                return fail(plausibility.message);
            }
        }
    }

    if let Some(message) = rule.no_digits {
        if has_digit {
            return fail(message);
        }
    }

    Ok(value)
}

/// Outcome of validating a whole form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    /// Every failing field, in rule order
    pub errors: Vec<ValidationError>,
    /// Trimmed values; present only when `errors` is empty
    pub data: Option<ValidatedSubmission>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<ValidatedSubmission, Vec<ValidationError>> {
        match self.data {
            Some(data) if self.errors.is_empty() => Ok(data),
            _ => Err(self.errors),
        }
    }
}

/// Validates submissions against the rule table of their form type.
#[derive(Debug, Clone)]
pub struct FormValidator {
    config: ValidationConfig,
}

impl FormValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate every field of `request` for `form`.
    pub fn validate(&self, form: FormType, request: &SubmissionRequest) -> FormValidation {
        let mut errors = Vec::new();
        let mut fields = Vec::new();

        for rule in rules_for(form) {
            match validate_field(rule, request.get(rule.field), self.config.plausibility_check) {
                Ok(value) => fields.push((rule.field, value.to_string())),
                Err(error) => {
                    debug!(%form, field = rule.field, message = %error.message, "Field rejected");
                    errors.push(error);
                }
            }
        }

        let data = errors
            .is_empty()
            .then(|| ValidatedSubmission::new(form, fields));

        FormValidation { errors, data }
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
