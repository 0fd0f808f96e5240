// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Declarative field rules for each form type.
//!
//! Tables are built once on first use and never change afterwards. Field
//! order in a table is the order errors are reported and the order fields
//! appear in the notification.

use crate::form::FormType;
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted values of the contact form's `expertise` field.
pub const EXPERTISE: &[&str] = &["engineering", "construction", "architecture", "design", "other"];

/// Mail providers accepted by the quotation form.
pub const QUOTATION_EMAIL_DOMAINS: &[&str] = &["gmail.com", "hotmail.com", "live.com", "outlook.com"];

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^[0-9]{10}$";

/// How the vowel heuristic judges a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plausibility {
    /// Every whitespace-separated word containing a letter needs a vowel.
    EveryWord,
    /// One vowel anywhere in the value is enough.
    AnyVowel,
}

impl Plausibility {
    /// Apply the heuristic to an already trimmed value.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::EveryWord => value
                .split_whitespace()
                .filter(|word| word.chars().any(|c| c.is_ascii_alphabetic()))
                .all(has_vowel),
            Self::AnyVowel => has_vowel(value),
        }
    }
}

fn has_vowel(text: &str) -> bool {
    text.chars().any(|c| "aeiouAEIOU".contains(c))
}

#[derive(Debug)]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
    pub too_short: &'static str,
    pub too_long: &'static str,
}

#[derive(Debug)]
pub struct PatternRule {
    pub regex: Regex,
    pub message: &'static str,
}

#[derive(Debug)]
pub struct DomainRule {
    pub domains: &'static [&'static str],
    pub message: &'static str,
}

#[derive(Debug)]
pub struct PlausibilityRule {
    pub mode: Plausibility,
    pub message: &'static str,
}

/// Everything that is checked about one field.
#[derive(Debug)]
pub struct FieldRule {
    pub field: &'static str,
    /// Message for a missing, non-string or blank value
    pub required: &'static str,
    pub length: Option<LengthRule>,
    pub pattern: Option<PatternRule>,
    /// Closed set of accepted values; any miss reports `required`
    pub one_of: Option<&'static [&'static str]>,
    pub domains: Option<DomainRule>,
    pub plausibility: Option<PlausibilityRule>,
    /// Message for values containing digits
    pub no_digits: Option<&'static str>,
}

impl FieldRule {
    pub fn new(field: &'static str, required: &'static str) -> Self {
        Self {
            field,
            required,
            length: None,
            pattern: None,
            one_of: None,
            domains: None,
            plausibility: None,
            no_digits: None,
        }
    }

    /// A field that must be exactly one of `values`.
    pub fn one_of(field: &'static str, values: &'static [&'static str], message: &'static str) -> Self {
        Self {
            one_of: Some(values),
            ..Self::new(field, message)
        }
    }

    pub fn length(
        mut self,
        min: usize,
        max: usize,
        too_short: &'static str,
        too_long: &'static str,
    ) -> Self {
        self.length = Some(LengthRule {
            min,
            max,
            too_short,
            too_long,
        });
        self
    }

    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex; patterns are compile-time
    /// constants.
    pub fn pattern(mut self, pattern: &str, message: &'static str) -> Self {
        self.pattern = Some(PatternRule {
            regex: Regex::new(pattern).expect("field pattern must compile"),
            message,
        });
        self
    }

    pub fn domains(mut self, domains: &'static [&'static str], message: &'static str) -> Self {
        self.domains = Some(DomainRule { domains, message });
        self
    }

    pub fn plausible(mut self, mode: Plausibility, message: &'static str) -> Self {
        self.plausibility = Some(PlausibilityRule { mode, message });
        self
    }

    pub fn no_digits(mut self, message: &'static str) -> Self {
        self.no_digits = Some(message);
        self
    }
}

static CONTACT_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new("fullName", "Full name is required")
            .length(
                2,
                50,
                "Name must be at least 2 characters",
                "Name cannot exceed 50 characters",
            )
            .pattern(
                r"^[a-zA-Z\s'-]+$",
                "Name can only contain letters, spaces, hyphens, and apostrophes",
            )
            .plausible(Plausibility::EveryWord, "Please enter a valid name")
            .no_digits("Name cannot contain numbers"),
        FieldRule::new("email", "Email is required")
            .pattern(EMAIL_PATTERN, "Please enter a valid email address"),
        FieldRule::new("phone", "Phone is required")
            .pattern(PHONE_PATTERN, "Phone must be exactly 10 digits"),
        FieldRule::new("location", "Location is required")
            .length(
                2,
                100,
                "Location must be at least 2 characters",
                "Location cannot exceed 100 characters",
            )
            .pattern(r"^[a-zA-Z0-9\s,.-]+$", "Location contains invalid characters")
            .plausible(Plausibility::EveryWord, "Please enter a valid location"),
        FieldRule::one_of("expertise", EXPERTISE, "Please select a valid expertise"),
        FieldRule::new("message", "Message is required")
            .length(
                10,
                500,
                "Message must be at least 10 characters",
                "Message cannot exceed 500 characters",
            )
            .plausible(Plausibility::AnyVowel, "Please enter a meaningful message"),
    ]
});

static QUOTATION_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::new("name", "Name is required")
            .length(
                3,
                50,
                "Name must be at least 3 characters",
                "Name cannot exceed 50 characters",
            )
            .plausible(Plausibility::EveryWord, "Please enter a valid name")
            .no_digits("Name cannot contain numbers"),
        FieldRule::new("phone", "Phone is required")
            .pattern(PHONE_PATTERN, "Phone must be exactly 10 digits"),
        FieldRule::new("email", "Email is required")
            .pattern(EMAIL_PATTERN, "Please enter a valid email address")
            .domains(
                QUOTATION_EMAIL_DOMAINS,
                "Email must be a Gmail, Hotmail, Live or Outlook address",
            ),
    ]
});

/// Rule table for a form type.
pub fn rules_for(form: FormType) -> &'static [FieldRule] {
    match form {
        FormType::Contact => &CONTACT_RULES,
        FormType::Quotation => &QUOTATION_RULES,
    }
}
