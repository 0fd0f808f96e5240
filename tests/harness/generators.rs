// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use form_relay::form::SubmissionRequest;

/// Generate a pool of client identifiers in the 10.x.x.x range.
pub fn generate_identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = (i >> 16) & 0xFF;
            let b = (i >> 8) & 0xFF;
            let c = i & 0xFF;
            format!("10.{a}.{b}.{c}")
        })
        .collect()
}

const FIRST_NAMES: &[&str] = &["Asha", "Ravi", "Meera", "Karan", "Nisha", "Arjun"];
const LAST_NAMES: &[&str] = &["Rao", "Kumar", "Iyer", "Singh", "Menon", "Das"];

fn person(i: usize) -> String {
    format!(
        "{} {}",
        FIRST_NAMES[i % FIRST_NAMES.len()],
        LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()]
    )
}

/// A contact submission that passes every rule.
pub fn valid_contact(i: usize) -> SubmissionRequest {
    SubmissionRequest::new()
        .with("fullName", &person(i))
        .with("email", &format!("visitor{i}@example.com"))
        .with("phone", &format!("98{:08}", i % 100_000_000))
        .with("location", "Pune, Maharashtra")
        .with("expertise", "construction")
        .with("message", "Please share a quote for a two storey home.")
}

/// A quotation submission that passes every rule.
pub fn valid_quotation(i: usize) -> SubmissionRequest {
    SubmissionRequest::new()
        .with("name", &person(i))
        .with("phone", &format!("91{:08}", i % 100_000_000))
        .with("email", &format!("client{i}@gmail.com"))
}

/// A quotation submission that fails validation.
pub fn invalid_quotation(i: usize) -> SubmissionRequest {
    valid_quotation(i).with("phone", "12345")
}

/// Keyboard-mash and bot-filler names that must not pass as names.
pub fn gibberish_names() -> Vec<(&'static str, &'static str)> {
    vec![
        ("xyz123", "Name cannot contain numbers"),
        ("bcdfg", "Please enter a valid name"),
        ("Asha xkcd", "Please enter a valid name"),
        ("qwrt zxcv", "Please enter a valid name"),
        ("R2D2 Unit", "Name cannot contain numbers"),
        ("<b>Asha</b>", "Name can only contain letters, spaces, hyphens, and apostrophes"),
    ]
}

/// Markup and script payloads aimed at the notification body.
pub fn injection_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script> is fine",
        "<img src=x onerror=alert(document.cookie)> hello",
        "\"><svg onload=alert('x')> please reply",
        "Tom & Jerry's <b>bold</b> request",
        "javascript:alert(1) <a href='javascript:void(0)'>click</a>",
        "&lt;already escaped&gt; and <raw> tags",
    ]
}

/// Email domains outside the quotation allow-list.
pub fn disallowed_domains() -> Vec<&'static str> {
    vec![
        "yahoo.com",
        "protonmail.com",
        "gmail.co",
        "mail.gmail.com",
        "gmail.com.evil.example",
        "example.com",
    ]
}
