// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for submissions and dispatch.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Service metrics, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    dispatch_failures: IntCounterVec,
    dispatch_duration: Histogram,
    tracked_identifiers: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("form_submissions_total", "Form submissions by terminal outcome"),
            &["form", "outcome"],
        )?;
        let dispatch_failures = IntCounterVec::new(
            Opts::new("form_dispatch_failures_total", "Failed notification dispatches by kind"),
            &["kind"],
        )?;
        let dispatch_duration = Histogram::with_opts(HistogramOpts::new(
            "form_dispatch_duration_seconds",
            "Time spent handing notifications to the mail transport",
        ))?;
        let tracked_identifiers = IntGauge::new(
            "form_rate_limit_identifiers",
            "Identifiers currently held by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;
        registry.register(Box::new(dispatch_duration.clone()))?;
        registry.register(Box::new(tracked_identifiers.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatch_failures,
            dispatch_duration,
            tracked_identifiers,
        })
    }

    pub fn record_submission(&self, form: &str, outcome: &str) {
        self.submissions.with_label_values(&[form, outcome]).inc();
    }

    pub fn record_dispatch_failure(&self, kind: &str) {
        self.dispatch_failures.with_label_values(&[kind]).inc();
    }

    pub fn observe_dispatch(&self, seconds: f64) {
        self.dispatch_duration.observe(seconds);
    }

    pub fn set_tracked_identifiers(&self, count: usize) {
        self.tracked_identifiers.set(count as i64);
    }

    pub fn submission_count(&self, form: &str, outcome: &str) -> u64 {
        self.submissions.with_label_values(&[form, outcome]).get()
    }

    /// Render every metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
