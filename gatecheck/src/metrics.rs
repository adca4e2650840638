//! Gate-check metrics.
//!
//! Recorded through the `metrics` facade; whichever recorder the host
//! process installs receives them. Nothing is exported by this crate.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `gatecheck_validations_total{outcome}` - Validations by outcome (`ADMIT` or violation code)
//! - `gatecheck_admissions_total{status}` - Admission writes by status (admitted, conflict, failed)
//! - `gatecheck_store_pages_total` - List pages fetched from the ticket store
//! - `gatecheck_page_cap_hits_total` - Lookups that stopped at the page cap
//!
//! ## Histograms
//! - `gatecheck_validation_duration_seconds` - Wall time of one validation

use metrics::{describe_counter, describe_histogram};

/// Register descriptions for all gate-check metrics.
///
/// Call once at startup, before anything is recorded.
pub fn register_gatecheck_metrics() {
    describe_counter!(
        "gatecheck_validations_total",
        "Total number of ticket validations by outcome"
    );
    describe_histogram!(
        "gatecheck_validation_duration_seconds",
        "Time taken to reach a validation decision"
    );
    describe_counter!(
        "gatecheck_admissions_total",
        "Total number of admission writes by status (admitted, conflict, failed)"
    );
    describe_counter!(
        "gatecheck_store_pages_total",
        "Total number of list pages fetched from the ticket store"
    );
    describe_counter!(
        "gatecheck_page_cap_hits_total",
        "Paginated lookups that stopped at the page cap"
    );

    tracing::info!("Gatecheck metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a finished validation.
///
/// # Arguments
///
/// * `outcome` - `ADMIT` or the violation code
/// * `duration_secs` - Wall time of the validation in seconds
pub fn record_validation(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("gatecheck_validations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gatecheck_validation_duration_seconds").record(duration_secs);
}

/// Record an admission write by status.
pub fn record_admission(status: &'static str) {
    metrics::counter!("gatecheck_admissions_total", "status" => status).increment(1);
    tracing::debug!(status, "Recorded admission metric");
}

/// Record one list page fetched from the store.
pub fn record_store_page() {
    metrics::counter!("gatecheck_store_pages_total").increment(1);
}

/// Record a lookup that stopped at the page cap.
pub fn record_page_cap_hit() {
    metrics::counter!("gatecheck_page_cap_hits_total").increment(1);
}
