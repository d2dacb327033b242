//! Metrics for middleware chain construction
//!
//! Emitted through the [`metrics`] facade; nothing is recorded unless the
//! application installs a recorder (for example `metrics-exporter-prometheus`).
//!
//! | Metric | Type | Labels |
//! |---|---|---|
//! | `middleware_chains_built_total` | counter | `store` |
//! | `middleware_construction_failures_total` | counter | `store`, `reason` |
//! | `middleware_chain_length` | gauge | `store` |

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Number of chains successfully assembled
pub const CHAINS_BUILT_TOTAL: &str = "middleware_chains_built_total";

/// Number of constructions that produced no enhanced store
pub const CONSTRUCTION_FAILURES_TOTAL: &str = "middleware_construction_failures_total";

/// Length of the most recently assembled chain
pub const CHAIN_LENGTH: &str = "middleware_chain_length";

/// Why a construction failed, as recorded in the `reason` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The terminal store factory returned an error
    StoreFactory,
    /// A middleware factory returned an error
    MiddlewareFactory,
    /// A middleware factory called the forwarding dispatch
    Reentrancy,
}

impl FailureReason {
    /// Label value for this reason
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoreFactory => "store_factory",
            Self::MiddlewareFactory => "middleware_factory",
            Self::Reentrancy => "reentrancy",
        }
    }
}

/// Register descriptions for every metric in this module
///
/// Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!(CHAINS_BUILT_TOTAL, "Middleware chains successfully assembled");
    describe_counter!(
        CONSTRUCTION_FAILURES_TOTAL,
        "Middleware chain constructions that failed"
    );
    describe_gauge!(CHAIN_LENGTH, "Number of middleware in the last assembled chain");
}

pub(crate) fn record_built(label: &str, chain_length: usize) {
    counter!(CHAINS_BUILT_TOTAL, "store" => label.to_owned()).increment(1);

    #[allow(clippy::cast_precision_loss)] // chain lengths are tiny
    let length = chain_length as f64;
    gauge!(CHAIN_LENGTH, "store" => label.to_owned()).set(length);
}

pub(crate) fn record_failure(label: &str, reason: FailureReason) {
    counter!(
        CONSTRUCTION_FAILURES_TOTAL,
        "store" => label.to_owned(),
        "reason" => reason.as_str()
    )
    .increment(1);
}
