//! Configuration for middleware chain construction

use std::borrow::Cow;

/// Configuration for [`Enhancer`](crate::Enhancer)
///
/// # Example
///
/// ```
/// use composable_middleware_runtime::ChainConfig;
///
/// let config = ChainConfig::default()
///     .with_label("checkout")
///     .with_trace_dispatch(true);
///
/// assert_eq!(config.label, "checkout");
/// assert!(config.record_metrics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Name recorded on construction spans and metric labels
    pub label: Cow<'static, str>,
    /// Wrap the composed dispatch in a `trace`-level span
    pub trace_dispatch: bool,
    /// Emit construction counters through the `metrics` facade
    pub record_metrics: bool,
}

impl ChainConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(label: impl Into<Cow<'static, str>>, trace_dispatch: bool, record_metrics: bool) -> Self {
        Self {
            label: label.into(),
            trace_dispatch,
            record_metrics,
        }
    }

    /// Set the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Enable or disable per-dispatch tracing spans
    #[must_use]
    pub const fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Enable or disable construction metrics
    #[must_use]
    pub const fn with_metrics(mut self, enabled: bool) -> Self {
        self.record_metrics = enabled;
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("store"),
            trace_dispatch: false,
            record_metrics: true,
        }
    }
}
