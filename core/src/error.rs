//! Error types for middleware chain construction and forwarding

use thiserror::Error;

/// Errors raised while building a middleware chain or forwarding through it
///
/// Nothing here is retryable. Construction is all-or-nothing: when any of
/// these surface from the chain builder, no enhanced store was produced.
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// The forwarding dispatch was called while the chain was still being built
    ///
    /// Middleware factories receive the [`MiddlewareApi`](crate::MiddlewareApi)
    /// before the chain exists. Calling its `dispatch` from the factory body
    /// (rather than from the returned interceptor) trips this guard.
    #[error(
        "forwarding call invoked during chain construction — interceptors must not invoke it synchronously at factory time, only inside the function they return."
    )]
    ConstructionReentrancy,

    /// The forwarding dispatch outlived the enhanced store that owns the chain
    #[error("forwarding call invoked after the enhanced store was dropped")]
    StoreReleased,

    /// A store or middleware factory failed
    ///
    /// The original error is kept as-is: its message is displayed unchanged
    /// and it can be recovered with [`anyhow::Error::downcast_ref`].
    #[error(transparent)]
    Factory(#[from] anyhow::Error),
}

impl MiddlewareError {
    /// Whether this error came from the construction reentrancy guard
    #[must_use]
    pub const fn is_reentrancy(&self) -> bool {
        matches!(self, Self::ConstructionReentrancy)
    }

    /// Borrow the factory error, if this is one
    #[must_use]
    pub const fn factory_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Factory(error) => Some(error),
            _ => None,
        }
    }
}
