//! Middleware trait and the capability object handed to middleware factories
//!
//! A middleware is a factory. The chain builder calls it exactly once per
//! construction with a [`MiddlewareApi`] and expects an [`Interceptor`] back:
//! a function from the `next` dispatch to the dispatch this middleware exposes.
//!
//! ```text
//!   api ──► middleware ──► interceptor
//!                              │
//!                       next ──┴──► dispatch
//! ```
//!
//! Interceptors can observe the action, transform it, short-circuit by not
//! calling `next`, or defer by handing the work to something else and calling
//! [`MiddlewareApi::dispatch`] later.

use crate::compose::Unary;
use crate::error::MiddlewareError;
use crate::store::{Dispatch, GetState};
use std::sync::Arc;

/// Maps the `next` dispatch to the dispatch this middleware exposes.
pub type Interceptor<A, R> = Unary<Dispatch<A, R>>;

/// The forwarding dispatch behind [`MiddlewareApi::dispatch`].
pub type Forward<A, R> = Arc<dyn Fn(A) -> Result<R, MiddlewareError> + Send + Sync>;

/// A shared, type-erased middleware.
pub type BoxedMiddleware<S, A, R> = Arc<dyn Middleware<S, A, R>>;

/// Capability object passed to every middleware factory
///
/// Exposes exactly two members:
///
/// - [`get_state`](Self::get_state): the terminal store's own state accessor
/// - [`dispatch`](Self::dispatch): a forwarding call that runs the *whole*
///   composed chain, outermost middleware first
///
/// One instance is shared by every factory in a single construction. Cloning
/// it shares the same members, so every clone sees the same forwarding
/// behaviour once the chain is bound.
pub struct MiddlewareApi<S, A, R> {
    get_state: GetState<S>,
    forward: Forward<A, R>,
}

impl<S, A, R> MiddlewareApi<S, A, R> {
    /// Create the capability object from a state accessor and a forwarding call
    #[must_use]
    pub fn new(get_state: GetState<S>, forward: Forward<A, R>) -> Self {
        Self { get_state, forward }
    }

    /// Read the current state of the terminal store
    pub fn get_state(&self) -> S {
        (self.get_state)()
    }

    /// Dispatch through the full middleware chain
    ///
    /// # Errors
    ///
    /// - [`MiddlewareError::ConstructionReentrancy`] when called before the
    ///   chain has been assembled, i.e. from a middleware factory body
    /// - [`MiddlewareError::StoreReleased`] when the enhanced store that owns
    ///   the chain has already been dropped
    pub fn dispatch(&self, action: A) -> Result<R, MiddlewareError> {
        (self.forward)(action)
    }

    /// The state accessor handle itself
    #[must_use]
    pub fn get_state_fn(&self) -> GetState<S> {
        Arc::clone(&self.get_state)
    }
}

impl<S, A, R> Clone for MiddlewareApi<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            get_state: Arc::clone(&self.get_state),
            forward: Arc::clone(&self.forward),
        }
    }
}

impl<S, A, R> std::fmt::Debug for MiddlewareApi<S, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareApi").finish_non_exhaustive()
    }
}

/// A middleware factory
///
/// Closures of the shape `Fn(&MiddlewareApi) -> Result<Interceptor, MiddlewareError>`
/// implement this trait; use [`middleware`] to box one.
///
/// # Contract
///
/// `attach` must not call [`MiddlewareApi::dispatch`] itself. Only the
/// interceptor it returns may do so, at dispatch time.
pub trait Middleware<S, A, R>: Send + Sync {
    /// Materialize this middleware against the shared capability object
    ///
    /// # Errors
    ///
    /// Any error returned here aborts chain construction and reaches the
    /// caller of the chain builder unchanged.
    fn attach(&self, api: &MiddlewareApi<S, A, R>) -> Result<Interceptor<A, R>, MiddlewareError>;
}

impl<S, A, R, F> Middleware<S, A, R> for F
where
    F: Fn(&MiddlewareApi<S, A, R>) -> Result<Interceptor<A, R>, MiddlewareError> + Send + Sync,
{
    fn attach(&self, api: &MiddlewareApi<S, A, R>) -> Result<Interceptor<A, R>, MiddlewareError> {
        self(api)
    }
}

/// Box a middleware closure
///
/// # Example
///
/// ```
/// use composable_middleware_core::middleware::{interceptor, middleware, BoxedMiddleware};
/// use composable_middleware_core::store::Dispatch;
///
/// // Rejects negative input without reaching the rest of the chain.
/// let guard: BoxedMiddleware<(), i64, i64> = middleware(|_api| {
///     Ok(interceptor(|next: Dispatch<i64, i64>| {
///         move |x: i64| if x < 0 { 0 } else { next(x) }
///     }))
/// });
/// # let _ = guard;
/// ```
pub fn middleware<S, A, R, F>(factory: F) -> BoxedMiddleware<S, A, R>
where
    F: Fn(&MiddlewareApi<S, A, R>) -> Result<Interceptor<A, R>, MiddlewareError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(factory)
}

/// Box an interceptor from a `next -> dispatch` closure
///
/// The closure runs once, when the chain is composed; the dispatch it returns
/// runs on every action.
pub fn interceptor<A, R, F, D>(wrap: F) -> Interceptor<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn(Dispatch<A, R>) -> D + Send + Sync + 'static,
    D: Fn(A) -> R + Send + Sync + 'static,
{
    Box::new(move |next: Dispatch<A, R>| Arc::new(wrap(next)) as Dispatch<A, R>)
}
