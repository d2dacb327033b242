//! Middleware chain construction
//!
//! [`apply_middleware`] turns an ordered list of middleware into an
//! [`Enhancer`]. Applying the enhancer to a terminal store (or to a store
//! factory) produces an [`Enhanced`] store whose dispatch runs every
//! middleware, first to last, before reaching the terminal dispatch.
//!
//! # Construction
//!
//! 1. Create the terminal store
//! 2. Create an empty forwarding slot; calling it fails with
//!    [`MiddlewareError::ConstructionReentrancy`]
//! 3. Create one [`MiddlewareApi`] shared by every middleware: the terminal
//!    state accessor plus a forwarding dispatch that reads the slot on each call
//! 4. Attach each middleware, in order, exactly once
//! 5. Compose the interceptors around the terminal dispatch and bind the slot
//! 6. Return the terminal store with its dispatch replaced
//!
//! The capability object only holds a weak handle to the slot. Strong handles
//! live in the dispatch of the [`Enhanced`] store and in every handle taken
//! from it with [`DispatchStore::dispatch_fn`]. Once all of those are gone,
//! a forwarding dispatch fails with [`MiddlewareError::StoreReleased`].
//!
//! # Example
//!
//! ```
//! use composable_middleware_core::middleware::{interceptor, middleware, BoxedMiddleware};
//! use composable_middleware_core::store::{Dispatch, DispatchStore, GetState};
//! use composable_middleware_runtime::apply_middleware;
//! use std::sync::Arc;
//!
//! struct Doubler;
//!
//! impl DispatchStore for Doubler {
//!     type State = ();
//!     type Action = i64;
//!     type Output = i64;
//!
//!     fn get_state_fn(&self) -> GetState<()> {
//!         Arc::new(|| ())
//!     }
//!
//!     fn dispatch_fn(&self) -> Dispatch<i64, i64> {
//!         Arc::new(|x| x * 2)
//!     }
//! }
//!
//! let add_one: BoxedMiddleware<(), i64, i64> = middleware(|_api| {
//!     Ok(interceptor(|next: Dispatch<i64, i64>| move |x: i64| next(x) + 1))
//! });
//! let add_ten: BoxedMiddleware<(), i64, i64> = middleware(|_api| {
//!     Ok(interceptor(|next: Dispatch<i64, i64>| move |x: i64| next(x + 10)))
//! });
//!
//! let store = apply_middleware(vec![add_one, add_ten]).build(Doubler)?;
//! assert_eq!(store.dispatch(5), 31);
//! # Ok::<(), composable_middleware_core::MiddlewareError>(())
//! ```

use crate::config::ChainConfig;
use crate::metrics::{self, FailureReason};
use composable_middleware_core::middleware::Forward;
use composable_middleware_core::{
    compose, BoxedMiddleware, Dispatch, DispatchStore, GetState, Interceptor, MiddlewareApi,
    MiddlewareError,
};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

/// Materialized interceptors, in caller order
type Chain<A, R> = SmallVec<[Interceptor<A, R>; 4]>;

/// Single-assignment cell behind the forwarding dispatch
///
/// Early use is only recorded when it happens on the thread running the
/// construction, i.e. from a factory body.
struct ForwardSlot<A, R> {
    target: OnceLock<Dispatch<A, R>>,
    used_early: AtomicBool,
    builder: ThreadId,
}

impl<A, R> ForwardSlot<A, R> {
    fn new() -> Self {
        Self {
            target: OnceLock::new(),
            used_early: AtomicBool::new(false),
            builder: thread::current().id(),
        }
    }

    fn forward(&self, action: A) -> Result<R, MiddlewareError> {
        let Some(dispatch) = self.target.get() else {
            if thread::current().id() == self.builder {
                self.used_early.store(true, Ordering::SeqCst);
                tracing::error!("Forwarding dispatch called while the middleware chain is being built");
            } else {
                tracing::warn!("Forwarding dispatch called from another thread before the chain was bound");
            }
            return Err(MiddlewareError::ConstructionReentrancy);
        };

        Ok(dispatch(action))
    }

    fn bind(&self, dispatch: Dispatch<A, R>) -> bool {
        let bound = self.target.set(dispatch).is_ok();
        if !bound {
            tracing::error!("Forwarding slot already bound, keeping the first chain");
        }
        bound
    }

    fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    fn used_early(&self) -> bool {
        self.used_early.load(Ordering::SeqCst)
    }
}

fn forward_through<A, R>(slot: &Arc<ForwardSlot<A, R>>) -> Forward<A, R>
where
    A: 'static,
    R: 'static,
{
    let slot = Arc::downgrade(slot);

    Arc::new(move |action: A| {
        let slot = slot.upgrade().ok_or(MiddlewareError::StoreReleased)?;
        slot.forward(action)
    })
}

/// The dispatch handed out to callers: runs `chain` and keeps the slot alive
fn anchored<A, R>(chain: Dispatch<A, R>, slot: Arc<ForwardSlot<A, R>>) -> Dispatch<A, R>
where
    A: 'static,
    R: 'static,
{
    Arc::new(move |action: A| {
        debug_assert!(slot.is_bound(), "anchored dispatch created before bind");
        chain(action)
    })
}

fn traced<A, R>(inner: Dispatch<A, R>, label: Cow<'static, str>) -> Dispatch<A, R>
where
    A: 'static,
    R: 'static,
{
    Arc::new(move |action: A| {
        let span = tracing::trace_span!("dispatch", store = %label);
        let _entered = span.enter();
        tracing::trace!("Dispatching through middleware chain");
        inner(action)
    })
}

/// Create an enhancer that applies `middlewares` to a store's dispatch
///
/// The first middleware is the outermost: it sees every action first and
/// every result last.
pub fn apply_middleware<S, A, R, I>(middlewares: I) -> Enhancer<S, A, R>
where
    I: IntoIterator<Item = BoxedMiddleware<S, A, R>>,
{
    apply_middleware_with_config(middlewares, ChainConfig::default())
}

/// [`apply_middleware`] with explicit configuration
pub fn apply_middleware_with_config<S, A, R, I>(middlewares: I, config: ChainConfig) -> Enhancer<S, A, R>
where
    I: IntoIterator<Item = BoxedMiddleware<S, A, R>>,
{
    Enhancer {
        middlewares: middlewares.into_iter().collect(),
        config,
    }
}

/// A reusable middleware enhancer
///
/// Created by [`apply_middleware`]. Every construction ([`build`](Self::build),
/// [`apply`](Self::apply), or a call to the factory returned by
/// [`enhance`](Self::enhance)) gets its own capability object, chain and
/// forwarding slot; nothing is shared between constructions except the
/// middleware factories themselves.
pub struct Enhancer<S, A, R> {
    middlewares: Arc<[BoxedMiddleware<S, A, R>]>,
    config: ChainConfig,
}

impl<S, A, R> Enhancer<S, A, R>
where
    S: 'static,
    A: 'static,
    R: 'static,
{
    /// Number of middleware in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Whether the chain has no middleware
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// The configuration this enhancer builds with
    #[must_use]
    pub const fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap a store factory
    ///
    /// Returns a factory with the same arguments that builds the terminal
    /// store and then applies the middleware to it.
    pub fn enhance<St, Args, E, F>(
        &self,
        create_store: F,
    ) -> impl Fn(Args) -> Result<Enhanced<St>, MiddlewareError> + use<S, A, R, St, Args, E, F>
    where
        St: DispatchStore<State = S, Action = A, Output = R>,
        F: Fn(Args) -> Result<St, E>,
        E: Into<MiddlewareError>,
    {
        let enhancer = self.clone();
        move |args| enhancer.apply(&create_store, args)
    }

    /// Build the terminal store from `create_store(args)` and apply the middleware
    ///
    /// # Errors
    ///
    /// - The store factory's error, converted into [`MiddlewareError`]
    /// - Any error from [`build`](Self::build)
    pub fn apply<St, Args, E, F>(&self, create_store: F, args: Args) -> Result<Enhanced<St>, MiddlewareError>
    where
        St: DispatchStore<State = S, Action = A, Output = R>,
        F: FnOnce(Args) -> Result<St, E>,
        E: Into<MiddlewareError>,
    {
        let store = create_store(args).map_err(|error| {
            let error: MiddlewareError = error.into();
            tracing::warn!(error = %error, "Store factory failed");
            self.record_failure(FailureReason::StoreFactory);
            error
        })?;

        self.build(store)
    }

    /// Apply the middleware to an existing terminal store
    ///
    /// The store is moved into the returned [`Enhanced`]; its state accessor
    /// and every other member are used as-is.
    ///
    /// # Errors
    ///
    /// - [`MiddlewareError::ConstructionReentrancy`] if any middleware factory
    ///   called the forwarding dispatch, even if it ignored the error. Only
    ///   calls made on the thread running `build` count; a thread spawned by a
    ///   factory that forwards too early gets the error itself but does not
    ///   fail the construction.
    /// - The first error returned by a middleware factory, unchanged
    #[tracing::instrument(
        skip_all,
        name = "apply_middleware",
        fields(store = %self.config.label, middleware = self.middlewares.len())
    )]
    pub fn build<St>(&self, store: St) -> Result<Enhanced<St>, MiddlewareError>
    where
        St: DispatchStore<State = S, Action = A, Output = R>,
    {
        tracing::debug!("Terminal store ready, attaching middleware");

        let slot = Arc::new(ForwardSlot::new());
        let api = MiddlewareApi::new(store.get_state_fn(), forward_through(&slot));

        let chain = self.materialize(&api);

        if slot.used_early() {
            tracing::error!("Middleware dispatched during construction, discarding chain");
            self.record_failure(FailureReason::Reentrancy);
            return Err(MiddlewareError::ConstructionReentrancy);
        }

        let chain = chain.inspect_err(|error| {
            tracing::warn!(error = %error, "Middleware factory failed");
            self.record_failure(FailureReason::MiddlewareFactory);
        })?;

        let chain_length = chain.len();
        tracing::debug!(chain_length, "Middleware attached, composing chain");

        let composed = compose(chain)(store.dispatch_fn());
        let dispatch = if self.config.trace_dispatch {
            traced(composed, self.config.label.clone())
        } else {
            composed
        };

        slot.bind(Arc::clone(&dispatch));
        tracing::debug!("Forwarding dispatch bound to composed chain");
        let dispatch = anchored(dispatch, slot);

        if self.config.record_metrics {
            metrics::record_built(&self.config.label, chain_length);
        }

        Ok(Enhanced { store, dispatch })
    }

    fn materialize(&self, api: &MiddlewareApi<S, A, R>) -> Result<Chain<A, R>, MiddlewareError> {
        self.middlewares
            .iter()
            .map(|middleware| middleware.attach(api))
            .collect()
    }

    fn record_failure(&self, reason: FailureReason) {
        if self.config.record_metrics {
            metrics::record_failure(&self.config.label, reason);
        }
    }
}

impl<S, A, R> Clone for Enhancer<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            middlewares: Arc::clone(&self.middlewares),
            config: self.config.clone(),
        }
    }
}

impl<S, A, R> std::fmt::Debug for Enhancer<S, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enhancer")
            .field("middleware", &self.middlewares.len())
            .field("config", &self.config)
            .finish()
    }
}

/// A store whose dispatch runs through a middleware chain
///
/// Owns the terminal store. Everything except dispatch passes straight
/// through, either via [`Deref`] or [`store`](Self::store).
pub struct Enhanced<St: DispatchStore> {
    store: St,
    /// Composed chain, anchoring the forwarding slot
    dispatch: Dispatch<St::Action, St::Output>,
}

impl<St: DispatchStore> Enhanced<St> {
    /// Dispatch an action through the middleware chain
    pub fn dispatch(&self, action: St::Action) -> St::Output {
        (self.dispatch)(action)
    }

    /// Read the terminal store's state
    pub fn get_state(&self) -> St::State {
        self.store.get_state()
    }

    /// The terminal store
    #[must_use]
    pub const fn store(&self) -> &St {
        &self.store
    }

    /// Drop the chain and return the terminal store
    ///
    /// Once no handle from [`dispatch_fn`](DispatchStore::dispatch_fn) is left
    /// either, forwarding dispatches captured by middleware fail with
    /// [`MiddlewareError::StoreReleased`].
    #[must_use]
    pub fn into_inner(self) -> St {
        self.store
    }
}

impl<St: DispatchStore> Deref for Enhanced<St> {
    type Target = St;

    fn deref(&self) -> &St {
        &self.store
    }
}

impl<St: DispatchStore> DispatchStore for Enhanced<St> {
    type State = St::State;
    type Action = St::Action;
    type Output = St::Output;

    fn get_state_fn(&self) -> GetState<St::State> {
        self.store.get_state_fn()
    }

    fn dispatch_fn(&self) -> Dispatch<St::Action, St::Output> {
        Arc::clone(&self.dispatch)
    }
}

impl<St> std::fmt::Debug for Enhanced<St>
where
    St: DispatchStore + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enhanced")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
