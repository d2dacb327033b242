//! # Composable Middleware Runtime
//!
//! Builds middleware chains around a store's dispatch.
//!
//! ## Core Components
//!
//! - **[`apply_middleware`]**: binds an ordered list of middleware into a
//!   reusable [`Enhancer`]
//! - **[`Enhanced`]**: the terminal store with its dispatch replaced by the
//!   composed chain
//! - **[`Store`]**: a reducer-backed terminal store
//! - **[`ChainConfig`]**: labels, dispatch tracing and metrics switches
//!
//! ## Example
//!
//! ```
//! use composable_middleware_core::middleware::{interceptor, middleware, BoxedMiddleware, MiddlewareApi};
//! use composable_middleware_core::{Dispatch, Reducer};
//! use composable_middleware_runtime::{apply_middleware, Store};
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = i64;
//!     type Action = i64;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut i64, action: i64, _env: &()) {
//!         *state += action;
//!     }
//! }
//!
//! // Drops any action that would push the counter past 10.
//! let cap: BoxedMiddleware<i64, i64, i64> = middleware(|api: &MiddlewareApi<i64, i64, i64>| {
//!     let api = api.clone();
//!     Ok(interceptor(move |next: Dispatch<i64, i64>| {
//!         let api = api.clone();
//!         move |action: i64| if api.get_state() + action > 10 { 0 } else { next(action) }
//!     }))
//! });
//!
//! let store = apply_middleware(vec![cap]).build(Store::new(0, CounterReducer, ()))?;
//! store.dispatch(7);
//! store.dispatch(7);
//! assert_eq!(store.get_state(), 7);
//! # Ok::<(), composable_middleware_core::MiddlewareError>(())
//! ```

/// Chain construction configuration
pub mod config;

/// Middleware chain construction (`apply_middleware`)
pub mod enhancer;

/// Metrics emitted during chain construction
pub mod metrics;

/// Reducer-backed terminal store
pub mod store;

pub use config::ChainConfig;
pub use enhancer::{apply_middleware, apply_middleware_with_config, Enhanced, Enhancer};
pub use store::Store;
