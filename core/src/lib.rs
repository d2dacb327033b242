//! # Composable Middleware Core
//!
//! Core traits and types for building middleware (interceptor) chains around a
//! store's dispatch function.
//!
//! This crate provides the pieces that do not depend on any runtime:
//!
//! - **Composer**: right-to-left function composition ([`compose()`], [`compose!`])
//! - **Store contract**: what a terminal store must expose ([`DispatchStore`])
//! - **Middleware API**: the capability object handed to every middleware
//!   factory ([`MiddlewareApi`]) and the [`Middleware`] trait itself
//! - **Errors**: [`MiddlewareError`]
//!
//! The chain builder that ties these together lives in the runtime crate
//! (`composable_middleware_runtime::apply_middleware`).
//!
//! ## Core Concepts
//!
//! - **Dispatch**: a call-entry point, `Fn(Action) -> Output`
//! - **Interceptor**: maps a `next` dispatch to a new dispatch
//! - **Middleware**: a factory that receives the [`MiddlewareApi`] once and
//!   returns an interceptor
//! - **Forwarding dispatch**: the API member that re-enters the whole chain
//!   from the outside once construction has finished
//!
//! ## Example
//!
//! ```
//! use composable_middleware_core::middleware::{interceptor, middleware, BoxedMiddleware};
//! use composable_middleware_core::store::Dispatch;
//!
//! // Adds one to whatever the rest of the chain returns.
//! let add_one: BoxedMiddleware<(), i64, i64> = middleware(|_api| {
//!     Ok(interceptor(|next: Dispatch<i64, i64>| move |x: i64| next(x) + 1))
//! });
//! # let _ = add_one;
//! ```

/// Right-to-left function composition
pub mod compose;

/// Declarative composition macro
pub mod compose_macros;

/// Error types shared by the chain builder and middleware
pub mod error;

/// Middleware trait and the capability object passed to factories
pub mod middleware;

/// Terminal store contract and the reducer shape it is usually built from
pub mod store;

// Re-export commonly used types
pub use compose::{compose, compose2, identity, Unary};
pub use error::MiddlewareError;
pub use middleware::{interceptor, middleware, BoxedMiddleware, Interceptor, Middleware, MiddlewareApi};
pub use store::{Dispatch, DispatchStore, GetState, Reducer};
