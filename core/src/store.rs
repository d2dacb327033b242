//! Terminal store contract
//!
//! A middleware chain wraps the dispatch function of some store. The store
//! itself (how state is held, how actions are validated, who gets notified)
//! is not this crate's concern: anything that can hand out a state accessor
//! and a dispatch function qualifies.
//!
//! Both are shared function handles (`Arc<dyn Fn ..>`) rather than methods so
//! that the chain builder can capture them in closures that outlive the
//! borrow of the store.

use std::sync::Arc;

/// A call-entry point: takes one action, returns one output synchronously.
pub type Dispatch<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// A zero-argument state accessor.
pub type GetState<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// A store whose dispatch can be wrapped by middleware
///
/// # Example
///
/// ```
/// use composable_middleware_core::store::{Dispatch, DispatchStore, GetState};
/// use std::sync::Arc;
///
/// struct Doubler;
///
/// impl DispatchStore for Doubler {
///     type State = ();
///     type Action = i64;
///     type Output = i64;
///
///     fn get_state_fn(&self) -> GetState<()> {
///         Arc::new(|| ())
///     }
///
///     fn dispatch_fn(&self) -> Dispatch<i64, i64> {
///         Arc::new(|x| x * 2)
///     }
/// }
///
/// assert_eq!(Doubler.dispatch(21), 42);
/// ```
pub trait DispatchStore {
    /// Snapshot type returned by the state accessor
    type State;

    /// Input accepted by dispatch
    type Action;

    /// Value returned by dispatch
    type Output;

    /// The store's state accessor
    ///
    /// Must observe later state changes: callers keep the handle and call it
    /// long after this method returned.
    fn get_state_fn(&self) -> GetState<Self::State>;

    /// The store's dispatch function
    fn dispatch_fn(&self) -> Dispatch<Self::Action, Self::Output>;

    /// Read the current state
    fn get_state(&self) -> Self::State {
        (self.get_state_fn())()
    }

    /// Dispatch an action
    fn dispatch(&self, action: Self::Action) -> Self::Output {
        (self.dispatch_fn())(action)
    }
}

/// The Reducer trait - business logic behind a store
///
/// Reducers are pure state transitions: `(State, Action, Environment) → State`.
/// They never see middleware; the chain runs before the reducer is reached.
///
/// # Example
///
/// ```
/// use composable_middleware_core::store::Reducer;
///
/// struct CounterReducer;
///
/// impl Reducer for CounterReducer {
///     type State = i64;
///     type Action = i64;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut i64, action: i64, _env: &()) {
///         *state += action;
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Apply an action to the state in place
    fn reduce(&self, state: &mut Self::State, action: Self::Action, env: &Self::Environment);
}
