//! Reducer-backed terminal store
//!
//! [`Store`] is the plain state container a middleware chain usually wraps:
//! it owns the state, runs the reducer on dispatch, and returns the
//! dispatched action. It knows nothing about middleware.

use composable_middleware_core::{Dispatch, DispatchStore, GetState, Reducer};
use std::sync::{Arc, PoisonError, RwLock};

/// The Store - holds state and runs the reducer on every dispatched action
///
/// Cloning a `Store` yields another handle to the same state.
///
/// # Type Parameters
///
/// - `R`: Reducer implementation; state, action and environment types come from it
///
/// # Example
///
/// ```
/// use composable_middleware_core::{DispatchStore, Reducer};
/// use composable_middleware_runtime::Store;
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
///
/// let store = Store::new(0, CounterReducer, ());
/// store.dispatch(5);
/// assert_eq!(store.get_state(), 5);
/// ```
pub struct Store<R: Reducer> {
    state: Arc<RwLock<R::State>>,
    reducer: Arc<R>,
    environment: Arc<R::Environment>,
}

impl<R> Store<R>
where
    R: Reducer + Send + Sync + 'static,
    R::State: Clone + Send + Sync + 'static,
    R::Action: Clone + Send + 'static,
    R::Environment: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
        }
    }

    /// Read a projection of the current state without cloning all of it
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

impl<R> DispatchStore for Store<R>
where
    R: Reducer + Send + Sync + 'static,
    R::State: Clone + Send + Sync + 'static,
    R::Action: Clone + Send + 'static,
    R::Environment: Send + Sync + 'static,
{
    type State = R::State;
    type Action = R::Action;
    type Output = R::Action;

    fn get_state_fn(&self) -> GetState<R::State> {
        let state = Arc::clone(&self.state);

        Arc::new(move || state.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn dispatch_fn(&self) -> Dispatch<R::Action, R::Action> {
        let state = Arc::clone(&self.state);
        let reducer = Arc::clone(&self.reducer);
        let environment = Arc::clone(&self.environment);

        Arc::new(move |action: R::Action| {
            tracing::trace!("Running reducer");
            let mut state = state.write().unwrap_or_else(PoisonError::into_inner);
            reducer.reduce(&mut state, action.clone(), &environment);
            action
        })
    }
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
        }
    }
}

impl<R: Reducer> std::fmt::Debug for Store<R>
where
    R::State: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
