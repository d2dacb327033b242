//! # Counter Middleware Example
//!
//! A counter store wrapped in three middleware:
//!
//! - [`logger`]: logs every action with the state before and after it
//! - [`upper_bound`]: drops increments that would push the count past a limit
//! - [`deferred`]: turns `IncrementLater` into a delayed `Increment`
//!   dispatched through the whole chain from a spawned task
//!
//! ## Example
//!
//! ```
//! use counter_middleware::{counter_store, CounterAction};
//!
//! let store = counter_store(3)?;
//!
//! for _ in 0..5 {
//!     store.dispatch(CounterAction::Increment);
//! }
//! assert_eq!(store.state(|s| s.count), 3);
//! # Ok::<(), composable_middleware_core::MiddlewareError>(())
//! ```

use composable_middleware_core::{
    interceptor, middleware, BoxedMiddleware, Dispatch, MiddlewareApi, MiddlewareError, Reducer,
};
use composable_middleware_runtime::{apply_middleware_with_config, ChainConfig, Enhanced, Store};
use std::time::Duration;

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current count value
    pub count: i64,
}

/// Counter actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterAction {
    /// Increment the counter by 1
    Increment,
    /// Decrement the counter by 1
    Decrement,
    /// Reset the counter to 0
    Reset,
    /// Increment by 1 after a delay
    ///
    /// Handled entirely by [`deferred`]; the reducer ignores it.
    IncrementLater(Duration),
}

/// Counter reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;
    type Environment = ();

    fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) {
        match action {
            CounterAction::Increment => state.count += 1,
            CounterAction::Decrement => state.count -= 1,
            CounterAction::Reset => state.count = 0,
            CounterAction::IncrementLater(_) => {}
        }
    }
}

/// Middleware over the counter store
pub type CounterMiddleware = BoxedMiddleware<CounterState, CounterAction, CounterAction>;

/// The enhanced counter store
pub type CounterStore = Enhanced<Store<CounterReducer>>;

type CounterApi = MiddlewareApi<CounterState, CounterAction, CounterAction>;
type CounterDispatch = Dispatch<CounterAction, CounterAction>;

/// Log every action with the count before and after it
#[must_use]
pub fn logger() -> CounterMiddleware {
    middleware(|api: &CounterApi| {
        let api = api.clone();

        Ok(interceptor(move |next: CounterDispatch| {
            let api = api.clone();

            move |action: CounterAction| {
                let before = api.get_state().count;
                tracing::info!(?action, before, "Dispatching");
                let output = next(action);
                tracing::info!(after = api.get_state().count, "Dispatched");
                output
            }
        }))
    })
}

/// Drop any `Increment` once the count has reached `limit`
#[must_use]
pub fn upper_bound(limit: i64) -> CounterMiddleware {
    middleware(move |api: &CounterApi| {
        let api = api.clone();

        Ok(interceptor(move |next: CounterDispatch| {
            let api = api.clone();

            move |action: CounterAction| {
                if action == CounterAction::Increment && api.get_state().count >= limit {
                    tracing::warn!(limit, "Increment dropped at upper bound");
                    return action;
                }
                next(action)
            }
        }))
    })
}

/// Turn `IncrementLater(delay)` into an `Increment` dispatched after `delay`
///
/// The follow-up goes through the forwarding dispatch, so it passes every
/// middleware again. Outside a Tokio runtime the increment is dispatched
/// immediately instead.
#[must_use]
pub fn deferred() -> CounterMiddleware {
    middleware(|api: &CounterApi| {
        let api = api.clone();

        Ok(interceptor(move |next: CounterDispatch| {
            let api = api.clone();

            move |action: CounterAction| {
                let CounterAction::IncrementLater(delay) = action else {
                    return next(action);
                };

                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        let api = api.clone();
                        handle.spawn(async move {
                            tokio::time::sleep(delay).await;
                            if let Err(error) = api.dispatch(CounterAction::Increment) {
                                tracing::warn!(%error, "Deferred increment dropped");
                            }
                        });
                    }
                    Err(_) => {
                        tracing::debug!("No async runtime, incrementing immediately");
                        if let Err(error) = api.dispatch(CounterAction::Increment) {
                            tracing::warn!(%error, "Immediate increment dropped");
                        }
                    }
                }

                action
            }
        }))
    })
}

/// Build the counter store with `logger`, `upper_bound(limit)` and `deferred`
///
/// # Errors
///
/// Returns [`MiddlewareError`] if chain construction fails.
pub fn counter_store(limit: i64) -> Result<CounterStore, MiddlewareError> {
    let config = ChainConfig::default()
        .with_label("counter")
        .with_trace_dispatch(true);

    apply_middleware_with_config(vec![logger(), upper_bound(limit), deferred()], config)
        .build(Store::new(CounterState::default(), CounterReducer, ()))
}
