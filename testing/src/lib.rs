//! # Composable Middleware Testing
//!
//! Testing utilities and helpers for middleware chains.
//!
//! This crate provides:
//! - A terminal store whose dispatch is any closure ([`TestStore`])
//! - A shared tag log and a middleware that records before/after tags
//!   ([`TagLog`], [`tagging_middleware`])
//! - A fluent Given-When-Then helper for chains ([`ChainTest`])
//! - Tracing setup for tests ([`init_test_tracing`])
//!
//! ## Example
//!
//! ```
//! use composable_middleware_testing::{tagging_middleware, ChainTest, TagLog, TestStore};
//!
//! let log = TagLog::new();
//! let terminal_log = log.clone();
//!
//! ChainTest::new()
//!     .given_store(TestStore::new((), move |x: i32| {
//!         terminal_log.push("terminal");
//!         x
//!     }))
//!     .with_middleware(tagging_middleware("m1", &log))
//!     .with_middleware(tagging_middleware("m2", &log))
//!     .when_dispatched(1)
//!     .then_outputs(|outputs| assert_eq!(outputs, &[1]))
//!     .run();
//!
//! assert_eq!(log.entries(), ["m1-before", "m2-before", "terminal", "m2-after", "m1-after"]);
//! ```


/// Mock implementations for testing.
pub mod mocks {
    use composable_middleware_core::middleware::{interceptor, middleware, BoxedMiddleware, MiddlewareApi};
    use composable_middleware_core::store::{Dispatch, DispatchStore, GetState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Terminal store for tests
    ///
    /// Holds a state value behind a mutex and counts how often its own
    /// (terminal) dispatch ran, which is how short-circuiting is observed.
    ///
    /// # Example
    ///
    /// ```
    /// use composable_middleware_core::DispatchStore;
    /// use composable_middleware_testing::mocks::TestStore;
    ///
    /// let store = TestStore::reducing(0_i64, |state: &mut i64, x: i64| {
    ///     *state += x;
    ///     *state
    /// });
    ///
    /// assert_eq!(store.dispatch(2), 2);
    /// assert_eq!(store.dispatch(3), 5);
    /// assert_eq!(store.calls(), 2);
    /// ```
    pub struct TestStore<S, A, R> {
        state: Arc<Mutex<S>>,
        dispatch: Dispatch<A, R>,
        calls: Arc<AtomicUsize>,
    }

    impl<S, A, R> TestStore<S, A, R>
    where
        S: Clone + Send + 'static,
        A: 'static,
        R: 'static,
    {
        /// Create a store with fixed state and a stateless dispatch
        #[must_use]
        pub fn new<F>(state: S, dispatch: F) -> Self
        where
            F: Fn(A) -> R + Send + Sync + 'static,
        {
            Self::reducing(state, move |_state: &mut S, action: A| dispatch(action))
        }

        /// Create a store whose dispatch may update the state
        #[must_use]
        pub fn reducing<F>(initial_state: S, reduce: F) -> Self
        where
            F: Fn(&mut S, A) -> R + Send + Sync + 'static,
        {
            let state = Arc::new(Mutex::new(initial_state));
            let calls = Arc::new(AtomicUsize::new(0));

            let dispatch = {
                let state = Arc::clone(&state);
                let calls = Arc::clone(&calls);
                Arc::new(move |action: A| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    reduce(&mut *state, action)
                })
            };

            Self {
                state,
                dispatch,
                calls,
            }
        }

        /// Replace the state from outside the chain
        pub fn set_state(&self, state: S) {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        }

        /// How many times the terminal dispatch ran
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl<S, A, R> DispatchStore for TestStore<S, A, R>
    where
        S: Clone + Send + 'static,
        A: 'static,
        R: 'static,
    {
        type State = S;
        type Action = A;
        type Output = R;

        fn get_state_fn(&self) -> GetState<S> {
            let state = Arc::clone(&self.state);
            Arc::new(move || state.lock().unwrap_or_else(PoisonError::into_inner).clone())
        }

        fn dispatch_fn(&self) -> Dispatch<A, R> {
            Arc::clone(&self.dispatch)
        }
    }

    impl<S, A, R> std::fmt::Debug for TestStore<S, A, R>
    where
        S: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TestStore")
                .field("state", &self.state)
                .field("calls", &self.calls)
                .finish_non_exhaustive()
        }
    }

    /// Shared, ordered log of tags
    #[derive(Debug, Clone, Default)]
    pub struct TagLog {
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl TagLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Append a tag
        pub fn push(&self, tag: impl Into<String>) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(tag.into());
        }

        /// Snapshot of every tag so far, oldest first
        #[must_use]
        pub fn entries(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Remove every tag
        pub fn clear(&self) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    /// Middleware that logs `"{tag}-before"`, calls `next`, then logs `"{tag}-after"`
    #[must_use]
    pub fn tagging_middleware<S, A, R>(tag: &str, log: &TagLog) -> BoxedMiddleware<S, A, R>
    where
        S: 'static,
        A: 'static,
        R: 'static,
    {
        let tag = tag.to_owned();
        let log = log.clone();

        middleware(move |_api: &MiddlewareApi<S, A, R>| {
            let tag = tag.clone();
            let log = log.clone();

            Ok(interceptor(move |next: Dispatch<A, R>| {
                let tag = tag.clone();
                let log = log.clone();

                move |action: A| {
                    log.push(format!("{tag}-before"));
                    let output = next(action);
                    log.push(format!("{tag}-after"));
                    output
                }
            }))
        })
    }
}

/// Install a `fmt` subscriber for tests
///
/// Honors `RUST_LOG`, defaults to `warn`, and writes through the test
/// harness so output is captured per test. Safe to call from every test.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use chain_test::ChainTest;
pub use mocks::{tagging_middleware, TagLog, TestStore};
