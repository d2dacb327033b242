//! Integration tests for enhancing the reducer-backed `Store`
//!
//! Exercises the chain builder against a real reducer: logging, validation,
//! action rewriting, configuration and store factories.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use composable_middleware_core::{
    interceptor, middleware, BoxedMiddleware, Dispatch, DispatchStore, MiddlewareApi, MiddlewareError,
    Reducer,
};
use composable_middleware_runtime::{apply_middleware, apply_middleware_with_config, ChainConfig, Store};
use composable_middleware_testing::{init_test_tracing, ChainTest};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Domain: Inventory
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct InventoryState {
    on_hand: u32,
    rejected: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum InventoryAction {
    Restock(u32),
    Ship(u32),
    Rejected,
}

struct InventoryEnvironment {
    max_on_hand: u32,
}

struct InventoryReducer;

impl Reducer for InventoryReducer {
    type State = InventoryState;
    type Action = InventoryAction;
    type Environment = InventoryEnvironment;

    fn reduce(&self, state: &mut InventoryState, action: InventoryAction, env: &InventoryEnvironment) {
        match action {
            InventoryAction::Restock(amount) => {
                state.on_hand = (state.on_hand + amount).min(env.max_on_hand);
            }
            InventoryAction::Ship(amount) => state.on_hand = state.on_hand.saturating_sub(amount),
            InventoryAction::Rejected => state.rejected += 1,
        }
    }
}

type InventoryStore = Store<InventoryReducer>;
type InventoryMiddleware = BoxedMiddleware<InventoryState, InventoryAction, InventoryAction>;

fn inventory_store(on_hand: u32) -> InventoryStore {
    Store::new(
        InventoryState {
            on_hand,
            rejected: 0,
        },
        InventoryReducer,
        InventoryEnvironment { max_on_hand: 100 },
    )
}

/// Records `(action, on_hand before, on_hand after)` for every dispatch
fn audit_log(entries: &Arc<Mutex<Vec<(InventoryAction, u32, u32)>>>) -> InventoryMiddleware {
    let entries = Arc::clone(entries);

    middleware(move |api: &MiddlewareApi<InventoryState, InventoryAction, InventoryAction>| {
        let api = api.clone();
        let entries = Arc::clone(&entries);

        Ok(interceptor(move |next: Dispatch<InventoryAction, InventoryAction>| {
            let api = api.clone();
            let entries = Arc::clone(&entries);

            move |action: InventoryAction| {
                let before = api.get_state().on_hand;
                let output = next(action.clone());
                let after = api.get_state().on_hand;
                entries.lock().unwrap().push((action, before, after));
                output
            }
        }))
    })
}

/// Turns a shipment larger than stock into a `Rejected` action, re-entering the chain
fn stock_guard() -> InventoryMiddleware {
    middleware(|api: &MiddlewareApi<InventoryState, InventoryAction, InventoryAction>| {
        let api = api.clone();

        Ok(interceptor(move |next: Dispatch<InventoryAction, InventoryAction>| {
            let api = api.clone();

            move |action: InventoryAction| match action {
                InventoryAction::Ship(amount) if amount > api.get_state().on_hand => {
                    api.dispatch(InventoryAction::Rejected).unwrap_or(InventoryAction::Rejected)
                }
                other => next(other),
            }
        }))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_logging_middleware_sees_state_around_reducer() {
    init_test_tracing();
    let entries = Arc::new(Mutex::new(Vec::new()));

    let store = apply_middleware(vec![audit_log(&entries)])
        .build(inventory_store(10))
        .unwrap();

    assert_eq!(store.dispatch(InventoryAction::Ship(4)), InventoryAction::Ship(4));
    store.dispatch(InventoryAction::Restock(200));

    assert_eq!(
        *entries.lock().unwrap(),
        [
            (InventoryAction::Ship(4), 10, 6),
            (InventoryAction::Restock(200), 6, 100),
        ]
    );
    assert_eq!(store.state(|s| s.on_hand), 100);
}

#[test]
fn test_guard_rewrites_action_through_whole_chain() {
    let entries = Arc::new(Mutex::new(Vec::new()));

    let store = apply_middleware(vec![audit_log(&entries), stock_guard()])
        .build(inventory_store(3))
        .unwrap();

    let output = store.dispatch(InventoryAction::Ship(5));

    assert_eq!(output, InventoryAction::Rejected);
    assert_eq!(
        store.get_state(),
        InventoryState {
            on_hand: 3,
            rejected: 1,
        }
    );
    // The rewritten action passed the audit log before the original finished.
    assert_eq!(
        *entries.lock().unwrap(),
        [
            (InventoryAction::Rejected, 3, 3),
            (InventoryAction::Ship(5), 3, 3),
        ]
    );
}

#[test]
fn test_chain_test_over_store() {
    ChainTest::new()
        .given_store(inventory_store(0))
        .with_middleware(stock_guard())
        .when_dispatched(InventoryAction::Restock(5))
        .when_dispatched(InventoryAction::Ship(2))
        .when_dispatched(InventoryAction::Ship(9))
        .then_outputs(|outputs| {
            assert_eq!(
                outputs,
                &[
                    InventoryAction::Restock(5),
                    InventoryAction::Ship(2),
                    InventoryAction::Rejected,
                ]
            );
        })
        .then_state(|state| {
            assert_eq!(state.on_hand, 3);
            assert_eq!(state.rejected, 1);
        })
        .run();
}

#[test]
fn test_traced_dispatch_behaves_identically() {
    init_test_tracing();

    let config = ChainConfig::default()
        .with_label("inventory")
        .with_trace_dispatch(true)
        .with_metrics(false);

    let enhancer = apply_middleware_with_config(vec![stock_guard()], config);
    assert_eq!(enhancer.config().label, "inventory");
    assert_eq!(enhancer.len(), 1);

    let store = enhancer.build(inventory_store(1)).unwrap();

    assert_eq!(store.dispatch(InventoryAction::Ship(2)), InventoryAction::Rejected);
    assert_eq!(store.dispatch(InventoryAction::Ship(1)), InventoryAction::Ship(1));
    assert_eq!(store.get_state().on_hand, 0);
}

#[test]
fn test_enhanced_store_factory() {
    let enhancer = apply_middleware(vec![stock_guard()]).with_config(ChainConfig::new("factory", false, false));

    let create = enhancer.enhance(|on_hand: u32| -> Result<InventoryStore, MiddlewareError> {
        if on_hand > 100 {
            return Err(anyhow::anyhow!("opening stock {on_hand} exceeds capacity").into());
        }
        Ok(inventory_store(on_hand))
    });

    let store = create(7).unwrap();
    assert_eq!(store.dispatch(InventoryAction::Ship(8)), InventoryAction::Rejected);

    let error = create(500).unwrap_err();
    assert_eq!(error.to_string(), "opening stock 500 exceeds capacity");
}

#[test]
fn test_store_handle_shares_state_with_enhanced() {
    let terminal = inventory_store(0);
    let handle = terminal.clone();

    let store = apply_middleware(vec![stock_guard()]).build(terminal).unwrap();
    store.dispatch(InventoryAction::Restock(4));

    // Dispatching on the handle bypasses the chain, so the guard never rejects it.
    assert_eq!(handle.dispatch(InventoryAction::Ship(9)), InventoryAction::Ship(9));
    assert_eq!(
        store.get_state(),
        InventoryState {
            on_hand: 0,
            rejected: 0,
        }
    );
}
