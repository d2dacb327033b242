//! Counter middleware example binary
//!
//! Builds the counter store, sends a few actions through the middleware
//! chain, waits for a deferred increment and prints the construction metrics.

use composable_middleware_runtime::metrics::register_metrics;
use counter_middleware::{counter_store, CounterAction};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter_middleware=info,composable_middleware_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Metrics are rendered at the end instead of served over HTTP
    let metrics = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    println!("=== Counter Example: Middleware Chain ===\n");

    let store = counter_store(3)?;
    println!("Initial count: {}", store.state(|s| s.count));

    for action in [
        CounterAction::Increment,
        CounterAction::Increment,
        CounterAction::Decrement,
        CounterAction::Increment,
        CounterAction::Increment,
        CounterAction::Increment,
    ] {
        println!("\n>>> Dispatching: {action:?}");
        store.dispatch(action);
        println!("Count: {}", store.state(|s| s.count));
    }

    println!("\n>>> Dispatching: Reset, then IncrementLater(100ms)");
    store.dispatch(CounterAction::Reset);
    store.dispatch(CounterAction::IncrementLater(Duration::from_millis(100)));
    println!("Count right after: {}", store.state(|s| s.count));

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("Count after the delay: {}", store.state(|s| s.count));

    println!("\n=== Metrics ===\n");
    println!("{}", metrics.render());

    Ok(())
}
