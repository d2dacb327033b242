//! Dispatch and chain construction benchmarks
//!
//! Measures:
//! - Composition overhead of plain unary functions
//! - Dispatch latency through chains of increasing length
//! - Cost of assembling a chain (attach + compose + bind)
//!
//! Run with: `cargo bench -p composable-middleware-runtime`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::unwrap_used)] // Benchmarks can unwrap during setup

use composable_middleware_core::{
    compose, interceptor, middleware, BoxedMiddleware, Dispatch, DispatchStore, Reducer, Unary,
};
use composable_middleware_runtime::{apply_middleware, apply_middleware_with_config, ChainConfig, Store};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const CHAIN_LENGTHS: [usize; 4] = [0, 1, 4, 16];

#[derive(Clone)]
struct BenchReducer;

impl Reducer for BenchReducer {
    type State = i64;
    type Action = i64;
    type Environment = ();

    fn reduce(&self, state: &mut i64, action: i64, _env: &()) {
        *state = state.wrapping_add(action);
    }
}

fn passthrough() -> BoxedMiddleware<i64, i64, i64> {
    middleware(|_api| Ok(interceptor(|next: Dispatch<i64, i64>| move |x: i64| next(x))))
}

fn chain(length: usize) -> Vec<BoxedMiddleware<i64, i64, i64>> {
    (0..length).map(|_| passthrough()).collect()
}

fn config() -> ChainConfig {
    ChainConfig::default().with_label("bench").with_metrics(false)
}

/// Benchmark right-to-left composition of plain functions
fn benchmark_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.throughput(Throughput::Elements(1));

    for length in CHAIN_LENGTHS {
        let funcs: Vec<Unary<i64>> = (0..length)
            .map(|i| Box::new(move |x: i64| x.wrapping_add(i64::try_from(i).unwrap())) as Unary<i64>)
            .collect();
        let composed = compose(funcs);

        group.bench_with_input(BenchmarkId::new("call", length), &length, |b, _| {
            b.iter(|| composed(black_box(1)));
        });
    }

    group.finish();
}

/// Benchmark dispatch through middleware chains of different lengths
fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("terminal_only", |b| {
        let store = Store::new(0, BenchReducer, ());
        b.iter(|| store.dispatch(black_box(1)));
    });

    for length in CHAIN_LENGTHS {
        let store = apply_middleware_with_config(chain(length), config())
            .build(Store::new(0, BenchReducer, ()))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("chain", length), &length, |b, _| {
            b.iter(|| store.dispatch(black_box(1)));
        });
    }

    group.finish();
}

/// Benchmark assembling a chain around a fresh store
fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for length in CHAIN_LENGTHS {
        let enhancer = apply_middleware(chain(length)).with_config(config());

        group.bench_with_input(BenchmarkId::new("build", length), &length, |b, _| {
            b.iter(|| enhancer.build(Store::new(0, BenchReducer, ())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compose,
    benchmark_dispatch,
    benchmark_construction
);
criterion_main!(benches);
