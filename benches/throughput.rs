//! Throughput benchmarks for bulk order signing.
//!
//! Run with: `cargo bench --bench throughput`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use rust_decimal::Decimal;

use dydx_core::{NetworkId, OrderSide, Signable, SignableOrder, MARKETS};
use stark_crypto::StarkPrivateKey;

const MOCK_PRIVATE_KEY: &str = "0x58c7d5a90b1776bde86ebac077e053ed85b0f7164f53b080304a531947f46e3";

/// Generate a batch of random orders across the market table.
fn generate_order_batch(count: usize) -> Vec<SignableOrder> {
    let mut rng = rand::thread_rng();
    let mut orders = Vec::with_capacity(count);

    while orders.len() < count {
        let market = &MARKETS[rng.gen_range(0..MARKETS.len())];
        let side = if rng.gen_bool(0.5) {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };

        let order = SignableOrder::builder(NetworkId::Mainnet)
            .market(market.symbol)
            .side(side)
            .position_id(rng.gen_range(1..1_000_000))
            .size(Decimal::new(rng.gen_range(1..1000), 0))
            .price(Decimal::new(rng.gen_range(1..10_000_000), 2))
            .limit_fee(Decimal::new(rng.gen_range(0..50), 4))
            .nonce(rng.gen())
            .expiration(rng.gen_range(1_600_000_000..1_800_000_000))
            .build();

        // Some random size/price pairs overflow a quantum field; skip them.
        if let Ok(order) = order {
            orders.push(order);
        }
    }

    orders
}

/// Benchmark sequential order signing.
fn bench_sequential_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_signing");
    group.sample_size(10);
    let key = StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap();

    for order_count in [10, 50, 100].iter() {
        let orders = generate_order_batch(*order_count);

        group.throughput(Throughput::Elements(*order_count as u64));
        group.bench_with_input(
            BenchmarkId::new("sequential", order_count),
            &orders,
            |b, orders| {
                b.iter(|| {
                    let signatures: Vec<_> = orders.iter().map(|order| order.sign(&key)).collect();
                    black_box(signatures)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark parallel order signing using rayon.
fn bench_parallel_signing(c: &mut Criterion) {
    use rayon::prelude::*;

    let mut group = c.benchmark_group("parallel_order_signing");
    group.sample_size(10);
    let key = StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap();

    for order_count in [100, 500, 1000].iter() {
        let orders = generate_order_batch(*order_count);

        group.throughput(Throughput::Elements(*order_count as u64));
        group.bench_with_input(
            BenchmarkId::new("parallel", order_count),
            &orders,
            |b, orders| {
                b.iter(|| {
                    let signatures: Vec<_> =
                        orders.par_iter().map(|order| order.sign(&key)).collect();
                    black_box(signatures)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark parallel verification against one public key.
fn bench_parallel_verification(c: &mut Criterion) {
    use rayon::prelude::*;

    let mut group = c.benchmark_group("parallel_verification");
    group.sample_size(10);
    let key = StarkPrivateKey::from_hex(MOCK_PRIVATE_KEY).unwrap();
    let public_key = key.public_key().unwrap();

    for order_count in [100, 500].iter() {
        let signed: Vec<_> = generate_order_batch(*order_count)
            .into_iter()
            .map(|order| {
                let signature = order.sign(&key).unwrap();
                (order, signature)
            })
            .collect();

        group.throughput(Throughput::Elements(*order_count as u64));
        group.bench_with_input(
            BenchmarkId::new("verify", order_count),
            &signed,
            |b, signed| {
                b.iter(|| {
                    let valid = signed
                        .par_iter()
                        .filter(|(order, signature)| {
                            order.verify(&public_key, signature).unwrap_or(false)
                        })
                        .count();
                    black_box(valid)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_signing,
    bench_parallel_signing,
    bench_parallel_verification,
);

criterion_main!(benches);
