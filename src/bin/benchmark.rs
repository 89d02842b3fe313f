//! Latency and throughput benchmark over seeded random order flow.
//!
//! Usage: `benchmark [--orders <N>]` (default 1,000,000).

use std::time::Instant;

use hdrhistogram::Histogram;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use matchbook::{MatchingEngine, OrderId, OrderType, Price, Quantity, Side};

const CENTER_PRICE: Price = 10000;
const SPREAD_TICKS: i64 = 100;

#[derive(Clone, Copy, Debug)]
enum GeneratedOrder {
    New {
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    },
    Cancel {
        order_id: OrderId,
    },
}

/// Seeded command-stream generator; identical seeds produce identical flow.
struct OrderGenerator {
    rng: ChaCha8Rng,
}

impl OrderGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a batch of random commands. `cancel_pct` of entries are
    /// cancels of previously generated ids; `market_pct` of the new
    /// orders are market instead of limit.
    fn generate(&mut self, count: usize, cancel_pct: u32, market_pct: u32) -> Vec<GeneratedOrder> {
        let mut orders = Vec::with_capacity(count);
        let mut max_id: OrderId = 0;

        for _ in 0..count {
            if max_id > 0 && self.rng.gen_range(0..100) < cancel_pct {
                orders.push(GeneratedOrder::Cancel {
                    order_id: self.rng.gen_range(1..=max_id),
                });
                continue;
            }

            let side = if self.rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            let quantity = self.rng.gen_range(1..=1000);

            let order = if self.rng.gen_range(0..100) < market_pct {
                GeneratedOrder::New {
                    side,
                    order_type: OrderType::Market,
                    price: 0,
                    quantity,
                }
            } else {
                GeneratedOrder::New {
                    side,
                    order_type: OrderType::Limit,
                    price: CENTER_PRICE + self.rng.gen_range(-SPREAD_TICKS..=SPREAD_TICKS),
                    quantity,
                }
            };
            orders.push(order);
            max_id += 1;
        }

        orders
    }
}

struct BenchResult {
    throughput: f64,
    mean_ns: f64,
    p50_ns: u64,
    p95_ns: u64,
    p99_ns: u64,
    p999_ns: u64,
    total_trades: u64,
}

fn run_benchmark(orders: &[GeneratedOrder]) -> BenchResult {
    let mut engine = MatchingEngine::new();
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).unwrap();

    let total_start = Instant::now();

    for order in orders {
        let start = Instant::now();
        match *order {
            GeneratedOrder::New {
                side,
                order_type,
                price,
                quantity,
            } => {
                std::hint::black_box(engine.process_order(side, order_type, price, quantity));
            }
            GeneratedOrder::Cancel { order_id } => {
                std::hint::black_box(engine.cancel_order(order_id));
            }
        }
        histogram.record(start.elapsed().as_nanos() as u64).unwrap_or(());
    }

    let total_sec = total_start.elapsed().as_secs_f64();

    BenchResult {
        throughput: orders.len() as f64 / total_sec,
        mean_ns: histogram.mean(),
        p50_ns: histogram.value_at_quantile(0.50),
        p95_ns: histogram.value_at_quantile(0.95),
        p99_ns: histogram.value_at_quantile(0.99),
        p999_ns: histogram.value_at_quantile(0.999),
        total_trades: engine.trade_count(),
    }
}

fn print_result(label: &str, r: &BenchResult, order_count: usize) {
    println!("\n=== {label} ===");
    println!("Orders:     {order_count}");
    println!("Trades:     {}", r.total_trades);
    println!("Throughput: {:.0} orders/sec", r.throughput);
    println!("Latency (ns):");
    println!("  mean:  {:.1}", r.mean_ns);
    println!("  p50:   {}", r.p50_ns);
    println!("  p95:   {}", r.p95_ns);
    println!("  p99:   {}", r.p99_ns);
    println!("  p99.9: {}", r.p999_ns);
}

/// Pin to the last available core; it tends to see the fewest interrupts.
fn pin_to_core() {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last_core) = core_ids.last() {
            core_affinity::set_for_current(*last_core);
        }
    }
}

fn main() {
    let mut order_count: usize = 1_000_000;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--orders" && i + 1 < args.len() {
            order_count = args[i + 1].parse().expect("--orders takes a number");
            i += 1;
        }
        i += 1;
    }

    pin_to_core();

    println!("Generating {order_count} random orders...");
    let mut gen = OrderGenerator::new(42);

    let mixed = gen.generate(order_count, 5, 10);
    let mixed_result = run_benchmark(&mixed);
    print_result("Mixed Workload (5% cancel, 10% market)", &mixed_result, order_count);

    let limit_only = gen.generate(order_count, 0, 0);
    let limit_result = run_benchmark(&limit_only);
    print_result("Pure Limit Orders", &limit_result, order_count);

    let cancel_heavy = gen.generate(order_count, 30, 5);
    let cancel_result = run_benchmark(&cancel_heavy);
    print_result("High Cancel Rate (30%)", &cancel_result, order_count);
}
