// Demo binary - the library lives in lib.rs
// Run examples with: cargo run --example basic

use stack_objectpool::{Pool, PoolError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== stack_objectpool ===");
    println!("Run: cargo run --example basic");
    println!();

    println!("Quick Demo:");
    let pool = Pool::new();
    for i in 0..12 {
        pool.release(i);
    }
    println!("  Stored: {}, capacity: {}", pool.count(), pool.capacity());

    match pool.acquire() {
        Ok(obj) => println!("  Got object: {}", obj),
        Err(e) => println!("  Error: {}", e),
    }

    while pool.try_acquire().is_some() {}
    if let Err(PoolError::EmptyPoolNoFactory) = pool.acquire() {
        println!("  Drained pool has no factory: acquire fails");
    }

    pool.set_factory(|| -1);
    println!("  With factory: {:?}", pool.acquire());
}
