//! Async usage examples

use stack_objectpool::Pool;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    println!("=== stack_objectpool - Async Examples ===\n");

    // Example 1: Async acquire with a slow factory
    slow_factory().await;

    // Example 2: Async warm-up
    async_warmup().await;

    // Example 3: Concurrent access
    concurrent_access().await;
}

async fn slow_factory() {
    println!("1. Slow Factory:");
    let pool = Pool::with_factory(|| {
        std::thread::sleep(Duration::from_millis(50));
        vec![0u8; 1 << 20]
    });

    let buffer = pool.acquire_async().await.unwrap();
    println!("   Built {} bytes off the async workers", buffer.len());
    pool.release(buffer);
    println!();
}

async fn async_warmup() {
    println!("2. Async Warm-up:");
    let pool = Pool::with_factory(|| String::with_capacity(64));
    pool.warmup_async(8).await.unwrap();
    println!("   Warmed: {}\n", pool.count());
}

async fn concurrent_access() {
    println!("3. Concurrent Access:");
    let pool = Arc::new(Pool::with_factory(|| 0u32));

    let mut handles = vec![];
    for _ in 0..10 {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            let n = pool.acquire_async().await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            pool.release(n + 1);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let metrics = pool.get_metrics();
    println!("   Acquired: {}, built: {}, stored: {}",
        metrics.total_acquired, metrics.factory_created, metrics.available_objects);
}
