//! Basic usage examples for Pool

use stack_objectpool::{Pool, PoolConfiguration};

fn main() {
    println!("=== stack_objectpool - Basic Examples ===\n");

    // Example 1: Release and acquire
    lifo_reuse();

    // Example 2: Factory fallback
    factory_fallback();

    // Example 3: Configured pool with warm-up
    configured_pool();

    // Example 4: Shared global pool
    global_pool();

    // Example 5: Metrics
    metrics();
}

fn lifo_reuse() {
    println!("1. LIFO Reuse:");
    let pool = Pool::new();
    pool.release("first");
    pool.release("second");

    println!("   Got: {}", pool.acquire().unwrap());
    println!("   Got: {}", pool.acquire().unwrap());
    println!("   Remaining: {}\n", pool.count());
}

fn factory_fallback() {
    println!("2. Factory Fallback:");
    let pool: Pool<Vec<u8>> = Pool::new();

    match pool.acquire() {
        Ok(_) => println!("   Unexpected object"),
        Err(e) => println!("   Error: {}", e),
    }

    pool.set_factory(|| Vec::with_capacity(4096));
    let buffer = pool.acquire().unwrap();
    println!("   Built buffer with capacity {}", buffer.capacity());
    pool.release(buffer);
    println!("   Stored after release: {}\n", pool.count());
}

fn configured_pool() {
    println!("3. Configured Pool:");
    let config = PoolConfiguration::new()
        .with_initial_capacity(4)
        .with_factory(|| String::with_capacity(128))
        .with_warmup(4);

    let pool = Pool::with_config(config);
    println!("   Warmed: {}, capacity: {}", pool.count(), pool.capacity());

    pool.release(String::new());
    println!("   After one more release, capacity: {}\n", pool.capacity());
}

fn global_pool() {
    println!("4. Global Pool:");
    Pool::<Vec<u32>>::global().set_factory(Vec::new);

    let mut v = Pool::<Vec<u32>>::global().acquire().unwrap();
    v.push(1);
    v.clear();
    Pool::<Vec<u32>>::global().release(v);

    println!("   Global pool stores {}\n", Pool::<Vec<u32>>::global().count());
}

fn metrics() {
    println!("5. Metrics:");
    let pool = Pool::with_factory(|| 0u64);
    for i in 0..5 {
        pool.release(i);
    }
    for _ in 0..7 {
        pool.acquire().unwrap();
    }

    for (key, value) in pool.export_metrics() {
        println!("     {}: {}", key, value);
    }
}
