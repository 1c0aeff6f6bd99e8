//! Keyed pool example

use stack_objectpool::{KeyedFactory, KeyedPool};
use std::sync::Arc;

struct Connection {
    host: String,
}

struct Connector;

impl KeyedFactory<String, Connection> for Connector {
    fn create_object(&self, host: &String) -> Connection {
        println!("   Connecting to {}", host);
        Connection { host: host.clone() }
    }
}

fn main() {
    println!("=== stack_objectpool - Keyed Pool ===\n");

    let pool = KeyedPool::new(Connector);
    let hosts = ["db-1", "db-2", "db-1", "db-1"];

    let first = pool.get(&hosts[0].to_string());
    for host in hosts {
        let conn = pool.get(&host.to_string());
        println!("   Using connection to {} (shared: {})", conn.host, Arc::ptr_eq(&conn, &first));
    }

    println!("   Distinct connections: {}", pool.len());
}
