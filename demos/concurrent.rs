//! Demo of concurrent inserts, reads, removes and transparent resizing.

use petek::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("=== petek: lock-free resizable hash map demo ===\n");

    // Start small so growth is visible.
    let map = Arc::new(HashMap::with_options(16, 0.65, true));
    println!(
        "initial capacity {} (resize after {} inserts)\n",
        map.capacity(),
        map.next_resize()
    );

    // Concurrent inserts from 8 threads.
    println!("inserting from 8 threads...");
    let start = Instant::now();
    let mut handles = Vec::new();
    for thread_id in 0..8i64 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for i in 0..10_000 {
                let key = thread_id * 10_000 + i;
                map.insert(key, key * 2);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    let duration = start.elapsed();
    println!(
        "inserted 80,000 entries in {:?} ({:.0} ops/sec)",
        duration,
        80_000.0 / duration.as_secs_f64()
    );
    println!(
        "map now holds {} entries in {} buckets\n",
        map.len(),
        map.capacity()
    );

    // Concurrent reads.
    println!("reading from 8 threads...");
    let start = Instant::now();
    let mut handles = Vec::new();
    for thread_id in 0..8i64 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            let mut hits = 0;
            for i in 0..10_000 {
                let key = thread_id * 10_000 + i;
                if map.get(&key) == Some(key * 2) {
                    hits += 1;
                }
            }
            hits
        }));
    }
    let hits: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let duration = start.elapsed();
    println!(
        "read 80,000 entries in {:?} ({} hits)\n",
        duration, hits
    );

    // Concurrent removes of every other entry.
    println!("removing every other entry from 8 threads...");
    let mut handles = Vec::new();
    for thread_id in 0..8i64 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for i in (0..10_000).step_by(2) {
                let key = thread_id * 10_000 + i;
                map.remove(&key);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    println!("map now holds {} entries\n", map.len());

    // Views.
    let evens = map.keys().iter().filter(|k| k % 2 == 0).count();
    println!("even keys left: {evens}");
    println!("contains_value(3):  {}", map.contains_value(&3));
    println!("contains_value(42): {}", map.contains_value(&42));
}
