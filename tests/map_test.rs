mod common;

use common::{IdentityState, SAME_BUCKET_KEYS};
use petek::{HashMap, DEFAULT_INITIAL_CAPACITY};

fn same_bucket_map() -> HashMap<i32, i32, IdentityState> {
    HashMap::with_options_and_hasher(16, 0.8, false, IdentityState)
}

#[test]
fn test_init() {
    let map: HashMap<i32, i32> = HashMap::new();
    assert_eq!(map.capacity(), DEFAULT_INITIAL_CAPACITY);
    assert_eq!(map.next_resize(), 83); // 128 * 0.65
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());

    // Capacity is rounded up to a power of two.
    let map: HashMap<i32, i32> = HashMap::with_options(40, 0.8, false);
    assert_eq!(map.capacity(), 64);
    assert_eq!(map.next_resize(), 51); // 64 * 0.8

    // Minimal capacity enforcement.
    let map: HashMap<i32, i32> = HashMap::with_options(5, 0.5, false);
    assert_eq!(map.capacity(), 16);
    assert_eq!(map.next_resize(), 8);

    // Load factors below 0.5 are clamped to 0.5.
    let map: HashMap<i32, i32> = HashMap::with_options(16, 0.3, false);
    assert_eq!(map.next_resize(), 8);
}

#[test]
fn test_typed_payloads() {
    let map = HashMap::new();
    for k in SAME_BUCKET_KEYS {
        map.insert(k, k + 1);
        assert_eq!(map.get(&k), Some(k + 1));
    }

    let map: HashMap<i64, String> = HashMap::new();
    for k in SAME_BUCKET_KEYS {
        map.insert(k as i64, k.to_string());
        assert_eq!(map.get(&(k as i64)), Some(k.to_string()));
    }

    let map: HashMap<String, String> = HashMap::new();
    for k in SAME_BUCKET_KEYS {
        map.insert(k.to_string(), (k + 1).to_string());
        assert_eq!(map.get(&k.to_string()), Some((k + 1).to_string()));
    }

    let values: Vec<String> = SAME_BUCKET_KEYS.iter().map(|k| k.to_string()).collect();
    let map: HashMap<i32, Vec<String>> = HashMap::new();
    for k in SAME_BUCKET_KEYS {
        map.insert(k, values.clone());
        assert_eq!(map.get(&k), Some(values.clone()));
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Payload {
        a: i32,
        b: i32,
    }
    let map: HashMap<i32, Payload> = HashMap::new();
    for k in SAME_BUCKET_KEYS {
        map.insert(k, Payload { a: k + 1, b: k + 2 });
        assert_eq!(map.get(&k), Some(Payload { a: k + 1, b: k + 2 }));
    }
}

#[test]
fn test_put_get_chaining() {
    let map: HashMap<i32, i32> = HashMap::with_options(16, 0.8, false);

    for i in 0..100 {
        assert_eq!(map.get(&i), None);
        map.insert(i, i * 10);
        assert_eq!(map.get(&i), Some(i * 10));
    }
    for i in 0..100 {
        assert_eq!(map.get(&i), Some(i * 10));
    }
    assert_eq!(map.get(&100), None);
}

#[test]
fn test_same_bucket_chaining() {
    let map = same_bucket_map();
    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }
    for k in SAME_BUCKET_KEYS {
        assert_eq!(map.get(&k), Some(k * 10));
    }

    assert_eq!(map.remove(&14), Some(140));
    assert_eq!(map.get(&14), None);
    assert_eq!(map.get(&21), Some(210));
    assert_eq!(map.len(), 4);
}

#[test]
fn test_insert_all() {
    let map: HashMap<i32, i32> = HashMap::new();
    map.insert_all((0..50).map(|i| (i, i * 10)));
    assert_eq!(map.len(), 50);
    for i in 0..50 {
        assert_eq!(map.get(&i), Some(i * 10));
    }
}

#[test]
fn test_insert_if_absent() {
    let map = same_bucket_map();

    let key = SAME_BUCKET_KEYS[0];
    assert_eq!(map.insert_if_absent(key, key * 10), None);
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.insert_if_absent(key, key * 20), Some(key * 10));
    assert_eq!(map.get(&key), Some(key * 10));

    // After a removal the key counts as absent again.
    map.remove(&key);
    assert_eq!(map.insert_if_absent(key, key * 20), None);
    assert_eq!(map.get(&key), Some(key * 20));

    let key = SAME_BUCKET_KEYS[1];
    assert_eq!(map.insert_if_absent(key, key * 10), None);
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.insert_if_absent(key, key * 20), Some(key * 10));
    assert_eq!(map.get(&key), Some(key * 10));
}

#[test]
fn test_key_delete() {
    let map = same_bucket_map();

    // Removing a missing key.
    let key = 5;
    assert_eq!(map.remove(&key), None);

    // Write, delete, write again.
    map.insert(key, key * 10);
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.remove(&key), Some(key * 10));
    assert_eq!(map.remove(&key), None);
    map.insert(key, key * 20);
    assert_eq!(map.get(&key), Some(key * 20));

    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }

    // Delete in the middle of the chain.
    let key = SAME_BUCKET_KEYS[2];
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.remove(&key), Some(key * 10));
    assert_eq!(map.remove(&key), None);
    assert_eq!(map.get(&SAME_BUCKET_KEYS[3]), Some(SAME_BUCKET_KEYS[3] * 10));

    // Delete at the head of the chain.
    let key = SAME_BUCKET_KEYS[0];
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.remove(&key), Some(key * 10));
    assert_eq!(map.remove(&key), None);
    assert_eq!(map.get(&SAME_BUCKET_KEYS[3]), Some(SAME_BUCKET_KEYS[3] * 10));

    // Delete at the tail of the chain.
    let key = SAME_BUCKET_KEYS[4];
    assert_eq!(map.get(&key), Some(key * 10));
    assert_eq!(map.remove(&key), Some(key * 10));
    assert_eq!(map.remove(&key), None);
    assert_eq!(map.get(&SAME_BUCKET_KEYS[3]), Some(SAME_BUCKET_KEYS[3] * 10));
}

#[test]
fn test_key_value_delete() {
    let map = same_bucket_map();
    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }

    // Wrong value leaves the entry alone.
    let key = SAME_BUCKET_KEYS[2];
    assert!(!map.remove_if_equals(&key, &key));
    assert_eq!(map.get(&key), Some(key * 10));

    // Right value removes it.
    assert!(map.remove_if_equals(&key, &(key * 10)));
    assert_eq!(map.remove(&key), None);
    assert_eq!(map.get(&SAME_BUCKET_KEYS[1]), Some(SAME_BUCKET_KEYS[1] * 10));
    assert_eq!(map.get(&SAME_BUCKET_KEYS[3]), Some(SAME_BUCKET_KEYS[3] * 10));

    // Reinsert after the tombstone.
    map.insert(key, key * 5);
    assert_eq!(map.get(&key), Some(key * 5));
}

#[test]
fn test_size_accounting() {
    let map = same_bucket_map();

    assert_eq!(map.len(), 0);
    assert!(map.is_empty());

    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }
    assert!(!map.is_empty());
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len());

    // Removals decrement.
    map.remove(&SAME_BUCKET_KEYS[1]);
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 1);
    map.remove_if_equals(&SAME_BUCKET_KEYS[3], &(SAME_BUCKET_KEYS[3] * 10));
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 2);

    // Insert-if-absent on a present key leaves the size alone.
    map.insert_if_absent(SAME_BUCKET_KEYS[2], 0);
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 2);
    // On an absent key it counts.
    map.insert_if_absent(SAME_BUCKET_KEYS[1], SAME_BUCKET_KEYS[1] * 10);
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 1);

    // Replacement never changes the size, present or not.
    map.replace(SAME_BUCKET_KEYS[1], 0);
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 1);
    map.replace(SAME_BUCKET_KEYS[3], 0);
    assert_eq!(map.len(), SAME_BUCKET_KEYS.len() - 1);

    for i in 0..100 {
        map.insert(i, i * 10);
    }
    assert_eq!(map.len(), 100);

    let mut i = 0;
    while i < 100 {
        map.remove(&i);
        i += 2;
    }
    assert_eq!(map.len(), 50);

    map.clear();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
}

#[test]
fn test_contains() {
    let map = same_bucket_map();
    let mut keys: Vec<i32> = SAME_BUCKET_KEYS.to_vec();
    keys.extend((6..=30).step_by(6));
    for &k in &keys {
        map.insert(k, k * 10);
    }

    assert!(map.contains_key(&keys[0]));
    assert!(map.contains_key(&keys[3]));
    assert!(map.contains_key(&keys[7]));
    assert!(!map.contains_key(&i32::MAX));

    assert!(map.contains_value(&(keys[0] * 10)));
    assert!(map.contains_value(&(keys[3] * 10)));
    assert!(map.contains_value(&(keys[7] * 10)));
    assert!(!map.contains_value(&i32::MAX));
}

#[test]
fn test_replace() {
    let map = same_bucket_map();

    // Replacing an absent key is a no-op.
    let key = SAME_BUCKET_KEYS[0];
    assert_eq!(map.replace(key, key * 10), None);
    assert_eq!(map.get(&key), None);

    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }

    assert_eq!(map.replace(key, key * 20), Some(key * 10));
    assert_eq!(map.get(&key), Some(key * 20));
    map.remove(&key);
    assert_eq!(map.replace(key, key * 10), None);

    let key = SAME_BUCKET_KEYS[3];
    assert_eq!(map.replace(key, key * 20), Some(key * 10));
    assert_eq!(map.get(&key), Some(key * 20));
    map.remove(&key);
    assert_eq!(map.replace(key, key * 10), None);
}

#[test]
fn test_conditional_replace() {
    let map = same_bucket_map();

    assert!(!map.replace_if_equals(i32::MAX, &i32::MAX, i32::MAX));
    assert_eq!(map.get(&i32::MAX), None);

    for k in SAME_BUCKET_KEYS {
        map.insert(k, k * 10);
    }

    let key = SAME_BUCKET_KEYS[2];
    // Wrong expected value.
    assert!(!map.replace_if_equals(key, &(key * 20), key * 30));
    assert_eq!(map.get(&key), Some(key * 10));
    // Correct expected value.
    assert!(map.replace_if_equals(key, &(key * 10), key * 30));
    assert_eq!(map.get(&key), Some(key * 30));
    map.remove(&key);
    // Key no longer exists.
    assert!(!map.replace_if_equals(key, &(key * 30), key * 50));
}

#[test]
fn test_replace_semantics_scenario() {
    let map: HashMap<i32, i32> = HashMap::new();
    map.insert(5, 50);
    assert!(!map.replace_if_equals(5, &99, 100));
    assert_eq!(map.get(&5), Some(50));
    assert!(map.replace_if_equals(5, &50, 100));
    assert_eq!(map.get(&5), Some(100));
}

#[test]
fn test_borrowed_key_lookup() {
    let map: HashMap<String, i32> = HashMap::new();
    map.insert("hello".to_string(), 1);
    map.insert("world".to_string(), 2);

    assert_eq!(map.get("hello"), Some(1));
    assert!(map.contains_key("world"));
    assert_eq!(map.remove("hello"), Some(1));
    assert_eq!(map.get("hello"), None);
}

#[test]
fn test_clear() {
    let map: HashMap<i32, String> = HashMap::with_options(16, 0.8, false);
    for i in 0..100 {
        map.insert(i, format!("value_{i}"));
    }
    assert_eq!(map.len(), 100);

    map.clear();
    assert!(map.is_empty());
    for i in 0..100 {
        assert_eq!(map.get(&i), None);
    }

    // The map stays usable.
    map.insert(7, "again".to_string());
    assert_eq!(map.get(&7), Some("again".to_string()));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_drop_cleanup() {
    let map = HashMap::new();
    for i in 0..5000 {
        map.insert(i, format!("value_{i}"));
    }
    drop(map);
}
