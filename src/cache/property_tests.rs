//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check byte accounting, the budget bound and recency order
//! of the LRU store against arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{entry_size, CacheStore, LruStore, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}"
}

#[derive(Debug, Clone)]
enum StoreOp {
    Add { key: String, value: String },
    Get { key: String },
    Remove { key: String },
    RemoveOldest,
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| StoreOp::Add { key, value }),
        3 => key_strategy().prop_map(|key| StoreOp::Get { key }),
        1 => key_strategy().prop_map(|key| StoreOp::Remove { key }),
        1 => Just(StoreOp::RemoveOldest),
    ]
}

/// Exact byte total over the store's live entries.
fn recount(store: &LruStore<String>) -> usize {
    store
        .keys()
        .map(|key| entry_size(key, store.peek(key).expect("indexed key has a value")))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // used_bytes always equals the exact sum over live entries, and never
    // exceeds the budget after an add.
    #[test]
    fn prop_byte_accounting_is_exact(
        max_bytes in 0usize..96,
        ops in prop::collection::vec(store_op_strategy(), 1..80)
    ) {
        let mut store = LruStore::new(max_bytes);

        for op in ops {
            match op {
                StoreOp::Add { key, value } => {
                    store.add(key, value);
                    prop_assert!(store.used_bytes() <= max_bytes);
                }
                StoreOp::Get { key } => {
                    let _ = store.get(&key);
                }
                StoreOp::Remove { key } => {
                    let _ = store.remove(&key);
                }
                StoreOp::RemoveOldest => store.remove_oldest(),
            }
            prop_assert_eq!(store.used_bytes(), recount(&store));
            store.debug_validate_invariants();
        }
    }

    // The store agrees with a reference model: a Vec ordered from most to
    // least recently used.
    #[test]
    fn prop_matches_reference_model(
        max_bytes in 1usize..64,
        ops in prop::collection::vec(store_op_strategy(), 1..80)
    ) {
        let mut store = LruStore::new(max_bytes);
        let mut model: Vec<(String, String)> = Vec::new();

        for op in ops {
            match op {
                StoreOp::Add { key, value } => {
                    model.retain(|(k, _)| *k != key);
                    model.insert(0, (key.clone(), value.clone()));
                    store.add(key, value);
                    let mut used: usize = model.iter().map(|(k, v)| k.len() + v.len()).sum();
                    while used > max_bytes {
                        if let Some((k, v)) = model.pop() {
                            used -= k.len() + v.len();
                        }
                    }
                }
                StoreOp::Get { key } => {
                    let expected = model.iter().position(|(k, _)| *k == key);
                    let got = store.get(&key).cloned();
                    match expected {
                        Some(pos) => {
                            let entry = model.remove(pos);
                            prop_assert_eq!(got.as_ref(), Some(&entry.1));
                            model.insert(0, entry);
                        }
                        None => prop_assert!(got.is_none()),
                    }
                }
                StoreOp::Remove { key } => {
                    let pos = model.iter().position(|(k, _)| *k == key);
                    let expected = pos.map(|pos| model.remove(pos).1);
                    prop_assert_eq!(store.remove(&key), expected);
                }
                StoreOp::RemoveOldest => {
                    model.pop();
                    store.remove_oldest();
                }
            }

            let keys: Vec<&str> = store.keys().collect();
            let model_keys: Vec<&str> = model.iter().map(|(k, _)| k.as_str()).collect();
            prop_assert_eq!(keys, model_keys);
        }
    }

    // A get right after an add returns the value, unless the entry alone
    // does not fit the budget.
    #[test]
    fn prop_get_after_add(
        max_bytes in 0usize..48,
        key in key_strategy(),
        value in value_strategy()
    ) {
        let mut store = LruStore::new(max_bytes);
        let fits = key.len() + value.len() <= max_bytes;
        store.add(key.clone(), value.clone());

        if fits {
            prop_assert_eq!(store.get(&key), Some(&value));
        } else {
            prop_assert!(store.get(&key).is_none());
            prop_assert!(store.is_empty());
        }
    }

    // Overwriting a key keeps a single entry sized by the latest value.
    #[test]
    fn prop_update_in_place(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = LruStore::new(1024);
        store.add(key.clone(), value1);
        store.add(key.clone(), value2.clone());

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.used_bytes(), key.len() + value2.len());
        prop_assert_eq!(store.get(&key), Some(&value2));
    }

    // Promoting the oldest key protects it; the next oldest is evicted.
    #[test]
    fn prop_get_protects_from_eviction(
        keys in prop::collection::hash_set("[a-z]{3}", 3..8),
        new_key in "[A-Z]{3}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        // Every entry is 3 + 1 bytes, so the budget holds exactly `keys.len()`.
        let mut store = LruStore::new(keys.len() * 4);
        for key in &keys {
            store.add(key.clone(), "v".to_string());
        }

        prop_assert!(store.get(&keys[0]).is_some());
        store.add(new_key.clone(), "v".to_string());

        prop_assert!(store.contains(&keys[0]));
        prop_assert!(!store.contains(&keys[1]));
        prop_assert!(store.contains(&new_key));
        prop_assert_eq!(store.len(), keys.len());
    }

    // Every capacity eviction reaches the callback exactly once.
    #[test]
    fn prop_callback_sees_each_eviction_once(
        max_bytes in 0usize..64,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..60)
    ) {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut store = LruStore::with_evict_callback(max_bytes, move |key: String, value: String| {
            sink.lock().unwrap().push(key.len() + value.len());
        });

        let mut inserted_bytes = 0usize;
        for (key, value) in entries {
            // Overwrites replace bytes rather than evicting them.
            if let Some(old) = store.peek(&key) {
                inserted_bytes -= entry_size(&key, old);
            }
            inserted_bytes += key.len() + value.len();
            store.add(key, value);
        }

        let evicted_bytes: usize = evicted.lock().unwrap().iter().sum();
        prop_assert_eq!(inserted_bytes, evicted_bytes + store.used_bytes());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The owner layer reports hits and misses exactly.
    #[test]
    fn prop_statistics_accuracy(
        ops in prop::collection::vec(store_op_strategy(), 1..50)
    ) {
        let mut store = CacheStore::new(128);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                StoreOp::Add { key, value } => {
                    let _ = store.set(key, value.into());
                }
                StoreOp::Get { key } => match store.get(&key) {
                    Ok(_) => expected_hits += 1,
                    Err(_) => expected_misses += 1,
                },
                StoreOp::Remove { key } => {
                    let _ = store.delete(&key);
                }
                StoreOp::RemoveOldest => {
                    let _ = store.evict_oldest();
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
        prop_assert!(stats.used_bytes <= stats.max_bytes);
    }

    // Distinct keys survive round trips while the budget is large enough.
    #[test]
    fn prop_roundtrip_storage(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..20)
    ) {
        let mut store = CacheStore::new(usize::MAX);
        let mut latest: HashMap<String, String> = HashMap::new();
        for (key, value) in entries {
            store.set(key.clone(), value.clone().into()).unwrap();
            latest.insert(key, value);
        }

        prop_assert_eq!(store.len(), latest.len());
        for (key, value) in &latest {
            prop_assert_eq!(store.get(key).unwrap().to_string_lossy(), value.clone());
        }
    }
}

// == Property Test for Error Response Format ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error becomes a JSON body with an "error" string.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();
        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(content_type.map(|ct| ct.contains("application/json")).unwrap_or(false));

            let bytes = rt.block_on(async { to_bytes(response.into_body(), usize::MAX).await.unwrap() });
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            let error_str = json.get("error").and_then(|v| v.as_str());
            prop_assert_eq!(error_str, Some(expected_msg.as_str()));
        }
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_length_validation() {
        let mut store = CacheStore::new(1024);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        assert!(store.set(long_key, "value".into()).is_err());
    }

    #[test]
    fn test_value_size_validation() {
        let mut store = CacheStore::new(usize::MAX);
        let large_value = "x".repeat(MAX_VALUE_SIZE + 1);
        assert!(store.set("key".to_string(), large_value.into()).is_err());
    }

    #[test]
    fn test_error_status_codes() {
        use crate::error::CacheError;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }
}
