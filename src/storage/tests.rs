//! Storage Module Tests
//!
//! Validates the node-local state layer in isolation from HTTP.
//!
//! ## Test Scopes
//! - **Sharding**: Deterministic shard selection and point operations.
//! - **Exports**: Range export equivalence against the shared arc predicate,
//!   full export completeness.
//! - **Pair Codec**: Encode/decode inverse behavior and edge cases.
//! - **Write Log**: Replay of writes and deletions across a simulated
//!   restart.

#[cfg(test)]
mod tests {
    use crate::ring::hash::{hash_key, in_range};
    use crate::storage::protocol::{decode_pairs, encode_pairs};
    use crate::storage::shards::{ShardedStore, SHARD_COUNT};
    use crate::storage::wal::WriteLog;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ringkv-test-{}-{}.log",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    // ============================================================
    // SHARDING
    // ============================================================

    #[test]
    fn test_shard_id_is_deterministic_and_bounded() {
        for i in 0..1000 {
            let key = format!("test_key_{}", i);
            let shard = ShardedStore::shard_id(&key);
            assert_eq!(shard, ShardedStore::shard_id(&key));
            assert!(shard < SHARD_COUNT);
        }
    }

    #[test]
    fn test_shard_distribution() {
        // With 16 shards and 1000 keys every shard should see traffic.
        let mut seen = HashSet::new();
        for i in 0..1000 {
            seen.insert(ShardedStore::shard_id(&format!("book_{}", i)));
        }
        assert_eq!(seen.len(), SHARD_COUNT, "all shards should be populated");
    }

    #[test]
    fn test_put_get_del_roundtrip() {
        let store = ShardedStore::new();

        store.put("user_id_1", "Alice");
        assert_eq!(store.get("user_id_1").as_deref(), Some("Alice"));

        assert!(store.del("user_id_1"), "delete of a present key reports true");
        assert_eq!(store.get("user_id_1"), None);
        assert!(!store.del("user_id_1"), "delete is idempotent");
    }

    #[test]
    fn test_put_overwrites() {
        let store = ShardedStore::new();
        store.put("k", "first");
        store.put("k", "second");
        assert_eq!(store.get("k").as_deref(), Some("second"));
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_get_nonexistent_key() {
        let store = ShardedStore::new();
        assert_eq!(store.get("nothing"), None);
    }

    // ============================================================
    // EXPORTS
    // ============================================================

    #[test]
    fn test_export_range_matches_predicate() {
        let store = ShardedStore::new();
        for i in 0..1000 {
            store.put(&format!("key_{}", i), &format!("val_{}", i));
        }

        for _ in 0..20 {
            let start = rand::random::<u64>();
            let end = rand::random::<u64>();

            let exported: HashSet<String> = store
                .export_range(start, end)
                .into_iter()
                .map(|(k, _)| k)
                .collect();

            let expected: HashSet<String> = (0..1000)
                .map(|i| format!("key_{}", i))
                .filter(|k| in_range(hash_key(k), start, end))
                .collect();

            assert_eq!(exported, expected, "range ({}, {}]", start, end);
        }
    }

    #[test]
    fn test_export_all_is_complete() {
        let store = ShardedStore::new();
        for i in 0..100 {
            store.put(&format!("key_{}", i), "v");
        }

        let all = store.export_all();
        assert_eq!(all.len(), 100);

        let keys: HashSet<String> = all.into_iter().map(|(k, _)| k).collect();
        for i in 0..100 {
            assert!(keys.contains(&format!("key_{}", i)));
        }
    }

    // ============================================================
    // PAIR CODEC
    // ============================================================

    #[test]
    fn test_codec_roundtrip() {
        let pairs = vec![
            ("user_id_1".to_string(), "Alice".to_string()),
            ("product_55".to_string(), "MacBook".to_string()),
            ("with spaces".to_string(), "value with spaces".to_string()),
        ];
        assert_eq!(decode_pairs(&encode_pairs(&pairs)), pairs);
    }

    #[test]
    fn test_codec_empty_body_and_empty_value() {
        assert!(decode_pairs("").is_empty());

        let pairs = vec![("k".to_string(), "".to_string())];
        assert_eq!(decode_pairs(&encode_pairs(&pairs)), pairs);
    }

    #[test]
    fn test_codec_ignores_unpaired_trailing_line() {
        assert_eq!(
            decode_pairs("a\n1\nstray"),
            vec![("a".to_string(), "1".to_string())]
        );
    }

    // ============================================================
    // WRITE LOG
    // ============================================================

    #[test]
    fn test_wal_replay_restores_writes_and_deletes() {
        let path = temp_log("replay");

        {
            let wal = WriteLog::open(&path).expect("open log");
            wal.append_set("a", "1").unwrap();
            wal.append_set("b", "2").unwrap();
            wal.append_del("a").unwrap();
            wal.append_set("b", "3").unwrap();
        }

        // Simulated restart: replay into a fresh store.
        let store = ShardedStore::new();
        let applied = WriteLog::replay(&path, &store).expect("replay log");

        assert_eq!(applied, 4);
        assert_eq!(store.get("a"), None, "deleted keys must stay deleted");
        assert_eq!(store.get("b").as_deref(), Some("3"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_wal_replay_missing_file_is_empty() {
        let path = temp_log("missing");
        let store = ShardedStore::new();
        let applied = WriteLog::replay(&path, &store).expect("missing file is fine");
        assert_eq!(applied, 0);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_wal_replay_skips_corrupt_lines() {
        let path = temp_log("corrupt");
        std::fs::write(
            &path,
            "{\"op\":\"set\",\"key\":\"a\",\"val\":\"1\"}\nnot json\n{\"op\":\"set\",\"key\":\"b\",\"val\":\"2\"}\n",
        )
        .unwrap();

        let store = ShardedStore::new();
        let applied = WriteLog::replay(&path, &store).expect("corrupt lines are skipped");

        assert_eq!(applied, 2);
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b").as_deref(), Some("2"));

        let _ = std::fs::remove_file(&path);
    }
}
