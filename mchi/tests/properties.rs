/*
 * This file is part of the mchi inverted-index storage engine.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Property tests over random operation sequences, checking invariants
//! 1 (round-trip), 2 (dedup), 5 (free-list accounting), 6 (bucket
//! locality), and 8 (allocator reuse) from the index's format description.
//! Properties 3, 4, 7 are exercised as explicit deterministic tests
//! instead, since they're naturally single-shot assertions.

use std::collections::{HashMap, HashSet};

use mchi::{Layout, MchiIndex};
use proptest::prelude::*;
use tempfile::tempdir;

const KEYS: &[&str] = &["ai", "python", "rust", "ml", "nlp", "db", "os", "net"];

#[derive(Debug, Clone)]
enum Op {
    Insert { key: usize, ids: Vec<u32> },
    Remove { key: usize, id: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..KEYS.len(), prop::collection::vec(0u32..40, 1..5))
            .prop_map(|(key, ids)| Op::Insert { key, ids }),
        (0..KEYS.len(), 0u32..40).prop_map(|(key, id)| Op::Remove { key, id }),
    ]
}

fn test_layout() -> Layout {
    Layout {
        table_size: 17,
        key_size: 16,
        max_items: 4,
        data_region_size: 256 * 1024,
        persist_high_water_mark: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Properties 1, 2, 5, 6: after any sequence of inserts/removes, `get`
    /// matches a reference `HashMap<String, HashSet<u32>>` model exactly
    /// (round-trip + dedup), the free-list accounting identity holds, and
    /// every key is only reachable from its own bucket.
    #[test]
    fn random_sequence_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.dat");
        let layout = test_layout();
        let mut idx = MchiIndex::open(&path, layout).unwrap();
        let mut model: HashMap<&str, HashSet<u32>> = HashMap::new();

        for op in &ops {
            match op {
                Op::Insert { key, ids } => {
                    let k = KEYS[*key];
                    idx.insert(k, ids).unwrap();
                    model.entry(k).or_default().extend(ids.iter().copied());
                }
                Op::Remove { key, id } => {
                    let k = KEYS[*key];
                    idx.remove(k, *id);
                    if let Some(set) = model.get_mut(k) {
                        set.remove(id);
                    }
                }
            }

            // property 5: bump-allocated == reachable + free-listed
            prop_assert_eq!(
                idx.bump_allocated_count(),
                idx.reachable_node_count() + idx.free_list_len()
            );
        }

        // properties 1 + 2: every key's `get` matches the deduplicated model
        for key in KEYS {
            let got: HashSet<u32> = idx.get(key).into_iter().collect();
            let expected = model.get(key).cloned().unwrap_or_default();
            prop_assert_eq!(got, expected);
        }

        // property 6: a key is only reachable from slot[hash(key)]
        for key in KEYS {
            let home = layout.hash(key);
            let home_bytes = layout.encode_key(key);
            for b in 0..layout.table_size {
                if b == home {
                    continue;
                }
                prop_assert!(!idx.bucket_keys(b).contains(&home_bytes));
            }
        }
    }

    /// Property 8: re-inserting into a key right after removing from it
    /// does not grow the high-water mark when the free list already holds
    /// a node from that removal.
    #[test]
    fn reinsert_after_full_removal_reuses_freed_node(id in 0u32..1000) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.dat");
        let mut idx = MchiIndex::open(&path, test_layout()).unwrap();

        idx.insert("ai", &[id]).unwrap();
        idx.remove("ai", id);
        prop_assert!(idx.free_list_len() > 0);

        let hwm_before = idx.high_water_mark();
        idx.insert("ai", &[id.wrapping_add(1)]).unwrap();
        prop_assert_eq!(idx.high_water_mark(), hwm_before);
    }
}
