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

//! Property 7 (persistence across close/reopen) and property 3
//! (remove-missing idempotence), as explicit deterministic tests rather
//! than property tests, since both are naturally single-shot assertions.

use std::collections::HashSet;

use mchi::{Layout, MchiIndex};
use tempfile::tempdir;

fn small_layout() -> Layout {
    Layout {
        table_size: 211,
        key_size: 32,
        max_items: 8,
        data_region_size: 1024 * 1024,
        persist_high_water_mark: true,
    }
}

#[test]
fn closing_and_reopening_preserves_get_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.dat");
    let layout = small_layout();

    let mut idx = MchiIndex::open(&path, layout).unwrap();
    idx.insert("ai", &[1, 2, 3]).unwrap();
    idx.insert("python", &[4, 5]).unwrap();
    idx.insert("rust", &(0..20).collect::<Vec<u32>>()).unwrap();
    idx.close().unwrap();

    let reopened = MchiIndex::open(&path, layout).unwrap();
    assert_eq!(
        reopened.get("ai").into_iter().collect::<HashSet<_>>(),
        HashSet::from([1, 2, 3])
    );
    assert_eq!(
        reopened.get("python").into_iter().collect::<HashSet<_>>(),
        HashSet::from([4, 5])
    );
    assert_eq!(
        reopened.get("rust").into_iter().collect::<HashSet<_>>(),
        (0..20).collect::<HashSet<_>>()
    );
}

#[test]
fn high_water_mark_survives_reopen_with_default_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.dat");
    let layout = small_layout();

    let mut idx = MchiIndex::open(&path, layout).unwrap();
    idx.insert("ai", &(0..40).collect::<Vec<u32>>()).unwrap();
    let hwm_before_close = idx.high_water_mark();
    idx.close().unwrap();

    let reopened = MchiIndex::open(&path, layout).unwrap();
    assert_eq!(reopened.high_water_mark(), hwm_before_close);
}

#[test]
fn compat_v0_layout_resets_high_water_mark_on_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.dat");
    let layout = Layout {
        table_size: 211,
        key_size: 32,
        max_items: 8,
        data_region_size: 1024 * 1024,
        ..Layout::compat_v0()
    };

    let mut idx = MchiIndex::open(&path, layout).unwrap();
    idx.insert("ai", &(0..40).collect::<Vec<u32>>()).unwrap();
    assert!(idx.high_water_mark() > layout.data_start_offset());
    idx.close().unwrap();

    let reopened = MchiIndex::open(&path, layout).unwrap();
    assert_eq!(reopened.high_water_mark(), layout.data_start_offset());
}

#[test]
fn remove_missing_key_is_a_noop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.dat");
    let layout = small_layout();

    let mut idx = MchiIndex::open(&path, layout).unwrap();
    idx.insert("ai", &[1, 2]).unwrap();
    idx.remove("nonexistent", 99);
    assert_eq!(
        idx.get("ai").into_iter().collect::<HashSet<_>>(),
        HashSet::from([1, 2])
    );
}

#[test]
fn remove_missing_id_under_existing_key_is_a_noop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.dat");
    let layout = small_layout();

    let mut idx = MchiIndex::open(&path, layout).unwrap();
    idx.insert("ai", &[1, 2]).unwrap();
    idx.remove("ai", 999);
    assert_eq!(
        idx.get("ai").into_iter().collect::<HashSet<_>>(),
        HashSet::from([1, 2])
    );
}
