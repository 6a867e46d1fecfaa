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

//! The index itself: file init, bucket/chain traversal, and the three
//! mutating/querying operations (`insert`, `get`, `remove`).

use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    path::Path,
};

use memmap2::MmapMut;

use crate::{
    error::{Error, Result},
    layout::Layout,
    node::{NodeRef, NodeView},
};

/// A persistent, memory-mapped, chained hash table.
///
/// Single-writer, single-reader: mutating methods take `&mut self`, which
/// the borrow checker already forbids calling concurrently from two
/// places in one process. Concurrent access from multiple processes (or
/// multiple `MchiIndex` handles over the same file) is a data race this
/// type does nothing to prevent — the host is responsible for serializing
/// access, exactly as with any other mmap'd structure.
pub struct MchiIndex {
    pub(crate) mmap: MmapMut,
    pub(crate) layout: Layout,
    pub(crate) free_list_head: u64,
    pub(crate) next_new_node_offset: u64,
    _file: File,
}

impl MchiIndex {
    /// Open (creating if absent) the index file at `path` using `layout`.
    pub fn open(path: impl AsRef<Path>, layout: Layout) -> Result<Self> {
        let path = path.as_ref();
        let existed = path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(Error::open_failed)?;

        if !existed {
            log::info!(
                "mchi: creating new index file at {} ({} bytes)",
                path.display(),
                layout.file_size()
            );
            file.set_len(layout.file_size()).map_err(Error::open_failed)?;
        } else {
            log::info!("mchi: opening existing index file at {}", path.display());
        }

        let mut mmap = unsafe { MmapMut::map_mut(&file).map_err(Error::open_failed)? };

        if !existed {
            // Zero the slot table and the reserved header cells explicitly;
            // the format only requires the data region to be usable as
            // freshly provided by the filesystem.
            let zero_upto = layout.data_start_offset() as usize;
            mmap[..zero_upto].fill(0);
        }

        let free_list_head = read_u64(&mmap, layout.free_list_head_offset());
        let next_new_node_offset = match layout.high_water_mark_offset() {
            Some(off) if existed => {
                let persisted = read_u64(&mmap, off);
                if persisted == 0 {
                    layout.data_start_offset()
                } else {
                    persisted
                }
            }
            _ => layout.data_start_offset(),
        };

        let mut index = Self {
            mmap,
            layout,
            free_list_head,
            next_new_node_offset,
            _file: file,
        };
        if !existed {
            index.persist_high_water_mark();
        }
        Ok(index)
    }

    /// Convenience constructor using [`Layout::default`].
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, Layout::default())
    }

    /// Flush the mapping, persist `free_list_head` (and the high-water
    /// mark, if this layout tracks one), and drop the mapping and file.
    pub fn close(mut self) -> Result<()> {
        self.set_free_list_head(self.free_list_head);
        self.persist_high_water_mark();
        self.mmap.flush()?;
        Ok(())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of nodes in `key`'s same-chain, `0` if the key is absent.
    /// Exposed only for tests and diagnostics; not part of the operation
    /// contract.
    #[doc(hidden)]
    pub fn same_chain_len(&self, key: &str) -> usize {
        let key_bytes = self.layout.encode_key(key);
        let bucket = self.layout.hash(key);
        let (mut cur, _) = self.find_key(bucket, &key_bytes);
        let mut n = 0;
        while cur != 0 {
            n += 1;
            cur = self.node_ref(cur).next_same();
        }
        n
    }

    /// Length of the other-chain rooted at `slot[hash(key)]`. Exposed only
    /// for tests and diagnostics.
    #[doc(hidden)]
    pub fn other_chain_len(&self, key: &str) -> usize {
        let bucket = self.layout.hash(key);
        let mut cur = self.read_slot(bucket);
        let mut n = 0;
        while cur != 0 {
            n += 1;
            cur = self.node_ref(cur).next_other();
        }
        n
    }

    /// Current bump-allocation high-water mark, in bytes from the start of
    /// the file. Exposed only for tests and diagnostics.
    #[doc(hidden)]
    pub fn high_water_mark(&self) -> u64 {
        self.next_new_node_offset
    }

    /// Number of nodes bump-allocated so far (live or freed). Exposed only
    /// for tests and diagnostics.
    #[doc(hidden)]
    pub fn bump_allocated_count(&self) -> usize {
        ((self.next_new_node_offset - self.layout.data_start_offset()) / self.layout.node_size())
            as usize
    }

    /// Number of nodes currently on the free list. Exposed only for tests
    /// and diagnostics.
    #[doc(hidden)]
    pub fn free_list_len(&self) -> usize {
        let mut n = 0;
        let mut cur = self.free_list_head;
        while cur != 0 {
            n += 1;
            cur = self.node_ref(cur).next_same();
        }
        n
    }

    /// Total number of nodes reachable from any slot, across every bucket.
    /// `O(table_size)`, intended only for small test layouts. Exposed only
    /// for tests and diagnostics.
    #[doc(hidden)]
    pub fn reachable_node_count(&self) -> usize {
        let mut n = 0;
        for b in 0..self.layout.table_size {
            let mut other_cur = self.read_slot(b);
            while other_cur != 0 {
                let other_node = self.node_ref(other_cur);
                let mut same_cur = other_cur;
                while same_cur != 0 {
                    n += 1;
                    same_cur = self.node_ref(same_cur).next_same();
                }
                other_cur = other_node.next_other();
            }
        }
        n
    }

    /// The distinct key bytes held by other-chain heads in `bucket`.
    /// Exposed only for tests and diagnostics.
    #[doc(hidden)]
    pub fn bucket_keys(&self, bucket: u64) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut cur = self.read_slot(bucket);
        while cur != 0 {
            let node = self.node_ref(cur);
            out.push(node.key().to_vec());
            cur = node.next_other();
        }
        out
    }

    // ---- low-level cell/slot access -----------------------------------

    fn read_u64(&self, off: u64) -> u64 {
        read_u64(&self.mmap, off)
    }

    fn write_u64(&mut self, off: u64, val: u64) {
        write_u64(&mut self.mmap, off, val);
    }

    pub(crate) fn set_free_list_head(&mut self, val: u64) {
        self.free_list_head = val;
        let off = self.layout.free_list_head_offset();
        self.write_u64(off, val);
    }

    pub(crate) fn persist_high_water_mark(&mut self) {
        if let Some(off) = self.layout.high_water_mark_offset() {
            self.write_u64(off, self.next_new_node_offset);
        }
    }

    fn read_slot(&self, bucket: u64) -> u64 {
        self.read_u64(self.layout.slot_offset(bucket))
    }

    fn write_slot(&mut self, bucket: u64, val: u64) {
        let off = self.layout.slot_offset(bucket);
        self.write_u64(off, val);
    }

    // ---- node views -----------------------------------------------------

    pub(crate) fn node_at(&mut self, off: u64) -> NodeView<'_> {
        let size = self.layout.node_size() as usize;
        let start = off as usize;
        NodeView::new(&mut self.mmap[start..start + size], self.layout)
    }

    fn node_ref(&self, off: u64) -> NodeRef<'_> {
        let size = self.layout.node_size() as usize;
        let start = off as usize;
        NodeRef::new(&self.mmap[start..start + size], self.layout)
    }

    /// Walk the other-chain rooted at `slot[bucket]` looking for `key`.
    /// Returns `(match_offset_or_0, prev_other_offset_or_0)`, where
    /// `prev_other` is `0` when the match (or the end of the chain) is the
    /// bucket head itself.
    fn find_key(&self, bucket: u64, key: &[u8]) -> (u64, u64) {
        let mut cur = self.read_slot(bucket);
        let mut prev_other = 0u64;
        while cur != 0 {
            let node = self.node_ref(cur);
            if node.key() == key {
                return (cur, prev_other);
            }
            prev_other = cur;
            cur = node.next_other();
        }
        (0, prev_other)
    }

    // ---- insert -----------------------------------------------------------

    /// Insert `ids` under `key`. A no-op if `ids` is empty. Fails only if
    /// the data region cannot accommodate new nodes (`Error::OutOfSpace`);
    /// any nodes already allocated and linked during this call are kept —
    /// insertion is not transactional.
    pub fn insert(&mut self, key: &str, ids: &[u32]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let key_bytes = self.layout.encode_key(key);
        let bucket = self.layout.hash(key);
        let (k0, prev_other) = self.find_key(bucket, &key_bytes);

        // Deduplicate against the entire same-chain up front (not just the
        // node being filled), so invariant 6 (each id appears at most once
        // per key) holds exactly rather than approximately.
        let mut seen: HashSet<u32> = HashSet::new();
        if k0 != 0 {
            let mut cur = k0;
            while cur != 0 {
                let node = self.node_ref(cur);
                seen.extend(node.items());
                cur = node.next_same();
            }
        }
        let pending: Vec<u32> = ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        if k0 != 0 {
            self.insert_into_existing_key(k0, &key_bytes, &pending)
        } else {
            self.insert_new_key(bucket, prev_other, &key_bytes, &pending)
        }
    }

    /// Phase 2a: fill partially-empty nodes along the same-chain from
    /// `k0`, then allocate fresh tail nodes for whatever remains pending.
    /// Tail nodes are initialized with `key_bytes` just like a brand-new
    /// key's nodes — a tail node can become the bucket-visible head later
    /// (via `remove`'s same-chain-successor promotion), so it must carry
    /// the key, not just the items.
    fn insert_into_existing_key(&mut self, k0: u64, key_bytes: &[u8], pending: &[u32]) -> Result<()> {
        let max_items = self.layout.max_items;
        let mut cur = k0;
        let mut prev_same = 0u64;
        let mut idx = 0usize;

        while cur != 0 && idx < pending.len() {
            let next = {
                let mut node = self.node_at(cur);
                let mut count = node.count();
                while idx < pending.len() && count < max_items {
                    node.push_item(pending[idx]);
                    idx += 1;
                    count += 1;
                }
                node.next_same()
            };
            prev_same = cur;
            cur = next;
        }

        while idx < pending.len() {
            let new_off = self.alloc_node()?;
            idx = self.init_and_fill(new_off, key_bytes, pending, idx)?;
            let mut prev_node = self.node_at(prev_same);
            prev_node.set_next_same(new_off);
            prev_same = new_off;
        }
        Ok(())
    }

    /// Phase 2b: build a fresh same-chain for a key not yet present in the
    /// bucket, then splice its head into the other-chain.
    fn insert_new_key(
        &mut self,
        bucket: u64,
        prev_other: u64,
        key_bytes: &[u8],
        pending: &[u32],
    ) -> Result<()> {
        let mut head = 0u64;
        let mut prev_same = 0u64;
        let mut idx = 0usize;

        while idx < pending.len() {
            let new_off = self.alloc_node()?;
            idx = self.init_and_fill(new_off, key_bytes, pending, idx)?;
            if head == 0 {
                head = new_off;
            } else {
                let mut prev_node = self.node_at(prev_same);
                prev_node.set_next_same(new_off);
            }
            prev_same = new_off;
        }

        if prev_other == 0 {
            self.write_slot(bucket, head);
        } else {
            let mut prev_node = self.node_at(prev_other);
            prev_node.set_next_other(head);
        }
        Ok(())
    }

    /// Initialize node `off` with `key` and append up to `max_items`
    /// entries from `pending[idx..]`. Returns the new `idx`. Every tail
    /// node allocated by `insert` — whether for an already-present key or
    /// a brand-new one — carries the key, since `remove`'s same-chain
    /// successor promotion can make any of them the bucket-visible head.
    fn init_and_fill(
        &mut self,
        off: u64,
        key: &[u8],
        pending: &[u32],
        mut idx: usize,
    ) -> Result<usize> {
        let max_items = self.layout.max_items;
        let mut node = self.node_at(off);
        node.init(key);
        let mut count = 0u32;
        while idx < pending.len() && count < max_items {
            node.push_item(pending[idx]);
            idx += 1;
            count += 1;
        }
        Ok(idx)
    }

    // ---- get ---------------------------------------------------------------

    /// Return every identifier stored under `key`, in same-chain encounter
    /// order. Empty if `key` is absent. Order within a node is insertion
    /// order except where a prior `remove` swapped an entry to a new slot.
    pub fn get(&self, key: &str) -> Vec<u32> {
        let key_bytes = self.layout.encode_key(key);
        let bucket = self.layout.hash(key);
        let (k0, _) = self.find_key(bucket, &key_bytes);
        if k0 == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut cur = k0;
        while cur != 0 {
            let node = self.node_ref(cur);
            out.extend(node.items());
            cur = node.next_same();
        }
        out
    }

    // ---- remove ------------------------------------------------------------

    /// Remove one occurrence of `id` from the set stored under `key`.
    /// Idempotent: a missing key or id leaves the index unchanged.
    pub fn remove(&mut self, key: &str, id: u32) {
        let key_bytes = self.layout.encode_key(key);
        let bucket = self.layout.hash(key);
        let (k0, prev_other) = self.find_key(bucket, &key_bytes);
        if k0 == 0 {
            return;
        }

        let mut cur = k0;
        let mut prev_same = 0u64;
        loop {
            if cur == 0 {
                return;
            }
            let (found, count, next_same) = {
                let node = self.node_at(cur);
                let found = (0..node.count()).find(|&i| node.item(i) == id);
                (found, node.count(), node.next_same())
            };
            let Some(i) = found else {
                prev_same = cur;
                cur = next_same;
                continue;
            };

            let last = count - 1;
            if i != last {
                let last_val = self.node_at(cur).item(last);
                self.node_at(cur).set_item(i, last_val);
            }
            self.node_at(cur).set_count(last);

            if last == 0 {
                self.unlink_emptied_node(cur, prev_same, prev_other, next_same, bucket);
                self.free_node(cur);
            }
            return;
        }
    }

    /// Relink whichever chain(s) reference the now-empty node `cur`,
    /// promoting the same-chain successor when `cur` was the bucket-visible
    /// head and a successor exists (the corrected behavior — the naive
    /// approach of simply skipping `cur` in the other-chain, as done by
    /// some reference implementations, silently drops the surviving
    /// same-chain nodes for the key).
    fn unlink_emptied_node(
        &mut self,
        cur: u64,
        prev_same: u64,
        prev_other: u64,
        next_same: u64,
        bucket: u64,
    ) {
        if prev_same == 0 {
            // cur is the head of the same-chain, i.e. the node reachable
            // directly from the other-chain.
            if next_same != 0 {
                let cur_next_other = self.node_at(cur).next_other();
                self.node_at(next_same).set_next_other(cur_next_other);
                if prev_other == 0 {
                    self.write_slot(bucket, next_same);
                } else {
                    self.node_at(prev_other).set_next_other(next_same);
                }
            } else {
                let cur_next_other = self.node_at(cur).next_other();
                if prev_other == 0 {
                    self.write_slot(bucket, cur_next_other);
                } else {
                    self.node_at(prev_other).set_next_other(cur_next_other);
                }
            }
        } else {
            self.node_at(prev_same).set_next_same(next_same);
        }
    }
}

fn read_u64(mmap: &MmapMut, off: u64) -> u64 {
    let off = off as usize;
    u64::from_le_bytes(mmap[off..off + 8].try_into().unwrap())
}

fn write_u64(mmap: &mut MmapMut, off: u64, val: u64) {
    let off = off as usize;
    mmap[off..off + 8].copy_from_slice(&val.to_le_bytes());
}
