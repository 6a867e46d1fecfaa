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

//! The free list: a singly-linked LIFO stack threaded through the
//! `next_same` field of freed nodes. This reuses the node's own storage
//! and needs no auxiliary structure of its own.

use crate::{error::Error, index::MchiIndex};

impl MchiIndex {
    /// Pop the free list if non-empty, otherwise bump-allocate. Only
    /// `insert` calls this, and only it can observe `Error::OutOfSpace`.
    pub(crate) fn alloc_node(&mut self) -> Result<u64, Error> {
        if self.free_list_head != 0 {
            let popped = self.free_list_head;
            let new_head = self.node_at(popped).next_same();
            self.set_free_list_head(new_head);
            Ok(popped)
        } else {
            let node_size = self.layout.node_size();
            if self.next_new_node_offset + node_size > self.layout.file_size() {
                log::warn!("mchi: data region exhausted, refusing allocation");
                return Err(Error::OutOfSpace);
            }
            let off = self.next_new_node_offset;
            self.next_new_node_offset += node_size;
            self.persist_high_water_mark();
            Ok(off)
        }
    }

    /// Push `off` onto the free list. No-op for the null offset.
    pub(crate) fn free_node(&mut self, off: u64) {
        if off == 0 {
            return;
        }
        let old_head = self.free_list_head;
        {
            let mut node = self.node_at(off);
            node.set_next_same(old_head);
            node.clear_for_free();
        }
        self.set_free_list_head(off);
    }
}

#[cfg(test)]
mod tests {
    use crate::{index::MchiIndex, layout::Layout};
    use tempfile::tempdir;

    fn tiny_layout() -> Layout {
        Layout {
            table_size: 16,
            key_size: 8,
            max_items: 4,
            data_region_size: 4096,
            persist_high_water_mark: true,
        }
    }

    #[test]
    fn free_list_is_lifo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.dat");
        let mut idx = MchiIndex::open(&path, tiny_layout()).unwrap();
        let a = idx.alloc_node().unwrap();
        let b = idx.alloc_node().unwrap();
        let c = idx.alloc_node().unwrap();
        idx.free_node(a);
        idx.free_node(b);
        idx.free_node(c);
        // LIFO: last freed (c) is popped first
        assert_eq!(idx.alloc_node().unwrap(), c);
        assert_eq!(idx.alloc_node().unwrap(), b);
        assert_eq!(idx.alloc_node().unwrap(), a);
    }

    #[test]
    fn out_of_space_when_region_exhausted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.dat");
        let layout = Layout {
            data_region_size: 0,
            ..tiny_layout()
        };
        let mut idx = MchiIndex::open(&path, layout).unwrap();
        assert!(idx.alloc_node().is_err());
    }
}
