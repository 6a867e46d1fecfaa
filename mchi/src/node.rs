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

//! Byte-slice view over one fixed-size node. No `#[repr(C)]` cast is taken
//! over the mapping — every field is read and written through explicit
//! little-endian encode/decode, so the layout is exact regardless of host
//! alignment or endianness assumptions.

use crate::layout::Layout;

/// A read/write view over a single node's bytes, relative to the node's
/// start (offset 0 of the slice is offset 0 of the node, i.e. `key[0]`).
pub struct NodeView<'a> {
    buf: &'a mut [u8],
    layout: Layout,
}

impl<'a> NodeView<'a> {
    /// `buf` must be exactly `layout.node_size()` bytes.
    pub fn new(buf: &'a mut [u8], layout: Layout) -> Self {
        debug_assert_eq!(buf.len() as u64, layout.node_size());
        Self { buf, layout }
    }

    fn count_offset(&self) -> usize {
        self.layout.key_size as usize
    }

    fn next_same_offset(&self) -> usize {
        self.count_offset() + 4
    }

    fn next_other_offset(&self) -> usize {
        self.next_same_offset() + 8
    }

    fn items_offset(&self) -> usize {
        self.next_other_offset() + 8
    }

    pub fn key(&self) -> &[u8] {
        &self.buf[..self.layout.key_size as usize]
    }

    pub fn set_key(&mut self, key: &[u8]) {
        debug_assert_eq!(key.len(), self.layout.key_size as usize);
        self.buf[..key.len()].copy_from_slice(key);
    }

    pub fn count(&self) -> u32 {
        let o = self.count_offset();
        u32::from_le_bytes(self.buf[o..o + 4].try_into().unwrap())
    }

    pub fn set_count(&mut self, count: u32) {
        let o = self.count_offset();
        self.buf[o..o + 4].copy_from_slice(&count.to_le_bytes());
    }

    pub fn next_same(&self) -> u64 {
        let o = self.next_same_offset();
        u64::from_le_bytes(self.buf[o..o + 8].try_into().unwrap())
    }

    pub fn set_next_same(&mut self, off: u64) {
        let o = self.next_same_offset();
        self.buf[o..o + 8].copy_from_slice(&off.to_le_bytes());
    }

    pub fn next_other(&self) -> u64 {
        let o = self.next_other_offset();
        u64::from_le_bytes(self.buf[o..o + 8].try_into().unwrap())
    }

    pub fn set_next_other(&mut self, off: u64) {
        let o = self.next_other_offset();
        self.buf[o..o + 8].copy_from_slice(&off.to_le_bytes());
    }

    pub fn item(&self, i: u32) -> u32 {
        let o = self.items_offset() + i as usize * 4;
        u32::from_le_bytes(self.buf[o..o + 4].try_into().unwrap())
    }

    pub fn set_item(&mut self, i: u32, id: u32) {
        let o = self.items_offset() + i as usize * 4;
        self.buf[o..o + 4].copy_from_slice(&id.to_le_bytes());
    }

    pub fn items(&self) -> Vec<u32> {
        (0..self.count()).map(|i| self.item(i)).collect()
    }

    /// Append `id` at `count`, then advance `count`. Caller must have
    /// already checked `count() < max_items`.
    pub fn push_item(&mut self, id: u32) {
        let i = self.count();
        debug_assert!(i < self.layout.max_items);
        self.set_item(i, id);
        self.set_count(i + 1);
    }

    /// Initialize a freshly (bump- or free-list-)allocated node: `key` set,
    /// `count = 0`, both chain pointers cleared.
    pub fn init(&mut self, key: &[u8]) {
        self.set_key(key);
        self.set_count(0);
        self.set_next_same(0);
        self.set_next_other(0);
    }

    /// Zero the key and count, as a debugging/safety measure when freeing.
    /// `next_other` and `items` are left as-is (unspecified per the format).
    pub fn clear_for_free(&mut self) {
        let zero_key = vec![0u8; self.layout.key_size as usize];
        self.set_key(&zero_key);
        self.set_count(0);
    }
}

/// A read-only view over a single node's bytes, used by `get` and by the
/// chain-locating traversal shared by `insert`/`remove`, neither of which
/// needs to mutate what they walk past.
pub struct NodeRef<'a> {
    buf: &'a [u8],
    layout: Layout,
}

impl<'a> NodeRef<'a> {
    pub fn new(buf: &'a [u8], layout: Layout) -> Self {
        debug_assert_eq!(buf.len() as u64, layout.node_size());
        Self { buf, layout }
    }

    fn count_offset(&self) -> usize {
        self.layout.key_size as usize
    }

    fn next_same_offset(&self) -> usize {
        self.count_offset() + 4
    }

    fn next_other_offset(&self) -> usize {
        self.next_same_offset() + 8
    }

    fn items_offset(&self) -> usize {
        self.next_other_offset() + 8
    }

    pub fn key(&self) -> &[u8] {
        &self.buf[..self.layout.key_size as usize]
    }

    pub fn count(&self) -> u32 {
        let o = self.count_offset();
        u32::from_le_bytes(self.buf[o..o + 4].try_into().unwrap())
    }

    pub fn next_same(&self) -> u64 {
        let o = self.next_same_offset();
        u64::from_le_bytes(self.buf[o..o + 8].try_into().unwrap())
    }

    pub fn next_other(&self) -> u64 {
        let o = self.next_other_offset();
        u64::from_le_bytes(self.buf[o..o + 8].try_into().unwrap())
    }

    pub fn item(&self, i: u32) -> u32 {
        let o = self.items_offset() + i as usize * 4;
        u32::from_le_bytes(self.buf[o..o + 4].try_into().unwrap())
    }

    pub fn items(&self) -> Vec<u32> {
        (0..self.count()).map(|i| self.item(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_layout() -> Layout {
        Layout {
            table_size: 8,
            key_size: 4,
            max_items: 2,
            data_region_size: 4096,
            persist_high_water_mark: true,
        }
    }

    #[test]
    fn round_trips_all_fields() {
        let layout = small_layout();
        let mut buf = vec![0u8; layout.node_size() as usize];
        let mut n = NodeView::new(&mut buf, layout);
        n.init(b"abcd");
        n.set_next_same(111);
        n.set_next_other(222);
        n.push_item(7);
        n.push_item(9);
        assert_eq!(n.key(), b"abcd");
        assert_eq!(n.count(), 2);
        assert_eq!(n.next_same(), 111);
        assert_eq!(n.next_other(), 222);
        assert_eq!(n.items(), vec![7, 9]);
    }

    #[test]
    fn clear_for_free_zeroes_key_and_count_only() {
        let layout = small_layout();
        let mut buf = vec![0u8; layout.node_size() as usize];
        let mut n = NodeView::new(&mut buf, layout);
        n.init(b"abcd");
        n.push_item(5);
        n.set_next_other(99);
        n.clear_for_free();
        assert_eq!(n.key(), &[0, 0, 0, 0]);
        assert_eq!(n.count(), 0);
        assert_eq!(n.next_other(), 99);
    }
}
