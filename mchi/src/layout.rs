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

//! On-disk geometry of the index file.
//!
//! A [`Layout`] is a runtime value rather than a set of compile-time
//! constants so that tests and tools can open a small file without a
//! separate build, but [`Layout::default`] reproduces the tunables named
//! in the format description (`TABLE_SIZE = 100_000`, `KEY_SIZE = 32`,
//! `MAX_ITEMS = 64`, `DATA_REGION = 500 MiB`) exactly.

/// Width in bytes of one slot-table entry (a little-endian file offset).
pub const SLOT_SIZE: u64 = 8;
/// Width in bytes of the free-list-head cell and the high-water-mark cell.
pub const HEADER_CELL_SIZE: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub table_size: u64,
    pub key_size: u32,
    pub max_items: u32,
    pub data_region_size: u64,
    /// When `false`, reproduces the original reference layout byte-for-byte:
    /// no persisted high-water mark, and the bump pointer always resets to
    /// the start of the data region on reopen (see `compat_v0`).
    pub persist_high_water_mark: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub const fn new() -> Self {
        Self {
            table_size: 100_000,
            key_size: 32,
            max_items: 64,
            data_region_size: 500 * 1024 * 1024,
            persist_high_water_mark: true,
        }
    }

    /// The byte-exact reference layout: no reserved high-water-mark cell.
    /// Using this layout means a node allocated in one `open`/`close` cycle
    /// and left off the free list is unreachable after reopening (the
    /// bump pointer always resumes from the start of the data region) —
    /// this is `mchi`'s opt-in reproduction of the known defect described
    /// in the format's design notes, kept only for reading/writing files
    /// produced by tools that expect the original zone layout.
    pub const fn compat_v0() -> Self {
        Self {
            persist_high_water_mark: false,
            ..Self::new()
        }
    }

    pub fn node_header_size(&self) -> u64 {
        self.key_size as u64 + 4 + 8 + 8
    }

    pub fn node_size(&self) -> u64 {
        self.node_header_size() + self.max_items as u64 * 4
    }

    pub fn slot_table_size(&self) -> u64 {
        SLOT_SIZE * self.table_size
    }

    /// Offset of the free-list-head cell, right after the slot table.
    pub fn free_list_head_offset(&self) -> u64 {
        self.slot_table_size()
    }

    /// Offset of the high-water-mark cell, if this layout persists one.
    pub fn high_water_mark_offset(&self) -> Option<u64> {
        self.persist_high_water_mark
            .then(|| self.free_list_head_offset() + HEADER_CELL_SIZE)
    }

    /// Offset where the data region (and thus bump allocation) begins.
    pub fn data_start_offset(&self) -> u64 {
        let header_cells = if self.persist_high_water_mark { 2 } else { 1 };
        self.free_list_head_offset() + header_cells * HEADER_CELL_SIZE
    }

    pub fn file_size(&self) -> u64 {
        self.data_start_offset() + self.data_region_size
    }

    /// Encode `key` into a fixed `key_size`-byte buffer: truncated if too
    /// long, zero-padded if too short.
    pub fn encode_key(&self, key: &str) -> Vec<u8> {
        let mut buf = vec![0u8; self.key_size as usize];
        let bytes = key.as_bytes();
        let n = bytes.len().min(self.key_size as usize);
        buf[..n].copy_from_slice(&bytes[..n]);
        buf
    }

    /// Hash a key into a bucket index: `sum(key_bytes) mod table_size`.
    ///
    /// Deliberately weak — this preserves behavioral compatibility with
    /// the reference format. Collisions are resolved by the other-chain.
    pub fn hash(&self, key: &str) -> u64 {
        let sum: u64 = key.as_bytes().iter().map(|b| *b as u64).sum();
        sum % self.table_size
    }

    pub fn slot_offset(&self, bucket: u64) -> u64 {
        bucket * SLOT_SIZE
    }
}
