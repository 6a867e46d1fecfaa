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

//! `mchi` — a persistent, memory-mapped chained hash table.
//!
//! The table lives entirely inside one fixed-size file: a slot table of
//! bucket heads, a free list, and a data region of fixed-size nodes. Each
//! bucket chains distinct keys through `next_other`; each key chains its
//! own overflow nodes through `next_same`. There is no tokenizer, ranker,
//! or network surface here — those are external collaborators that only
//! see [`MchiIndex::insert`], [`MchiIndex::get`], and [`MchiIndex::remove`].
//!
//! This crate is single-writer, single-reader, with no internal locking:
//! callers that need concurrent access from multiple processes (or
//! multiple handles onto the same file) must serialize it themselves.

mod alloc;
pub mod error;
pub mod layout;
mod node;

mod index;

pub use error::{Error, Result};
pub use index::MchiIndex;
pub use layout::Layout;
