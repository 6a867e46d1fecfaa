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

//! Error types for the index. Kept as a hand-rolled enum with `Display` and
//! `From` impls rather than a derive-macro crate, matching the rest of the
//! storage engine.

use std::{fmt, io::Error as IoError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The backing file could not be created, extended, or mapped.
    OpenFailed(IoError),
    /// The data region has no room for another node.
    OutOfSpace,
    /// Any other I/O error encountered after a successful `open`.
    Io(IoError),
}

impl Error {
    pub fn open_failed(e: IoError) -> Self {
        Self::OpenFailed(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(e) => write!(f, "failed to open index file: {e}"),
            Self::OutOfSpace => write!(f, "data region is full; no room for another node"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}
