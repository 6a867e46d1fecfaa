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

use std::fmt::Display;

pub type BResult<T> = Result<T, Error>;

/// Benchmark tool errors.
pub enum Error {
    /// An error originating from the index itself
    Index(mchi::Error),
    /// A filesystem error encountered outside of the index's own `open`
    Io(std::io::Error),
}

impl From<mchi::Error> for Error {
    fn from(e: mchi::Error) -> Self {
        Self::Index(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Index(e) => write!(f, "index error: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}
