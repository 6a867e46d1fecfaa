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

//! A minimal per-phase report: one [`PhaseReport`] per benched operation
//! (`insert`/`get`/`remove`), printed as a throughput line.

use std::time::Duration;

pub struct PhaseReport {
    pub name: &'static str,
    pub op_count: usize,
    pub elapsed: Duration,
}

impl PhaseReport {
    pub fn new(name: &'static str, op_count: usize, elapsed: Duration) -> Self {
        Self {
            name,
            op_count,
            elapsed,
        }
    }

    pub fn ops_per_sec(&self) -> f64 {
        if self.elapsed.as_secs_f64() == 0.0 {
            return f64::INFINITY;
        }
        self.op_count as f64 / self.elapsed.as_secs_f64()
    }
}

impl std::fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<8} {:>9} ops in {:>8.3}ms  ({:>12.1} ops/sec)",
            self.name,
            self.op_count,
            self.elapsed.as_secs_f64() * 1000.0,
            self.ops_per_sec()
        )
    }
}
