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

//! Drives an [`mchi::MchiIndex`] with synthetic keys/ids and reports
//! insert/get/remove throughput. Not part of the storage engine's public
//! contract — a developer tool, the way `sky-bench` sits beside the
//! server it benchmarks.

use {
    clap::Parser,
    cli::Cli,
    env_logger::Builder,
    mchi::{Layout, MchiIndex},
    rand::{rngs::StdRng, Rng, SeedableRng},
    report::PhaseReport,
    std::{env, process, time::Instant},
};

#[macro_use]
extern crate log;

mod cli;
mod error;
mod report;

fn main() {
    Builder::new()
        .parse_filters(&env::var("MCHI_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();
    if let Err(e) = run() {
        error!("mchi-bench exited with error: {e}");
        process::exit(0x01);
    }
}

fn run() -> error::BResult<()> {
    let cli = Cli::parse();
    info!(
        "opening index at {} (keys={}, ids_per_key={})",
        cli.file, cli.keys, cli.ids_per_key
    );
    let mut idx = MchiIndex::open(&cli.file, Layout::default())?;
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    let keys: Vec<String> = (0..cli.keys).map(|i| format!("key-{i}")).collect();
    let ids: Vec<Vec<u32>> = keys
        .iter()
        .map(|_| {
            (0..cli.ids_per_key)
                .map(|_| rng.gen::<u32>())
                .collect::<Vec<_>>()
        })
        .collect();

    let start = Instant::now();
    for (key, ids) in keys.iter().zip(&ids) {
        idx.insert(key, ids)?;
    }
    let insert_report = PhaseReport::new("insert", cli.keys, start.elapsed());
    println!("{insert_report}");

    let start = Instant::now();
    let mut found = 0usize;
    for key in &keys {
        found += idx.get(key).len();
    }
    let get_report = PhaseReport::new("get", cli.keys, start.elapsed());
    println!("{get_report}");
    debug!("get phase observed {found} total ids across {} keys", cli.keys);

    let start = Instant::now();
    for (key, ids) in keys.iter().zip(&ids) {
        for id in ids {
            idx.remove(key, *id);
        }
    }
    let remove_report = PhaseReport::new("remove", cli.keys * cli.ids_per_key, start.elapsed());
    println!("{remove_report}");

    idx.close()?;
    if !cli.keep {
        std::fs::remove_file(&cli.file)?;
    } else {
        info!("keeping index file at {}", cli.file);
    }
    Ok(())
}
