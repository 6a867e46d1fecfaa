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

use clap::Parser;

const HELP_TEMPLATE: &str = r#"
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
"#;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, help_template = HELP_TEMPLATE)]
pub struct Cli {
    #[arg(
        short,
        long,
        help = "Path to the index file to create/open",
        default_value = "mchi-bench.dat",
        value_name = "PATH"
    )]
    pub file: String,

    #[arg(
        short = 'k',
        long = "keys",
        help = "Number of distinct keys to insert",
        value_name = "COUNT",
        default_value_t = 10_000
    )]
    pub keys: usize,

    #[arg(
        short = 'i',
        long = "ids-per-key",
        help = "Number of identifiers inserted per key",
        value_name = "COUNT",
        default_value_t = 8
    )]
    pub ids_per_key: usize,

    #[arg(
        long = "keep",
        help = "Keep the index file around after the run instead of deleting it",
        default_value_t = false
    )]
    pub keep: bool,
}
