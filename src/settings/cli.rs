// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

pub(super) const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, StructOpt)]
#[structopt()]
pub(crate) struct Args {
    /// Path to a configuration file. Defaults to `config.toml` if that file exists.
    #[structopt(short, long, parse(from_os_str))]
    pub(crate) config_path: Option<PathBuf>,

    /// Log more. May be given more than once.
    #[structopt(short, long, parse(from_occurrences))]
    pub(crate) verbose: u8,

    /// Only log warnings and errors.
    #[structopt(short, long)]
    pub(crate) quiet: bool,
}

impl Args {
    /// The log filter to use when `RUST_LOG` is not set.
    pub(crate) fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
