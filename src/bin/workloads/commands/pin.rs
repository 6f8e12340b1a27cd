//! `workloads pin` - show the nearest global.json and its pins.

use anyhow::{Context, Result};

use workloads::pinning::GlobalJsonInfo;

use crate::cli::PinArgs;

use super::print_json;

pub fn execute(args: PinArgs) -> Result<()> {
    let start = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };

    match GlobalJsonInfo::load_nearest(&start) {
        Some(info) => print_json(&info),
        None => {
            println!("no global.json found at or above {}", start.display());
            Ok(())
        }
    }
}
