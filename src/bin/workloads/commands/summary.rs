//! `workloads summary` - report the local install state.

use anyhow::{bail, Result};

use workloads::inventory::LocalInventory;

use crate::cli::SummaryArgs;

use super::print_json;

pub fn execute(args: SummaryArgs) -> Result<()> {
    let inventory = match args.root {
        Some(root) => LocalInventory::at_root(root),
        None => match LocalInventory::discover() {
            Some(inventory) => inventory,
            None => bail!("no dotnet installation found; pass --root to inspect one explicitly"),
        },
    };

    tracing::debug!("inspecting {}", inventory.root().display());
    print_json(&inventory.build_summary(args.detailed))
}
