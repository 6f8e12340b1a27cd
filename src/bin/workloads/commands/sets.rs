//! `workloads sets` - query published workload sets.

use anyhow::{bail, Context, Result};
use url::Url;

use workloads::catalog::{ManifestCatalog, WorkloadSetCatalog};
use workloads::core::SdkVersion;
use workloads::feed::CancelToken;

use crate::cli::SetsArgs;

use super::{build_feed, parse_band, print_json};

pub fn execute(feed_url: &Url, args: SetsArgs) -> Result<()> {
    let band = parse_band(&args.band)?;
    let feed = build_feed(feed_url);
    let catalog = WorkloadSetCatalog::new(&feed);

    if args.list {
        let versions = catalog
            .list_set_versions(&band, args.include_prerelease)
            .context("failed to list workload set versions")?;
        let versions: Vec<String> = versions.iter().map(SdkVersion::to_string).collect();
        return print_json(&versions);
    }

    let set = match args.set_version {
        Some(version) => {
            let version: SdkVersion = version
                .parse()
                .with_context(|| format!("invalid workload set version `{version}`"))?;
            catalog
                .get_workload_set(&band, &version)
                .context("failed to fetch workload set")?
        }
        None => catalog
            .get_latest_workload_set(&band, args.include_prerelease)
            .context("failed to fetch workload set")?,
    };

    let Some(set) = set else {
        bail!("no workload set found for band {}", band);
    };

    if args.resolve {
        let manifests = ManifestCatalog::new(&feed);
        let resolution = manifests.manifests_for_set(&set, &CancelToken::new());
        return print_json(&resolution);
    }

    print_json(&set)
}
