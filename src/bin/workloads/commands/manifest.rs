//! `workloads manifest` - query published workload manifests.

use anyhow::{bail, Context, Result};
use url::Url;

use workloads::catalog::ManifestCatalog;
use workloads::core::SdkVersion;

use crate::cli::ManifestArgs;

use super::{build_feed, parse_band, print_json};

pub fn execute(feed_url: &Url, args: ManifestArgs) -> Result<()> {
    let band = parse_band(&args.band)?;
    let feed = build_feed(feed_url);
    let catalog = ManifestCatalog::new(&feed);

    if args.list {
        let versions = catalog
            .list_manifest_versions(&args.id, &band, args.include_prerelease)
            .context("failed to list manifest versions")?;
        let versions: Vec<String> = versions.iter().map(SdkVersion::to_string).collect();
        return print_json(&versions);
    }

    let manifest = match args.manifest_version {
        Some(version) => {
            let version: SdkVersion = version
                .parse()
                .with_context(|| format!("invalid manifest version `{version}`"))?;
            catalog
                .get_manifest(&args.id, &band, &version)
                .context("failed to fetch manifest")?
        }
        None => catalog
            .get_latest_manifest(&args.id, &band, args.include_prerelease)
            .context("failed to fetch manifest")?
            .map(|(_, manifest)| manifest),
    };

    match manifest {
        Some(manifest) => print_json(&manifest),
        None => bail!("no manifest found for {} at band {}", args.id, band),
    }
}
