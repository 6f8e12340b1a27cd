//! `workloads deps` - show a manifest's external tool dependencies.

use anyhow::{bail, Context, Result};
use url::Url;

use workloads::catalog::ManifestCatalog;
use workloads::core::SdkVersion;

use crate::cli::DepsArgs;

use super::{build_feed, parse_band, print_json};

pub fn execute(feed_url: &Url, args: DepsArgs) -> Result<()> {
    let band = parse_band(&args.band)?;
    let feed = build_feed(feed_url);
    let catalog = ManifestCatalog::new(&feed);

    let version: SdkVersion = match args.manifest_version {
        Some(version) => version
            .parse()
            .with_context(|| format!("invalid manifest version `{version}`"))?,
        None => {
            let versions = catalog
                .list_manifest_versions(&args.id, &band, args.include_prerelease)
                .context("failed to list manifest versions")?;
            match versions.into_iter().next() {
                Some(latest) => latest,
                None => bail!("no published versions for {} at band {}", args.id, band),
            }
        }
    };

    let dependencies = catalog
        .get_dependencies(&args.id, &band, &version)
        .context("failed to fetch dependencies")?;

    match dependencies {
        Some(dependencies) => print_json(&dependencies),
        None => bail!(
            "no dependency document in {} {} at band {}",
            args.id,
            version,
            band
        ),
    }
}
