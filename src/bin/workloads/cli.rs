//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

/// Default feed: the nuget.org V3 flat container.
pub const DEFAULT_FEED: &str = "https://api.nuget.org/v3-flatcontainer";

/// workloads - inspect .NET SDK workload manifests, sets, and installs
#[derive(Parser)]
#[command(name = "workloads")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Package feed base URL (NuGet V3 flat container)
    #[arg(long, global = true, env = "WORKLOADS_FEED", default_value = DEFAULT_FEED)]
    pub feed: Url,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the locally installed SDKs and workload manifests
    Summary(SummaryArgs),

    /// Query published workload manifests for a feature band
    Manifest(ManifestArgs),

    /// Query published workload sets for a feature band
    Sets(SetsArgs),

    /// Show the external tool dependencies of a workload manifest
    Deps(DepsArgs),

    /// Show the nearest global.json and its pins
    Pin(PinArgs),
}

#[derive(Args)]
pub struct SummaryArgs {
    /// dotnet root to inspect (defaults to auto-discovery)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Include full workload and pack definitions per manifest
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Manifest id (e.g. microsoft.net.sdk.maui)
    pub id: String,

    /// SDK feature band (e.g. 9.0.100)
    #[arg(long)]
    pub band: String,

    /// Manifest version to fetch (defaults to the latest)
    #[arg(long)]
    pub manifest_version: Option<String>,

    /// List published versions instead of fetching a document
    #[arg(long)]
    pub list: bool,

    /// Include prerelease versions
    #[arg(long)]
    pub include_prerelease: bool,
}

#[derive(Args)]
pub struct SetsArgs {
    /// SDK feature band (e.g. 9.0.100)
    pub band: String,

    /// Workload set version to fetch (defaults to the latest)
    #[arg(long)]
    pub set_version: Option<String>,

    /// List published versions instead of fetching a document
    #[arg(long)]
    pub list: bool,

    /// Also resolve every manifest the set pins
    #[arg(long)]
    pub resolve: bool,

    /// Include prerelease versions
    #[arg(long)]
    pub include_prerelease: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Manifest id (e.g. microsoft.net.sdk.android)
    pub id: String,

    /// SDK feature band (e.g. 9.0.100)
    #[arg(long)]
    pub band: String,

    /// Manifest version (defaults to the latest)
    #[arg(long)]
    pub manifest_version: Option<String>,

    /// Include prerelease versions when resolving the latest
    #[arg(long)]
    pub include_prerelease: bool,
}

#[derive(Args)]
pub struct PinArgs {
    /// Directory to start the upward search from (defaults to cwd)
    pub path: Option<PathBuf>,
}
