//! Command implementations

pub mod cache;
pub mod features;

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use tracing::info;

use extdocs_features::BundleConfig;

use crate::cli::Cli;

/// Loads the configuration named on the command line, or the one found in
/// the source root, or the defaults.
pub fn load_config(cli: &Cli) -> Result<BundleConfig> {
    let mut config = if let Some(ref path) = cli.config {
        BundleConfig::from_file(path).into_diagnostic()?
    } else {
        find_config(&search_dir(cli))?
    };

    if cli.no_cache {
        config.cache = false;
    }

    Ok(config)
}

/// Returns the directory source paths are resolved against.
pub fn source_root(cli: &Cli, config: &BundleConfig) -> PathBuf {
    cli.root
        .clone()
        .or_else(|| config.base_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn search_dir(cli: &Cli) -> PathBuf {
    cli.root.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn find_config(dir: &Path) -> Result<BundleConfig> {
    if let Some(path) = BundleConfig::discover(dir) {
        info!("Using config: {}", path.display());
        return BundleConfig::from_file(&path).into_diagnostic();
    }

    // Keep the cache next to the sources when there is no config file
    let mut config = BundleConfig::new();
    config.base_dir = Some(dir.to_path_buf());
    Ok(config)
}
