//! Features command implementation

use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tracing::debug;

use extdocs_features::normalize::filtered;
use extdocs_features::{FamilyKind, FeaturesBundle, Platform};
use extdocs_fs::LocalFileSystem;

use super::{load_config, source_root};
use crate::cli::Cli;
use crate::output::output_features;

pub fn run_features(
    cli: &Cli,
    kind: FamilyKind,
    platform: Option<Platform>,
    format: &str,
) -> Result<()> {
    let config = load_config(cli)?;
    let root = source_root(cli, &config);
    debug!("Reading {} features from {}", kind, root.display());

    let fs = Arc::new(LocalFileSystem::new(root));
    let creator = config.object_store_creator(fs.as_ref()).into_diagnostic()?;

    let bundle = FeaturesBundle::with_sources(
        fs,
        &config.compiled_cache_factory(),
        &creator,
        &config.sources,
    )
    .into_diagnostic()?;

    let mut features = bundle.features(kind).into_diagnostic()?;
    if let Some(platform) = platform {
        features = filtered(&features, platform);
    }

    output_features(&features, format)
}
