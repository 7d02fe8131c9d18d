//! Cache command implementation

use extdocs_cache::ObjectStoreCreator;
use miette::{IntoDiagnostic, Result};
use tracing::info;

use super::load_config;
use crate::cli::Cli;

pub fn run_cache_clean(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let creator = ObjectStoreCreator::persistent(config.cache_path(), config.hash());
    creator.clear().into_diagnostic()?;

    info!("Feature cache cleaned");
    Ok(())
}
