//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use extdocs_features::{FamilyKind, Platform};

/// extdocs - Feature resolution for the extensions documentation
#[derive(Parser)]
#[command(name = "extdocs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Source tree root (defaults to the configuration file's directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable caching
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a feature family
    Features {
        /// Family to print (api, manifest, permission)
        kind: FamilyKind,

        /// Only print features available on this platform (apps, extensions)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Manage the feature cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove the persisted feature stores
    Clean,
}
