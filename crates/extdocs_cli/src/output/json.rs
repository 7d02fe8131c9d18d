//! JSON output formatter

use miette::{IntoDiagnostic, Result};

use extdocs_features::FeatureFamily;

pub fn output_json(features: &FeatureFamily) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(features).into_diagnostic()?
    );
    Ok(())
}
