//! Output formatting module

mod json;
mod text;

use miette::Result;

use extdocs_features::FeatureFamily;

pub fn output_features(features: &FeatureFamily, format: &str) -> Result<()> {
    match format {
        "json" => json::output_json(features)?,
        "text" => text::output_text(features),
        other => return Err(miette::miette!("Unknown output format '{}'", other)),
    }
    Ok(())
}
