//! Text output formatter

use extdocs_features::{Feature, FeatureFamily};

pub fn output_text(features: &FeatureFamily) {
    let width = features.keys().map(String::len).max().unwrap_or(0);

    for (name, feature) in features {
        println!("{:<width$}  {}", name, platforms(feature), width = width);
    }

    println!();
    println!("{} features", features.len());
}

fn platforms(feature: &Feature) -> String {
    match &feature.platforms {
        Some(platforms) => {
            let names: Vec<_> = platforms.iter().map(|p| p.as_str()).collect();
            format!("[{}]", names.join(", "))
        }
        None => "[unavailable]".to_string(),
    }
}
