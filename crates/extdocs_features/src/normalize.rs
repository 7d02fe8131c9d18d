//! Normalization of raw feature documents into feature families.

use std::collections::BTreeSet;
use std::collections::btree_map::Entry;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Feature, FeatureFamily, FeaturesError, Platform};

/// Converts a parsed `_*_features.json` document into a feature family.
///
/// - Each top-level key is a feature name. Its value is either a declaration
///   object or an array of declaration objects, of which the first one not
///   restricted to the `trunk` channel is used.
/// - Features restricted to `trunk` are dropped.
/// - `extension_types` is replaced by the `platforms` it implies.
pub fn parse_features(raw: &Value) -> Result<FeatureFamily, FeaturesError> {
    let object = raw
        .as_object()
        .ok_or_else(|| FeaturesError::malformed("feature document must be a JSON object"))?;

    let mut features = FeatureFamily::new();
    for (name, value) in object {
        match select_declaration(name, value)? {
            Some(declaration) => {
                features.insert(name.clone(), normalize_feature(name, declaration)?);
            }
            None => debug!("Skipping trunk-only feature {}", name),
        }
    }

    Ok(features)
}

/// Merges `overlay` into `base`.
///
/// The result holds every feature of both families. Where a name exists in
/// both, the overlay feature's attributes are written over the base
/// feature's.
pub fn merged_with(overlay: FeatureFamily, mut base: FeatureFamily) -> FeatureFamily {
    for (name, feature) in overlay {
        match base.entry(name) {
            Entry::Occupied(mut entry) => entry.get_mut().overlay(feature),
            Entry::Vacant(entry) => {
                entry.insert(feature);
            }
        }
    }
    base
}

/// Returns the features of `family` available on `platform`.
pub fn filtered(family: &FeatureFamily, platform: Platform) -> FeatureFamily {
    family
        .iter()
        .filter(|(_, feature)| feature.is_available_on(platform))
        .map(|(name, feature)| (name.clone(), feature.clone()))
        .collect()
}

fn is_trunk(declaration: &Map<String, Value>) -> bool {
    declaration.get("channel").and_then(Value::as_str) == Some("trunk")
}

fn select_declaration<'a>(
    name: &str,
    value: &'a Value,
) -> Result<Option<&'a Map<String, Value>>, FeaturesError> {
    match value {
        Value::Object(declaration) => Ok((!is_trunk(declaration)).then_some(declaration)),
        Value::Array(declarations) => {
            let mut candidates = Vec::new();
            for declaration in declarations {
                let declaration = declaration.as_object().ok_or_else(|| {
                    FeaturesError::malformed(format!(
                        "feature '{}' has a declaration that is not an object",
                        name
                    ))
                })?;
                if !is_trunk(declaration) {
                    candidates.push(declaration);
                }
            }
            if candidates.len() > 1 {
                warn!(
                    "Feature {} has {} non-trunk declarations; using the first",
                    name,
                    candidates.len()
                );
            }
            Ok(candidates.into_iter().next())
        }
        _ => Err(FeaturesError::malformed(format!(
            "feature '{}' must be an object or an array of objects",
            name
        ))),
    }
}

fn normalize_feature(
    name: &str,
    declaration: &Map<String, Value>,
) -> Result<Feature, FeaturesError> {
    let mut attributes = declaration.clone();
    let mut feature = Feature::new(name);

    if let Some(extension_types) = attributes.remove("extension_types") {
        feature.platforms = Some(platforms_for_extension_types(&extension_types));
    }

    if let Some(dependencies) = attributes.remove("dependencies") {
        let dependencies = serde_json::from_value(dependencies).map_err(|e| {
            FeaturesError::malformed(format!("feature '{}' dependencies: {}", name, e))
        })?;
        feature.dependencies = Some(dependencies);
    }

    if let Some(platforms) = attributes.remove("platforms") {
        let platforms = serde_json::from_value(platforms).map_err(|e| {
            FeaturesError::malformed(format!("feature '{}' platforms: {}", name, e))
        })?;
        feature.platforms = Some(platforms);
    }

    // The key is authoritative.
    attributes.remove("name");
    feature.attributes = attributes;

    Ok(feature)
}

fn platforms_for_extension_types(extension_types: &Value) -> BTreeSet<Platform> {
    let types: Vec<&str> = match extension_types {
        Value::String(s) if s == "all" => return Platform::all(),
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let mut platforms = BTreeSet::new();
    if types.contains(&"platform_app") {
        platforms.insert(Platform::Apps);
    }
    if types.contains(&"extension") {
        platforms.insert(Platform::Extensions);
    }
    platforms
}
