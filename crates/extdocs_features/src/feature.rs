//! Feature and platform types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A runtime surface a feature can be available on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apps,
    Extensions,
}

impl Platform {
    /// Every known platform.
    pub const ALL: [Platform; 2] = [Platform::Apps, Platform::Extensions];

    /// The set of every known platform.
    pub fn all() -> BTreeSet<Platform> {
        Self::ALL.into_iter().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Apps => "apps",
            Platform::Extensions => "extensions",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apps" => Ok(Platform::Apps),
            "extensions" => Ok(Platform::Extensions),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// A named API, manifest key or permission.
///
/// `dependencies` and `platforms` are the attributes feature resolution
/// works with; everything else is carried through untouched in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// The feature's name, equal to its key in the family.
    pub name: String,

    /// `"<family>:<name>"` references. `None` means the feature declares no
    /// dependencies at all, which is different from an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    /// Platforms the feature is available on. `None` when unknown or, for
    /// API features, when a dependency could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<BTreeSet<Platform>>,

    /// Opaque payload.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    /// Creates a feature with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: None,
            platforms: None,
            attributes: Map::new(),
        }
    }

    /// Returns an opaque attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns true if the feature is known to be available on `platform`.
    pub fn is_available_on(&self, platform: Platform) -> bool {
        self.platforms
            .as_ref()
            .is_some_and(|platforms| platforms.contains(&platform))
    }

    /// Writes the attributes present in `other` over this feature's.
    pub fn overlay(&mut self, other: Feature) {
        if other.dependencies.is_some() {
            self.dependencies = other.dependencies;
        }
        if other.platforms.is_some() {
            self.platforms = other.platforms;
        }
        self.attributes.extend(other.attributes);
    }
}

/// All features of one family, keyed by name.
pub type FeatureFamily = BTreeMap<String, Feature>;
