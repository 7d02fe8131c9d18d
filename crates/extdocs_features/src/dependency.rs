//! Feature families and dependency references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FeaturesError;

/// One of the three feature families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Api,
    Manifest,
    Permission,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 3] = [
        FamilyKind::Api,
        FamilyKind::Manifest,
        FamilyKind::Permission,
    ];

    /// The prefix used for this family in dependency references.
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyKind::Api => "api",
            FamilyKind::Manifest => "manifest",
            FamilyKind::Permission => "permission",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(FamilyKind::Api),
            "manifest" => Ok(FamilyKind::Manifest),
            "permission" => Ok(FamilyKind::Permission),
            other => Err(format!("unknown feature family '{}'", other)),
        }
    }
}

/// A parsed `"<family>:<name>"` dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRef {
    pub family: FamilyKind,
    pub name: String,
}

impl DependencyRef {
    pub fn new(family: FamilyKind, name: impl Into<String>) -> Self {
        Self {
            family,
            name: name.into(),
        }
    }
}

impl FromStr for DependencyRef {
    type Err = FeaturesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (family, name) = s
            .split_once(':')
            .ok_or_else(|| FeaturesError::invalid_dependency(s))?;
        let family = family
            .parse::<FamilyKind>()
            .map_err(|_| FeaturesError::invalid_dependency(s))?;
        Ok(Self::new(family, name))
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.name)
    }
}
