//! Locations of the feature documents in the source tree.

pub const API_FEATURES: &str = "chrome/common/extensions/api/_api_features.json";
pub const MANIFEST_FEATURES: &str = "chrome/common/extensions/api/_manifest_features.json";
pub const PERMISSION_FEATURES: &str = "chrome/common/extensions/api/_permission_features.json";

/// Manifest keys described by the documentation templates.
pub const MANIFEST_DECLARATIONS: &str =
    "chrome/common/extensions/docs/templates/json/manifest.json";

/// Permissions described by the documentation templates.
pub const PERMISSION_DECLARATIONS: &str =
    "chrome/common/extensions/docs/templates/json/permissions.json";
