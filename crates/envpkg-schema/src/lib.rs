//! Package manifest model for envpkg.
//!
//! This crate defines the schema layer: TOML manifest parsing and validation
//! (`PackageManifest`), platform-keyed dispatch tables (`PlatformTable`),
//! dependency specifiers (`Requirement`), placeholder templates for
//! environment commands (`Template`), release-history checks, and built-in
//! manifest presets.

pub mod history;
pub mod manifest;
pub mod platform;
pub mod preset;
pub mod requirement;
pub mod template;
pub mod types;

pub use history::{check_release_history, HistoryError};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, EnvCommand, Hook, ManifestError, PackageManifest,
    ScopedConfig,
};
pub use platform::{Platform, PlatformTable, UnknownPlatform};
pub use preset::{get_preset, list_presets, Preset, BUILTIN_PRESETS};
pub use requirement::{Requirement, RequirementError};
pub use template::{Placeholder, Segment, Template, TemplateError};
pub use types::{PackageName, Token};

pub use semver::Version;
