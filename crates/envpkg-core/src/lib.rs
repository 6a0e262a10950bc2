//! Evaluation of envpkg manifests against a host context.
//!
//! Evaluation runs in two phases. Phase one resolves the fields that depend
//! only on the host platform (release path, private build requirements).
//! Phase two resolves the context-dependent fields: variant selection and
//! environment expansion. Everything here is pure; applying the resulting
//! [`EnvOp`]s to a real process is left to the caller.

pub mod config;
pub mod context;
pub mod environment;
pub mod evaluate;
pub mod variant;

pub use config::EnvpkgConfig;
pub use context::HostContext;
pub use environment::{render_script, EnvOp, Environment, Shell};
pub use evaluate::{
    expand_environment, host_platform, package_root, resolve_build_requirements,
    resolve_release_config, Evaluation, ResolvedContext,
};
pub use variant::{constraints, select_variant, Constraint, NoMatchingVariant, VariantMatch};

use envpkg_schema::{Hook, ManifestError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("unsupported platform: {field} has no branch for '{platform}'")]
    UnsupportedPlatform {
        field: &'static str,
        platform: String,
    },
    #[error("no matching variant: {0}")]
    NoMatchingVariant(#[from] NoMatchingVariant),
    #[error("template resolution error: {hook}: '{var}' uses {placeholder}, which has no value")]
    TemplateResolution {
        hook: Hook,
        var: String,
        placeholder: String,
    },
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
