pub mod build_requires;
pub mod completions;
pub mod env;
pub mod history;
pub mod inspect;
pub mod man_pages;
pub mod new;
pub mod release_path;
pub mod select;
pub mod validate;

use envpkg_core::{host_platform, EnvpkgConfig, HostContext};
use envpkg_schema::{parse_manifest_file, PackageManifest, Platform};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_EVAL_ERROR: u8 = 3;
pub const EXIT_NO_VARIANT: u8 = 4;

/// Context overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ContextArgs {
    pub config: Option<PathBuf>,
    pub platform: Option<String>,
    pub arch: Option<String>,
    pub os: Option<String>,
    pub toolsets: Vec<String>,
}

impl ContextArgs {
    pub fn load_config(&self) -> Result<EnvpkgConfig, String> {
        let config = match &self.config {
            Some(path) => EnvpkgConfig::load(path),
            None => EnvpkgConfig::load_default(),
        };
        config.map_err(|e| e.to_string())
    }

    /// Detection, then config, then flags.
    pub fn resolve(&self, config: &EnvpkgConfig) -> HostContext {
        let mut ctx = config.apply_to(HostContext::detect());
        if let Some(platform) = &self.platform {
            ctx.platform.clone_from(platform);
        }
        if let Some(arch) = &self.arch {
            ctx.arch.clone_from(arch);
        }
        if let Some(os) = &self.os {
            ctx.os.clone_from(os);
        }
        ctx.toolsets.extend(self.toolsets.iter().cloned());
        debug!("host context: {ctx}");
        ctx
    }
}

pub fn load_manifest(path: &Path) -> Result<PackageManifest, String> {
    parse_manifest_file(path).map_err(|e| format!("manifest error: {}: {e}", path.display()))
}

pub fn platform_of(ctx: &HostContext) -> Result<Platform, String> {
    host_platform(&ctx.platform).map_err(|e| e.to_string())
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn ok_mark(msg: &str) -> String {
    use console::Style;
    format!("{} {msg}", Style::new().green().apply_to("✓"))
}

pub fn fail_mark(msg: &str) -> String {
    use console::Style;
    format!("{} {msg}", Style::new().red().apply_to("✗"))
}

pub fn format_variant(tokens: &[envpkg_schema::Token]) -> String {
    let parts: Vec<&str> = tokens.iter().map(envpkg_schema::Token::as_str).collect();
    format!("[{}]", parts.join(", "))
}
