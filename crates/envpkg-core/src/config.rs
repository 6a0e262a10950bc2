use crate::context::HostContext;
use crate::EvalError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "ENVPKG_CONFIG";

/// User-level defaults for evaluation.
///
/// Every field is optional; a missing field falls back to detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvpkgConfig {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub toolsets: Vec<String>,
    /// Directory that holds installed packages as `<name>/<version>/<variant>`.
    #[serde(default)]
    pub packages_root: Option<PathBuf>,
}

impl EnvpkgConfig {
    /// Load from `$ENVPKG_CONFIG` or `~/.config/envpkg/config.toml`.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_default() -> Result<Self, EvalError> {
        let Some(path) = default_config_path() else {
            debug!("no HOME and no {CONFIG_ENV_VAR}; using default config");
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!("config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| EvalError::Config(format!("invalid config {}: {e}", path.display())))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply the configured overrides on top of `base`.
    pub fn apply_to(&self, mut base: HostContext) -> HostContext {
        if let Some(platform) = &self.platform {
            base.platform.clone_from(platform);
        }
        if let Some(arch) = &self.arch {
            base.arch.clone_from(arch);
        }
        if let Some(os) = &self.os {
            base.os.clone_from(os);
        }
        base.toolsets.extend(self.toolsets.iter().cloned());
        base
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/envpkg/config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
platform = "windows"
arch = "x64"
os = "windows-10"
toolsets = ["usd-20.11"]
packages_root = "R:/int"
"#,
        )
        .unwrap();

        let config = EnvpkgConfig::load(&path).unwrap();
        assert_eq!(config.platform.as_deref(), Some("windows"));
        assert_eq!(config.toolsets, vec!["usd-20.11"]);
        assert_eq!(config.packages_root, Some(PathBuf::from("R:/int")));
    }

    #[test]
    fn empty_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(EnvpkgConfig::load(&path).unwrap(), EnvpkgConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "plattform = \"linux\"\n").unwrap();
        let err = EnvpkgConfig::load(&path).unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EnvpkgConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, EvalError::Io(_)));
    }

    #[test]
    fn overrides_replace_detected_values() {
        let config = EnvpkgConfig {
            os: Some("centos-7".to_owned()),
            toolsets: vec!["usd-20.11".to_owned()],
            ..EnvpkgConfig::default()
        };
        let ctx = config.apply_to(HostContext::new("linux", "x86_64", "linux"));
        assert_eq!(ctx.platform, "linux");
        assert_eq!(ctx.os, "centos-7");
        assert!(ctx.toolsets.contains("usd-20.11"));
    }
}
