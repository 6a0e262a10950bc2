use crate::platform::PlatformTable;
use crate::requirement::Requirement;
use crate::template::{is_valid_var_name, Placeholder, Template};
use crate::types::{PackageName, Token};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to serialize manifest: {0}")]
    SerializeToml(#[from] toml::ser::Error),
    #[error("name must not be empty")]
    EmptyName,
    #[error("package '{0}' must list at least one author")]
    NoAuthors(String),
    #[error("author #{0} must not be empty")]
    EmptyAuthor(usize),
    #[error("variant #{0} must declare at least one token")]
    EmptyVariant(usize),
    #[error("variant #{variant} has an invalid token '{token}'")]
    InvalidVariantToken { variant: usize, token: String },
    #[error("{hook}: invalid environment variable name '{var}'")]
    InvalidVarName { hook: Hook, var: String },
    #[error("{hook}: '{var}' references undefined template variable {placeholder}")]
    UndefinedTemplateVariable {
        hook: Hook,
        var: String,
        placeholder: String,
    },
}

/// Lifecycle hook that carries environment commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Applied to the build process of the package itself.
    PreBuild,
    /// Applied to every process that consumes the package.
    Commands,
}

impl Hook {
    pub const ALL: [Hook; 2] = [Hook::PreBuild, Hook::Commands];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreBuild => "pre_build_commands",
            Self::Commands => "commands",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared environment mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EnvCommand {
    /// Overwrite `var` unconditionally.
    Set { var: String, value: Template },
    /// Push onto the list held by `var`, keeping prior entries.
    Append { var: String, value: Template },
}

impl EnvCommand {
    pub fn set(var: impl Into<String>, value: Template) -> Self {
        Self::Set {
            var: var.into(),
            value,
        }
    }

    pub fn append(var: impl Into<String>, value: Template) -> Self {
        Self::Append {
            var: var.into(),
            value,
        }
    }

    pub fn var(&self) -> &str {
        match self {
            Self::Set { var, .. } | Self::Append { var, .. } => var,
        }
    }

    pub fn value(&self) -> &Template {
        match self {
            Self::Set { value, .. } | Self::Append { value, .. } => value,
        }
    }
}

/// Scoped configuration overrides declared by the package.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScopedConfig {
    #[serde(default, skip_serializing_if = "PlatformTable::is_empty")]
    pub release_packages_path: PlatformTable<String>,
}

impl ScopedConfig {
    pub fn is_empty(&self) -> bool {
        self.release_packages_path.is_empty()
    }
}

/// In-memory model of one package manifest.
///
/// Field order matters for serialization: plain values first, then tables,
/// then arrays of tables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    pub name: PackageName,
    pub version: Version,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Vec<Token>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_system: Option<String>,
    #[serde(default, skip_serializing_if = "ScopedConfig::is_empty")]
    pub config: ScopedConfig,
    #[serde(default, skip_serializing_if = "PlatformTable::is_empty")]
    pub private_build_requires: PlatformTable<Vec<Requirement>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_build_commands: Vec<EnvCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<EnvCommand>,
}

impl PackageManifest {
    /// `name-version`, the form used for release directories and requirements.
    pub fn qualified_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn hook(&self, hook: Hook) -> &[EnvCommand] {
        match hook {
            Hook::PreBuild => &self.pre_build_commands,
            Hook::Commands => &self.commands,
        }
    }

    /// Structural checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::EmptyName);
        }

        if self.authors.is_empty() {
            return Err(ManifestError::NoAuthors(self.name.to_string()));
        }
        if let Some(index) = self.authors.iter().position(|a| a.trim().is_empty()) {
            return Err(ManifestError::EmptyAuthor(index));
        }

        for (index, variant) in self.variants.iter().enumerate() {
            if variant.is_empty() {
                return Err(ManifestError::EmptyVariant(index));
            }
            if let Some(token) = variant
                .iter()
                .find(|t| t.is_empty() || t.chars().any(char::is_whitespace))
            {
                return Err(ManifestError::InvalidVariantToken {
                    variant: index,
                    token: token.to_string(),
                });
            }
        }

        for hook in Hook::ALL {
            validate_hook(hook, self.hook(hook))?;
        }

        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `{env.VAR}` may only read a variable that an earlier `set` in the same hook
/// defined; every other placeholder is resolved by the evaluator.
fn validate_hook(hook: Hook, commands: &[EnvCommand]) -> Result<(), ManifestError> {
    let mut defined: HashSet<&str> = HashSet::new();
    for command in commands {
        if !is_valid_var_name(command.var()) {
            return Err(ManifestError::InvalidVarName {
                hook,
                var: command.var().to_owned(),
            });
        }
        for placeholder in command.value().placeholders() {
            if let Placeholder::Env(name) = placeholder {
                if !defined.contains(name.as_str()) {
                    return Err(ManifestError::UndefinedTemplateVariable {
                        hook,
                        var: command.var().to_owned(),
                        placeholder: placeholder.to_string(),
                    });
                }
            }
        }
        if let EnvCommand::Set { var, .. } = command {
            defined.insert(var.as_str());
        }
    }
    Ok(())
}

pub fn parse_manifest_str(input: &str) -> Result<PackageManifest, ManifestError> {
    let manifest: PackageManifest = toml::from_str(input)?;
    manifest.validate()?;
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<PackageManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
