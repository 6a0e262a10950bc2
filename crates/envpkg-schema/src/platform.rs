//! Host platforms and platform-keyed dispatch tables.
//!
//! A manifest's conditional fields (release path, private build requirements)
//! are written as one explicit branch per platform. A platform without a
//! branch is reported by the evaluator, never guessed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown platform '{0}' (expected windows, linux, or darwin)")]
pub struct UnknownPlatform(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Darwin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Darwin => "darwin",
        }
    }

    /// Recognize a platform from a bare name, a common alias, or a
    /// `platform-` prefixed variant token.
    pub fn from_token(token: &str) -> Option<Self> {
        let bare = token.strip_prefix("platform-").unwrap_or(token);
        match bare.to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" | "win64" => Some(Self::Windows),
            "linux" | "linux2" => Some(Self::Linux),
            "darwin" | "macos" | "osx" | "mac" => Some(Self::Darwin),
            _ => None,
        }
    }

    /// The platform this process was compiled for, if it is one we know.
    pub fn current() -> Option<Self> {
        Self::from_token(std::env::consts::OS)
    }

    /// Separator used when joining list-valued environment variables.
    pub fn path_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::Linux | Self::Darwin => ':',
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| UnknownPlatform(s.to_owned()))
    }
}

/// One optional value per platform.
///
/// Serialized as a TOML table keyed by platform name; unknown keys are rejected
/// so that a misspelled branch fails at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformTable<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darwin: Option<T>,
}

impl<T> Default for PlatformTable<T> {
    fn default() -> Self {
        Self {
            windows: None,
            linux: None,
            darwin: None,
        }
    }
}

impl<T> PlatformTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, platform: Platform, value: T) -> Self {
        self.insert(platform, value);
        self
    }

    pub fn insert(&mut self, platform: Platform, value: T) -> Option<T> {
        self.slot_mut(platform).replace(value)
    }

    pub fn get(&self, platform: Platform) -> Option<&T> {
        match platform {
            Platform::Windows => self.windows.as_ref(),
            Platform::Linux => self.linux.as_ref(),
            Platform::Darwin => self.darwin.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_none() && self.linux.is_none() && self.darwin.is_none()
    }

    /// Platforms that have an explicit branch, in declaration order of [`Platform::ALL`].
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some())
            .collect()
    }

    pub fn branches(&self) -> impl Iterator<Item = (Platform, &T)> {
        Platform::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<T> {
        match platform {
            Platform::Windows => &mut self.windows,
            Platform::Linux => &mut self.linux,
            Platform::Darwin => &mut self.darwin,
        }
    }
}
