use crate::variant::Constraint;
use envpkg_schema::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The platform/toolset context a variant is selected against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    pub platform: String,
    pub arch: String,
    pub os: String,
    #[serde(default)]
    pub toolsets: BTreeSet<String>,
}

impl HostContext {
    pub fn new(platform: impl Into<String>, arch: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
            os: os.into(),
            toolsets: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_toolset(mut self, token: impl Into<String>) -> Self {
        self.toolsets.insert(token.into());
        self
    }

    /// Context of the running process.
    ///
    /// The OS token defaults to the platform name; release-specific names such
    /// as `windows-10` or `centos-7` come from config or flags.
    pub fn detect() -> Self {
        let os = std::env::consts::OS;
        let platform = Platform::current().map_or(os, Platform::as_str);
        let arch = match (Platform::current(), std::env::consts::ARCH) {
            (Some(Platform::Windows), "x86_64") => "x64",
            (_, arch) => arch,
        };
        Self::new(platform, arch, platform)
    }

    /// The known platform this context names, if any.
    pub fn platform_kind(&self) -> Option<Platform> {
        Platform::from_token(&self.platform)
    }

    /// Whether one variant constraint holds in this context.
    ///
    /// Platforms compare by canonical name when both sides are known
    /// (`win` equals `windows`); arch and OS compare exactly. Toolset
    /// constraints only ever look at `toolsets`.
    pub fn satisfies(&self, constraint: Constraint<'_>) -> bool {
        match constraint {
            Constraint::Platform(value) => {
                match (self.platform_kind(), Platform::from_token(value)) {
                    (Some(host), Some(wanted)) => host == wanted,
                    _ => strip_field(&self.platform, "platform-") == value,
                }
            }
            Constraint::Arch(value) => strip_field(&self.arch, "arch-") == value,
            Constraint::Os(value) => strip_field(&self.os, "os-") == value,
            Constraint::Toolset(value) => self.toolsets.contains(value),
        }
    }
}

fn strip_field<'a>(value: &'a str, prefix: &str) -> &'a str {
    value.strip_prefix(prefix).unwrap_or(value)
}

impl fmt::Display for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "platform={} arch={} os={}",
            self.platform, self.arch, self.os
        )?;
        if !self.toolsets.is_empty() {
            let toolsets: Vec<&str> = self.toolsets.iter().map(String::as_str).collect();
            write!(f, " toolsets={}", toolsets.join(","))?;
        }
        Ok(())
    }
}
