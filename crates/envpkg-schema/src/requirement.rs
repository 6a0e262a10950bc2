use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequirementError {
    #[error("requirement must not be empty")]
    Empty,
    #[error("requirement '{0}' must start with a letter or '_'")]
    InvalidStart(String),
    #[error("requirement '{spec}' contains invalid character '{ch}'")]
    InvalidChar { spec: String, ch: char },
}

/// A dependency specifier: a package name, optionally pinned to a version or
/// version range (`cycles-1.13.0-ta.1.9.2`, `gcc-7`, `usdcycles`).
///
/// The version part starts at the first `-` followed by a digit and is kept
/// verbatim; interpreting ranges belongs to the consuming package manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    name: String,
    version: Option<String>,
}

impl Requirement {
    pub fn parse(spec: &str) -> Result<Self, RequirementError> {
        let spec = spec.trim();
        let Some(first) = spec.chars().next() else {
            return Err(RequirementError::Empty);
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(RequirementError::InvalidStart(spec.to_owned()));
        }
        if let Some(ch) = spec
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+' | '<')))
        {
            return Err(RequirementError::InvalidChar {
                spec: spec.to_owned(),
                ch,
            });
        }

        let split = spec
            .char_indices()
            .find(|&(i, ch)| {
                ch == '-'
                    && spec[i + 1..]
                        .chars()
                        .next()
                        .is_some_and(|next| next.is_ascii_digit())
            })
            .map(|(i, _)| i);

        Ok(match split {
            Some(i) => Self {
                name: spec[..i].to_owned(),
                version: Some(spec[i + 1..].to_owned()),
            },
            None => Self {
                name: spec.to_owned(),
                version: None,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}-{v}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Requirement {
    type Error = RequirementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Requirement> for String {
    fn from(value: Requirement) -> Self {
        value.to_string()
    }
}
