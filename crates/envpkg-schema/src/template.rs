//! Placeholder templates used in environment command values.
//!
//! A template is literal text with `{...}` placeholders. `{{` and `}}` escape
//! literal braces. Recognized placeholders are `{root}`, `{name}`,
//! `{version}`, `{version.major}`, `{version.minor}`, `{version.patch}` and
//! `{env.VAR}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder in '{0}'")]
    Unclosed(String),
    #[error("unmatched '}}' in '{0}'")]
    Unmatched(String),
    #[error("empty placeholder in '{0}'")]
    Empty(String),
    #[error("unknown placeholder '{{{key}}}' in '{template}'")]
    Unknown { key: String, template: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Root,
    Name,
    Version,
    VersionMajor,
    VersionMinor,
    VersionPatch,
    Env(String),
}

impl Placeholder {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "root" => Some(Self::Root),
            "name" => Some(Self::Name),
            "version" => Some(Self::Version),
            "version.major" => Some(Self::VersionMajor),
            "version.minor" => Some(Self::VersionMinor),
            "version.patch" => Some(Self::VersionPatch),
            _ => key
                .strip_prefix("env.")
                .filter(|var| is_valid_var_name(var))
                .map(|var| Self::Env(var.to_owned())),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("{root}"),
            Self::Name => f.write_str("{name}"),
            Self::Version => f.write_str("{version}"),
            Self::VersionMajor => f.write_str("{version.major}"),
            Self::VersionMinor => f.write_str("{version.minor}"),
            Self::VersionPatch => f.write_str("{version.patch}"),
            Self::Env(var) => write!(f, "{{env.{var}}}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A parsed template. Keeps the source text so that serialization is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::Unmatched(raw.to_owned())),
                '{' => {
                    let mut key = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        key.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(raw.to_owned()));
                    }
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(TemplateError::Empty(raw.to_owned()));
                    }
                    let placeholder =
                        Placeholder::parse(key).ok_or_else(|| TemplateError::Unknown {
                            key: key.to_owned(),
                            template: raw.to_owned(),
                        })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder through `lookup`.
    ///
    /// Returns the first placeholder that `lookup` cannot resolve.
    pub fn render<F>(&self, mut lookup: F) -> Result<String, Placeholder>
    where
        F: FnMut(&Placeholder) -> Option<String>,
    {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) => match lookup(p) {
                    Some(value) => out.push_str(&value),
                    None => return Err(p.clone()),
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Template> for String {
    fn from(value: Template) -> Self {
        value.raw
    }
}

pub(crate) fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
