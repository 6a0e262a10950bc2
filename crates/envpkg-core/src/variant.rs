use crate::context::HostContext;
use envpkg_schema::{PackageManifest, Platform, Token};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// The variant chosen for a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantMatch {
    /// Position in the manifest's `variants` list.
    pub index: usize,
    pub tokens: Vec<Token>,
}

impl VariantMatch {
    /// Install subdirectory of this variant: its tokens joined by `/`.
    pub fn subpath(&self) -> String {
        let parts: Vec<&str> = self.tokens.iter().map(Token::as_str).collect();
        parts.join("/")
    }
}

/// No declared variant fits the context.
///
/// Recoverable: callers can list `available` and pick another context.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("no variant of '{package}' matches {context} ({count} declared)", count = .available.len())]
pub struct NoMatchingVariant {
    pub package: String,
    pub context: String,
    pub available: Vec<Vec<Token>>,
}

/// What one variant token requires of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint<'t> {
    Platform(&'t str),
    Arch(&'t str),
    Os(&'t str),
    Toolset(&'t str),
}

const FIELD_PREFIXES: [&str; 3] = ["platform-", "arch-", "os-"];

/// Classify each token of a variant tuple.
///
/// `platform-`/`arch-`/`os-` prefixes name their field. In a tuple with no
/// prefixed token, the first three positions are platform, arch and OS.
/// Otherwise a bare token naming a known platform constrains the platform.
/// Everything else is a toolset token.
pub fn constraints(variant: &[Token]) -> Vec<Constraint<'_>> {
    let positional = !variant
        .iter()
        .any(|t| FIELD_PREFIXES.iter().any(|p| t.as_str().starts_with(p)));

    variant
        .iter()
        .enumerate()
        .map(|(position, token)| {
            let token = token.as_str();
            if let Some(value) = token.strip_prefix("platform-") {
                Constraint::Platform(value)
            } else if let Some(value) = token.strip_prefix("arch-") {
                Constraint::Arch(value)
            } else if let Some(value) = token.strip_prefix("os-") {
                Constraint::Os(value)
            } else if positional {
                match position {
                    0 => Constraint::Platform(token),
                    1 => Constraint::Arch(token),
                    2 => Constraint::Os(token),
                    _ => Constraint::Toolset(token),
                }
            } else if Platform::from_token(token).is_some() {
                Constraint::Platform(token)
            } else {
                Constraint::Toolset(token)
            }
        })
        .collect()
}

/// Pick the first variant, in declaration order, whose every constraint the
/// context satisfies.
pub fn select_variant(
    manifest: &PackageManifest,
    context: &HostContext,
) -> Result<VariantMatch, NoMatchingVariant> {
    for (index, variant) in manifest.variants.iter().enumerate() {
        let unmet: Vec<&str> = variant
            .iter()
            .zip(constraints(variant))
            .filter(|(_, c)| !context.satisfies(*c))
            .map(|(t, _)| t.as_str())
            .collect();
        if unmet.is_empty() {
            debug!("variant #{index} matches {context}");
            return Ok(VariantMatch {
                index,
                tokens: variant.clone(),
            });
        }
        debug!("variant #{index} rejected, unsatisfied: {}", unmet.join(", "));
    }

    Err(NoMatchingVariant {
        package: manifest.qualified_name(),
        context: context.to_string(),
        available: manifest.variants.clone(),
    })
}
