use serde::Serialize;
use std::collections::BTreeMap;

/// A concrete environment mutation, ready for a caller to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EnvOp {
    Set { var: String, value: String },
    Append { var: String, value: String },
}

impl EnvOp {
    pub fn var(&self) -> &str {
        match self {
            Self::Set { var, .. } | Self::Append { var, .. } => var,
        }
    }
}

/// List-valued view of a process environment.
///
/// Each variable holds the ordered entries that joining with the platform
/// separator would produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Environment {
    vars: BTreeMap<String, Vec<String>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from existing `(name, value)` pairs, splitting on `separator`.
    pub fn from_vars<I>(vars: I, separator: char) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = vars
            .into_iter()
            .map(|(name, value)| {
                let entries = value
                    .split(separator)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect();
                (name, entries)
            })
            .collect();
        Self { vars }
    }

    /// `Set` replaces the variable; `Append` adds to the end of its list.
    pub fn apply(&mut self, ops: &[EnvOp]) {
        for op in ops {
            match op {
                EnvOp::Set { var, value } => {
                    self.vars.insert(var.clone(), vec![value.clone()]);
                }
                EnvOp::Append { var, value } => {
                    self.vars.entry(var.clone()).or_default().push(value.clone());
                }
            }
        }
    }

    pub fn get(&self, var: &str) -> Option<&[String]> {
        self.vars.get(var).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Flatten to plain strings joined by `separator`.
    pub fn render(&self, separator: char) -> BTreeMap<String, String> {
        let sep = separator.to_string();
        self.vars
            .iter()
            .map(|(name, entries)| (name.clone(), entries.join(&sep)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Powershell,
}

impl Shell {
    pub fn default_separator(self) -> char {
        match self {
            Self::Bash => ':',
            Self::Powershell => ';',
        }
    }
}

/// Render operations as statements for `shell`.
pub fn render_script(ops: &[EnvOp], shell: Shell, separator: char) -> String {
    let mut out = String::new();
    for op in ops {
        let line = match (shell, op) {
            (Shell::Bash, EnvOp::Set { var, value }) => {
                format!("export {var}={}", sh_quote(value))
            }
            (Shell::Bash, EnvOp::Append { var, value }) => format!(
                "export {var}=\"${{{var}:+${{{var}}}{separator}}}\"{}",
                sh_quote(value)
            ),
            (Shell::Powershell, EnvOp::Set { var, value }) => {
                format!("$env:{var} = {}", ps_quote(value))
            }
            (Shell::Powershell, EnvOp::Append { var, value }) => format!(
                "$env:{var} = if ($env:{var}) {{ $env:{var} + '{separator}' + {v} }} else {{ {v} }}",
                v = ps_quote(value)
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
