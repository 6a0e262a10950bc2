use crate::context::HostContext;
use crate::environment::EnvOp;
use crate::variant::{select_variant, NoMatchingVariant, VariantMatch};
use crate::EvalError;
use envpkg_schema::{EnvCommand, Hook, PackageManifest, Placeholder, Platform, Requirement};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

const RELEASE_PATH_FIELD: &str = "config.release_packages_path";
const BUILD_REQUIRES_FIELD: &str = "private_build_requires";

/// Map a host platform string (`win`, `linux`, `platform-darwin`, ...) to a
/// known [`Platform`].
pub fn host_platform(token: &str) -> Result<Platform, EvalError> {
    Platform::from_token(token).ok_or_else(|| EvalError::UnsupportedPlatform {
        field: "host",
        platform: token.to_owned(),
    })
}

/// Release path branch for `platform`. Pure table lookup, no I/O.
pub fn resolve_release_config(
    manifest: &PackageManifest,
    platform: Platform,
) -> Result<String, EvalError> {
    release_path(manifest, platform).map(str::to_owned)
}

/// Private build requirements for `platform`.
pub fn resolve_build_requirements(
    manifest: &PackageManifest,
    platform: Platform,
) -> Result<Vec<Requirement>, EvalError> {
    Evaluation::new(manifest, platform)
        .build_requirements()
        .map(<[Requirement]>::to_vec)
}

fn release_path(manifest: &PackageManifest, platform: Platform) -> Result<&str, EvalError> {
    manifest
        .config
        .release_packages_path
        .get(platform)
        .map(String::as_str)
        .ok_or_else(|| EvalError::UnsupportedPlatform {
            field: RELEASE_PATH_FIELD,
            platform: platform.to_string(),
        })
}

/// One evaluation of a manifest for one host platform.
///
/// Phase one (platform-only fields) is available as soon as the evaluation
/// exists; build requirements are computed on first use and then frozen.
/// Phase two (variant selection, environment expansion) takes the remaining
/// context per call.
#[derive(Debug)]
pub struct Evaluation<'m> {
    manifest: &'m PackageManifest,
    platform: Platform,
    build_requires: OnceLock<Vec<Requirement>>,
}

impl<'m> Evaluation<'m> {
    pub fn new(manifest: &'m PackageManifest, platform: Platform) -> Self {
        info!("evaluating {} for {platform}", manifest.qualified_name());
        Self {
            manifest,
            platform,
            build_requires: OnceLock::new(),
        }
    }

    pub fn manifest(&self) -> &'m PackageManifest {
        self.manifest
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn release_path(&self) -> Result<&'m str, EvalError> {
        release_path(self.manifest, self.platform)
    }

    pub fn build_requirements(&self) -> Result<&[Requirement], EvalError> {
        if let Some(cached) = self.build_requires.get() {
            return Ok(cached);
        }
        let resolved = self
            .manifest
            .private_build_requires
            .get(self.platform)
            .ok_or_else(|| EvalError::UnsupportedPlatform {
                field: BUILD_REQUIRES_FIELD,
                platform: self.platform.to_string(),
            })?
            .clone();
        debug!(
            "resolved {} private build requirement(s) for {}",
            resolved.len(),
            self.platform
        );
        Ok(self.build_requires.get_or_init(|| resolved))
    }

    pub fn select_variant(&self, context: &HostContext) -> Result<VariantMatch, NoMatchingVariant> {
        select_variant(self.manifest, context)
    }

    pub fn expand(&self, hook: Hook, resolved: &ResolvedContext) -> Result<Vec<EnvOp>, EvalError> {
        expand_environment(self.manifest, resolved, hook)
    }
}

/// Values that environment templates may reference besides the manifest's
/// own name and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedContext {
    pub root: Option<String>,
}

impl ResolvedContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }
}

/// Install location `<packages_root>/<name>/<version>[/<variant subpath>]`.
pub fn package_root(
    packages_root: &Path,
    manifest: &PackageManifest,
    variant: Option<&VariantMatch>,
) -> PathBuf {
    let mut root = packages_root
        .join(manifest.name.as_str())
        .join(manifest.version.to_string());
    if let Some(variant) = variant {
        for token in &variant.tokens {
            root.push(token.as_str());
        }
    }
    root
}

/// Expand one hook's commands into concrete operations, in declared order.
///
/// `{env.VAR}` reads the value the latest earlier `set` of `VAR` in the same
/// hook produced. Appends to `VAR` do not change that value; they only
/// exist as operations for [`Environment::apply`](crate::Environment::apply).
pub fn expand_environment(
    manifest: &PackageManifest,
    resolved: &ResolvedContext,
    hook: Hook,
) -> Result<Vec<EnvOp>, EvalError> {
    let commands = manifest.hook(hook);
    let mut scope: HashMap<&str, String> = HashMap::new();
    let mut ops = Vec::with_capacity(commands.len());

    for command in commands {
        let value = command
            .value()
            .render(|p| lookup(p, manifest, resolved, &scope))
            .map_err(|p| EvalError::TemplateResolution {
                hook,
                var: command.var().to_owned(),
                placeholder: p.to_string(),
            })?;
        debug!("{hook}: {} = {value}", command.var());
        match command {
            EnvCommand::Set { var, .. } => {
                scope.insert(var.as_str(), value.clone());
                ops.push(EnvOp::Set {
                    var: var.clone(),
                    value,
                });
            }
            EnvCommand::Append { var, .. } => ops.push(EnvOp::Append {
                var: var.clone(),
                value,
            }),
        }
    }
    Ok(ops)
}

fn lookup(
    placeholder: &Placeholder,
    manifest: &PackageManifest,
    resolved: &ResolvedContext,
    scope: &HashMap<&str, String>,
) -> Option<String> {
    let version = &manifest.version;
    match placeholder {
        Placeholder::Root => resolved.root.clone(),
        Placeholder::Name => Some(manifest.name.to_string()),
        Placeholder::Version => Some(version.to_string()),
        Placeholder::VersionMajor => Some(version.major.to_string()),
        Placeholder::VersionMinor => Some(version.minor.to_string()),
        Placeholder::VersionPatch => Some(version.patch.to_string()),
        Placeholder::Env(var) => scope.get(var.as_str()).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envpkg_schema::{get_preset, parse_manifest_str};

    fn hdcycles() -> PackageManifest {
        parse_manifest_str(get_preset("hdcycles-0.9.1").unwrap().manifest).unwrap()
    }

    #[test]
    fn release_path_per_platform() {
        let m = hdcycles();
        assert_eq!(
            resolve_release_config(&m, host_platform("win").unwrap()).unwrap(),
            "R:/int"
        );
        assert_eq!(
            resolve_release_config(&m, host_platform("linux").unwrap()).unwrap(),
            "/r/int"
        );
    }

    #[test]
    fn missing_release_branch_is_unsupported() {
        let err = resolve_release_config(&hdcycles(), Platform::Darwin).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UnsupportedPlatform { field: RELEASE_PATH_FIELD, .. }
        ));
    }

    #[test]
    fn unknown_host_platform_is_unsupported() {
        assert!(matches!(
            host_platform("sunos"),
            Err(EvalError::UnsupportedPlatform { field: "host", .. })
        ));
    }

    #[test]
    fn build_requirements_per_platform() {
        let m = hdcycles();
        let win = resolve_build_requirements(&m, Platform::Windows).unwrap();
        assert_eq!(win[0].to_string(), "visual_studio");
        let linux = resolve_build_requirements(&m, Platform::Linux).unwrap();
        assert_eq!(linux[0].to_string(), "gcc-7");
        assert!(resolve_build_requirements(&m, Platform::Darwin).is_err());
    }

    #[test]
    fn build_requirements_are_memoized() {
        let m = hdcycles();
        let eval = Evaluation::new(&m, Platform::Linux);
        let first = eval.build_requirements().unwrap();
        let second = eval.build_requirements().unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn expands_commands_with_root() {
        let m = hdcycles();
        let ops = expand_environment(
            &m,
            &ResolvedContext::new().with_root("/opt/hdcycles"),
            Hook::Commands,
        )
        .unwrap();
        assert_eq!(
            ops[1],
            EnvOp::Set {
                var: "HDCYCLES_PLUGIN_ROOT".to_owned(),
                value: "/opt/hdcycles/plugin".to_owned(),
            }
        );
        let appended: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                EnvOp::Append { var, value } if var == "PXR_PLUGINPATH_NAME" => {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            appended,
            vec![
                "/opt/hdcycles/plugin/usd/ndrCycles/resources",
                "/opt/hdcycles/plugin/usd/hdCycles/resources",
            ]
        );
    }

    #[test]
    fn env_placeholder_reads_last_set_not_appends() {
        let m = parse_manifest_str(
            r#"
name = "tool"
version = "1.2.3"
authors = ["a"]

[[commands]]
op = "set"
var = "TOOL_HOME"
value = "/opt/tool"

[[commands]]
op = "append"
var = "TOOL_HOME"
value = "/opt/extra"

[[commands]]
op = "set"
var = "TOOL_BIN"
value = "{env.TOOL_HOME}/bin"

[[commands]]
op = "set"
var = "TOOL_HOME"
value = "/srv/tool"

[[commands]]
op = "set"
var = "TOOL_LIB"
value = "{env.TOOL_HOME}/lib"
"#,
        )
        .unwrap();
        let ops = expand_environment(&m, &ResolvedContext::new(), Hook::Commands).unwrap();
        assert_eq!(
            ops[2],
            EnvOp::Set {
                var: "TOOL_BIN".to_owned(),
                value: "/opt/tool/bin".to_owned(),
            }
        );
        assert_eq!(
            ops[4],
            EnvOp::Set {
                var: "TOOL_LIB".to_owned(),
                value: "/srv/tool/lib".to_owned(),
            }
        );
    }

    #[test]
    fn pre_build_expands_version_fields() {
        let m = hdcycles();
        let ops = expand_environment(&m, &ResolvedContext::new(), Hook::PreBuild).unwrap();
        let values: Vec<&str> = ops
            .iter()
            .map(|op| match op {
                EnvOp::Set { value, .. } | EnvOp::Append { value, .. } => value.as_str(),
            })
            .collect();
        assert_eq!(values, vec!["0", "9", "1", "0.9.1"]);
    }

    #[test]
    fn unresolved_root_is_template_error() {
        let err =
            expand_environment(&hdcycles(), &ResolvedContext::new(), Hook::Commands).unwrap_err();
        match err {
            EvalError::TemplateResolution {
                hook,
                var,
                placeholder,
            } => {
                assert_eq!(hook, Hook::Commands);
                assert_eq!(var, "HDCYCLES_ROOT");
                assert_eq!(placeholder, "{root}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn package_root_includes_variant_subpath() {
        let m = hdcycles();
        let ctx = HostContext::new("linux", "x86_64", "centos-7").with_toolset("usd-20.11");
        let variant = select_variant(&m, &ctx).unwrap();
        let root = package_root(Path::new("/r/int"), &m, Some(&variant));
        assert_eq!(
            root,
            PathBuf::from("/r/int/hdcycles/0.9.1/platform-linux/arch-x86_64/os-centos-7/usd-20.11")
        );
        assert_eq!(
            package_root(Path::new("/r/int"), &m, None),
            PathBuf::from("/r/int/hdcycles/0.9.1")
        );
    }
}
