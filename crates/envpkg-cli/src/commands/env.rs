use super::{json_pretty, load_manifest, ContextArgs, EXIT_SUCCESS};
use envpkg_core::{
    expand_environment, package_root, render_script, select_variant, EnvOp, Environment,
    EnvpkgConfig, HostContext, ResolvedContext, Shell,
};
use envpkg_schema::{Hook, PackageManifest, Platform};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub hook: Hook,
    pub root: Option<String>,
    pub shell: Option<Shell>,
    pub apply: bool,
}

/// `--root` wins; otherwise derive it from the configured packages root and
/// the selected variant. Without either, `{root}` stays unresolved.
fn resolve_root(
    manifest: &PackageManifest,
    ctx: &HostContext,
    config: &EnvpkgConfig,
    explicit: Option<&str>,
) -> Result<Option<String>, String> {
    if let Some(root) = explicit {
        return Ok(Some(root.to_owned()));
    }
    let Some(packages_root) = &config.packages_root else {
        debug!("no --root and no packages_root configured");
        return Ok(None);
    };
    let variant = if manifest.variants.is_empty() {
        None
    } else {
        Some(select_variant(manifest, ctx).map_err(|e| format!("no matching variant: {e}"))?)
    };
    let root = package_root(packages_root, manifest, variant.as_ref());
    Ok(Some(root.to_string_lossy().into_owned()))
}

/// The current process environment, minus entries that are not UTF-8.
fn process_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(name, value)| {
        match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                let name = name.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
                warn!("skipping non-UTF-8 environment variable '{name}'");
                None
            }
        }
    })
}

pub fn run(
    manifest_path: &Path,
    args: &ContextArgs,
    options: &EnvOptions,
    json: bool,
) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    let config = args.load_config()?;
    let ctx = args.resolve(&config);

    let mut resolved = ResolvedContext::new();
    resolved.root = resolve_root(&manifest, &ctx, &config, options.root.as_deref())?;

    let ops = expand_environment(&manifest, &resolved, options.hook).map_err(|e| e.to_string())?;

    let separator = ctx.platform_kind().map_or_else(
        || {
            warn!(
                "unknown platform '{}'; joining lists with ':'",
                ctx.platform
            );
            ':'
        },
        Platform::path_separator,
    );

    if let Some(shell) = options.shell {
        print!("{}", render_script(&ops, shell, separator));
        return Ok(EXIT_SUCCESS);
    }

    if options.apply {
        let mut env = Environment::from_vars(process_vars(), separator);
        env.apply(&ops);
        let touched: BTreeSet<&str> = ops.iter().map(EnvOp::var).collect();
        let rendered: Vec<(String, String)> = env
            .render(separator)
            .into_iter()
            .filter(|(name, _)| touched.contains(name.as_str()))
            .collect();
        if json {
            let map: serde_json::Map<String, serde_json::Value> = rendered
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            println!("{}", json_pretty(&map)?);
        } else {
            for (name, value) in rendered {
                println!("{name}={value}");
            }
        }
        return Ok(EXIT_SUCCESS);
    }

    if json {
        println!("{}", json_pretty(&ops)?);
    } else {
        for op in &ops {
            match op {
                EnvOp::Set { var, value } => println!("set    {var} {value}"),
                EnvOp::Append { var, value } => println!("append {var} {value}"),
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
