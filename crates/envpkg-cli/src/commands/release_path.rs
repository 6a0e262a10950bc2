use super::{json_pretty, load_manifest, platform_of, ContextArgs, EXIT_SUCCESS};
use envpkg_core::resolve_release_config;
use std::path::Path;

pub fn run(manifest_path: &Path, args: &ContextArgs, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    let config = args.load_config()?;
    let platform = platform_of(&args.resolve(&config))?;
    let path = resolve_release_config(&manifest, platform).map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({
            "package": manifest.qualified_name(),
            "platform": platform,
            "release_packages_path": path,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{path}");
    }
    Ok(EXIT_SUCCESS)
}
