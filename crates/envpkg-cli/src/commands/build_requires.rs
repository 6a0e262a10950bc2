use super::{json_pretty, load_manifest, platform_of, ContextArgs, EXIT_SUCCESS};
use envpkg_core::Evaluation;
use std::path::Path;

pub fn run(manifest_path: &Path, args: &ContextArgs, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    let config = args.load_config()?;
    let platform = platform_of(&args.resolve(&config))?;
    let eval = Evaluation::new(&manifest, platform);
    let requires = eval.build_requirements().map_err(|e| e.to_string())?;
    if json {
        let payload = serde_json::json!({
            "package": manifest.qualified_name(),
            "platform": platform,
            "private_build_requires": requires,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for req in requires {
            println!("{req}");
        }
    }
    Ok(EXIT_SUCCESS)
}
