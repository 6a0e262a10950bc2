use super::{json_pretty, load_manifest, ok_mark, EXIT_SUCCESS};
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    if json {
        let payload = serde_json::json!({
            "status": "ok",
            "manifest": manifest_path,
            "package": manifest.qualified_name(),
            "variants": manifest.variants.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{}",
            ok_mark(&format!(
                "{} is a valid manifest for {}",
                manifest_path.display(),
                manifest.qualified_name()
            ))
        );
    }
    Ok(EXIT_SUCCESS)
}
