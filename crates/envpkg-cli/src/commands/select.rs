use super::{
    fail_mark, format_variant, json_pretty, load_manifest, ok_mark, ContextArgs, EXIT_NO_VARIANT,
    EXIT_SUCCESS,
};
use envpkg_core::select_variant;
use std::path::Path;

pub fn run(manifest_path: &Path, args: &ContextArgs, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    let config = args.load_config()?;
    let ctx = args.resolve(&config);

    match select_variant(&manifest, &ctx) {
        Ok(selected) => {
            if json {
                let payload = serde_json::json!({
                    "status": "matched",
                    "package": manifest.qualified_name(),
                    "context": ctx,
                    "index": selected.index,
                    "variant": selected.tokens,
                    "subpath": selected.subpath(),
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!(
                    "{}",
                    ok_mark(&format!(
                        "variant #{} {}",
                        selected.index,
                        format_variant(&selected.tokens)
                    ))
                );
            }
            Ok(EXIT_SUCCESS)
        }
        Err(no_match) => {
            if json {
                let payload = serde_json::json!({
                    "status": "no_match",
                    "package": no_match.package,
                    "context": ctx,
                    "available": no_match.available,
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                eprintln!("{}", fail_mark(&no_match.to_string()));
                if no_match.available.is_empty() {
                    eprintln!("  (manifest declares no variants)");
                }
                for (index, variant) in no_match.available.iter().enumerate() {
                    eprintln!("  #{index:<3} {}", format_variant(variant));
                }
            }
            Ok(EXIT_NO_VARIANT)
        }
    }
}
