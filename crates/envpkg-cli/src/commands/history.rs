use super::{json_pretty, load_manifest, ok_mark, EXIT_SUCCESS};
use envpkg_schema::{check_release_history, PackageManifest};
use std::path::PathBuf;

pub fn run(paths: &[PathBuf], json: bool) -> Result<u8, String> {
    let releases = paths
        .iter()
        .map(|p| load_manifest(p))
        .collect::<Result<Vec<PackageManifest>, String>>()?;

    check_release_history(&releases).map_err(|e| format!("release history: {e}"))?;

    if json {
        let versions: Vec<String> = releases.iter().map(|m| m.version.to_string()).collect();
        let payload = serde_json::json!({
            "status": "ok",
            "package": releases[0].name,
            "versions": versions,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for release in &releases {
            println!("{}", release.qualified_name());
        }
        println!(
            "{}",
            ok_mark(&format!("{} releases in increasing order", releases.len()))
        );
    }
    Ok(EXIT_SUCCESS)
}
