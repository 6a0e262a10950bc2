use super::{json_pretty, EXIT_SUCCESS};
use dialoguer::{Confirm, Input};
use envpkg_schema::{get_preset, list_presets, parse_manifest_str, PackageManifest, PackageName};
use std::io::{stderr, stdin, IsTerminal};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const DEST_MANIFEST: &str = "package.toml";

fn load_template(name: &str) -> Result<PackageManifest, String> {
    let preset = get_preset(name).ok_or_else(|| {
        let known: Vec<&str> = list_presets().iter().map(|p| p.name).collect();
        format!("unknown template '{name}' (expected: {})", known.join(", "))
    })?;
    parse_manifest_str(preset.manifest).map_err(|e| format!("template parse error: {e}"))
}

fn write_atomic(dest: &Path, content: &str) -> Result<(), String> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| format!("write temp file: {e}"))?;
    use std::io::Write;
    tmp.write_all(content.as_bytes())
        .map_err(|e| format!("write temp file: {e}"))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| format!("fsync temp file: {e}"))?;
    tmp.persist(dest)
        .map_err(|e| format!("persist manifest: {}", e.error))?;
    Ok(())
}

fn ensure_can_write(dest: &Path, force: bool, is_tty: bool) -> Result<(), String> {
    if !dest.exists() || force {
        return Ok(());
    }
    if !is_tty {
        return Err(format!(
            "refusing to overwrite existing ./{DEST_MANIFEST} (pass --force)"
        ));
    }
    let overwrite = Confirm::new()
        .with_prompt(format!("overwrite ./{DEST_MANIFEST}?"))
        .default(false)
        .interact()
        .map_err(|e| format!("prompt failed: {e}"))?;
    if overwrite {
        Ok(())
    } else {
        Err(format!(
            "refusing to overwrite existing ./{DEST_MANIFEST} (pass --force)"
        ))
    }
}

fn prompt_identity(manifest: &mut PackageManifest) -> Result<(), String> {
    let name: String = Input::new()
        .with_prompt("package name")
        .default(manifest.name.to_string())
        .interact_text()
        .map_err(|e| format!("prompt failed: {e}"))?;
    manifest.name = PackageName::new(name);

    let authors: String = Input::new()
        .with_prompt("authors (space-separated)")
        .default(manifest.authors.join(" "))
        .interact_text()
        .map_err(|e| format!("prompt failed: {e}"))?;
    let authors: Vec<String> = authors.split_whitespace().map(str::to_owned).collect();
    if !authors.is_empty() {
        manifest.authors = authors;
    }
    Ok(())
}

fn print_result(manifest: &PackageManifest, template: &str, json: bool) -> Result<(), String> {
    if json {
        let payload = serde_json::json!({
            "status": "written",
            "path": format!("./{DEST_MANIFEST}"),
            "name": manifest.name,
            "version": manifest.version.to_string(),
            "template": template,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "wrote ./{DEST_MANIFEST} for '{}'",
            manifest.qualified_name()
        );
        println!("template: {template}");
    }
    Ok(())
}

pub fn list(json: bool) -> Result<u8, String> {
    let presets = list_presets();
    if json {
        println!("{}", json_pretty(&presets)?);
    } else {
        for preset in presets {
            println!("{:<18} {}", preset.name, preset.description);
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn run(template: &str, name: Option<&str>, force: bool, json: bool) -> Result<u8, String> {
    let dest = Path::new(DEST_MANIFEST);
    let is_tty = stdin().is_terminal() && stderr().is_terminal();

    let mut manifest = load_template(template)?;
    ensure_can_write(dest, force, is_tty)?;

    if let Some(name) = name {
        manifest.name = PackageName::new(name);
    } else if is_tty && !json {
        prompt_identity(&mut manifest)?;
    }
    manifest
        .validate()
        .map_err(|e| format!("manifest error: {e}"))?;

    let toml = manifest
        .to_toml_string()
        .map_err(|e| format!("TOML serialization failed: {e}"))?;
    write_atomic(dest, &toml)?;
    print_result(&manifest, template, json)?;
    Ok(EXIT_SUCCESS)
}
