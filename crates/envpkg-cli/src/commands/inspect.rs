use super::{format_variant, json_pretty, load_manifest, EXIT_SUCCESS};
use envpkg_schema::{EnvCommand, Hook};
use std::path::Path;

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    parts.join(", ")
}

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let manifest = load_manifest(manifest_path)?;
    if json {
        println!("{}", json_pretty(&manifest)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("name:          {}", manifest.name);
    println!("version:       {}", manifest.version);
    println!("authors:       {}", manifest.authors.join(", "));
    println!("requires:      {}", join_display(&manifest.requires));
    println!(
        "build_system:  {}",
        manifest.build_system.as_deref().unwrap_or("(none)")
    );
    println!("variants:      {}", manifest.variants.len());
    for (index, variant) in manifest.variants.iter().enumerate() {
        println!("  #{index:<3} {}", format_variant(variant));
    }
    for (platform, path) in manifest.config.release_packages_path.branches() {
        println!("release_path:  {platform}: {path}");
    }
    for (platform, reqs) in manifest.private_build_requires.branches() {
        println!("build_requires: {platform}: {}", join_display(reqs));
    }
    for hook in Hook::ALL {
        let commands = manifest.hook(hook);
        if commands.is_empty() {
            continue;
        }
        println!("{hook}:");
        for command in commands {
            let op = match command {
                EnvCommand::Set { .. } => "set",
                EnvCommand::Append { .. } => "append",
            };
            println!("  {op:<7} {} = {}", command.var(), command.value());
        }
    }
    Ok(EXIT_SUCCESS)
}
