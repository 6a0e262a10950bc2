//! CLI subprocess integration tests.
//!
//! These tests invoke the `envpkg` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn envpkg_bin(sandbox: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_envpkg"));
    // Point at a config file that does not exist so user config never leaks in.
    cmd.env("ENVPKG_CONFIG", sandbox.join("absent-config.toml"));
    cmd.env_remove("ENVPKG_LOG");
    cmd
}

fn write_preset(dir: &Path, preset: &str) -> PathBuf {
    let path = dir.join(format!("{preset}.toml"));
    let text = envpkg_schema::get_preset(preset).unwrap().manifest;
    std::fs::write(&path, text).unwrap();
    path
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const WINDOWS: [&str; 6] = [
    "--platform",
    "windows",
    "--arch",
    "x64",
    "--os",
    "windows-10",
];

#[test]
fn cli_version_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = envpkg_bin(dir.path()).arg("--version").output().unwrap();
    assert!(output.status.success(), "envpkg --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("envpkg"), "version output: {stdout}");
}

#[test]
fn cli_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = envpkg_bin(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["select", "release-path", "build-requires", "env", "history"] {
        assert!(stdout.contains(cmd), "help must list '{cmd}'");
    }
}

#[test]
fn validate_accepts_preset() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .args(["--json", "validate"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["package"], "hdcycles-0.9.1");
}

#[test]
fn validate_rejects_malformed_manifest_with_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.toml");
    std::fs::write(&path, "name = \"x\"\nauthors = [\"a\"]\n").unwrap();
    let output = envpkg_bin(dir.path())
        .arg("validate")
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("manifest error"), "stderr: {stderr}");
}

#[test]
fn missing_manifest_file_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let output = envpkg_bin(dir.path())
        .arg("inspect")
        .arg(dir.path().join("nope.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn select_picks_toolset_variant() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .arg("--json")
        .args(WINDOWS)
        .args(["--toolset", "usd-20.11", "select"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json = stdout_json(&output);
    assert_eq!(json["status"], "matched");
    assert_eq!(json["index"], 1);
    assert_eq!(json["variant"][3], "usd-20.11");
}

#[test]
fn select_without_match_lists_variants_and_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.7.23");
    let output = envpkg_bin(dir.path())
        .args(["--json", "--platform", "linux", "--arch", "x86_64", "--os", "centos-7"])
        .arg("select")
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "no_match");
    assert_eq!(json["available"].as_array().unwrap().len(), 3);
}

#[test]
fn release_path_per_platform() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    for (platform, expected) in [("win", "R:/int"), ("linux", "/r/int")] {
        let output = envpkg_bin(dir.path())
            .args(["--platform", platform, "release-path"])
            .arg(&manifest)
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
    }
}

#[test]
fn release_path_for_unlisted_platform_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .args(["--platform", "darwin", "release-path"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported platform"), "stderr: {stderr}");
}

#[test]
fn build_requires_per_platform() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.8.6");
    let output = envpkg_bin(dir.path())
        .args(["--platform", "linux", "build-requires"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "gcc-7");
}

#[test]
fn env_expands_commands_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .args(["--json", "env", "--root", "/opt/hdcycles"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let ops = stdout_json(&output);
    let ops = ops.as_array().unwrap();
    assert_eq!(ops[1]["var"], "HDCYCLES_PLUGIN_ROOT");
    assert_eq!(ops[1]["value"], "/opt/hdcycles/plugin");
    let appended: Vec<&str> = ops
        .iter()
        .filter(|op| op["op"] == "append" && op["var"] == "PXR_PLUGINPATH_NAME")
        .map(|op| op["value"].as_str().unwrap())
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
fn env_pre_build_needs_no_root() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .args(["env", "--hook", "pre-build"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("set    HDCYCLES_BUILD_VERSION 0.9.1"), "{stdout}");
}

#[test]
fn env_without_root_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .arg("env")
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("{root}"), "stderr: {stderr}");
}

#[test]
fn env_root_from_config_packages_root() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "platform = \"linux\"\narch = \"x86_64\"\nos = \"centos-7\"\ntoolsets = [\"usd-20.11\"]\npackages_root = \"/r/int\"\n",
    )
    .unwrap();
    let output = envpkg_bin(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--json", "env"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let ops = stdout_json(&output);
    assert_eq!(
        ops[0]["value"],
        "/r/int/hdcycles/0.9.1/platform-linux/arch-x86_64/os-centos-7/usd-20.11"
    );
}

#[test]
fn env_apply_keeps_existing_entries() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .env("PXR_PLUGINPATH_NAME", "/studio/plugins")
        .args(["--platform", "linux", "--json", "env", "--apply", "--root", "/opt/hdcycles"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(
        json["PXR_PLUGINPATH_NAME"],
        "/studio/plugins:/opt/hdcycles/plugin/usd/ndrCycles/resources:/opt/hdcycles/plugin/usd/hdCycles/resources"
    );
    assert_eq!(json["HDCYCLES_ROOT"], "/opt/hdcycles");
}

#[cfg(unix)]
#[test]
fn env_apply_skips_non_utf8_variables() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .env("ENVPKG_BINARY_VALUE", OsStr::from_bytes(b"\xff"))
        .args(["--platform", "linux", "--json", "env", "--apply", "--root", "/opt/hdcycles"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json = stdout_json(&output);
    assert_eq!(json["HDCYCLES_ROOT"], "/opt/hdcycles");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ENVPKG_BINARY_VALUE"), "stderr: {stderr}");
}

#[test]
fn env_renders_bash_script() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_preset(dir.path(), "hdcycles-0.9.1");
    let output = envpkg_bin(dir.path())
        .args(["--platform", "linux", "env", "--shell", "bash", "--root", "/opt/hdcycles"])
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("export HDCYCLES_ROOT='/opt/hdcycles'\n"), "{stdout}");
    assert!(stdout.contains("export PATH=\"${PATH:+${PATH}:}\"'/opt/hdcycles/tools'"));
}

#[test]
fn history_accepts_increasing_releases() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = ["hdcycles-0.7.6", "hdcycles-0.7.23", "hdcycles-0.8.6", "hdcycles-0.9.1"]
        .iter()
        .map(|p| write_preset(dir.path(), p))
        .collect();
    let output = envpkg_bin(dir.path())
        .arg("history")
        .args(&paths)
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn history_rejects_out_of_order_releases() {
    let dir = tempfile::tempdir().unwrap();
    let newer = write_preset(dir.path(), "hdcycles-0.9.1");
    let older = write_preset(dir.path(), "hdcycles-0.8.6");
    let output = envpkg_bin(dir.path())
        .arg("history")
        .arg(&newer)
        .arg(&older)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not follow"), "stderr: {stderr}");
}

#[test]
fn new_writes_parsable_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let output = envpkg_bin(dir.path())
        .current_dir(dir.path())
        .args(["--json", "new", "--template", "minimal", "--name", "mytool", "--force"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let written = std::fs::read_to_string(dir.path().join("package.toml")).unwrap();
    let manifest = envpkg_schema::parse_manifest_str(&written).unwrap();
    assert_eq!(manifest.name, "mytool");
}

#[test]
fn new_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.toml"), "keep me").unwrap();
    let output = envpkg_bin(dir.path())
        .current_dir(dir.path())
        .args(["new", "--name", "mytool"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("package.toml")).unwrap(),
        "keep me"
    );
}

#[test]
fn completions_generate_for_bash() {
    let dir = tempfile::tempdir().unwrap();
    let output = envpkg_bin(dir.path())
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("envpkg"));
}
