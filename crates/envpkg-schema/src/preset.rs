use serde::Serialize;

/// A built-in manifest that `envpkg new` can write out.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub manifest: &'static str,
}

macro_rules! hdcycles_hooks {
    () => {
        r#"
[config.release_packages_path]
windows = "R:/int"
linux = "/r/int"

[private_build_requires]
windows = ["visual_studio"]
linux = ["gcc-7"]

[[pre_build_commands]]
op = "set"
var = "HDCYCLES_BUILD_VERSION_MAJOR"
value = "{version.major}"

[[pre_build_commands]]
op = "set"
var = "HDCYCLES_BUILD_VERSION_MINOR"
value = "{version.minor}"

[[pre_build_commands]]
op = "set"
var = "HDCYCLES_BUILD_VERSION_PATCH"
value = "{version.patch}"

[[pre_build_commands]]
op = "set"
var = "HDCYCLES_BUILD_VERSION"
value = "{version}"

[[commands]]
op = "set"
var = "HDCYCLES_ROOT"
value = "{root}"

[[commands]]
op = "set"
var = "HDCYCLES_PLUGIN_ROOT"
value = "{root}/plugin"

[[commands]]
op = "set"
var = "HDCYCLES_TOOLS_ROOT"
value = "{root}/tools"

[[commands]]
op = "append"
var = "PXR_PLUGINPATH_NAME"
value = "{env.HDCYCLES_PLUGIN_ROOT}/usd/ndrCycles/resources"

[[commands]]
op = "append"
var = "PXR_PLUGINPATH_NAME"
value = "{env.HDCYCLES_PLUGIN_ROOT}/usd/hdCycles/resources"

[[commands]]
op = "append"
var = "PATH"
value = "{env.HDCYCLES_TOOLS_ROOT}"
"#
    };
}

pub const BUILTIN_PRESETS: &[Preset] = &[
    Preset {
        name: "hdcycles-0.7.6",
        description: "hdcycles 0.7.6, Windows-only USD 20.05 and Houdini 19.11 builds",
        manifest: concat!(
            r#"name = "hdcycles"
version = "0.7.6"
authors = ["benjamin.skinner"]
requires = ["usdcycles", "cycles-1.13"]
variants = [
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.05-ta.1.2"],
    ["platform-windows", "arch-x64", "os-windows-10", "usd-19.11-houdini"],
]
build_system = "cmake"
"#,
            hdcycles_hooks!()
        ),
    },
    Preset {
        name: "hdcycles-0.7.23",
        description: "hdcycles 0.7.23, adds the Houdini 20.08 build",
        manifest: concat!(
            r#"name = "hdcycles"
version = "0.7.23"
authors = ["benjamin.skinner"]
requires = ["usdcycles", "cycles-1.13"]
variants = [
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.05-ta.1.2"],
    ["platform-windows", "arch-x64", "os-windows-10", "usd-19.11-houdini"],
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.08-houdini"],
]
build_system = "cmake"
"#,
            hdcycles_hooks!()
        ),
    },
    Preset {
        name: "hdcycles-0.8.6",
        description: "hdcycles 0.8.6, first release with a Linux variant",
        manifest: concat!(
            r#"name = "hdcycles"
version = "0.8.6"
authors = ["benjamin.skinner"]
requires = ["usdcycles-0.8", "cycles-1.13.0-ta.1.9.2"]
variants = [
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.05-ta.1.2"],
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.08-houdini"],
    ["platform-linux", "arch-x86_64", "os-centos-7", "usd-20.08-houdini"],
]
build_system = "cmake"
"#,
            hdcycles_hooks!()
        ),
    },
    Preset {
        name: "hdcycles-0.9.1",
        description: "hdcycles 0.9.1, USD 20.11 on Windows and Linux",
        manifest: concat!(
            r#"name = "hdcycles"
version = "0.9.1"
authors = ["benjamin.skinner"]
requires = ["usdcycles-0.9", "cycles-1.13.0-ta.1.9.2"]
variants = [
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.05-ta.1.2"],
    ["platform-windows", "arch-x64", "os-windows-10", "usd-20.11"],
    ["platform-linux", "arch-x86_64", "os-centos-7", "usd-20.11"],
]
build_system = "cmake"
"#,
            hdcycles_hooks!()
        ),
    },
    Preset {
        name: "minimal",
        description: "Minimal package with a single root variable",
        manifest: r#"name = "mypackage"
version = "0.1.0"
authors = ["me"]

[[commands]]
op = "set"
var = "MYPACKAGE_ROOT"
value = "{root}"
"#,
    },
];

pub fn get_preset(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn list_presets() -> &'static [Preset] {
    BUILTIN_PRESETS
}
