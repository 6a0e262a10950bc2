mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use commands::{
    ContextArgs, EXIT_EVAL_ERROR, EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_NO_VARIANT,
};
use envpkg_core::Shell as ScriptShell;
use envpkg_schema::Hook;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "envpkg",
    version,
    about = "Resolve package manifest variants and project their environment"
)]
struct Cli {
    /// Config file (defaults to $ENVPKG_CONFIG or ~/.config/envpkg/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Host platform to evaluate for (e.g. windows, linux).
    #[arg(long, global = true)]
    platform: Option<String>,

    /// Host architecture token (e.g. x64, x86_64).
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Host OS token (e.g. windows-10, centos-7).
    #[arg(long, global = true)]
    os: Option<String>,

    /// Toolset token available in the context (repeatable, e.g. usd-20.11).
    #[arg(long = "toolset", global = true)]
    toolsets: Vec<String>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HookArg {
    /// Commands applied when the package is consumed.
    Commands,
    /// Commands applied while the package itself is built.
    PreBuild,
}

impl From<HookArg> for Hook {
    fn from(value: HookArg) -> Self {
        match value {
            HookArg::Commands => Hook::Commands,
            HookArg::PreBuild => Hook::PreBuild,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShellArg {
    Bash,
    Powershell,
}

impl From<ShellArg> for ScriptShell {
    fn from(value: ShellArg) -> Self {
        match value {
            ShellArg::Bash => ScriptShell::Bash,
            ShellArg::Powershell => ScriptShell::Powershell,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a new package.toml from a built-in template.
    New {
        /// Template to start from (see --list).
        #[arg(long, default_value = "minimal")]
        template: String,
        /// Package name to write into the manifest.
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing package.toml.
        #[arg(long, default_value_t = false)]
        force: bool,
        /// List the available templates and exit.
        #[arg(long, default_value_t = false)]
        list: bool,
    },
    /// Parse and validate a manifest.
    Validate {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
    },
    /// Show the parsed manifest.
    Inspect {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
    },
    /// Select the variant that matches the host context.
    Select {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
    },
    /// Resolve the release packages path for the host platform.
    ReleasePath {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
    },
    /// Resolve the private build requirements for the host platform.
    BuildRequires {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
    },
    /// Expand a hook into environment operations.
    Env {
        /// Path to manifest TOML file.
        #[arg(default_value = "package.toml")]
        manifest: PathBuf,
        /// Which hook to expand.
        #[arg(long, value_enum, default_value = "commands")]
        hook: HookArg,
        /// Package root used for {root} (otherwise derived from packages_root).
        #[arg(long)]
        root: Option<String>,
        /// Render as a script for this shell.
        #[arg(long, value_enum, conflicts_with = "apply")]
        shell: Option<ShellArg>,
        /// Apply to the current process environment and print the affected variables.
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// Check that successive releases have strictly increasing versions.
    History {
        /// Manifests, oldest release first.
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ENVPKG_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let context = ContextArgs {
        config: cli.config,
        platform: cli.platform,
        arch: cli.arch,
        os: cli.os,
        toolsets: cli.toolsets,
    };
    let json_output = cli.json;

    let result = match cli.command {
        Commands::New {
            template,
            name,
            force,
            list,
        } => {
            if list {
                commands::new::list(json_output)
            } else {
                commands::new::run(&template, name.as_deref(), force, json_output)
            }
        }
        Commands::Validate { manifest } => commands::validate::run(&manifest, json_output),
        Commands::Inspect { manifest } => commands::inspect::run(&manifest, json_output),
        Commands::Select { manifest } => commands::select::run(&manifest, &context, json_output),
        Commands::ReleasePath { manifest } => {
            commands::release_path::run(&manifest, &context, json_output)
        }
        Commands::BuildRequires { manifest } => {
            commands::build_requires::run(&manifest, &context, json_output)
        }
        Commands::Env {
            manifest,
            hook,
            root,
            shell,
            apply,
        } => commands::env::run(
            &manifest,
            &context,
            &commands::env::EnvOptions {
                hook: hook.into(),
                root,
                shell: shell.map(Into::into),
                apply,
            },
            json_output,
        ),
        Commands::History { manifests } => commands::history::run(&manifests, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("manifest error:") {
        EXIT_MANIFEST_ERROR
    } else if msg.starts_with("unsupported platform:")
        || msg.starts_with("template resolution error:")
    {
        EXIT_EVAL_ERROR
    } else if msg.starts_with("no matching variant:") {
        EXIT_NO_VARIANT
    } else {
        EXIT_FAILURE
    }
}
