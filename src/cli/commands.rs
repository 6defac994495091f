use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::output::OutputFormat;
use crate::platforms::Platform;

/// Native-module autolinking engine for cross-platform app builds
#[derive(Parser, Debug)]
#[command(
    name = "modlink",
    about = "Native-module autolinking engine for cross-platform app builds",
    version,
    long_about = "modlink discovers which installed packages contribute native code to an \
                  application, resolves per-platform build metadata for each, and generates \
                  the registration source consumed by the Gradle and CocoaPods build \
                  toolchains."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Resolve the native module list for a platform",
        long_about = "Walks the dependency installation tree, loads each package's module \
                      config, and prints the resolved platform descriptor list.\n\n\
                      Examples:\n  \
                      modlink resolve --platform android\n  \
                      modlink resolve --platform apple --format json\n  \
                      modlink resolve --platform android --search-path ./node_modules --exclude pkg-dev-tools"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Generate the platform registration source",
        long_about = "Resolves the native module list and writes the generated registration \
                      source for the platform build toolchain.\n\n\
                      Examples:\n  \
                      modlink generate --platform android --output android/generated/ModulePackageList.kt\n  \
                      modlink generate --platform apple --output ios/generated/ModlinkModulesProvider.swift"
    )]
    Generate(GenerateArgs),

    #[command(
        name = "extra-deps",
        about = "Resolve extra build dependencies from project property files",
        long_about = "Reads the project's platform build property files and prints any extra \
                      repository or pod declarations requested by installed packages.\n\n\
                      Examples:\n  \
                      modlink extra-deps --platform android\n  \
                      modlink extra-deps --platform apple --format json"
    )]
    ExtraDeps(ExtraDepsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(short = 'p', long, value_enum, help = "Target platform")]
    pub platform: Platform,

    #[arg(
        long,
        value_name = "DIR",
        help = "Project root (defaults to current directory)"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long = "search-path",
        value_name = "DIR",
        help = "Search root for packages (repeatable, order matters)"
    )]
    pub search_paths: Vec<PathBuf>,

    #[arg(
        long = "exclude",
        value_name = "NAME",
        help = "Package name to skip (repeatable)"
    )]
    pub exclude: Vec<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    #[arg(short = 'o', long, value_name = "FILE", help = "Output file path")]
    pub output: PathBuf,

    #[arg(
        long,
        value_name = "NAME",
        help = "Generated class name (defaults to the platform's conventional name)"
    )]
    pub target_name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ExtraDepsArgs {
    #[arg(short = 'p', long, value_enum, help = "Target platform")]
    pub platform: Platform,

    #[arg(
        long,
        value_name = "DIR",
        help = "Project root (defaults to current directory)"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormat,
}
