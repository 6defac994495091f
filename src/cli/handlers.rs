//! Command handlers
//!
//! Each handler runs one subcommand end to end and returns the process
//! exit code: zero on success, non-zero on any fatal resolution or
//! generation error. Errors are printed with their full context chain so
//! the failing package or path is always visible.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::cli::commands::{ExtraDepsArgs, GenerateArgs, ResolveArgs};
use crate::cli::output::OutputFormatter;
use crate::codegen;
use crate::config::LinkingOptions;
use crate::dependencies;
use crate::platforms::Platform;
use crate::resolver;

pub async fn handle_resolve(args: &ResolveArgs) -> i32 {
    match run_resolve(args).await {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => report_failure(err),
    }
}

pub async fn handle_generate(args: &GenerateArgs) -> i32 {
    match run_generate(args).await {
        Ok(path) => {
            info!(path = %path.display(), "generated registration source");
            0
        }
        Err(err) => report_failure(err),
    }
}

pub async fn handle_extra_deps(args: &ExtraDepsArgs) -> i32 {
    match run_extra_deps(args).await {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => report_failure(err),
    }
}

fn report_failure(err: anyhow::Error) -> i32 {
    error!("{err:#}");
    eprintln!("Error: {err:#}");
    1
}

async fn run_resolve(args: &ResolveArgs) -> Result<String> {
    let options = load_options(args).await?;
    let descriptors = resolver::resolve_modules(&options, args.platform)
        .await
        .context("module resolution failed")?;

    OutputFormatter::new(args.format).format_descriptors(args.platform, &descriptors)
}

async fn run_generate(args: &GenerateArgs) -> Result<PathBuf> {
    let options = load_options(&args.resolve).await?;
    let platform = args.resolve.platform;
    let descriptors = resolver::resolve_modules(&options, platform)
        .await
        .context("module resolution failed")?;

    let class_name = args.target_name.clone().unwrap_or_else(|| {
        match platform {
            Platform::Android => codegen::DEFAULT_ANDROID_CLASS_NAME,
            Platform::Apple => codegen::DEFAULT_APPLE_CLASS_NAME,
        }
        .to_string()
    });

    // Render fully before touching the output path: a failed run must
    // never leave a partial artifact for the build to pick up.
    let source = codegen::generate_source(platform, &descriptors, &class_name);
    codegen::write_artifact(&args.output, &source)
        .await
        .context("failed to write generated source")?;

    debug!(
        modules = descriptors.len(),
        class = %class_name,
        "artifact written"
    );
    Ok(args.output.clone())
}

async fn run_extra_deps(args: &ExtraDepsArgs) -> Result<String> {
    let project_root = effective_project_root(args.project_root.clone());
    let dependencies =
        dependencies::resolve_extra_dependencies(&project_root, args.platform).await;

    OutputFormatter::new(args.format).format_extra_dependencies(&dependencies)
}

async fn load_options(args: &ResolveArgs) -> Result<LinkingOptions> {
    let project_root = effective_project_root(args.project_root.clone());
    LinkingOptions::load(
        &project_root,
        args.platform,
        args.search_paths.clone(),
        args.exclude.clone(),
    )
    .await
    .context("failed to load linking options")
}

fn effective_project_root(cli_root: Option<PathBuf>) -> PathBuf {
    cli_root.unwrap_or_else(|| PathBuf::from("."))
}
