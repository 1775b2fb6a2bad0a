//! Command handlers
//!
//! Each handler builds the configuration, runs one operation and maps the
//! outcome to a process exit code.

use super::commands::{CliArgs, DecompileArgs};
use crate::config::ApkforgeConfig;
use crate::pipeline::{DecompileService, PipelineRequest};
use crate::progress::{LoggingHandler, ProgressHandler};
use crate::runner::{CommandRunner, ShellRunner};
use crate::toolset::{Provisioner, ToolCatalogue, ToolsetLayout};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

const TOOL_OUTPUT_NOTE: &str = "For additional details, see the output of the tools above.";

pub async fn handle_install(args: &CliArgs) -> i32 {
    report(install(args).await)
}

pub async fn handle_update(args: &CliArgs) -> i32 {
    report(update(args).await)
}

pub async fn handle_compact_install(args: &CliArgs) -> i32 {
    report(compact_install(args).await)
}

pub async fn handle_decompile(args: &CliArgs, decompile_args: &DecompileArgs) -> i32 {
    report(decompile(args, decompile_args).await)
}

async fn install(args: &CliArgs) -> Result<()> {
    let (config, catalogue) = load(args)?;
    info!(toolset = %config.toolset_dir.display(), "Installing toolset");
    provisioner(&config, catalogue).install().await?;
    info!("Toolset installed");
    Ok(())
}

async fn update(args: &CliArgs) -> Result<()> {
    let (config, catalogue) = load(args)?;
    info!(toolset = %config.toolset_dir.display(), "Updating toolset");
    provisioner(&config, catalogue).update().await?;
    info!("Toolset updated");
    Ok(())
}

async fn compact_install(args: &CliArgs) -> Result<()> {
    let (config, catalogue) = load(args)?;
    info!(
        toolset = %config.toolset_dir.display(),
        source = %config.compact_source.url,
        "Installing prebuilt toolset"
    );
    provisioner(&config, catalogue)
        .compact_install(&config.compact_source)
        .await?;
    info!("Toolset installed");
    Ok(())
}

async fn decompile(args: &CliArgs, decompile_args: &DecompileArgs) -> Result<()> {
    let (config, catalogue) = load(args)?;

    let mut request = PipelineRequest::new(
        decompile_args.decompiler,
        &decompile_args.package,
        &decompile_args.output,
    )
    .with_archive(decompile_args.archive);
    if let Some(path) = &decompile_args.external_tool_path {
        request = request.with_external_tool(path);
    }

    let service = DecompileService::new(
        shell_runner(),
        catalogue,
        ToolsetLayout::new(&config.toolset_dir),
        &config.work_dir,
    )
    .with_progress(progress());

    let output = service.decompile(request).await?;
    println!("{}", output.display());
    Ok(())
}

fn load(args: &CliArgs) -> Result<(ApkforgeConfig, Arc<ToolCatalogue>)> {
    let config = ApkforgeConfig::default()
        .with_overrides(args.toolset_dir.clone(), args.work_dir.clone());
    config.validate()?;
    debug!("{}", config);

    let catalogue = config.load_catalogue().context("Could not load the tool catalogue")?;
    Ok((config, Arc::new(catalogue)))
}

fn provisioner(config: &ApkforgeConfig, catalogue: Arc<ToolCatalogue>) -> Provisioner {
    Provisioner::new(
        shell_runner(),
        catalogue,
        ToolsetLayout::new(&config.toolset_dir),
    )
    .with_progress(progress())
}

fn shell_runner() -> Arc<dyn CommandRunner> {
    Arc::new(ShellRunner::new())
}

fn progress() -> Arc<dyn ProgressHandler> {
    Arc::new(LoggingHandler)
}

fn report(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", render_error(&e));
            1
        }
    }
}

/// One line per cause, followed by a pointer to the tool output
fn render_error(error: &anyhow::Error) -> String {
    let mut rendered = format!("Error: {}", error);
    for cause in error.chain().skip(1) {
        rendered.push_str(&format!("\n  caused by: {}", cause));
    }
    rendered.push_str("\n\n");
    rendered.push_str(TOOL_OUTPUT_NOTE);
    rendered
}
