use crate::pipeline::DecompilerKind;
use crate::util::logging::parse_level;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turns Android packages into IDE-ready source projects
#[derive(Parser, Debug)]
#[command(
    name = "apkforge",
    about = "Turns Android packages into IDE-ready source projects",
    version,
    author,
    long_about = "apkforge provisions a toolset of open-source decompilers and drives an APK \
                  through unpacking, bytecode conversion, decompilation and project assembly. \
                  The result is an Android Studio project holding the manifest, resources, \
                  decompiled sources, smali and native libraries of the package."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = parse_log_level,
        help = "Set logging level (trace, debug, info, warn, error)"
    )]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Toolset directory (overrides APKFORGE_HOME)"
    )]
    pub toolset_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Root for temporary workspaces (overrides APKFORGE_WORK_DIR)"
    )]
    pub work_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Fetch, build and install every tool",
        long_about = "Empties the toolset directory, clones every tool, builds it and installs \
                      the build output. Requires git, a JDK, Gradle and Maven on the PATH.\n\n\
                      Example:\n  \
                      apkforge install"
    )]
    Install,

    #[command(
        about = "Pull, rebuild and reinstall every tool",
        long_about = "Pulls the latest sources of every installed tool, rebuilds them and \
                      replaces the installed build output.\n\n\
                      Example:\n  \
                      apkforge update"
    )]
    Update,

    #[command(
        name = "compact-install",
        about = "Install a prebuilt toolset from a single repository",
        long_about = "Clones a repository holding an already built toolset straight into the \
                      toolset directory. No build tools are needed.\n\n\
                      Example:\n  \
                      apkforge compact-install"
    )]
    CompactInstall,

    #[command(
        about = "Decompile a package into a source project",
        long_about = "Decompiles PACKAGE with DECOMPILER and writes the assembled project to \
                      OUTPUT. On failure nothing this run created is left behind.\n\n\
                      Examples:\n  \
                      apkforge decompile jadx app.apk ./app-project\n  \
                      apkforge decompile cfr app.apk ./out --archive\n  \
                      apkforge decompile jeb3 app.apk ./out /opt/jeb"
    )]
    Decompile(DecompileArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DecompileArgs {
    #[arg(value_enum, ignore_case = true, value_name = "DECOMPILER")]
    pub decompiler: DecompilerKind,

    #[arg(value_name = "PACKAGE", help = "Path to the APK")]
    pub package: PathBuf,

    #[arg(value_name = "OUTPUT", help = "Directory the project is written to")]
    pub output: PathBuf,

    #[arg(
        value_name = "EXTERNAL_TOOL_PATH",
        help = "Installation directory of decompilers that are not part of the toolset (JEB3)"
    )]
    pub external_tool_path: Option<PathBuf>,

    #[arg(long, help = "Write the project as <OUTPUT>/<package name>.zip")]
    pub archive: bool,
}

fn parse_log_level(s: &str) -> Result<String, String> {
    parse_level(s)
        .map(|_| s.to_lowercase())
        .ok_or_else(|| {
            format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                s
            )
        })
}
