//! Supported decompilers and how each one is launched

use crate::runner::quote_path;
use crate::toolset::{catalogue, locate_artifact, ToolCatalogue};
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Closed set of decompilers a package can be run through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DecompilerKind {
    Cfr,
    Fernflower,
    Jadx,
    Jdcmd,
    Procyon,
    Jeb3,
}

impl DecompilerKind {
    pub fn all() -> &'static [DecompilerKind] {
        &[
            DecompilerKind::Cfr,
            DecompilerKind::Fernflower,
            DecompilerKind::Jadx,
            DecompilerKind::Jdcmd,
            DecompilerKind::Procyon,
            DecompilerKind::Jeb3,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            DecompilerKind::Cfr => catalogue::CFR,
            DecompilerKind::Fernflower => catalogue::FERNFLOWER,
            DecompilerKind::Jadx => catalogue::JADX,
            DecompilerKind::Jdcmd => catalogue::JDCMD,
            DecompilerKind::Procyon => catalogue::PROCYON,
            DecompilerKind::Jeb3 => catalogue::JEB3,
        }
    }

    /// Whether the decompiler runs from a caller-supplied installation
    pub fn requires_external_tool(self) -> bool {
        matches!(self, DecompilerKind::Jeb3)
    }

    pub fn spec(self) -> DecompilerSpec {
        match self {
            DecompilerKind::Cfr => DecompilerSpec {
                launch: LaunchDir::Toolset,
                build_command: cfr_command,
                normalization: Normalization::None,
            },
            DecompilerKind::Fernflower => DecompilerSpec {
                launch: LaunchDir::Toolset,
                build_command: fernflower_command,
                normalization: Normalization::ExtractArchive,
            },
            DecompilerKind::Jadx => DecompilerSpec {
                launch: LaunchDir::ToolsetSubdir("bin"),
                build_command: jadx_command,
                normalization: Normalization::None,
            },
            DecompilerKind::Jdcmd => DecompilerSpec {
                launch: LaunchDir::Toolset,
                build_command: jdcmd_command,
                normalization: Normalization::None,
            },
            DecompilerKind::Procyon => DecompilerSpec {
                launch: LaunchDir::Toolset,
                build_command: procyon_command,
                normalization: Normalization::None,
            },
            DecompilerKind::Jeb3 => DecompilerSpec {
                launch: LaunchDir::External,
                build_command: jeb3_command,
                normalization: Normalization::FlattenSubdir(JEB3_OUTPUT_DIR),
            },
        }
    }
}

impl fmt::Display for DecompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecompilerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        DecompilerKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| {
                let names: Vec<_> = DecompilerKind::all().iter().map(|k| k.name()).collect();
                format!("Unknown decompiler '{}'. Valid options: {}", s, names.join(", "))
            })
    }
}

/// Directory JEB3's script writes decompiled sources into
pub const JEB3_OUTPUT_DIR: &str = "Bytecode_decompiled";

/// Where a decompiler is launched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDir {
    /// The decompiler's toolset directory
    Toolset,
    /// A subdirectory of the toolset directory
    ToolsetSubdir(&'static str),
    /// The caller-supplied installation directory
    External,
}

/// Post-processing that brings the decompiler's output into `sources/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    None,
    /// Output is an archive named after the input; extract it in place
    ExtractArchive,
    /// Output is nested one level down; move it up and drop the wrapper
    FlattenSubdir(&'static str),
}

/// Paths a decompiler command line is built from
#[derive(Debug, Clone)]
pub struct DecompilerInputs {
    pub package: PathBuf,
    pub converted_jar: PathBuf,
    pub sources: PathBuf,
    pub workspace_root: PathBuf,
    /// The decompiler's toolset directory
    pub tool_dir: PathBuf,
    pub catalogue: std::sync::Arc<ToolCatalogue>,
}

/// Dispatch entry for one decompiler
#[derive(Clone, Copy)]
pub struct DecompilerSpec {
    pub launch: LaunchDir,
    pub build_command: fn(&DecompilerInputs) -> Result<String>,
    pub normalization: Normalization,
}

impl DecompilerSpec {
    /// Resolves the working directory for a run
    pub fn launch_dir(&self, tool_dir: &Path, external: Option<&Path>) -> Result<PathBuf> {
        match self.launch {
            LaunchDir::Toolset => Ok(tool_dir.to_path_buf()),
            LaunchDir::ToolsetSubdir(sub) => Ok(tool_dir.join(sub)),
            LaunchDir::External => external
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow!("No installation directory supplied")),
        }
    }
}

/// Name of a file in the launch directory as the platform shell expects it
fn local(file: &str) -> String {
    if cfg!(windows) {
        file.to_string()
    } else {
        format!("./{}", file)
    }
}

fn cfr_command(inputs: &DecompilerInputs) -> Result<String> {
    let pattern = inputs
        .catalogue
        .get(catalogue::CFR)
        .and_then(|tool| tool.build.as_ref())
        .map(|build| build.output_pattern.as_str())
        .unwrap_or("-SNAPSHOT.jar");
    let jar = locate_artifact(&inputs.tool_dir, pattern)?
        .ok_or_else(|| {
            anyhow!("No CFR jar matching '{}' in {}", pattern, inputs.tool_dir.display())
        })?;
    let jar_name = jar
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("CFR jar has no usable file name: {}", jar.path.display()))?;

    Ok(format!(
        "java -jar {} {} --aexagg true --outputdir {}",
        local(jar_name),
        quote_path(&inputs.converted_jar),
        quote_path(&inputs.sources)
    ))
}

fn fernflower_command(inputs: &DecompilerInputs) -> Result<String> {
    Ok(format!(
        "java -jar {} {} {}",
        local("fernflower.jar"),
        quote_path(&inputs.converted_jar),
        quote_path(&inputs.sources)
    ))
}

fn jadx_command(inputs: &DecompilerInputs) -> Result<String> {
    // jadx writes into `<dir>/sources`
    let launcher = if cfg!(windows) {
        "jadx.bat".to_string()
    } else {
        format!("sh {}", local("jadx"))
    };
    Ok(format!(
        "{} -r --escape-unicode -d {} {}",
        launcher,
        quote_path(&inputs.workspace_root),
        quote_path(&inputs.converted_jar)
    ))
}

fn jdcmd_command(inputs: &DecompilerInputs) -> Result<String> {
    Ok(format!(
        "java -jar {} -od {} {}",
        local("jd-cli.jar"),
        quote_path(&inputs.sources),
        quote_path(&inputs.converted_jar)
    ))
}

fn procyon_command(inputs: &DecompilerInputs) -> Result<String> {
    Ok(format!(
        "java -jar {} -ci -eml --jar-file {} -o {}",
        local("procyon-decompiler-0.5.30.jar"),
        quote_path(&inputs.converted_jar),
        quote_path(&inputs.sources)
    ))
}

fn jeb3_command(inputs: &DecompilerInputs) -> Result<String> {
    let script = inputs.tool_dir.join("DecompileAndroid.py");
    Ok(format!(
        "java -jar {} --srv2 --script={} -- {} {}",
        local("bin/app/jeb.jar"),
        quote_path(&script),
        quote_path(&inputs.package),
        quote_path(&inputs.sources)
    ))
}
