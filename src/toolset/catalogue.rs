//! Declarative catalogue of the external tools the toolset is built from

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const ANDROID_PROJECT: &str = "androidproject";
pub const APKTOOL: &str = "apktool";
pub const CFR: &str = "cfr";
pub const DEX2JAR: &str = "dex2jar";
pub const FERNFLOWER: &str = "fernflower";
pub const JADX: &str = "jadx";
pub const JDCMD: &str = "jdcmd";
pub const JEB3: &str = "jeb3";
pub const PROCYON: &str = "procyon";

/// Git location of a tool's sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub url: String,
    pub branch: String,
}

/// How to turn a checkout into an installable artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    /// Command line run inside the checkout
    pub command: String,
    /// Directory, relative to the checkout, the build writes its artifact to
    pub output_dir: String,
    /// Case-insensitive substring identifying the artifact's file name
    pub output_pattern: String,
}

/// Which part of an extracted archive lands in the tool directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallLayout {
    #[default]
    WholeTree,
    /// Only the first child directory of the extracted tree
    FirstChild,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub source: SourceLocation,
    /// `None` for pass-through tools whose checkout is the artifact
    #[serde(default)]
    pub build: Option<BuildStep>,
    #[serde(default)]
    pub install: InstallLayout,
}

impl ToolDescriptor {
    fn new(name: &str, url: &str, branch: &str) -> Self {
        Self {
            name: name.to_string(),
            source: SourceLocation {
                url: url.to_string(),
                branch: branch.to_string(),
            },
            build: None,
            install: InstallLayout::WholeTree,
        }
    }

    fn built_with(mut self, command: &str, output_dir: &str, output_pattern: &str) -> Self {
        self.build = Some(BuildStep {
            command: command.to_string(),
            output_dir: output_dir.to_string(),
            output_pattern: output_pattern.to_string(),
        });
        self
    }

    fn installed_as(mut self, install: InstallLayout) -> Self {
        self.install = install;
        self
    }

    pub fn is_pass_through(&self) -> bool {
        self.build.is_none()
    }
}

/// Every tool the toolset is provisioned from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCatalogue {
    #[serde(rename = "tool")]
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalogue {
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self, ConfigError> {
        let catalogue = Self { tools };
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Built-in catalogue
    pub fn standard() -> Self {
        let gradlew = if cfg!(windows) { "gradlew.bat" } else { "./gradlew" };
        Self {
            tools: vec![
                ToolDescriptor::new(
                    ANDROID_PROJECT,
                    "https://github.com/ThisIsLibra/AndroidStudioProject.git",
                    "main",
                ),
                ToolDescriptor::new(APKTOOL, "https://github.com/iBotPeaches/Apktool.git", "master")
                    .built_with(
                        &format!("{} build shadowJar", gradlew),
                        "brut.apktool/apktool-cli/build/libs",
                        "apktool-cli-all.jar",
                    ),
                ToolDescriptor::new(CFR, "https://github.com/leibnitz27/cfr.git", "master")
                    .built_with("mvn clean package", "target", "-SNAPSHOT.jar"),
                ToolDescriptor::new(DEX2JAR, "https://github.com/pxb1988/dex2jar.git", "2.x")
                    .built_with(
                        &format!("{} clean distZip", gradlew),
                        "dex-tools/build/distributions",
                        "-SNAPSHOT.zip",
                    )
                    .installed_as(InstallLayout::FirstChild),
                ToolDescriptor::new(
                    FERNFLOWER,
                    "https://github.com/fesh0r/fernflower.git",
                    "master",
                )
                .built_with(&format!("{} jar", gradlew), "build/libs", "fernflower.jar"),
                ToolDescriptor::new(JADX, "https://github.com/skylot/jadx.git", "master")
                    .built_with(&format!("{} dist", gradlew), "build", "jadx-dev.zip"),
                ToolDescriptor::new(JDCMD, "https://github.com/ThisIsLibra/jdcmd.git", "main"),
                ToolDescriptor::new(
                    JEB3,
                    "https://github.com/ThisIsLibra/jeb3-cli-android-decompiler.git",
                    "main",
                ),
                ToolDescriptor::new(
                    PROCYON,
                    "https://github.com/ThisIsLibra/procyon-decompiler.git",
                    "apc-1.1",
                ),
            ],
        }
    }

    /// Parses a catalogue from TOML (`[[tool]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let catalogue: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            field: "catalogue".to_string(),
            error: e.to_string(),
        })?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            field: format!("catalogue file {}", path.display()),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks names are unique, non-empty and usable as directory names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "catalogue contains no tools".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for tool in &self.tools {
            if tool.name.is_empty()
                || tool.name.contains(['/', '\\'])
                || tool.name.starts_with('.')
                || tool.name == super::layout::CHECKOUTS_DIR
            {
                return Err(ConfigError::ValidationFailed(format!(
                    "invalid tool name '{}'",
                    tool.name
                )));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(ConfigError::ValidationFailed(format!(
                    "duplicate tool '{}'",
                    tool.name
                )));
            }
            if tool.source.url.is_empty() || tool.source.branch.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "tool '{}' needs a source url and branch",
                    tool.name
                )));
            }
            if let Some(build) = &tool.build {
                if build.command.trim().is_empty() || build.output_pattern.is_empty() {
                    return Err(ConfigError::ValidationFailed(format!(
                        "tool '{}' has an incomplete build step",
                        tool.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }
}

impl Default for ToolCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}
