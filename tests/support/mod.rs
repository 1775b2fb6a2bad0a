//! Shared fixtures for the integration tests
//!
//! Real decompilers are replaced by a [`ScriptedRunner`] whose rules create
//! the files each tool would produce.

#![allow(dead_code)]

use apkforge::progress::{ProgressEvent, ProgressHandler};
use apkforge::runner::{ScriptedRunner, ToolCommand};
use apkforge::toolset::{ToolCatalogue, ToolsetLayout};
use apkforge::workspace::pack_archive;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const MAIN_ACTIVITY: &str = "com/example/MainActivity.java";

/// What the simulated apktool and dex2jar produce for a package
#[derive(Debug, Clone, Copy)]
pub struct ApkProfile {
    pub manifest: bool,
    pub native_libs: bool,
    pub assets: bool,
    pub smali: bool,
    pub converts: bool,
}

impl ApkProfile {
    pub fn complete() -> Self {
        Self {
            manifest: true,
            native_libs: true,
            assets: true,
            smali: true,
            converts: true,
        }
    }

    /// A package without native libraries or assets
    pub fn minimal() -> Self {
        Self {
            native_libs: false,
            assets: false,
            ..Self::complete()
        }
    }
}

/// Paths wrapped in double quotes on a command line, in order
pub fn quoted_args(line: &str) -> Vec<PathBuf> {
    line.split('"').skip(1).step_by(2).map(PathBuf::from).collect()
}

fn io<T>(result: std::io::Result<T>) -> Result<T, String> {
    result.map_err(|e| e.to_string())
}

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        io(fs::create_dir_all(parent))?;
    }
    io(fs::write(path, content))
}

fn write_sources(dir: &Path) -> Result<(), String> {
    write_file(
        &dir.join(MAIN_ACTIVITY),
        "package com.example;\n\npublic class MainActivity {}\n",
    )
}

fn quoted(command: &ToolCommand, index: usize) -> Result<PathBuf, String> {
    quoted_args(&command.line)
        .get(index)
        .cloned()
        .ok_or_else(|| format!("no quoted argument {} in {}", index, command.line))
}

/// Adds rules simulating apktool, dex2jar and every decompiler
///
/// Rules already on `runner` take precedence.
pub fn script_pipeline(runner: ScriptedRunner, profile: ApkProfile) -> ScriptedRunner {
    runner
        .on(" d -f -s -m -k -o ", move |command| {
            let unpacked = quoted(command, 0)?;
            if profile.manifest {
                write_file(&unpacked.join("AndroidManifest.xml"), "<manifest/>")?;
            }
            write_file(&unpacked.join("classes.dex"), "dex\n035")?;
            write_file(&unpacked.join("res/values/strings.xml"), "<resources/>")?;
            if profile.native_libs {
                write_file(&unpacked.join("lib/arm64-v8a/libnative.so"), "ELF")?;
            }
            if profile.assets {
                write_file(&unpacked.join("assets/config.json"), "{}")?;
            }
            Ok(())
        })
        .on("--no-assets --no-res", move |command| {
            if profile.smali {
                let disassembled = quoted(command, 0)?;
                write_file(
                    &disassembled.join("smali/com/example/MainActivity.smali"),
                    ".class public Lcom/example/MainActivity;",
                )?;
            }
            Ok(())
        })
        .on("d2j-dex2jar", move |command| {
            if profile.converts {
                write_file(&quoted(command, 0)?, "PK")?;
            }
            Ok(())
        })
        .on("--outputdir", |command| write_sources(&quoted(command, 1)?))
        .on("fernflower.jar", |command| {
            let converted = quoted(command, 0)?;
            let sources = quoted(command, 1)?;
            let staging = sources.with_file_name("fernflower-staging");
            write_sources(&staging)?;
            let name = converted.file_name().ok_or("converted archive has no name")?;
            pack_archive(&staging, &sources.join(name)).map_err(|e| e.to_string())
        })
        .on("--escape-unicode", |command| {
            write_sources(&quoted(command, 0)?.join("sources"))
        })
        .on("jd-cli.jar", |command| write_sources(&quoted(command, 0)?))
        .on("procyon-decompiler", |command| write_sources(&quoted(command, 1)?))
        .on("--script=", |command| {
            write_sources(&quoted(command, 2)?.join("Bytecode_decompiled"))
        })
}

/// Populates every tool directory of the built-in catalogue
///
/// The project skeleton is a real archive so assembly can extract it.
pub fn fake_toolset(root: &Path) -> ToolsetLayout {
    let layout = ToolsetLayout::new(root);
    for name in ToolCatalogue::standard().names() {
        fs::create_dir_all(layout.tool_dir(name)).unwrap();
    }
    for name in ["apktool", "dex2jar", "fernflower", "jadx", "jdcmd", "jeb3", "procyon"] {
        fs::write(layout.tool_dir(name).join("marker"), name).unwrap();
    }
    fs::write(layout.tool_dir("cfr").join("cfr-0.153-SNAPSHOT.jar"), "jar").unwrap();

    let skeleton = root.join("skeleton-staging");
    fs::create_dir_all(skeleton.join("app/src/main/java")).unwrap();
    fs::write(skeleton.join("settings.gradle"), "include ':app'\n").unwrap();
    fs::write(
        skeleton.join("app/build.gradle"),
        "apply plugin: 'com.android.application'\n",
    )
    .unwrap();
    pack_archive(&skeleton, &layout.skeleton_archive()).unwrap();
    fs::remove_dir_all(&skeleton).unwrap();

    layout
}

/// Number of entries left in a directory; zero when it does not exist
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Handler that keeps every event it receives
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn started_phases(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::PhaseStarted { phase } => Some(phase),
                _ => None,
            })
            .collect()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
