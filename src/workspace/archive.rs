//! ZIP extraction and packaging

use crate::error::{ArchiveError, IoError, WorkspaceError};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Extracts every entry of the ZIP archive at `source` into `destination`
///
/// Directories are created as needed. Entries whose names would land outside
/// `destination` are rejected. Returns the number of files written.
pub fn extract_archive(source: &Path, destination: &Path) -> Result<usize, WorkspaceError> {
    let file = File::open(source).map_err(|e| IoError::new("extract_archive.open", source, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::Zip {
        operation: "extract_archive.read",
        path: source.to_path_buf(),
        source: e,
    })?;

    fs::create_dir_all(destination)
        .map_err(|e| IoError::new("extract_archive.create_destination", destination, e))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| ArchiveError::Zip {
            operation: "extract_archive.entry",
            path: source.to_path_buf(),
            source: e,
        })?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(ArchiveError::UnsafeEntry {
                path: source.to_path_buf(),
                entry: entry.name().to_string(),
            }
            .into());
        };
        let target = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| IoError::new("extract_archive.create_dir", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| IoError::new("extract_archive.create_parent", parent, e))?;
        }

        let mut output =
            File::create(&target)
                .map_err(|e| IoError::new("extract_archive.create_file", &target, e))?;
        io::copy(&mut entry, &mut output)
            .map_err(|e| IoError::new("extract_archive.write_file", &target, e))?;
        written += 1;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .map_err(|e| IoError::new("extract_archive.set_permissions", &target, e))?;
        }
    }

    debug!(
        archive = %source.display(),
        destination = %destination.display(),
        files = written,
        "Extracted archive"
    );
    Ok(written)
}

/// Writes the tree under `source_dir` to a new ZIP archive at `destination`
///
/// Entry names are relative to `source_dir` and use `/` separators.
pub fn pack_archive(source_dir: &Path, destination: &Path) -> Result<(), WorkspaceError> {
    if !source_dir.is_dir() {
        return Err(IoError::new(
            "pack_archive.source",
            source_dir,
            io::Error::new(io::ErrorKind::NotFound, "source is not a directory"),
        )
        .into());
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| IoError::new("pack_archive.create_parent", parent, e))?;
    }

    let file = File::create(destination)
        .map_err(|e| IoError::new("pack_archive.create", destination, e))?;
    let mut writer = ZipWriter::new(file);
    let zip_error = |operation: &'static str| {
        move |source: zip::result::ZipError| ArchiveError::Zip {
            operation,
            path: destination.to_path_buf(),
            source,
        }
    };

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            IoError::new("pack_archive.walk", path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|_| {
                IoError::other("pack_archive.relative", entry.path(), "entry outside source")
            })?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = entry
            .metadata()
            .map_err(|e| IoError::new("pack_archive.metadata", entry.path(), e.into()))?;
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(permissions_of(&metadata));

        if metadata.is_dir() {
            writer
                .add_directory(format!("{}/", name), options)
                .map_err(zip_error("pack_archive.add_directory"))?;
            continue;
        }

        writer
            .start_file(name, options)
            .map_err(zip_error("pack_archive.start_file"))?;
        let mut input =
            File::open(entry.path())
                .map_err(|e| IoError::new("pack_archive.open", entry.path(), e))?;
        let mut buffer = Vec::new();
        input
            .read_to_end(&mut buffer)
            .map_err(|e| IoError::new("pack_archive.read", entry.path(), e))?;
        writer
            .write_all(&buffer)
            .map_err(|e| IoError::new("pack_archive.write", destination, e))?;
    }

    writer.finish().map_err(zip_error("pack_archive.finish"))?;
    debug!(
        source = %source_dir.display(),
        archive = %destination.display(),
        "Packed archive"
    );
    Ok(())
}

#[cfg(unix)]
fn permissions_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions_of(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() {
        0o755
    } else {
        0o644
    }
}
