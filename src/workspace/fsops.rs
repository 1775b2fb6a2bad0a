//! Recursive tree operations used by provisioning and assembly

use crate::error::IoError;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Version-control metadata directories preserved by [`empty_tree`] and
/// skipped when copying checkouts
pub const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Copies `src` into `dst` recursively, skipping files that already exist
///
/// Returns the number of files copied. Running it again with the same
/// arguments copies nothing.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, IoError> {
    copy_tree_excluding(src, dst, &[])
}

/// Like [`copy_tree`] but prunes any entry whose file name is in `excluded`
pub fn copy_tree_excluding(src: &Path, dst: &Path, excluded: &[&str]) -> Result<usize, IoError> {
    if !src.is_dir() {
        return Err(IoError::new(
            "copy_tree.source",
            src,
            io::Error::new(io::ErrorKind::NotFound, "source is not a directory"),
        ));
    }
    ensure_dir(dst, "copy_tree.destination")?;

    let mut copied = 0;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !excluded.contains(&name))
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            IoError::new("copy_tree.walk", path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                IoError::other("copy_tree.relative", entry.path(), "entry outside source")
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target, "copy_tree.create_dir")?;
            continue;
        }

        if target.exists() {
            trace!(path = %target.display(), "Skipping existing file");
            continue;
        }

        fs::copy(entry.path(), &target).map_err(|source| {
            IoError::new(
                "copy_tree.copy_file",
                entry.path(),
                io::Error::new(
                    source.kind(),
                    format!("could not copy to {}: {}", target.display(), source),
                ),
            )
        })?;
        copied += 1;
    }

    debug!(
        src = %src.display(),
        dst = %dst.display(),
        copied,
        "Copied tree"
    );
    Ok(copied)
}

/// Removes a file or directory tree; an absent path is not an error
pub fn delete_tree(path: &Path) -> Result<(), IoError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(IoError::new("delete_tree.metadata", path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && metadata.is_dir() => {
            // Checkouts carry read-only object files on some platforms.
            clear_readonly(path);
            fs::remove_dir_all(path).map_err(|source| IoError::new("delete_tree", path, source))
        }
        Err(e) => Err(IoError::new("delete_tree", path, e)),
    }
}

/// Removes every child of `path` except version-control metadata directories
///
/// Creates the directory when it does not exist yet.
pub fn empty_tree(path: &Path) -> Result<(), IoError> {
    if !path.exists() {
        return ensure_dir(path, "empty_tree.create");
    }

    let entries = fs::read_dir(path).map_err(|e| IoError::new("empty_tree.read_dir", path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| IoError::new("empty_tree.read_entry", path, e))?;
        let name = entry.file_name();
        if name.to_str().map_or(false, |n| VCS_DIRS.contains(&n)) {
            continue;
        }
        delete_tree(&entry.path())?;
    }
    Ok(())
}

/// Copies a single file byte for byte, creating parent directories
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), IoError> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent, "copy_file.create_parent")?;
    }
    fs::copy(src, dst).map_err(|source| IoError::new("copy_file", src, source))?;
    Ok(())
}

/// Returns true if `path` is a directory with at least one entry
pub fn is_populated_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn ensure_dir(path: &Path, operation: &'static str) -> Result<(), IoError> {
    if path.exists() && !path.is_dir() {
        return Err(IoError::other(operation, path, "exists and is not a directory"));
    }
    fs::create_dir_all(path).map_err(|e| IoError::new(operation, path, e))
}

fn clear_readonly(path: &Path) {
    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if let Ok(metadata) = entry.metadata() {
            let mut permissions = metadata.permissions();
            if permissions.readonly() {
                #[allow(clippy::permissions_set_readonly_false)]
                permissions.set_readonly(false);
                let _ = fs::set_permissions(entry.path(), permissions);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("a/one.txt"), "one").unwrap();
        fs::write(root.join("a/b/two.txt"), "two").unwrap();
    }

    #[test]
    fn test_copy_tree_copies_everything() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("nested/dst");
        sample_tree(&src);

        let copied = copy_tree(&src, &dst).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(dst.join("a/b/two.txt")).unwrap(), "two");
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
    }

    #[test]
    fn test_copy_tree_twice_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        sample_tree(&src);

        copy_tree(&src, &dst).unwrap();
        let second = copy_tree(&src, &dst).unwrap();

        assert_eq!(second, 0);
        let files: Vec<_> = WalkDir::new(&dst)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .collect();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_copy_tree_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        sample_tree(&src);
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("top.txt"), "kept").unwrap();

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "kept");
    }

    #[test]
    fn test_copy_tree_destination_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        sample_tree(&src);
        fs::write(&dst, "not a dir").unwrap();

        let err = copy_tree(&src, &dst).unwrap_err();

        assert_eq!(err.path, dst);
        assert_eq!(err.operation, "copy_tree.destination");
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let err = copy_tree(&temp_dir.path().join("missing"), &temp_dir.path().join("dst"))
            .unwrap_err();
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_copy_tree_excluding_skips_vcs() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("checkout");
        let dst = temp_dir.path().join("tool");
        sample_tree(&src);
        fs::create_dir_all(src.join(".git/objects")).unwrap();
        fs::write(src.join(".git/HEAD"), "ref").unwrap();

        copy_tree_excluding(&src, &dst, VCS_DIRS).unwrap();

        assert!(!dst.join(".git").exists());
        assert!(dst.join("a/one.txt").exists());
    }

    #[test]
    fn test_delete_tree_absent_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        delete_tree(&temp_dir.path().join("nothing-here")).unwrap();
    }

    #[test]
    fn test_delete_tree_removes_dir_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("tree");
        sample_tree(&tree);
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        delete_tree(&tree).unwrap();
        delete_tree(&file).unwrap();

        assert!(!tree.exists());
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_tree_without_permission_reports_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let parent = temp_dir.path().join("locked");
        let child = parent.join("child");
        sample_tree(&child);
        fs::set_permissions(&parent, fs::Permissions::from_mode(0o555)).unwrap();

        let result = delete_tree(&child);

        fs::set_permissions(&parent, fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users can delete regardless of mode bits
        if let Err(err) = result {
            assert!(err.to_string().contains(&child.display().to_string()));
            assert!(child.exists());
        }
    }

    #[test]
    fn test_empty_tree_keeps_vcs_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("tool");
        sample_tree(&tree);
        fs::create_dir_all(tree.join(".git")).unwrap();
        fs::write(tree.join(".git/HEAD"), "ref").unwrap();

        empty_tree(&tree).unwrap();

        let remaining: Vec<_> = fs::read_dir(&tree)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(remaining, vec![".git".to_string()]);
    }

    #[test]
    fn test_empty_tree_creates_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let tree = temp_dir.path().join("new/tool");

        empty_tree(&tree).unwrap();

        assert!(tree.is_dir());
        assert!(!is_populated_dir(&tree));
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("Manifest.xml");
        fs::write(&src, b"<manifest/>").unwrap();
        let dst = temp_dir.path().join("app/src/main/AndroidManifest.xml");

        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"<manifest/>");
    }
}
