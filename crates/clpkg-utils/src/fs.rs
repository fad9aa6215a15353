use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// If the directory already exists, this function does nothing. If the path
/// exists but is not a directory, this function returns an error.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source: err,
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Removes the specified file or directory safely.
///
/// Returns `Ok(())` if the path does not exist. Directories are removed
/// recursively.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(());
    }

    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|err| FileSystemError::File {
        path: path.to_path_buf(),
        action: "remove",
        source: err,
    })
}

/// Reads the whole file into memory.
pub fn read_file<P: AsRef<Path>>(path: P) -> FileSystemResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|err| FileSystemError::File {
        path: path.to_path_buf(),
        action: "read",
        source: err,
    })
}

/// Writes `content` to `path`, replacing any previous content.
///
/// Parent directories are created as needed. The bytes are first written to a
/// sibling `.part` file which is then renamed over the destination, so readers
/// never observe a truncated file.
pub fn write_file<P: AsRef<Path>>(path: P, content: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let tmp_path = PathBuf::from(format!("{}.part", path.display()));
    let file_err = |path: &Path, action: &'static str| {
        let path = path.to_path_buf();
        move |err| FileSystemError::File {
            path,
            action,
            source: err,
        }
    };

    {
        let file = File::create(&tmp_path).map_err(file_err(&tmp_path, "create"))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(content)
            .map_err(file_err(&tmp_path, "write"))?;
        writer.flush().map_err(file_err(&tmp_path, "write"))?;
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(file_err(path, "replace")(err));
    }

    Ok(())
}

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_files<P: AsRef<Path>>(dir: P) -> FileSystemResult<Vec<PathBuf>> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let dir_err = |err| FileSystemError::Directory {
        path: dir.to_path_buf(),
        action: "read",
        source: err,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}
