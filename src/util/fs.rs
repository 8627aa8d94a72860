//! File helpers.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SardonicError};

/// Write `data` to `path` so that readers see either the old file or the
/// complete new one, never a partial write.
///
/// The bytes go to a temporary file in the destination directory, are synced,
/// and the temporary file is then renamed over `path`. Parent directories are
/// created as needed.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| SardonicError::invalid_config(format!("{} is not a file path", path.display())))?
        .to_string_lossy()
        .into_owned();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory)?;

    let temp_path = temp_path_for(&directory, &file_name)?;
    let written = write_and_sync(&temp_path, data).and_then(|_| {
        fs::rename(&temp_path, path)?;
        Ok(())
    });

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_and_sync(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

fn temp_path_for(directory: &Path, file_name: &str) -> Result<PathBuf> {
    let pid = std::process::id();
    for counter in 0..10_000 {
        let candidate = directory.join(format!(".{file_name}.{pid}_{counter}.tmp"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(SardonicError::Io(std::io::Error::other(format!(
        "could not create a temporary file for {file_name} in {}",
        directory.display()
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        write_atomic(&path, b"data").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_rejects_directory_like_path() {
        assert!(write_atomic("..", b"x").is_err());
    }
}
