use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("File I/O error for '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to serialize '{}': {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to walk directory '{}': {source}", .path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Serializes `value` as JSON into a new file at `path`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| OutputError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)
}

/// Copies every file below `source` into `destination`, recreating the directory
/// layout and overwriting files that already exist there. Nothing already present in
/// `destination` is removed.
///
/// # Return
///
/// Returns the number of files copied.
pub fn merge_directory(source: &Path, destination: &Path) -> Result<usize, OutputError> {
    create_dir(destination)?;

    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|err| OutputError::Walk {
            path: source.to_path_buf(),
            source: err,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target)?;
        } else {
            debug!("Copying {:?} to {:?}", entry.path(), target);
            fs::copy(entry.path(), &target).map_err(|err| OutputError::Io {
                path: target.clone(),
                source: err,
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn create_dir(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
