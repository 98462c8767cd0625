use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("File I/O error for '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid ZIP container: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Extracts every entry of a ZIP-compatible archive (including OMEX bundles) into
/// `destination`, preserving the archive's directory layout.
///
/// Entries whose names would escape `destination` are skipped.
///
/// # Return
///
/// Returns the paths of the extracted files, in archive order.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;
    debug!(
        "Extracting {} entries from {:?} into {:?}",
        archive.len(),
        archive_path,
        destination
    );

    let mut extracted = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!("Skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let target = destination.join(relative);

        if entry.is_dir() {
            create_dir(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }

        let mut out = File::create(&target).map_err(|source| ArchiveError::Io {
            path: target.clone(),
            source,
        })?;
        io::copy(&mut entry, &mut out).map_err(|source| ArchiveError::Io {
            path: target.clone(),
            source,
        })?;
        extracted.push(target);
    }

    Ok(extracted)
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
