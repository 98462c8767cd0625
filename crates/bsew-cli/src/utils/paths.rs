use crate::error::{CliError, Result};
use directories::BaseDirs;
use std::path::{Component, Path, PathBuf};

/// Replaces a leading `~` component with the current user's home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot expand '{}': no home directory could be determined.",
                path.display()
            ))
        })?;
    Ok(home.join(rest))
}

/// Expands `~` and makes `path` absolute against the current directory, folding away
/// `.` and `..` components. The path does not need to exist, and symlinks are left
/// unresolved.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    let absolute = std::path::absolute(&expanded).map_err(|e| {
        CliError::Argument(format!(
            "Cannot make '{}' absolute: {}",
            expanded.display(),
            e
        ))
    })?;
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // `..` at the root stays at the root.
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
