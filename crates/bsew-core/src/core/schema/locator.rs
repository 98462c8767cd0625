use super::{InputFormats, Schema, SchemaError};
use crate::core::io::archive;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolves `input` to a single parsed [`Schema`], staging everything it touches in
/// `scratch_dir`.
///
/// A bare file (any extension that is not an archive extension) is copied into
/// `scratch_dir` under its own name and parsed. An archive is extracted fully into
/// `scratch_dir`, and the first top-level file carrying a schema extension is
/// selected. Candidates are visited in file-name order so the choice does not depend
/// on the platform's directory listing order.
///
/// # Errors
///
/// Returns [`SchemaError::NotFound`] when no candidate exists, and
/// [`SchemaError::Parse`] when the selected file is not valid JSON.
pub fn locate_schema(
    input: &Path,
    scratch_dir: &Path,
    formats: &InputFormats,
) -> Result<Schema, SchemaError> {
    let selected = if formats.is_archive(input) {
        info!("Extracting archive {:?}", input);
        let files =
            archive::extract_archive(input, scratch_dir).map_err(|source| SchemaError::Archive {
                path: input.to_path_buf(),
                source,
            })?;
        debug!("Extracted {} file(s) into {:?}", files.len(), scratch_dir);
        find_schema_file(scratch_dir, formats)?
    } else {
        stage_input_file(input, scratch_dir)?
    };

    let Some(schema_path) = selected else {
        return Err(SchemaError::NotFound {
            input: input.to_path_buf(),
        });
    };

    info!("Loading schema from {:?}", schema_path);
    read_schema(&schema_path)
}

/// Parses the JSON document at `path` into a [`Schema`].
pub fn read_schema(path: &Path) -> Result<Schema, SchemaError> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let schema = Schema::from_value(value).ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_path_buf(),
    })?;
    Ok(match path.parent() {
        Some(dir) => schema.with_base_dir(dir),
        None => schema,
    })
}

fn stage_input_file(input: &Path, scratch_dir: &Path) -> Result<Option<PathBuf>, SchemaError> {
    let Some(file_name) = input.file_name() else {
        return Ok(None);
    };
    let staged = scratch_dir.join(file_name);
    debug!("Copying {:?} to {:?}", input, staged);
    fs::copy(input, &staged).map_err(|source| SchemaError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    Ok(Some(staged))
}

fn find_schema_file(dir: &Path, formats: &InputFormats) -> Result<Option<PathBuf>, SchemaError> {
    let io_error = |source| SchemaError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && formats.is_schema(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();

    if candidates.len() > 1 {
        let names: Vec<_> = candidates
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        warn!(
            "Archive contains {} schema candidates ({}); using '{}'.",
            candidates.len(),
            names.join(", "),
            names[0]
        );
    }

    Ok(candidates.into_iter().next())
}
