use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::observation::Observation;

const INDENT: &[u8] = b"    ";

/// Pretty-prints the observations as one JSON array with a four-space indent.
pub fn render_observations(observations: &[Observation]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    observations.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Writes the array next to `path` first and renames it into place, so a
/// failed run never leaves a truncated file behind.
pub fn write_observations(path: &Path, observations: &[Observation]) -> Result<()> {
    let bytes = render_observations(observations)?;

    let parent = output_dir(path);
    fs::create_dir_all(&parent).map_err(ConvertError::io(&parent))?;

    let mut staged = NamedTempFile::new_in(&parent).map_err(ConvertError::io(&parent))?;
    staged.write_all(&bytes).map_err(ConvertError::io(staged.path()))?;
    staged.flush().map_err(ConvertError::io(staged.path()))?;
    debug!(staged = %staged.path().display(), bytes = bytes.len(), "staged output");

    staged
        .persist(path)
        .map_err(|err| ConvertError::Io {
            path: path.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}

fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
