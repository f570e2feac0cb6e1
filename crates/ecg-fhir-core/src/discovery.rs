use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::{debug, warn};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};

/// First `.txt` file directly inside `dir`, in lexicographic order.
pub fn find_input_file(dir: &Path) -> Result<PathBuf> {
    let dir_str = dir.to_str().ok_or_else(|| {
        ConvertError::Config(format!("input directory '{}' is not valid UTF-8", dir.display()))
    })?;
    let dir_str = if dir_str.is_empty() { "." } else { dir_str };
    let pattern = format!("{}/*.txt", Pattern::escape(dir_str));
    debug!(%pattern, "searching for input recording");

    for entry in glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("could not read path from glob pattern: {err}");
                continue;
            }
        };
        if path.is_file() {
            return Ok(path);
        }
    }

    Err(ConvertError::NoInputFile {
        dir: dir.to_path_buf(),
    })
}

/// The explicit `input_path` if configured, otherwise a search of `input_dir`.
pub fn resolve_input(config: &ConverterConfig) -> Result<PathBuf> {
    match &config.input_path {
        Some(path) => Ok(path.clone()),
        None => find_input_file(&config.input_dir),
    }
}
