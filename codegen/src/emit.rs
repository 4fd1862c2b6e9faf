//! Writes rendered artifacts to disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::EmitError;

/// Writes `content` to `path`, creating parent directories as needed.
///
/// An existing file is truncated and replaced. The handle is flushed and
/// closed before this returns.
///
/// # Errors
///
/// Returns [`EmitError::Write`] if the directory cannot be created or the
/// file cannot be written.
pub fn write_file(path: &Path, content: &str) -> Result<(), EmitError> {
    let fail = |source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(fail)?;
    }
    let mut file = fs::File::create(path).map_err(fail)?;
    file.write_all(content.as_bytes()).map_err(fail)?;
    file.flush().map_err(fail)?;
    Ok(())
}
