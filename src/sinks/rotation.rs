//! Size-based file rotation: `path` becomes `path.1`, shifting older
//! generations up and unlinking the oldest

use crate::core::error::{EngineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn numbered(path: &Path, index: u32) -> PathBuf {
    let mut numbered = path.to_path_buf();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.log");
    numbered.set_file_name(format!("{}.{}", name, index));
    numbered
}

/// Rotates the generations for `path`, keeping at most `max_files` of them:
/// unlink `path.K`, rename `path.i` to `path.(i+1)` for `i = K-1 .. 1`, then
/// move `path` aside as `path.1`. The caller reopens `path` fresh.
pub fn rotate_files(path: &Path, max_files: u32) -> Result<()> {
    let k = max_files.max(1);

    let oldest = numbered(path, k);
    if oldest.exists() {
        fs::remove_file(&oldest).map_err(|e| {
            EngineError::rotation(
                path.display().to_string(),
                format!("cannot unlink oldest generation: {}", e),
            )
        })?;
    }

    for i in (1..k).rev() {
        let from = numbered(path, i);
        if !from.exists() {
            continue;
        }
        let to = numbered(path, i + 1);
        fs::rename(&from, &to).map_err(|e| {
            EngineError::rotation(
                path.display().to_string(),
                format!("cannot shift generation {}: {}", i, e),
            )
        })?;
    }

    if path.exists() {
        fs::rename(path, numbered(path, 1)).map_err(|e| {
            EngineError::rotation(
                path.display().to_string(),
                format!("cannot move active file aside: {}", e),
            )
        })?;
    }

    Ok(())
}
