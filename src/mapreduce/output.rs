//! Job output files
//!
//! Each reducer writes one `part-r-NNNNN` file holding one line per pair
//! it scored, in key order. Reducers with no keys still write an empty
//! part file, so the directory always holds `num_reducers` parts. A
//! successful job may add a `_SUCCESS.json` summary.

use super::errors::{MapReduceError, MapReduceResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File name of the job summary marker
pub const SUMMARY_FILE_NAME: &str = "_SUCCESS.json";

/// Pure: File name of reducer `reducer`'s output
pub fn part_file_name(reducer: usize) -> String {
    format!("part-r-{:05}", reducer)
}

fn write_error(path: &Path, source: std::io::Error) -> MapReduceError {
    MapReduceError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `dir`, or accept it if it exists and is empty
///
/// A directory that already holds files is refused so a run never mixes
/// its part files with those of an earlier run.
pub async fn prepare_output_dir(dir: &Path) -> MapReduceResult<()> {
    if fs::try_exists(dir).await.map_err(|e| write_error(dir, e))? {
        let mut entries = fs::read_dir(dir).await.map_err(|e| write_error(dir, e))?;
        if entries
            .next_entry()
            .await
            .map_err(|e| write_error(dir, e))?
            .is_some()
        {
            return Err(MapReduceError::OutputDirectoryNotEmpty {
                path: dir.to_path_buf(),
            });
        }
        return Ok(());
    }
    fs::create_dir_all(dir).await.map_err(|e| write_error(dir, e))?;
    debug!("Created output directory {}", dir.display());
    Ok(())
}

/// Write one reducer's lines to its part file
pub async fn write_part_file(dir: &Path, reducer: usize, lines: &[String]) -> MapReduceResult<PathBuf> {
    let path = dir.join(part_file_name(reducer));
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(&path, content)
        .await
        .map_err(|e| write_error(&path, e))?;
    debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(path)
}

/// Write `summary` as pretty JSON to `_SUCCESS.json` in `dir`
pub async fn write_summary<T: Serialize>(dir: &Path, summary: &T) -> MapReduceResult<PathBuf> {
    let path = dir.join(SUMMARY_FILE_NAME);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| write_error(&path, std::io::Error::other(e)))?;
    fs::write(&path, json)
        .await
        .map_err(|e| write_error(&path, e))?;
    Ok(path)
}
