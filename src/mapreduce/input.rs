//! Input splitting
//!
//! Input paths are files or directories. A directory contributes its
//! regular files in name order, skipping hidden files and files starting
//! with `_` (job markers such as `_SUCCESS.json`). Each file is cut into
//! splits of at most `split_size` non-blank lines; a split never spans two
//! files. Each split becomes one map partition.
//!
//! A split is a byte range of its file, not a copy of its records. The
//! setup phase only scans line boundaries; each map task reads its own
//! range, so at most `max_parallel_mappers` splits are in memory at once.
//! Lines are handed out as raw bytes and decoded by the consumer.

use super::errors::{MapReduceError, MapReduceResult};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info};

/// One partition of input records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSplit {
    /// Position of this split in the job, starting at 0
    pub index: usize,
    /// File the records live in
    pub source: PathBuf,
    /// Byte offset of the first line of the split
    pub start: u64,
    /// Byte offset just past the last line of the split
    pub end: u64,
    /// Number of non-blank lines in the range
    pub records: usize,
}

fn is_data_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| !name.starts_with('.') && !name.starts_with('_'))
        .unwrap_or(false)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

fn strip_line_ending(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

/// Expand `inputs` into the ordered list of files to read
pub async fn resolve_input_files(inputs: &[PathBuf]) -> MapReduceResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let metadata = fs::metadata(input)
            .await
            .map_err(|source| MapReduceError::InputReadFailed {
                path: input.clone(),
                source,
            })?;

        if !metadata.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut entries = fs::read_dir(input)
            .await
            .map_err(|source| MapReduceError::InputReadFailed {
                path: input.clone(),
                source,
            })?;
        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| MapReduceError::InputReadFailed {
                path: input.clone(),
                source,
            })?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && is_data_file(&path) {
                found.push(path);
            }
        }
        found.sort();
        debug!("Directory {} holds {} input files", input.display(), found.len());
        files.extend(found);
    }
    Ok(files)
}

/// Cuts the lines of one file into splits as they stream past
#[derive(Debug)]
pub struct SplitCutter {
    source: PathBuf,
    split_size: usize,
    next_index: usize,
    start: u64,
    offset: u64,
    records: usize,
    splits: Vec<InputSplit>,
}

impl SplitCutter {
    /// Start cutting `source`, numbering splits from `first_index`
    pub fn new(source: &Path, split_size: usize, first_index: usize) -> Self {
        Self {
            source: source.to_path_buf(),
            split_size: split_size.max(1),
            next_index: first_index,
            start: 0,
            offset: 0,
            records: 0,
            splits: Vec::new(),
        }
    }

    /// Account for one line, including its terminator
    pub fn push_line(&mut self, line: &[u8]) {
        if is_blank(line) {
            // blank lines before the first record stay out of the split
            if self.records == 0 {
                self.start += line.len() as u64;
            }
            self.offset += line.len() as u64;
            return;
        }

        self.offset += line.len() as u64;
        self.records += 1;
        if self.records == self.split_size {
            self.close();
        }
    }

    fn close(&mut self) {
        self.splits.push(InputSplit {
            index: self.next_index,
            source: self.source.clone(),
            start: self.start,
            end: self.offset,
            records: self.records,
        });
        self.next_index += 1;
        self.start = self.offset;
        self.records = 0;
    }

    pub fn finish(mut self) -> Vec<InputSplit> {
        if self.records > 0 {
            self.close();
        }
        self.splits
    }
}

/// Pure: Cut in-memory `content` into splits, numbering from `first_index`
pub fn split_bytes(source: &Path, content: &[u8], split_size: usize, first_index: usize) -> Vec<InputSplit> {
    let mut cutter = SplitCutter::new(source, split_size, first_index);
    for line in content.split_inclusive(|b| *b == b'\n') {
        cutter.push_line(line);
    }
    cutter.finish()
}

async fn scan_file(file: &Path, split_size: usize, first_index: usize) -> MapReduceResult<Vec<InputSplit>> {
    let read_failed = |source| MapReduceError::InputReadFailed {
        path: file.to_path_buf(),
        source,
    };
    let handle = fs::File::open(file).await.map_err(read_failed)?;
    let mut reader = tokio::io::BufReader::new(handle);
    let mut cutter = SplitCutter::new(file, split_size, first_index);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await.map_err(read_failed)?;
        if read == 0 {
            break;
        }
        cutter.push_line(&line);
    }
    Ok(cutter.finish())
}

/// Scan every input and cut it into splits
///
/// Only line boundaries are recorded; no record is kept in memory.
pub async fn load_splits(inputs: &[PathBuf], split_size: usize) -> MapReduceResult<Vec<InputSplit>> {
    let files = resolve_input_files(inputs).await?;
    let mut splits = Vec::new();
    for file in &files {
        let file_splits = scan_file(file, split_size, splits.len()).await?;
        debug!("{} -> {} splits", file.display(), file_splits.len());
        splits.extend(file_splits);
    }

    info!(
        "Loaded {} splits from {} input files",
        splits.len(),
        files.len()
    );
    Ok(splits)
}

/// Read the non-blank lines of `split`, without terminators, in file order
///
/// Blocking; map tasks call this from `spawn_blocking`.
pub fn read_split<F>(split: &InputSplit, mut on_line: F) -> MapReduceResult<()>
where
    F: FnMut(&[u8]) -> MapReduceResult<()>,
{
    let read_failed = |source| MapReduceError::InputReadFailed {
        path: split.source.clone(),
        source,
    };
    let mut file = std::fs::File::open(&split.source).map_err(read_failed)?;
    file.seek(SeekFrom::Start(split.start)).map_err(read_failed)?;
    let mut reader = BufReader::new(file.take(split.end.saturating_sub(split.start)));

    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(read_failed)? == 0 {
            return Ok(());
        }
        if !is_blank(&line) {
            on_line(strip_line_ending(&line))?;
        }
    }
}
