//! Filesystem scanning primitives
//!
//! The walker is an explicit worklist over `tokio::fs::read_dir` rather
//! than a recursive descent: stack depth stays bounded on deep trees, and
//! sorted-vs-natural ordering is an explicit per-directory buffering
//! choice. Sorted traversal is what makes generated artifacts stable
//! across runs on the same tree.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ScanError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One entry produced by [`DirWalker`].
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub is_dir: bool,
}

type ExcludePredicate = Box<dyn Fn(&FileEntry) -> bool + Send + Sync>;

/// Lazy, exclusion-aware directory traversal.
///
/// Entries come out one at a time via [`next_entry`](Self::next_entry);
/// directories are descended into breadth-first after being yielded. The
/// exclusion predicate runs before an entry is yielded or descended, so
/// excluded subtrees are never read at all.
pub struct DirWalker {
    frontier: VecDeque<(PathBuf, usize)>,
    ready: VecDeque<(FileEntry, usize)>,
    sorted: bool,
    max_depth: Option<usize>,
    exclude: Option<ExcludePredicate>,
}

impl DirWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back((root.into(), 0));
        Self {
            frontier,
            ready: VecDeque::new(),
            sorted: false,
            max_depth: None,
            exclude: None,
        }
    }

    /// Buffer and sort each directory's entries by file name before
    /// yielding them. Required wherever traversal order feeds generated
    /// output.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Limit descent to `depth` levels below the root (0 = root entries only).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Skip entries (and whole subtrees) for which `predicate` returns true.
    pub fn exclude<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FileEntry) -> bool + Send + Sync + 'static,
    {
        self.exclude = Some(Box::new(predicate));
        self
    }

    pub async fn next_entry(&mut self) -> Result<Option<FileEntry>, ScanError> {
        loop {
            if let Some((entry, depth)) = self.ready.pop_front() {
                let within_depth = self.max_depth.map_or(true, |max| depth < max);
                if entry.is_dir && within_depth {
                    self.frontier.push_back((entry.path.clone(), depth + 1));
                }
                return Ok(Some(entry));
            }

            let Some((dir, depth)) = self.frontier.pop_front() else {
                return Ok(None);
            };

            let mut read_dir = tokio::fs::read_dir(&dir)
                .await
                .map_err(|err| ScanError::io(&dir, err))?;

            let mut batch = Vec::new();
            while let Some(dir_entry) = read_dir
                .next_entry()
                .await
                .map_err(|err| ScanError::io(&dir, err))?
            {
                let file_type = dir_entry
                    .file_type()
                    .await
                    .map_err(|err| ScanError::io(&dir_entry.path(), err))?;
                let entry = FileEntry {
                    path: dir_entry.path(),
                    file_name: dir_entry.file_name().to_string_lossy().into_owned(),
                    is_dir: file_type.is_dir(),
                };
                if let Some(exclude) = &self.exclude {
                    if exclude(&entry) {
                        continue;
                    }
                }
                batch.push(entry);
            }

            if self.sorted {
                batch.sort_by(|a, b| a.file_name.cmp(&b.file_name));
            }
            self.ready.extend(batch.into_iter().map(|entry| (entry, depth)));
        }
    }

    /// Drains the walker, returning only file entries.
    pub async fn collect_files(mut self) -> Result<Vec<FileEntry>, ScanError> {
        let mut files = Vec::new();
        while let Some(entry) = self.next_entry().await? {
            if !entry.is_dir {
                files.push(entry);
            }
        }
        Ok(files)
    }
}

/// Walks `root`, reads each file whose name matches `file_pattern`, and
/// applies `extract` to its contents, collecting the non-`None` results.
/// Traversal is sorted so the result order is stable for identical trees.
pub async fn scan_matching<T, F>(
    root: &Path,
    file_pattern: &Regex,
    exclude_dirs: &'static [&'static str],
    mut extract: F,
) -> Result<Vec<T>, ScanError>
where
    F: FnMut(&Path, &str) -> Option<T>,
{
    let mut walker = DirWalker::new(root)
        .sorted(true)
        .exclude(move |entry| entry.is_dir && exclude_dirs.contains(&entry.file_name.as_str()));

    let mut results = Vec::new();
    while let Some(entry) = walker.next_entry().await? {
        if entry.is_dir || !file_pattern.is_match(&entry.file_name) {
            continue;
        }
        let contents = tokio::fs::read_to_string(&entry.path)
            .await
            .map_err(|err| ScanError::io(&entry.path, err))?;
        if let Some(value) = extract(&entry.path, &contents) {
            results.push(value);
        }
    }
    Ok(results)
}
