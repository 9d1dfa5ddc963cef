//! Upload discovery and archive expansion.
//!
//! Uploads are CSV files, directories of CSV files, or ZIP archives. Archives
//! are extracted into a scratch directory owned by the returned
//! [`UploadSet`]; dropping the set deletes it, whichever way the run ends.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{IngestError, Result};

/// CSV files gathered from the inputs, plus the scratch space backing any
/// extracted archive members.
#[derive(Debug)]
pub struct UploadSet {
    files: Vec<PathBuf>,
    scratch: Option<TempDir>,
}

impl UploadSet {
    /// Expands every input into CSV files, in input order.
    pub fn collect(inputs: &[PathBuf]) -> Result<Self> {
        let mut set = UploadSet {
            files: Vec::new(),
            scratch: None,
        };
        for input in inputs {
            if input.is_dir() {
                set.files.extend(list_csv_files(input)?);
            } else if has_extension(input, "zip") {
                let files = set.extract_archive(input)?;
                set.files.extend(files);
            } else if has_extension(input, "csv") {
                if !input.is_file() {
                    return Err(IngestError::FileNotFound {
                        path: input.clone(),
                    });
                }
                set.files.push(input.clone());
            } else {
                tracing::warn!(path = %input.display(), "ignoring upload that is neither CSV nor ZIP");
            }
        }
        Ok(set)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Scratch directory holding extracted members, if any archive was given.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    fn scratch(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.scratch {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new()
            .prefix("his-uploads-")
            .tempdir()
            .map_err(|source| IngestError::ScratchDir { source })?;
        let path = dir.path().to_path_buf();
        self.scratch = Some(dir);
        Ok(path)
    }

    fn extract_archive(&mut self, archive_path: &Path) -> Result<Vec<PathBuf>> {
        let archive_error = |message: String| IngestError::Archive {
            path: archive_path.to_path_buf(),
            message,
        };
        let file = File::open(archive_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IngestError::FileNotFound {
                    path: archive_path.to_path_buf(),
                }
            } else {
                IngestError::FileRead {
                    path: archive_path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;

        // Each archive gets its own folder so members with equal names do not collide.
        let stem = archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        let target = unique_child(&self.scratch()?, &stem);
        std::fs::create_dir_all(&target).map_err(|source| IngestError::FileRead {
            path: target.clone(),
            source,
        })?;

        let mut extracted = Vec::new();
        for index in 0..archive.len() {
            let mut member = archive
                .by_index(index)
                .map_err(|e| archive_error(e.to_string()))?;
            if member.is_dir() {
                continue;
            }
            let Some(relative) = member.enclosed_name() else {
                tracing::warn!(archive = %archive_path.display(), member = member.name(), "skipping archive member with unsafe path");
                continue;
            };
            if !has_extension(&relative, "csv") {
                tracing::debug!(archive = %archive_path.display(), member = member.name(), "skipping non-CSV member");
                continue;
            }

            let destination = target.join(&relative);
            if let Some(parent) = destination.parent() {
                std::fs::create_dir_all(parent).map_err(|source| IngestError::FileRead {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let mut output = File::create(&destination).map_err(|source| IngestError::FileRead {
                path: destination.clone(),
                source,
            })?;
            std::io::copy(&mut member, &mut output).map_err(|e| archive_error(e.to_string()))?;
            extracted.push(destination);
        }

        extracted.sort();
        tracing::info!(
            archive = %archive_path.display(),
            files = extracted.len(),
            "extracted archive"
        );
        Ok(extracted)
    }
}

/// Lists CSV files under a directory, recursively, sorted by path.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if has_extension(&path, "csv") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn unique_child(parent: &Path, stem: &str) -> PathBuf {
    let mut candidate = parent.join(stem);
    let mut counter = 1;
    while candidate.exists() {
        candidate = parent.join(format!("{stem}_{counter}"));
        counter += 1;
    }
    candidate
}
