// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IngestError;

/// Where device logs are read from.
pub trait FileSource {
    /// Every non-directory path beneath `root`.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError>;

    fn read(&self, path: &Path) -> Result<Vec<u8>, IngestError>;
}

/// Local filesystem, walked recursively.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileSource;

impl FsFileSource {
    fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IngestError> {
        let entries = fs::read_dir(dir).map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| IngestError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            // follows symlinks, like metadata() does
            let metadata = fs::metadata(&path).map_err(|source| IngestError::Io {
                path: path.clone(),
                source,
            })?;
            if metadata.is_dir() {
                Self::walk(&path, files)?;
            } else {
                debug!("File found: {}", path.display());
                files.push(path);
            }
        }
        Ok(())
    }
}

impl FileSource for FsFileSource {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        let metadata = fs::metadata(root).map_err(|source| IngestError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            debug!("File found: {}", root.display());
            return Ok(vec![root.to_path_buf()]);
        }
        let mut files = Vec::new();
        Self::walk(root, &mut files)?;
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, IngestError> {
        fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
