//! Content hash store for duplicate detection
//!
//! This module provides:
//! 1. A fixed-size content digest (BLAKE3) used to compare downloads by content
//! 2. A startup scan of the download directory that seeds the store
//! 3. Membership checks and append-only registration of new digests

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Fingerprint of a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Digest of an in-memory buffer
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Lowercase hex rendering of the full digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Set of digests for every file known to exist in the download directory.
///
/// The set only grows for the lifetime of the process. A digest is inserted
/// once a file with that content has been written, so membership implies the
/// file exists (or existed) on disk.
#[derive(Debug, Default)]
pub struct HashStore {
    digests: RwLock<HashSet<Digest>>,
}

impl HashStore {
    /// Create an empty store
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `directory` (non-recursive) and hash every regular file in it.
    ///
    /// Unreadable entries are skipped. A missing directory yields an empty store.
    pub fn load(directory: &Path) -> Self {
        let files: Vec<PathBuf> = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
                Ok(_) => None,
                Err(e) => {
                    debug!("Skipping unreadable directory entry: {}", e);
                    None
                }
            })
            .collect();

        let digests: HashSet<Digest> = files
            .par_iter()
            .filter_map(|path| match fs::read(path) {
                Ok(bytes) => Some(Digest::of(&bytes)),
                Err(e) => {
                    debug!("Skipping unreadable file {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        info!(
            directory = %directory.display(),
            files = files.len(),
            digests = digests.len(),
            "Loaded existing image hashes"
        );

        Self {
            digests: RwLock::new(digests),
        }
    }

    /// Check whether content with this digest has already been saved
    pub fn contains(&self, digest: &Digest) -> bool {
        self.digests.read().contains(digest)
    }

    /// Register a digest. Returns false if it was already present.
    pub fn insert(&self, digest: Digest) -> bool {
        self.digests.write().insert(digest)
    }

    /// Number of distinct digests known
    pub fn len(&self) -> usize {
        self.digests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.read().is_empty()
    }
}
