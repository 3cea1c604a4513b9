//! Configuration for a stress run.

use anyhow::ensure;
use bytesize::ByteSize;

/// Configuration for one stress run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of workers uploading artifacts.
    pub upload_workers: usize,
    /// Number of workers downloading artifacts.
    pub download_workers: usize,
    /// Size of each uploaded artifact.
    pub file_size: ByteSize,
    /// The repository to target.
    pub repo: String,
}

impl Config {
    /// Validates the configuration, before any workers are spawned.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.repo.is_empty(), "required flag --repo was not set");
        Ok(())
    }
}
