//! Generation of randomized upload payloads.

use bytes::Bytes;
use md5::Digest;
use rand::TryRngCore;
use rand::rngs::OsRng;

/// A randomized payload together with the content digest naming it.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// The payload bytes.
    pub content: Bytes,
    /// MD5 digest of `content`.
    pub digest: Digest,
}

impl Artifact {
    /// Generates `size` bytes from the OS random source and digests them.
    ///
    /// Every call fills a fresh buffer, so concurrent callers never share
    /// data. A failing OS random source leaves no usable environment to run
    /// in, so this panics rather than surfacing a retryable error.
    pub fn generate(size: usize) -> Self {
        let mut content = vec![0u8; size];
        OsRng
            .try_fill_bytes(&mut content)
            .expect("OS random source failed");
        let digest = md5::compute(&content);

        Self {
            content: Bytes::from(content),
            digest,
        }
    }

    /// The object path under which this artifact gets uploaded.
    pub fn object_path(&self, repo: &str, worker_id: usize) -> String {
        format!("{repo}/{worker_id}/{:x}", self.digest)
    }
}
