//! L2: disk-backed store keyed by `(namespace, key)`, with optional ZSTD
//! compression. File IO and compression are both synchronous, so every
//! operation runs on the blocking pool — the same pattern the teacher uses
//! in `search/index.rs` to bridge `postcard` (de)serialization into async
//! code via `tokio::task::block_in_place`/`spawn_blocking`.

use super::Namespace;
use crate::hash::ContentHash;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, ns: Namespace, key: &str) -> PathBuf {
        let filename = ContentHash::of(key.as_bytes()).to_string();
        self.root.join(ns.as_str()).join(filename)
    }

    pub async fn get(&self, ns: Namespace, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(ns, key);
        tokio::task::spawn_blocking(move || read_entry(&path))
            .await
            .ok()
            .flatten()
    }

    pub async fn set(&self, ns: Namespace, key: &str, bytes: Vec<u8>, compress: bool) -> Result<()> {
        let path = self.path_for(ns, key);
        tokio::task::spawn_blocking(move || write_entry(&path, &bytes, compress))
            .await
            .context("disk cache write task panicked")?
    }

    pub async fn invalidate(&self, ns: Namespace, key: &str) {
        let path = self.path_for(ns, key);
        let _ = tokio::fs::remove_file(path).await;
    }

    pub async fn clear(&self, ns: Namespace) {
        let dir = self.root.join(ns.as_str());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    pub async fn size_bytes(&self, ns: Namespace, key: &str) -> Option<u64> {
        let path = self.path_for(ns, key);
        tokio::fs::metadata(path).await.ok().map(|m| m.len())
    }
}

/// On-disk framing: one magic byte (0 = raw, 1 = zstd) followed by the
/// payload. Keeps `get` self-describing without a side-channel manifest.
const FRAME_RAW: u8 = 0;
const FRAME_ZSTD: u8 = 1;

fn write_entry(path: &Path, bytes: &[u8], compress: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating cache directory {}", parent.display()))?;
    }

    let mut framed = Vec::with_capacity(bytes.len() + 1);
    if compress {
        framed.push(FRAME_ZSTD);
        framed.extend(zstd::stream::encode_all(bytes, 0).context("zstd-compressing cache entry")?);
    } else {
        framed.push(FRAME_RAW);
        framed.extend_from_slice(bytes);
    }

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, &framed)
        .with_context(|| format!("writing cache entry to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming cache entry into place at {}", path.display()))
}

fn read_entry(path: &Path) -> Option<Vec<u8>> {
    let framed = std::fs::read(path).ok()?;
    let (&tag, payload) = framed.split_first()?;
    match tag {
        FRAME_ZSTD => zstd::stream::decode_all(payload).ok(),
        _ => Some(payload.to_vec()),
    }
}
