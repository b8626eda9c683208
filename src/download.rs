//! Blob downloads.
//!
//! Mirrors the browser flow: content is wrapped in a blob, registered under
//! a transient `blob:` object URL, the URL is "clicked" by handing it to a
//! `DownloadSink`, and the URL is revoked straight away. `data:` URLs (as
//! produced by `Canvas::to_data_url`) are decoded and delivered directly.

use crate::{Error, Result};
use base64::Engine as _;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Binary content with a MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>, mime: &str) -> Self {
        Self {
            mime: mime.to_string(),
            data: data.into(),
        }
    }
}

/// Registry of live object URLs
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: HashMap<String, Blob>,
    next_id: u64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return its object URL
    pub fn create_object_url(&mut self, blob: Blob) -> String {
        self.next_id += 1;
        let url = format!("blob:paperexport/{}", self.next_id);
        self.blobs.insert(url.clone(), blob);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<&Blob> {
        self.blobs.get(url)
    }

    /// Drop the blob behind `url`. Returns false if it was not registered.
    pub fn revoke_object_url(&mut self, url: &str) -> bool {
        self.blobs.remove(url).is_some()
    }

    pub fn live_urls(&self) -> usize {
        self.blobs.len()
    }
}

/// An object URL that is revoked when dropped
pub struct ObjectUrl<'a> {
    store: &'a mut BlobStore,
    url: String,
}

impl<'a> ObjectUrl<'a> {
    pub fn create(store: &'a mut BlobStore, blob: Blob) -> Self {
        let url = store.create_object_url(blob);
        Self { store, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn blob(&self) -> Option<&Blob> {
        self.store.resolve(&self.url)
    }
}

impl Drop for ObjectUrl<'_> {
    fn drop(&mut self) {
        self.store.revoke_object_url(&self.url);
    }
}

/// A file handed over for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    /// URL the download was triggered from (`blob:` or `data:`)
    pub href: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// Destination for downloads
pub trait DownloadSink: Send {
    fn save(&mut self, download: Download) -> Result<()>;
}

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, download: Download) -> Result<()> {
        validate_filename(&download.filename)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&download.filename);
        std::fs::write(&path, &download.data)
            .map_err(|e| Error::DownloadError(format!("{}: {}", path.display(), e)))?;
        log::debug!("saved {} ({} bytes)", path.display(), download.data.len());
        Ok(())
    }
}

/// Keeps downloads in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub downloads: Vec<Download>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, download: Download) -> Result<()> {
        self.downloads.push(download);
        Ok(())
    }
}

impl<S: DownloadSink + ?Sized> DownloadSink for &mut S {
    fn save(&mut self, download: Download) -> Result<()> {
        (**self).save(download)
    }
}

/// Filenames must be a single, non-empty path component
pub fn validate_filename(filename: &str) -> Result<()> {
    let bad = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if bad {
        return Err(Error::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Download `content` as `filename` through a transient object URL.
/// The URL is revoked before returning, whether or not the sink succeeded.
pub fn download_file(
    store: &mut BlobStore,
    sink: &mut dyn DownloadSink,
    content: &str,
    mime: &str,
    filename: &str,
) -> Result<()> {
    let object_url = ObjectUrl::create(store, Blob::new(content, mime));
    let blob = object_url
        .blob()
        .cloned()
        .ok_or_else(|| Error::DownloadError(format!("object URL {} vanished", object_url.url())))?;
    sink.save(Download {
        filename: filename.to_string(),
        href: object_url.url().to_string(),
        mime: blob.mime,
        data: blob.data,
    })
}

/// A decoded `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    /// Parse `data:[<mime>][;base64],<payload>`. Non-base64 payloads are
    /// taken verbatim (no percent-decoding).
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUrl("missing data: scheme".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUrl("missing ',' separator".into()))?;
        let (mime, is_base64) = match meta.strip_suffix(";base64") {
            Some(m) => (m, true),
            None => (meta, false),
        };
        let mime = if mime.is_empty() { "text/plain" } else { mime };
        let data = if is_base64 {
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| Error::InvalidDataUrl(e.to_string()))?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(Self {
            mime: mime.to_string(),
            data,
        })
    }
}

/// Download the content of a `data:` URL as `filename`
pub fn download_data_url(sink: &mut dyn DownloadSink, data_url: &str, filename: &str) -> Result<()> {
    let decoded = DataUrl::parse(data_url)?;
    sink.save(Download {
        filename: filename.to_string(),
        href: data_url.to_string(),
        mime: decoded.mime,
        data: decoded.data,
    })
}
