// 📥 Byte Sources - uploaded files and the clipboard
//
// Both are single-completion async reads. Nothing is parsed or recomputed
// until the whole payload has resolved; the dependent operation then runs
// synchronously to completion.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use crate::record::{ImageField, RecordPatch};

/// Something that yields a whole payload once
#[async_trait]
pub trait ByteSource: Send + Sync {
    async fn read_all(&self) -> io::Result<Vec<u8>>;

    /// Payload decoded as text (lossy for invalid UTF-8)
    async fn read_text(&self) -> io::Result<String> {
        let bytes = self.read_all().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// A file on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// An in-memory payload (drag-and-drop buffers, tests)
pub struct BytesSource {
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        BytesSource { bytes: bytes.into() }
    }
}

#[async_trait]
impl ByteSource for BytesSource {
    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// System clipboard access
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self) -> io::Result<String>;
}

/// Paste clipboard text into one image field of a pending edit
///
/// A clipboard failure leaves the field untouched; nothing is surfaced.
/// Returns whether the field was populated.
pub async fn paste_into(patch: &mut RecordPatch, field: ImageField, clipboard: &dyn ClipboardSource) -> bool {
    match clipboard.read_text().await {
        Ok(text) => {
            patch.set_image(field, text.trim().to_string());
            true
        }
        Err(err) => {
            debug!(?field, error = %err, "clipboard read failed, field left as is");
            false
        }
    }
}
