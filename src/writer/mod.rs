//! Output for mapsvg
//!
//! `svg` turns a style document and a map view into an SVG document. The
//! serialized bytes are then handed to a [`Delivery`], the "save blob as
//! file" collaborator: [`FileDelivery`] writes into a directory,
//! [`MemoryDelivery`] keeps everything in memory for embedding and tests.

use std::path::{Path, PathBuf};

use crate::{MapSvgError, Result};

pub mod svg;

pub use svg::{Diagnostic, ExportReport, MapExporter, SvgDocument};

/// MIME type of every delivered document
pub const SVG_MIME_TYPE: &str = "image/svg+xml;charset=utf-8";

/// Receiver of finished documents.
pub trait Delivery {
    /// Store `bytes` under the suggested `filename`.
    fn deliver(&mut self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<()>;
}

/// Writes delivered documents into a directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Delivery for FileDelivery {
    fn deliver(&mut self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<()> {
        let name = Path::new(filename);
        if name.file_name().map(Path::new) != Some(name) {
            return Err(MapSvgError::DeliveryError(format!(
                "Refusing to write '{}': not a plain file name",
                filename
            )));
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MapSvgError::DeliveryError(format!(
                "Failed to create output directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).map_err(|e| {
            MapSvgError::DeliveryError(format!("Failed to write '{}': {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), mime_type, "Delivered document");
        self.written.push(path);
        Ok(())
    }
}

/// One document held by [`MemoryDelivery`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DeliveredFile {
    /// Contents as UTF-8 text, if valid.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Keeps delivered documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDelivery {
    pub files: Vec<DeliveredFile>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently delivered document.
    pub fn last(&self) -> Option<&DeliveredFile> {
        self.files.last()
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&mut self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<()> {
        self.files.push(DeliveredFile {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_delivery_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut delivery = FileDelivery::new(dir.path().join("nested"));
        delivery
            .deliver(b"<svg/>", "mapSvg.svg", SVG_MIME_TYPE)
            .unwrap();

        let path = dir.path().join("nested").join("mapSvg.svg");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg/>");
        assert_eq!(delivery.written(), &[path]);
    }

    #[test]
    fn test_file_delivery_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut delivery = FileDelivery::new(dir.path());
        let result = delivery.deliver(b"x", "../escape.svg", SVG_MIME_TYPE);
        assert!(matches!(result, Err(MapSvgError::DeliveryError(_))));
    }

    #[test]
    fn test_memory_delivery() {
        let mut delivery = MemoryDelivery::new();
        delivery.deliver(b"<svg/>", "a.svg", SVG_MIME_TYPE).unwrap();
        let file = delivery.last().unwrap();
        assert_eq!(file.filename, "a.svg");
        assert_eq!(file.mime_type, "image/svg+xml;charset=utf-8");
        assert_eq!(file.text(), Some("<svg/>"));
    }
}
