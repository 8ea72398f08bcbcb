//! In-memory zip building for training input bundles.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PipelineError;

/// Accumulates files into a zip archive held in memory.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Append one file to the archive.
    pub fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|e| PipelineError::Archive(format!("start {name}: {e}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| PipelineError::Archive(format!("write {name}: {e}")))?;
        Ok(())
    }

    /// Finalize the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, PipelineError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| PipelineError::Archive(format!("finish: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}
