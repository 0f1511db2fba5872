//! Source staging.
//!
//! The driver only reads source from disk, so each request's text is written
//! to a uniquely named file for the duration of that request. The file is
//! removed when the [`SourceFile`] is dropped.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::FrontendError;

const FILE_PREFIX: &str = "rtcc_";

/// A request's source text materialized as a file.
#[derive(Debug)]
pub struct SourceFile {
    file: NamedTempFile,
}

impl SourceFile {
    /// Write `text` to a fresh file in `dir` (or the OS temp dir) with the
    /// given extension.
    pub fn stage(text: &[u8], dir: Option<&Path>, extension: &str) -> Result<Self, FrontendError> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut builder = tempfile::Builder::new();
        builder.prefix(FILE_PREFIX).suffix(&suffix);

        let created = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created.map_err(|e| FrontendError::Staging {
            message: format!("cannot create source file: {e}"),
        })?;

        file.write_all(text)
            .and_then(|()| file.flush())
            .map_err(|e| FrontendError::Staging {
                message: format!("cannot write {}: {e}", file.path().display()),
            })?;

        tracing::trace!(path = %file.path().display(), bytes = text.len(), "staged source");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests;
