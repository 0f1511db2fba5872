//! Compilation requests.

use std::path::{Path, PathBuf};

/// A single compilation request.
///
/// Immutable once built: the front end reads it once and the engine discards
/// it after the request finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    entry_point: String,
    source_text: Vec<u8>,
    compiler_options: Vec<String>,
    link_libraries: Vec<PathBuf>,
}

impl SourceUnit {
    /// Create a unit with no compiler options and no libraries.
    pub fn new(entry_point: impl Into<String>, source_text: impl Into<Vec<u8>>) -> Self {
        Self {
            entry_point: entry_point.into(),
            source_text: source_text.into(),
            compiler_options: Vec::new(),
            link_libraries: Vec::new(),
        }
    }

    /// Build a unit from the host's string arguments.
    ///
    /// Both `compiler_options` and `link_libraries` are space-delimited.
    pub fn from_request(
        entry_point: &str,
        source_text: &str,
        compiler_options: &str,
        link_libraries: &str,
    ) -> Self {
        Self::new(entry_point, source_text)
            .with_options(tokenize(compiler_options))
            .with_libraries(tokenize(link_libraries))
    }

    /// Set the compiler options (builder pattern).
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compiler_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the auxiliary libraries (builder pattern).
    #[must_use]
    pub fn with_libraries<I, P>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.link_libraries = libraries.into_iter().map(Into::into).collect();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn source_text(&self) -> &[u8] {
        &self.source_text
    }

    pub fn compiler_options(&self) -> &[String] {
        &self.compiler_options
    }

    /// Libraries in load order. Earlier entries shadow later ones.
    pub fn link_libraries(&self) -> &[PathBuf] {
        &self.link_libraries
    }

    /// Iterate over library paths as `&Path`.
    pub fn library_paths(&self) -> impl Iterator<Item = &Path> {
        self.link_libraries.iter().map(PathBuf::as_path)
    }
}

/// Split a space-delimited argument string into tokens.
///
/// Runs of spaces collapse; only the space character delimits.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
