//! Host-facing request types.

use rtcc_frontend::SourceUnit;

/// A compile request as the host passes it: four strings.
///
/// `compiler_options` and `link_libraries` are space-delimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    pub entry_point: String,
    pub source_text: String,
    pub compiler_options: String,
    pub link_libraries: String,
}

impl CompileRequest {
    pub fn new(entry_point: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
            source_text: source_text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.compiler_options = options.into();
        self
    }

    #[must_use]
    pub fn with_libraries(mut self, libraries: impl Into<String>) -> Self {
        self.link_libraries = libraries.into();
        self
    }

    pub fn to_unit(&self) -> SourceUnit {
        SourceUnit::from_request(
            &self.entry_point,
            &self.source_text,
            &self.compiler_options,
            &self.link_libraries,
        )
    }
}
