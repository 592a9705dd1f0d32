//! Template file errors

/// Errors raised while accepting or reading an attached file.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Extension not allowed for this kind of file.
    #[error("File type not supported. Allowed types: {}", .allowed.join(", "))]
    Unsupported {
        extension: String,
        allowed: &'static [&'static str],
    },

    /// File exceeds the size limit.
    #[error("File size exceeds {}MB limit", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },

    /// File could not be read.
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// File content could not be parsed.
    #[error("Failed to parse file: {0}")]
    Parse(String),
}
