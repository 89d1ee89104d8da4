use std::path::PathBuf;
use thiserror::Error;

/// Error type for library indexing and streaming
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The identifier is well-formed but unknown, or the file vanished
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed identifier or Range header, or an oversized range
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The resolved path escapes the library root or is a directory
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested range lies outside the file
    #[error("Range not satisfiable for file of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// The library root did not exist when a scan started
    #[error("Music directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Traversal failed partway through a scan
    #[error("Error while walking music directory: {0}")]
    Walk(String),

    /// The scan was cancelled before it completed
    #[error("Scan cancelled")]
    Cancelled,

    /// Any other failure while opening or reading a file
    #[error("Internal error: {0}")]
    Internal(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LibraryError {
    /// HTTP status code this outcome maps to
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
            LibraryError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LibraryError::Forbidden(_) => StatusCode::FORBIDDEN,
            LibraryError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            LibraryError::DirectoryNotFound(_)
            | LibraryError::Walk(_)
            | LibraryError::Cancelled
            | LibraryError::Internal(_)
            | LibraryError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LibraryError>;
