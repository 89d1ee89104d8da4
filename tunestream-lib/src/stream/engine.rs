//! Stream engine - resolves identifiers and serves file bytes

use http::header::{self, HeaderMap, HeaderValue};
use http::StatusCode;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::{LibraryError, Result};
use crate::id::is_valid_id;
use crate::index::Library;
use crate::types::Entry;

use super::content_type::content_type_for;
use super::range::{parse_range, ByteRange, RangeError};

/// Largest range served by default (100 MiB)
pub const DEFAULT_MAX_RANGE_SIZE: u64 = 100 * 1024 * 1024;

/// File handle limited to the bytes that belong in the response body.
/// Dropping it closes the file.
pub type ByteSource = tokio::io::Take<File>;

/// Everything needed to write the HTTP response
#[derive(Debug)]
pub struct StreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the response carries no body (416)
    pub body: Option<ByteSource>,
}

impl StreamResponse {
    fn unsatisfiable(size: u64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_RANGE, header_value(format!("bytes */{}", size)));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        Self {
            status: StatusCode::RANGE_NOT_SATISFIABLE,
            headers,
            body: None,
        }
    }
}

/// Serves library files by content identifier
pub struct StreamEngine {
    library: Arc<dyn Library>,
    root: PathBuf,
    max_range_size: u64,
}

impl StreamEngine {
    pub fn new<P: AsRef<Path>>(library: Arc<dyn Library>, root: P, max_range_size: u64) -> Self {
        let root = root.as_ref();
        let root = std::path::absolute(root)
            .map(|p| clean_path(&p))
            .unwrap_or_else(|_| clean_path(root));
        let max_range_size = if max_range_size == 0 {
            DEFAULT_MAX_RANGE_SIZE
        } else {
            max_range_size
        };

        Self {
            library,
            root,
            max_range_size,
        }
    }

    /// Absolute, cleaned library root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_range_size(&self) -> u64 {
        self.max_range_size
    }

    /// Build the response for `id`, honouring an optional Range header.
    ///
    /// Relies on the library having been scanned; the lookup never rescans.
    /// The lookup takes the index read lock, so async callers that may race
    /// a walk should look the entry up off the runtime and use
    /// [`stream_entry`](Self::stream_entry).
    pub async fn stream(&self, id: &str, range_header: Option<&str>) -> Result<StreamResponse> {
        if !is_valid_id(id) {
            return Err(LibraryError::BadRequest(format!("invalid song id: {:?}", id)));
        }

        let entry = self.library.lookup(id)?;
        self.stream_entry(&entry, range_header).await
    }

    /// Build the response for an entry that was already looked up
    pub async fn stream_entry(
        &self,
        entry: &Entry,
        range_header: Option<&str>,
    ) -> Result<StreamResponse> {
        let id = &entry.id;
        let path = self.resolve_path(&entry.file_path).await?;

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_error(e, &path))?;
        if meta.is_dir() {
            tracing::warn!("Security: refusing to stream directory {:?}", path);
            return Err(LibraryError::Forbidden(
                "cannot stream a directory".to_string(),
            ));
        }

        let mut file = File::open(&path).await.map_err(|e| io_error(e, &path))?;
        let size = meta.len();

        tracing::info!("Stream request: id={}, path={:?}, size={}", id, path, size);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type_for(&entry.format)),
        );
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(&entry.file_name),
        );

        let Some(range_header) = range_header else {
            headers.insert(header::CONTENT_LENGTH, header_value(size.to_string()));
            return Ok(StreamResponse {
                status: StatusCode::OK,
                headers,
                body: Some(file.take(size)),
            });
        };

        let range = match self.resolve_range(range_header, size) {
            Ok(r) => r,
            Err(LibraryError::RangeNotSatisfiable { size }) => {
                return Ok(StreamResponse::unsatisfiable(size))
            }
            Err(e) => return Err(e),
        };

        file.seek(SeekFrom::Start(range.start)).await.map_err(|e| {
            LibraryError::Internal(format!(
                "failed to seek {:?} to {}: {}",
                path, range.start, e
            ))
        })?;

        headers.insert(
            header::CONTENT_RANGE,
            header_value(range.content_range(size)),
        );
        headers.insert(header::CONTENT_LENGTH, header_value(range.len().to_string()));

        Ok(StreamResponse {
            status: StatusCode::PARTIAL_CONTENT,
            headers,
            body: Some(file.take(range.len())),
        })
    }

    /// Parse a Range header and enforce the size cap
    pub fn resolve_range(&self, header: &str, size: u64) -> Result<ByteRange> {
        let range = parse_range(header, size).map_err(|e| match e {
            RangeError::Unsatisfiable => LibraryError::RangeNotSatisfiable { size },
            other => LibraryError::BadRequest(other.to_string()),
        })?;

        if range.len() > self.max_range_size {
            tracing::warn!(
                "Range request too large: {} bytes (max {})",
                range.len(),
                self.max_range_size
            );
            return Err(LibraryError::BadRequest(format!(
                "requested range too large (max {} bytes)",
                self.max_range_size
            )));
        }

        Ok(range)
    }

    /// Resolve an entry path and make sure it stays under the root.
    ///
    /// Checked twice: once on the cleaned absolute path, and again after
    /// symlinks are resolved against the resolved root.
    async fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path)
            .map(|p| clean_path(&p))
            .map_err(|e| LibraryError::Internal(format!("bad path {:?}: {}", path, e)))?;
        if !absolute.starts_with(&self.root) {
            return Err(self.escape(&absolute));
        }

        let resolved = tokio::fs::canonicalize(&absolute)
            .await
            .map_err(|e| io_error(e, &absolute))?;
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .unwrap_or_else(|_| self.root.clone());
        if !resolved.starts_with(&root) {
            return Err(self.escape(&resolved));
        }

        Ok(resolved)
    }

    fn escape(&self, path: &Path) -> LibraryError {
        tracing::warn!(
            "Security: access denied - {:?} is outside music directory {:?}",
            path,
            self.root
        );
        LibraryError::Forbidden("access denied".to_string())
    }
}

/// Lexically normalise `.` and `..` components
fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn io_error(err: std::io::Error, path: &Path) -> LibraryError {
    if err.kind() == std::io::ErrorKind::NotFound {
        LibraryError::NotFound(format!("audio file {:?}", path))
    } else {
        tracing::error!("Cannot access {:?}: {}", path, err);
        LibraryError::Internal(format!("cannot access {:?}: {}", path, err))
    }
}

fn header_value(value: String) -> HeaderValue {
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    HeaderValue::from_bytes(format!("inline; filename=\"{}\"", safe).as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("inline"))
}
