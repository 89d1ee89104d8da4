//! Content identifiers
//!
//! An identifier is the first 16 bytes of the SHA-256 digest of a file's
//! path, hex-encoded. It is stable across restarts and depends only on the
//! path, never on file contents.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;

/// Number of digest bytes kept in an identifier
pub const ID_BYTES: usize = 16;

/// Wire format of an identifier
pub const ID_PATTERN: &str = "^[a-f0-9]{32}$";

static ID_REGEX: OnceLock<Regex> = OnceLock::new();

/// Compute the identifier for a path
pub fn content_id<P: AsRef<Path>>(path: P) -> String {
    let digest = Sha256::digest(path.as_ref().to_string_lossy().as_bytes());
    hex::encode(&digest[..ID_BYTES])
}

/// Check that `id` is exactly 32 lowercase hex characters
pub fn is_valid_id(id: &str) -> bool {
    ID_REGEX
        .get_or_init(|| Regex::new(ID_PATTERN).expect("identifier pattern is valid"))
        .is_match(id)
}
