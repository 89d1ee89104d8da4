//! Content-Type lookup by file extension

/// Fallback for anything not in the table
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type for a lower-case, dot-prefixed extension
pub fn content_type_for(format: &str) -> &'static str {
    match format.to_ascii_lowercase().trim_start_matches('.') {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "wma" => "audio/x-ms-wma",
        "aif" | "aiff" => "audio/aiff",
        "webm" => "audio/webm",
        _ => OCTET_STREAM,
    }
}
