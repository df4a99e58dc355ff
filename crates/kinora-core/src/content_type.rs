//! Content-type inference from file-name extensions.

use crate::constants::FALLBACK_CONTENT_TYPE;
use std::path::Path;

/// Infer a MIME type from the extension of `file_name`.
///
/// Unknown or missing extensions fall back to `application/octet-stream`.
pub fn content_type_for_file_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let Some(extension) = extension else {
        return FALLBACK_CONTENT_TYPE;
    };

    match extension.as_str() {
        // video
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mpeg" | "mpg" => "video/mpeg",
        "ts" => "video/mp2t",
        // audio
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "aac" => "audio/aac",
        // image
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        // documents and text
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "zip" => "application/zip",
        "m3u8" => "application/vnd.apple.mpegurl",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
