//! Byte-range support for serving video files.
//!
//! [`RangeRequest`] turns a `Range` header into a typed request, which is then
//! planned against the file size into a [`ServePlan`]. [`open_span`] streams
//! the selected bytes off disk in fixed-size chunks.

mod range;
mod span;

use std::path::Path;

pub use range::{ByteSpan, RangeRequest, ServePlan};
pub use span::{open_span, CHUNK_SIZE};

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME type for `path` based on its extension.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a/clip.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("clip.WEBM")), "video/webm");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(content_type_for(Path::new("clip.zzzunknown")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("no_extension")), FALLBACK_CONTENT_TYPE);
    }
}
