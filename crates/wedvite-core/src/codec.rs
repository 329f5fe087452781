//! Media codec
//!
//! Embedded images and audio travel through the editor as data URIs
//! (`data:<mime>;base64,<payload>`). At rest only the base64 payload is kept; the
//! prefix is re-attached on load from a per-field MIME hint.
//!
//! Both directions are idempotent and treat payloads as opaque strings: the base64
//! body is never validated here.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::constants::{AUDIO_MIME_HINT, IMAGE_MIME_HINT};
use crate::models::InvitationRecord;

const DATA_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Strip a `data:<mime>;base64,` prefix, returning the bare payload.
///
/// Strings without that prefix are returned unchanged.
pub fn compress(payload: &str) -> String {
    strip_prefix(payload).to_string()
}

/// Attach a `data:<mime_hint>;base64,` prefix to a bare payload.
///
/// Strings that already start with `data:` and empty strings are returned unchanged.
pub fn decompress(payload: &str, mime_hint: &str) -> String {
    if payload.is_empty() || payload.starts_with(DATA_SCHEME) {
        return payload.to_string();
    }
    format!("{DATA_SCHEME}{mime_hint}{BASE64_MARKER}{payload}")
}

/// Number of media bytes the payload decodes to, or `None` if the body is not
/// valid standard base64.
pub fn payload_len(payload: &str) -> Option<usize> {
    STANDARD.decode(strip_prefix(payload)).ok().map(|bytes| bytes.len())
}

fn strip_prefix(payload: &str) -> &str {
    if !payload.starts_with(DATA_SCHEME) {
        return payload;
    }
    match payload.find(BASE64_MARKER) {
        Some(idx) => &payload[idx + BASE64_MARKER.len()..],
        None => payload,
    }
}

/// Applies the codec to every media field of a record.
#[derive(Debug, Clone)]
pub struct MediaCodec {
    image_mime: String,
    audio_mime: String,
}

impl Default for MediaCodec {
    fn default() -> Self {
        Self::new(IMAGE_MIME_HINT, AUDIO_MIME_HINT)
    }
}

impl MediaCodec {
    pub fn new(image_mime: impl Into<String>, audio_mime: impl Into<String>) -> Self {
        Self {
            image_mime: image_mime.into(),
            audio_mime: audio_mime.into(),
        }
    }

    pub fn compress_record(&self, record: InvitationRecord) -> InvitationRecord {
        record.map_media(|image| compress(&image), |audio| compress(&audio))
    }

    pub fn decompress_record(&self, record: InvitationRecord) -> InvitationRecord {
        record.map_media(
            |image| decompress(&image, &self.image_mime),
            |audio| decompress(&audio, &self.audio_mime),
        )
    }
}
