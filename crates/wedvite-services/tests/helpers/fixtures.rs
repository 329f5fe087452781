//! Test fixtures: invitation records with media payloads and fixed ages.

use chrono::{Duration, Utc};
use wedvite_core::InvitationRecord;

/// Tiny base64 JPEG-ish payload; the bytes do not matter, only the framing.
pub const PHOTO_BASE64: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD";
pub const MUSIC_BASE64: &str = "SUQzBAAAAAAAI1RTU0UAAAAPAAAD";

pub fn photo_data_uri() -> String {
    format!("data:image/jpeg;base64,{}", PHOTO_BASE64)
}

pub fn music_data_uri() -> String {
    format!("data:audio/mpeg;base64,{}", MUSIC_BASE64)
}

/// Record last updated `days` days ago.
pub fn aged_record(id: &str, days: i64) -> InvitationRecord {
    InvitationRecord {
        groom_name: Some("Budi".to_string()),
        bride_name: Some("Sari".to_string()),
        updated_at: Some(Utc::now() - Duration::days(days)),
        ..InvitationRecord::new(id)
    }
}

/// Fresh record carrying every kind of media field.
pub fn record_with_media(id: &str) -> InvitationRecord {
    InvitationRecord {
        venue: Some("Grand Ballroom".to_string()),
        cover_photo: Some(photo_data_uri()),
        groom_photo: Some(photo_data_uri()),
        gallery: Some(vec![photo_data_uri(), photo_data_uri()]),
        background_music: Some(music_data_uri()),
        updated_at: Some(Utc::now()),
        ..InvitationRecord::new(id)
    }
}

pub fn ids(records: &[InvitationRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}
