use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One wedding invitation as the editor saves it.
///
/// Each save replaces the whole record. Media fields hold data URIs in memory and
/// bare base64 at rest (see `codec`). Fields the store does not know about are kept
/// in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRecord {
    /// Empty when the input carried no id; callers assign one before saving.
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groom_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bride_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groom_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bride_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_music: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvitationRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Stamp `updated_at` (and `created_at` on first save).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    /// Recency signal used by retention: `updated_at`, else the parsed `date`.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .or_else(|| self.date.as_deref().and_then(parse_loose_date))
    }

    /// Apply `image` to every image payload and `audio` to the music payload.
    /// Absent fields stay absent.
    pub fn map_media(
        mut self,
        image: impl Fn(String) -> String,
        audio: impl Fn(String) -> String,
    ) -> Self {
        self.cover_photo = self.cover_photo.map(&image);
        self.groom_photo = self.groom_photo.map(&image);
        self.bride_photo = self.bride_photo.map(&image);
        self.gallery = self
            .gallery
            .map(|items| items.into_iter().map(&image).collect());
        self.background_music = self.background_music.map(audio);
        self
    }

    /// Labelled view of every media payload, gallery entries indexed.
    pub fn media_payloads(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        let singles = [
            ("coverPhoto", &self.cover_photo),
            ("groomPhoto", &self.groom_photo),
            ("bridePhoto", &self.bride_photo),
        ];
        for (label, value) in singles {
            if let Some(payload) = value {
                out.push((label.to_string(), payload.as_str()));
            }
        }
        if let Some(gallery) = &self.gallery {
            for (i, payload) in gallery.iter().enumerate() {
                out.push((format!("gallery[{}]", i), payload.as_str()));
            }
        }
        if let Some(payload) = &self.background_music {
            out.push(("backgroundMusic".to_string(), payload.as_str()));
        }
        out
    }

    /// Display title: "Groom & Bride", falling back to the id.
    pub fn title(&self) -> String {
        match (self.groom_name.as_deref(), self.bride_name.as_deref()) {
            (Some(g), Some(b)) => format!("{} & {}", g, b),
            (Some(one), None) | (None, Some(one)) => one.to_string(),
            (None, None) => self.id.clone(),
        }
    }
}

fn parse_loose_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
