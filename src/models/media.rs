use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Тип по расширению файла, всё неизвестное считается картинкой.
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("mp4" | "mov" | "avi") => MediaKind::Video,
            Some("mp3" | "wav" | "ogg") => MediaKind::Audio,
            _ => MediaKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub event_id: Uuid,
    pub file_url: String,
    pub media_type: MediaKind,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension_case_insensitively() {
        assert_eq!(MediaKind::from_file_name("clip.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::from_file_name("holiday.mov"), MediaKind::Video);
        assert_eq!(MediaKind::from_file_name("song.ogg"), MediaKind::Audio);
        assert_eq!(MediaKind::from_file_name("voice.Wav"), MediaKind::Audio);
        assert_eq!(MediaKind::from_file_name("photo.jpeg"), MediaKind::Image);
    }

    #[test]
    fn files_without_extension_are_images() {
        assert_eq!(MediaKind::from_file_name("README"), MediaKind::Image);
        assert_eq!(MediaKind::from_file_name(""), MediaKind::Image);
    }
}
