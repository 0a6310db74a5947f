//! Галерея события.
//!
//! Байты файла пишет граничный слой через [`crate::storage::BlobStore`],
//! здесь только проверка владельца, классификация и запись ссылки.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ownership::load_owned;
use crate::error::{CoreError, CoreResult};
use crate::models::{Media, MediaKind};
use crate::store::{EventStore, MediaStore};

const MAX_EXTENSION_LEN: usize = 8;

/// Разрешение на загрузку: куда класть файл и какого он типа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub event_id: Uuid,
    pub storage_key: String,
    pub kind: MediaKind,
}

/// Расширение в нижнем регистре, только ASCII буквы и цифры.
fn safe_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= MAX_EXTENSION_LEN && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

#[derive(Clone)]
pub struct MediaService {
    events: Arc<dyn EventStore>,
    media: Arc<dyn MediaStore>,
}

impl MediaService {
    pub fn new(events: Arc<dyn EventStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { events, media }
    }

    pub async fn prepare_upload(
        &self,
        actor_id: Uuid,
        event_id: Uuid,
        file_name: &str,
    ) -> CoreResult<UploadTicket> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;

        let unique = format!(
            "{}-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let storage_key = match safe_extension(file_name) {
            Some(ext) => format!("events/{}/{}.{}", event_id, unique, ext),
            None => format!("events/{}/{}", event_id, unique),
        };

        Ok(UploadTicket {
            event_id,
            storage_key,
            kind: MediaKind::from_file_name(file_name),
        })
    }

    pub async fn attach(&self, ticket: UploadTicket, file_url: String) -> CoreResult<Media> {
        let media = Media {
            id: Uuid::new_v4(),
            event_id: ticket.event_id,
            file_url,
            media_type: ticket.kind,
            created_at: Utc::now(),
        };
        self.media.create(&media).await?;

        info!(event_id = %media.event_id, media_id = %media.id, kind = ?media.media_type, "Media attached");
        Ok(media)
    }

    pub async fn list(&self, actor_id: Uuid, event_id: Uuid) -> CoreResult<Vec<Media>> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;
        Ok(self.media.find_by_event(event_id).await?)
    }

    pub async fn delete(&self, actor_id: Uuid, event_id: Uuid, media_id: Uuid) -> CoreResult<Media> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;

        let media = self
            .media
            .find_by_id(media_id)
            .await?
            .filter(|m| m.event_id == event_id)
            .ok_or(CoreError::NotFound("media"))?;
        self.media.delete(media.id).await?;
        Ok(media)
    }
}
