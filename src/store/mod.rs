//! Хранилища записей.
//!
//! Каждая возможность хранилища описана отдельным трейтом: события вместе с
//! темой и секциями, гости, медиафайлы и каталог шаблонов (только чтение).
//! Реализации: [`memory::InMemoryStore`] для тестов и локального запуска,
//! [`postgres::PgStore`] для продакшена.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Event, EventSection, EventStats, EventTheme, Guest, Media, RsvpStatus, Template,
    TemplateSection,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Нарушение уникальности (например, slug уже занят)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Запись исчезла между чтением и записью (например, параллельное удаление)
    #[error("row missing: {0}")]
    Missing(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, event: &Event) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Event>>;
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>>;
    /// Новые события первыми
    async fn find_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Event>>;
    async fn update(&self, event: &Event) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
    async fn slug_exists(&self, slug: &str) -> StoreResult<bool>;
    /// Атомарное `+1`, без чтения-изменения-записи
    async fn increment_view_count(&self, id: Uuid) -> StoreResult<()>;

    async fn upsert_theme(&self, theme: &EventTheme) -> StoreResult<()>;
    async fn find_theme(&self, event_id: Uuid) -> StoreResult<Option<EventTheme>>;

    /// Все секции или ни одной
    async fn create_sections(&self, sections: &[EventSection]) -> StoreResult<()>;
    /// По возрастанию `sort_order`
    async fn find_sections(&self, event_id: Uuid) -> StoreResult<Vec<EventSection>>;
    async fn update_section(&self, section: &EventSection) -> StoreResult<()>;
}

#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn create(&self, guest: &Guest) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>>;
    /// Новые гости первыми
    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Guest>>;
    async fn update_status(&self, id: Uuid, status: RsvpStatus) -> StoreResult<()>;
    async fn stats(&self, event_id: Uuid) -> StoreResult<EventStats>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn create(&self, media: &Media) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Media>>;
    /// Новые файлы первыми
    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Media>>;
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Только активные шаблоны, новые первыми
    async fn find_all(&self, category: Option<&str>) -> StoreResult<Vec<Template>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Template>>;
    /// По возрастанию `sort_order`
    async fn find_sections(&self, template_id: Uuid) -> StoreResult<Vec<TemplateSection>>;
}

/// Набор хранилищ, из которого собирается состояние приложения.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<dyn EventStore>,
    pub guests: Arc<dyn GuestStore>,
    pub media: Arc<dyn MediaStore>,
    pub templates: Arc<dyn TemplateCatalog>,
}

impl Stores {
    pub fn in_memory(store: memory::InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            events: store.clone(),
            guests: store.clone(),
            media: store.clone(),
            templates: store,
        }
    }

    pub fn postgres(store: postgres::PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            events: store.clone(),
            guests: store.clone(),
            media: store.clone(),
            templates: store,
        }
    }
}
