//! Агрегат события: само событие, его тема и упорядоченные секции.
//!
//! Все изменения проходят через проверку владельца. Обновления частичные:
//! поле меняется, только если оно пришло в запросе. Тема - исключение,
//! она каждый раз заменяется целиком.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::ownership::{self, load_owned, Access};
use super::slug::SlugGenerator;
use super::template_clone::{clone_sections, empty_content};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    Event, EventPatch, EventSection, EventTheme, NewEvent, SectionPatch, ThemeInput,
};
use crate::store::{EventStore, StoreError, TemplateCatalog};

/// Событие вместе с секциями, склонированными из шаблона.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub sections: Vec<EventSection>,
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    templates: Arc<dyn TemplateCatalog>,
    slugs: Arc<SlugGenerator>,
}

fn parse_event_date(raw: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| CoreError::InvalidInput("invalid event_date format, use RFC 3339".to_string()))
}

/// Записывает значение, только если оно пришло.
fn patch<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Строка исчезла между чтением и записью (параллельное удаление).
pub(crate) fn missing_as_not_found(what: &'static str) -> impl Fn(StoreError) -> CoreError {
    move |err| match err {
        StoreError::Missing(_) => CoreError::NotFound(what),
        other => other.into(),
    }
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventStore>,
        templates: Arc<dyn TemplateCatalog>,
        slugs: Arc<SlugGenerator>,
    ) -> Self {
        Self { events, templates, slugs }
    }

    /// Создаёт неопубликованное событие и копирует в него секции шаблона.
    /// Если секции сохранить не удалось, событие удаляется и возвращается ошибка.
    pub async fn create(&self, actor_id: Uuid, input: NewEvent) -> CoreResult<CreatedEvent> {
        input.validate()?;

        let template = self
            .templates
            .find_by_id(input.template_id)
            .await?
            .ok_or(CoreError::NotFound("template"))?;
        let event_date = parse_event_date(&input.event_date)?;

        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4(),
            user_id: actor_id,
            template_id: template.id,
            title: input.title,
            slug: String::new(),
            event_date,
            location_name: input.location_name,
            location_address: input.location_address,
            is_published: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };

        // между проверкой slug и вставкой его может занять параллельный запрос
        let mut stored = false;
        for _ in 0..self.slugs.max_attempts() {
            event.slug = self.slugs.generate_unique(self.events.as_ref(), &event.title).await?;
            match self.events.create(&event).await {
                Ok(()) => {
                    stored = true;
                    break;
                }
                Err(StoreError::Conflict(reason)) => {
                    warn!(slug = %event.slug, %reason, "slug taken concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !stored {
            error!(title = %event.title, "could not store event with a unique slug");
            return Err(CoreError::Internal("slug retry budget exhausted".to_string()));
        }

        let sections = match clone_sections(
            self.events.as_ref(),
            self.templates.as_ref(),
            event.id,
            template.id,
        )
        .await
        {
            Ok(sections) => sections,
            Err(err) => {
                error!(event_id = %event.id, error = %err, "section cloning failed, rolling back event");
                if let Err(cleanup) = self.events.delete(event.id).await {
                    error!(event_id = %event.id, error = %cleanup, "rollback of half-created event failed");
                }
                return Err(CoreError::Internal(format!(
                    "failed to create event sections: {}",
                    err
                )));
            }
        };

        info!(event_id = %event.id, slug = %event.slug, sections = sections.len(), "Event created");
        Ok(CreatedEvent { event, sections })
    }

    /// Без проверки владельца: вызывающий сам решает, что показывать.
    pub async fn get_by_id(&self, id: Uuid) -> CoreResult<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound("event"))
    }

    /// Опубликованное событие видно всем, черновик - только владельцу.
    /// Чужой черновик выглядит как несуществующий.
    pub async fn get_for_viewer(&self, actor_id: Uuid, id: Uuid) -> CoreResult<Event> {
        let event = self.get_by_id(id).await?;
        if event.is_published || ownership::authorize(actor_id, &event) == Access::Allowed {
            Ok(event)
        } else {
            Err(CoreError::NotFound("event"))
        }
    }

    /// Публичный вход: черновик и несуществующий slug неразличимы.
    pub async fn get_published_by_slug(&self, slug: &str) -> CoreResult<Event> {
        match self.events.find_by_slug(slug).await? {
            Some(event) if event.is_published => Ok(event),
            _ => Err(CoreError::NotFound("event")),
        }
    }

    pub async fn list_by_owner(&self, actor_id: Uuid) -> CoreResult<Vec<Event>> {
        Ok(self.events.find_by_owner(actor_id).await?)
    }

    pub async fn update(&self, actor_id: Uuid, event_id: Uuid, changes: EventPatch) -> CoreResult<Event> {
        changes.validate()?;
        let mut event = load_owned(self.events.as_ref(), actor_id, event_id).await?;

        patch(&mut event.title, changes.title);
        if let Some(raw) = changes.event_date.as_deref() {
            event.event_date = parse_event_date(raw)?;
        }
        patch(&mut event.location_name, changes.location_name);
        patch(&mut event.location_address, changes.location_address);
        event.updated_at = Utc::now();

        self.events.update(&event).await.map_err(missing_as_not_found("event"))?;
        Ok(event)
    }

    pub async fn delete(&self, actor_id: Uuid, event_id: Uuid) -> CoreResult<()> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;
        self.events.delete(event_id).await?;
        info!(%event_id, "Event deleted");
        Ok(())
    }

    /// Повторная установка того же значения ничего не пишет и не считается ошибкой.
    pub async fn publish(&self, actor_id: Uuid, event_id: Uuid, publish: bool) -> CoreResult<Event> {
        let mut event = load_owned(self.events.as_ref(), actor_id, event_id).await?;
        if event.is_published == publish {
            return Ok(event);
        }

        event.is_published = publish;
        event.updated_at = Utc::now();
        self.events.update(&event).await.map_err(missing_as_not_found("event"))?;
        info!(%event_id, publish, "Event publication changed");
        Ok(event)
    }

    pub async fn update_theme(
        &self,
        actor_id: Uuid,
        event_id: Uuid,
        input: ThemeInput,
    ) -> CoreResult<EventTheme> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;

        let theme = EventTheme {
            id: Uuid::new_v4(),
            event_id,
            primary_color: input.primary_color,
            secondary_color: input.secondary_color,
            font_family: input.font_family,
            background_url: input.background_url,
            custom_css: input.custom_css,
            created_at: Utc::now(),
        };
        self.events.upsert_theme(&theme).await?;

        // при замене существующей темы хранилище оставляет прежний id строки
        Ok(self.events.find_theme(event_id).await?.unwrap_or(theme))
    }

    pub async fn update_section(
        &self,
        actor_id: Uuid,
        event_id: Uuid,
        section_id: Uuid,
        changes: SectionPatch,
    ) -> CoreResult<EventSection> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;

        let mut section = self
            .events
            .find_sections(event_id)
            .await?
            .into_iter()
            .find(|s| s.id == section_id)
            .ok_or(CoreError::NotFound("section"))?;

        // явный null сбрасывает содержимое к пустому объекту
        patch(&mut section.content, changes.content.map(|c| c.unwrap_or_else(empty_content)));
        patch(&mut section.is_visible, changes.is_visible);
        patch(&mut section.sort_order, changes.sort_order);

        self.events
            .update_section(&section)
            .await
            .map_err(missing_as_not_found("section"))?;
        Ok(section)
    }
}
