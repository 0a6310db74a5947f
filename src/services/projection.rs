//! Публичная страница события.
//!
//! Собирает событие, тему, секции, галерею и статистику гостей. Каждая
//! часть загружается независимо и возвращается как [`Fetched`]: сбой одной
//! части не роняет страницу, но и не маскируется под "данных нет".

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::events::EventService;
use super::view_counter::ViewCounter;
use crate::error::CoreResult;
use crate::models::{Event, EventSection, EventStats, EventTheme, Media};
use crate::store::{EventStore, GuestStore, MediaStore, StoreResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    Absent,
    Failed(String),
}

impl<T> Fetched<T> {
    fn from_optional(result: StoreResult<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Fetched::Found(value),
            Ok(None) => Fetched::Absent,
            Err(e) => Fetched::Failed(e.to_string()),
        }
    }

    fn from_result(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => Fetched::Found(value),
            Err(e) => Fetched::Failed(e.to_string()),
        }
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Fetched::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Fetched::Failed(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicEvent {
    pub event: Event,
    pub theme: Fetched<EventTheme>,
    pub sections: Fetched<Vec<EventSection>>,
    pub gallery: Fetched<Vec<Media>>,
    pub stats: Fetched<EventStats>,
}

/// Представление для клиента: упавшие части отдаются пустыми
/// и перечисляются в `degraded`.
#[derive(Debug, Serialize)]
pub struct PublicEventView {
    pub event: Event,
    pub theme: Option<EventTheme>,
    pub sections: Vec<EventSection>,
    pub gallery: Vec<Media>,
    pub stats: Option<EventStats>,
    pub degraded: Vec<&'static str>,
}

impl PublicEvent {
    pub fn degraded(&self) -> Vec<&'static str> {
        [
            ("theme", self.theme.is_failed()),
            ("sections", self.sections.is_failed()),
            ("gallery", self.gallery.is_failed()),
            ("stats", self.stats.is_failed()),
        ]
        .into_iter()
        .filter_map(|(part, failed)| failed.then_some(part))
        .collect()
    }

    pub fn into_view(self) -> PublicEventView {
        let degraded = self.degraded();
        PublicEventView {
            event: self.event,
            theme: self.theme.into_option(),
            sections: self.sections.into_option().unwrap_or_default(),
            gallery: self.gallery.into_option().unwrap_or_default(),
            stats: self.stats.into_option(),
            degraded,
        }
    }
}

#[derive(Clone)]
pub struct ProjectionService {
    event_service: EventService,
    events: Arc<dyn EventStore>,
    guests: Arc<dyn GuestStore>,
    media: Arc<dyn MediaStore>,
    views: ViewCounter,
}

impl ProjectionService {
    pub fn new(
        event_service: EventService,
        events: Arc<dyn EventStore>,
        guests: Arc<dyn GuestStore>,
        media: Arc<dyn MediaStore>,
        views: ViewCounter,
    ) -> Self {
        Self { event_service, events, guests, media, views }
    }

    /// Только опубликованные события. Просмотр ставится в очередь
    /// и на ответ не влияет.
    pub async fn assemble(&self, slug: &str) -> CoreResult<PublicEvent> {
        let event = self.event_service.get_published_by_slug(slug).await?;
        self.views.record(event.id);

        let id: Uuid = event.id;
        let (theme, sections, gallery, stats) = futures::join!(
            self.events.find_theme(id),
            self.events.find_sections(id),
            self.media.find_by_event(id),
            self.guests.stats(id),
        );

        let public = PublicEvent {
            event,
            theme: Fetched::from_optional(theme),
            sections: Fetched::from_result(sections),
            gallery: Fetched::from_result(gallery),
            stats: Fetched::from_result(stats),
        };

        let degraded = public.degraded();
        if !degraded.is_empty() {
            warn!(event_id = %id, ?degraded, "public page served with missing parts");
        }
        Ok(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn absent_and_failed_are_distinguished() {
        let absent: Fetched<EventTheme> = Fetched::from_optional(Ok(None));
        assert_eq!(absent, Fetched::Absent);
        assert!(!absent.is_failed());

        let failed: Fetched<EventTheme> =
            Fetched::from_optional(Err(StoreError::Unavailable("down".into())));
        assert!(failed.is_failed());
        assert!(failed.found().is_none());
    }

    #[test]
    fn found_lists_unwrap_to_values() {
        let fetched = Fetched::from_result(Ok(vec![1, 2, 3]));
        assert_eq!(fetched.found(), Some(&vec![1, 2, 3]));
        assert_eq!(fetched.into_option(), Some(vec![1, 2, 3]));
    }
}
