use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, GuestStore, MediaStore, StoreError, StoreResult, TemplateCatalog};
use crate::models::{
    Event, EventSection, EventStats, EventTheme, Guest, Media, RsvpStatus, Template,
    TemplateSection,
};

/// Часть хранилища, которую можно искусственно "уронить".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Events,
    Themes,
    Sections,
    Guests,
    Media,
    Templates,
}

#[derive(Default)]
struct Tables {
    // порядок вставки сохраняется, выборки сортируют сами
    events: Vec<Event>,
    themes: HashMap<Uuid, EventTheme>,
    sections: Vec<EventSection>,
    guests: Vec<Guest>,
    media: Vec<Media>,
    templates: Vec<Template>,
    template_sections: Vec<TemplateSection>,
    outages: HashSet<Area>,
}

impl Tables {
    fn check(&self, area: Area) -> StoreResult<()> {
        if self.outages.contains(&area) {
            return Err(StoreError::Unavailable(format!("{:?} storage is down", area)));
        }
        Ok(())
    }
}

/// Хранилище в памяти с теми же правилами, что и у Postgres:
/// уникальный slug, каскадное удаление, одна тема на событие.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_template(&self, template: Template, sections: Vec<TemplateSection>) {
        let mut tables = self.tables.write().await;
        tables.templates.push(template);
        tables.template_sections.extend(sections);
    }

    /// Все операции над `area` будут завершаться ошибкой, пока флаг не снят.
    pub async fn set_outage(&self, area: Area, down: bool) {
        let mut tables = self.tables.write().await;
        if down {
            tables.outages.insert(area);
        } else {
            tables.outages.remove(&area);
        }
    }
}

/// Стабильная сортировка "новые первыми": при равных `created_at`
/// позже вставленная запись идёт раньше.
fn newest_first<T: Clone>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.reverse();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn create(&self, event: &Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Events)?;
        if tables.events.iter().any(|e| e.slug == event.slug) {
            return Err(StoreError::Conflict(format!("slug {} already taken", event.slug)));
        }
        tables.events.push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let tables = self.tables.read().await;
        tables.check(Area::Events)?;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let tables = self.tables.read().await;
        tables.check(Area::Events)?;
        Ok(tables.events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        tables.check(Area::Events)?;
        Ok(newest_first(
            tables.events.iter().filter(|e| e.user_id == user_id).cloned(),
            |e| e.created_at.timestamp_micros(),
        ))
    }

    async fn update(&self, event: &Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Events)?;
        let stored = tables
            .events
            .iter_mut()
            .find(|e| e.id == event.id && e.user_id == event.user_id)
            .ok_or_else(|| StoreError::Missing(format!("event {}", event.id)))?;

        // slug и счётчик просмотров этим методом не меняются
        stored.title = event.title.clone();
        stored.event_date = event.event_date;
        stored.location_name = event.location_name.clone();
        stored.location_address = event.location_address.clone();
        stored.is_published = event.is_published;
        stored.updated_at = event.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Events)?;
        tables.events.retain(|e| e.id != id);
        tables.themes.remove(&id);
        tables.sections.retain(|s| s.event_id != id);
        tables.guests.retain(|g| g.event_id != id);
        tables.media.retain(|m| m.event_id != id);
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        tables.check(Area::Events)?;
        Ok(tables.events.iter().any(|e| e.slug == slug))
    }

    async fn increment_view_count(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Events)?;
        if let Some(event) = tables.events.iter_mut().find(|e| e.id == id) {
            event.view_count += 1;
        }
        Ok(())
    }

    async fn upsert_theme(&self, theme: &EventTheme) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Themes)?;
        // как ON CONFLICT в Postgres: строка остаётся прежней, меняются только поля
        let mut theme = theme.clone();
        if let Some(existing) = tables.themes.get(&theme.event_id) {
            theme.id = existing.id;
            theme.created_at = existing.created_at;
        }
        tables.themes.insert(theme.event_id, theme);
        Ok(())
    }

    async fn find_theme(&self, event_id: Uuid) -> StoreResult<Option<EventTheme>> {
        let tables = self.tables.read().await;
        tables.check(Area::Themes)?;
        Ok(tables.themes.get(&event_id).cloned())
    }

    async fn create_sections(&self, sections: &[EventSection]) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Sections)?;
        tables.sections.extend_from_slice(sections);
        Ok(())
    }

    async fn find_sections(&self, event_id: Uuid) -> StoreResult<Vec<EventSection>> {
        let tables = self.tables.read().await;
        tables.check(Area::Sections)?;
        let mut sections: Vec<EventSection> = tables
            .sections
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.sort_order);
        Ok(sections)
    }

    async fn update_section(&self, section: &EventSection) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Sections)?;
        let stored = tables
            .sections
            .iter_mut()
            .find(|s| s.id == section.id && s.event_id == section.event_id)
            .ok_or_else(|| StoreError::Missing(format!("section {}", section.id)))?;
        stored.content = section.content.clone();
        stored.is_visible = section.is_visible;
        stored.sort_order = section.sort_order;
        Ok(())
    }
}

#[async_trait]
impl GuestStore for InMemoryStore {
    async fn create(&self, guest: &Guest) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Guests)?;
        tables.guests.push(guest.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        let tables = self.tables.read().await;
        tables.check(Area::Guests)?;
        Ok(tables.guests.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Guest>> {
        let tables = self.tables.read().await;
        tables.check(Area::Guests)?;
        Ok(newest_first(
            tables.guests.iter().filter(|g| g.event_id == event_id).cloned(),
            |g| g.created_at.timestamp_micros(),
        ))
    }

    async fn update_status(&self, id: Uuid, status: RsvpStatus) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Guests)?;
        let guest = tables
            .guests
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::Missing(format!("guest {}", id)))?;
        guest.rsvp_status = status;
        Ok(())
    }

    async fn stats(&self, event_id: Uuid) -> StoreResult<EventStats> {
        let tables = self.tables.read().await;
        tables.check(Area::Guests)?;
        Ok(EventStats::tally(
            tables.guests.iter().filter(|g| g.event_id == event_id),
        ))
    }
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn create(&self, media: &Media) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Media)?;
        tables.media.push(media.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Media>> {
        let tables = self.tables.read().await;
        tables.check(Area::Media)?;
        Ok(tables.media.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Media>> {
        let tables = self.tables.read().await;
        tables.check(Area::Media)?;
        Ok(newest_first(
            tables.media.iter().filter(|m| m.event_id == event_id).cloned(),
            |m| m.created_at.timestamp_micros(),
        ))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check(Area::Media)?;
        tables.media.retain(|m| m.id != id);
        Ok(())
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryStore {
    async fn find_all(&self, category: Option<&str>) -> StoreResult<Vec<Template>> {
        let tables = self.tables.read().await;
        tables.check(Area::Templates)?;
        Ok(newest_first(
            tables
                .templates
                .iter()
                .filter(|t| t.is_active)
                .filter(|t| category.map_or(true, |c| t.category == c))
                .cloned(),
            |t| t.created_at.timestamp_micros(),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Template>> {
        let tables = self.tables.read().await;
        tables.check(Area::Templates)?;
        Ok(tables.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn find_sections(&self, template_id: Uuid) -> StoreResult<Vec<TemplateSection>> {
        let tables = self.tables.read().await;
        tables.check(Area::Templates)?;
        let mut sections: Vec<TemplateSection> = tables
            .template_sections
            .iter()
            .filter(|s| s.template_id == template_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.sort_order);
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(slug: &str) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            title: "Party".to_string(),
            slug: slug.to_string(),
            event_date: now,
            location_name: None,
            location_address: None,
            is_published: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let store = InMemoryStore::new();
        EventStore::create(&store, &event("party-abc123")).await.unwrap();

        let err = EventStore::create(&store, &event("party-abc123")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_dependents() {
        let store = InMemoryStore::new();
        let party = event("party-000000");
        EventStore::create(&store, &party).await.unwrap();
        store
            .create_sections(&[EventSection {
                id: Uuid::new_v4(),
                event_id: party.id,
                template_section_id: Uuid::new_v4(),
                content: serde_json::json!({}),
                is_visible: true,
                sort_order: 0,
            }])
            .await
            .unwrap();

        EventStore::delete(&store, party.id).await.unwrap();

        assert!(EventStore::find_sections(&store, party.id).await.unwrap().is_empty());
        assert!(EventStore::find_by_id(&store, party.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patching_vanished_rows_is_missing() {
        let store = InMemoryStore::new();
        let section = EventSection {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            template_section_id: Uuid::new_v4(),
            content: serde_json::json!({}),
            is_visible: false,
            sort_order: 0,
        };

        let err = store.update_section(&section).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));

        let err = store
            .update_status(Uuid::new_v4(), RsvpStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn outage_fails_only_its_area() {
        let store = InMemoryStore::new();
        store.set_outage(Area::Themes, true).await;

        assert!(store.find_theme(Uuid::new_v4()).await.is_err());
        assert!(EventStore::find_sections(&store, Uuid::new_v4()).await.is_ok());

        store.set_outage(Area::Themes, false).await;
        assert!(store.find_theme(Uuid::new_v4()).await.is_ok());
    }
}
