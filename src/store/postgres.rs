use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{EventStore, GuestStore, MediaStore, StoreError, StoreResult, TemplateCatalog};
use crate::models::{
    Event, EventSection, EventStats, EventTheme, Guest, Media, RsvpStatus, Template,
    TemplateSection,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Пул соединений и миграции схемы приглашений (`src/migrations`).
    /// Миграции идемпотентны, поэтому выполняются при каждом старте.
    pub async fn connect(database_url: &str, pool_size: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        info!(pool_size, "Database connected");

        sqlx::migrate!("./src/migrations")
            .run(&pool)
            .await
            .context("Failed to run invitation schema migrations")?;
        info!("Invitation schema is up to date");

        Ok(Self::new(pool))
    }
}

// 23505 - unique_violation
fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(format!("{} already exists", what))
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO events (id, user_id, template_id, title, slug, event_date,
                                 location_name, location_address, is_published, view_count,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.template_id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(event.event_date)
        .bind(&event.location_name)
        .bind(&event.location_address)
        .bind(event.is_published)
        .bind(event.view_count)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, &format!("slug {}", event.slug)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn find_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn update(&self, event: &Event) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE events SET
                title = $1,
                event_date = $2,
                location_name = $3,
                location_address = $4,
                is_published = $5,
                updated_at = $6
             WHERE id = $7 AND user_id = $8"
        )
        .bind(&event.title)
        .bind(event.event_date)
        .bind(&event.location_name)
        .bind(&event.location_address)
        .bind(event.is_published)
        .bind(event.updated_at)
        .bind(event.id)
        .bind(event.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("event {}", event.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        // тема, секции, гости и медиа удаляются каскадом
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE slug = $1)"
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn increment_view_count(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE events SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_theme(&self, theme: &EventTheme) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO event_themes (id, event_id, primary_color, secondary_color,
                                       font_family, background_url, custom_css, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (event_id) DO UPDATE SET
                primary_color = EXCLUDED.primary_color,
                secondary_color = EXCLUDED.secondary_color,
                font_family = EXCLUDED.font_family,
                background_url = EXCLUDED.background_url,
                custom_css = EXCLUDED.custom_css"
        )
        .bind(theme.id)
        .bind(theme.event_id)
        .bind(&theme.primary_color)
        .bind(&theme.secondary_color)
        .bind(&theme.font_family)
        .bind(&theme.background_url)
        .bind(&theme.custom_css)
        .bind(theme.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_theme(&self, event_id: Uuid) -> StoreResult<Option<EventTheme>> {
        let theme = sqlx::query_as::<_, EventTheme>(
            "SELECT * FROM event_themes WHERE event_id = $1"
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(theme)
    }

    async fn create_sections(&self, sections: &[EventSection]) -> StoreResult<()> {
        if sections.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for section in sections {
            sqlx::query(
                "INSERT INTO event_sections (id, event_id, template_section_id, content,
                                             is_visible, sort_order)
                 VALUES ($1, $2, $3, $4, $5, $6)"
            )
            .bind(section.id)
            .bind(section.event_id)
            .bind(section.template_section_id)
            .bind(&section.content)
            .bind(section.is_visible)
            .bind(section.sort_order)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_sections(&self, event_id: Uuid) -> StoreResult<Vec<EventSection>> {
        let sections = sqlx::query_as::<_, EventSection>(
            "SELECT * FROM event_sections WHERE event_id = $1 ORDER BY sort_order ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sections)
    }

    async fn update_section(&self, section: &EventSection) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE event_sections SET
                content = $1,
                is_visible = $2,
                sort_order = $3
             WHERE id = $4 AND event_id = $5"
        )
        .bind(&section.content)
        .bind(section.is_visible)
        .bind(section.sort_order)
        .bind(section.id)
        .bind(section.event_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("section {}", section.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl GuestStore for PgStore {
    async fn create(&self, guest: &Guest) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO guests (id, event_id, name, phone, message, rsvp_status, guest_code, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        )
        .bind(guest.id)
        .bind(guest.event_id)
        .bind(&guest.name)
        .bind(&guest.phone)
        .bind(&guest.message)
        .bind(guest.rsvp_status)
        .bind(&guest.guest_code)
        .bind(guest.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(guest)
    }

    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE event_id = $1 ORDER BY created_at DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(guests)
    }

    async fn update_status(&self, id: Uuid, status: RsvpStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE guests SET rsvp_status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("guest {}", id)));
        }
        Ok(())
    }

    async fn stats(&self, event_id: Uuid) -> StoreResult<EventStats> {
        let stats = sqlx::query_as::<_, EventStats>(
            r#"
            SELECT
                COUNT(*) AS total_rsvp,
                COUNT(*) FILTER (WHERE rsvp_status = 'yes') AS total_attending,
                COUNT(*) FILTER (WHERE rsvp_status = 'no') AS total_declined,
                COUNT(*) FILTER (WHERE rsvp_status = 'pending') AS total_pending,
                COUNT(*) FILTER (WHERE message IS NOT NULL AND message <> '') AS total_messages
            FROM guests
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

#[async_trait]
impl MediaStore for PgStore {
    async fn create(&self, media: &Media) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO media (id, event_id, file_url, media_type, created_at)
             VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(media.id)
        .bind(media.event_id)
        .bind(&media.file_url)
        .bind(media.media_type)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Media>> {
        let media = sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(media)
    }

    async fn find_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Media>> {
        let media = sqlx::query_as::<_, Media>(
            "SELECT * FROM media WHERE event_id = $1 ORDER BY created_at DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(media)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateCatalog for PgStore {
    async fn find_all(&self, category: Option<&str>) -> StoreResult<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(
            "SELECT * FROM templates
             WHERE is_active = true AND ($1::text IS NULL OR category = $1)
             ORDER BY created_at DESC"
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Template>> {
        let template = sqlx::query_as::<_, Template>("SELECT * FROM templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(template)
    }

    async fn find_sections(&self, template_id: Uuid) -> StoreResult<Vec<TemplateSection>> {
        let sections = sqlx::query_as::<_, TemplateSection>(
            "SELECT * FROM template_sections WHERE template_id = $1 ORDER BY sort_order ASC"
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sections)
    }
}
