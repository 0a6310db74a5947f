use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::guest::{Guest, RsvpStatus};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub title: String,
    pub slug: String,
    pub event_date: DateTime<Utc>,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub is_published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EventTheme {
    pub id: Uuid,
    pub event_id: Uuid,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub font_family: Option<String>,
    pub background_url: Option<String>,
    pub custom_css: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EventSection {
    pub id: Uuid,
    pub event_id: Uuid,
    pub template_section_id: Uuid,
    pub content: Value,
    pub is_visible: bool,
    pub sort_order: i32,
}

/// Счётчики ответов гостей. Не хранится, считается на каждый запрос.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EventStats {
    pub total_rsvp: i64,
    pub total_attending: i64,
    pub total_declined: i64,
    pub total_pending: i64,
    pub total_messages: i64,
}

impl EventStats {
    pub fn tally<'a>(guests: impl IntoIterator<Item = &'a Guest>) -> Self {
        guests.into_iter().fold(Self::default(), |mut stats, guest| {
            stats.total_rsvp += 1;
            match guest.rsvp_status {
                RsvpStatus::Yes => stats.total_attending += 1,
                RsvpStatus::No => stats.total_declined += 1,
                RsvpStatus::Pending => stats.total_pending += 1,
            }
            if guest.message.as_deref().is_some_and(|m| !m.is_empty()) {
                stats.total_messages += 1;
            }
            stats
        })
    }
}

// === Входные данные ===

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    pub template_id: Uuid,
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    /// RFC 3339, разбирается в сервисе
    pub event_date: String,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
}

/// Частичное обновление события: отсутствующие поля не трогаются,
/// явный `null` в полях локации очищает значение.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventPatch {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "super::present")]
    pub location_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::present")]
    pub location_address: Option<Option<String>>,
}

/// Тема всегда заменяется целиком.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeInput {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub font_family: Option<String>,
    pub background_url: Option<String>,
    pub custom_css: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPatch {
    #[serde(default, deserialize_with = "super::present")]
    pub content: Option<Option<Value>>,
    pub is_visible: Option<bool>,
    pub sort_order: Option<i32>,
}
