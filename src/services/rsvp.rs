//! Ответы гостей на приглашение.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::events::missing_as_not_found;
use super::ownership::load_owned;
use crate::error::{CoreError, CoreResult};
use crate::models::{Guest, NewGuest, RsvpStatus};
use crate::store::{EventStore, GuestStore};

#[derive(Clone)]
pub struct RsvpService {
    events: Arc<dyn EventStore>,
    guests: Arc<dyn GuestStore>,
}

impl RsvpService {
    pub fn new(events: Arc<dyn EventStore>, guests: Arc<dyn GuestStore>) -> Self {
        Self { events, guests }
    }

    /// Публичная отправка ответа. Дубликаты не отсекаются, код гостя не проверяется.
    pub async fn submit(&self, event_id: Uuid, input: NewGuest) -> CoreResult<Guest> {
        input.validate()?;

        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(CoreError::NotFound("event"))?;
        if !event.is_published {
            return Err(CoreError::InvalidState("event is not published".to_string()));
        }

        let guest = Guest {
            id: Uuid::new_v4(),
            event_id,
            name: input.name,
            phone: input.phone,
            message: input.message,
            rsvp_status: input.status,
            guest_code: input.guest_code,
            created_at: Utc::now(),
        };
        self.guests.create(&guest).await?;

        info!(%event_id, guest_id = %guest.id, status = ?guest.rsvp_status, "RSVP received");
        Ok(guest)
    }

    /// Только для владельца, новые ответы первыми.
    pub async fn list_guests(&self, actor_id: Uuid, event_id: Uuid) -> CoreResult<Vec<Guest>> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;
        Ok(self.guests.find_by_event(event_id).await?)
    }

    pub async fn update_guest_status(
        &self,
        actor_id: Uuid,
        event_id: Uuid,
        guest_id: Uuid,
        status: RsvpStatus,
    ) -> CoreResult<Guest> {
        load_owned(self.events.as_ref(), actor_id, event_id).await?;

        let mut guest = self
            .guests
            .find_by_id(guest_id)
            .await?
            .filter(|g| g.event_id == event_id)
            .ok_or(CoreError::NotFound("guest"))?;

        self.guests
            .update_status(guest.id, status)
            .await
            .map_err(missing_as_not_found("guest"))?;
        guest.rsvp_status = status;
        Ok(guest)
    }
}
