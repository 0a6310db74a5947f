//! Проверка владения событием.
//!
//! Единственный предикат авторизации: событие принадлежит тому, чей id
//! записан в `user_id`. Отсутствие события и чужое событие - разные ошибки,
//! а как их показывать клиенту, решает вызывающий код.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::Event;
use crate::store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

pub fn authorize(actor_id: Uuid, event: &Event) -> Access {
    if event.user_id == actor_id {
        Access::Allowed
    } else {
        Access::Denied
    }
}

pub fn ensure_owner(actor_id: Uuid, event: &Event) -> CoreResult<()> {
    match authorize(actor_id, event) {
        Access::Allowed => Ok(()),
        Access::Denied => Err(CoreError::Forbidden),
    }
}

/// Загружает событие и проверяет владельца: `NotFound`, если события нет,
/// `Forbidden`, если оно чужое.
pub async fn load_owned(
    events: &dyn EventStore,
    actor_id: Uuid,
    event_id: Uuid,
) -> CoreResult<Event> {
    let event = events
        .find_by_id(event_id)
        .await?
        .ok_or(CoreError::NotFound("event"))?;
    ensure_owner(actor_id, &event)?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use chrono::Utc;

    fn owned_by(user_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            user_id,
            template_id: Uuid::new_v4(),
            title: "Birthday".to_string(),
            slug: format!("birthday-{}", &Uuid::new_v4().simple().to_string()[..6]),
            event_date: now,
            location_name: None,
            location_address: None,
            is_published: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_is_allowed_and_others_denied() {
        let owner = Uuid::new_v4();
        let event = owned_by(owner);

        assert_eq!(authorize(owner, &event), Access::Allowed);
        assert_eq!(authorize(Uuid::new_v4(), &event), Access::Denied);
    }

    #[tokio::test]
    async fn missing_and_foreign_events_are_different_errors() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let event = owned_by(owner);
        EventStore::create(&store, &event).await.unwrap();

        let missing = load_owned(&store, owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, CoreError::NotFound("event")));

        let foreign = load_owned(&store, Uuid::new_v4(), event.id).await.unwrap_err();
        assert!(matches!(foreign, CoreError::Forbidden));

        let loaded = load_owned(&store, owner, event.id).await.unwrap();
        assert_eq!(loaded.id, event.id);
    }
}
