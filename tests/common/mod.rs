#![allow(dead_code)]

use chrono::{Duration, Utc};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use invitation_service::config::Config;
use invitation_service::models::{NewEvent, NewGuest, RsvpStatus, Template, TemplateSection};
use invitation_service::storage::LocalBlobStore;
use invitation_service::store::{memory::InMemoryStore, Stores};
use invitation_service::AppState;

pub struct Harness {
    pub store: InMemoryStore,
    pub state: Arc<AppState>,
    pub upload_dir: PathBuf,
}

/// Состояние приложения поверх хранилища в памяти, slug детерминирован.
pub async fn harness() -> Harness {
    let upload_dir = std::env::temp_dir().join(format!("invitation-test-{}", Uuid::new_v4()));
    let vars: HashMap<&str, String> = HashMap::from([
        ("STORE_BACKEND", "memory".to_string()),
        ("JWT_SECRET", "test-secret".to_string()),
        ("SLUG_SEED", "42".to_string()),
        ("STORAGE_BASE_PATH", upload_dir.display().to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("test config");

    let store = InMemoryStore::new();
    let blobs = LocalBlobStore::new(&upload_dir, "/uploads");
    let state = AppState::new(config, Stores::in_memory(store.clone()), Arc::new(blobs));

    Harness { store, state, upload_dir }
}

/// Активный шаблон с секциями в заданном порядке сортировки.
pub async fn seed_template(store: &InMemoryStore, sort_orders: &[i32]) -> Uuid {
    let template_id = Uuid::new_v4();
    let template = Template {
        id: template_id,
        name: "Classic wedding".to_string(),
        category: "wedding".to_string(),
        thumbnail_url: None,
        is_active: true,
        created_at: Utc::now(),
    };
    let sections = sort_orders
        .iter()
        .map(|&order| TemplateSection {
            id: Uuid::new_v4(),
            template_id,
            name: format!("Section {}", order),
            section_type: "text".to_string(),
            default_content: Some(json!({ "text": format!("section {}", order) })),
            sort_order: order,
        })
        .collect();
    store.insert_template(template, sections).await;
    template_id
}

pub fn new_event(template_id: Uuid, title: &str) -> NewEvent {
    NewEvent {
        template_id,
        title: title.to_string(),
        event_date: (Utc::now() + Duration::days(30)).to_rfc3339(),
        location_name: Some("Grand Hall".to_string()),
        location_address: Some("1 Main Street".to_string()),
    }
}

pub fn guest(status: RsvpStatus, message: Option<&str>) -> NewGuest {
    NewGuest {
        name: Name().fake(),
        phone: None,
        message: message.map(str::to_string),
        status,
        guest_code: None,
    }
}
