use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TemplateSection {
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub section_type: String,
    /// `None`, если шаблон не задаёт содержимое по умолчанию
    pub default_content: Option<Value>,
    pub sort_order: i32,
}
