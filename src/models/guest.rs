use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "rsvp_status", rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub rsvp_status: RsvpStatus,
    /// Код приглашения сохраняется как есть, без проверки
    pub guest_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGuest {
    #[validate(length(min = 2, max = 150))]
    pub name: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub status: RsvpStatus,
    pub guest_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(RsvpStatus::Yes).unwrap(), json!("yes"));
        let parsed: RsvpStatus = serde_json::from_value(json!("pending")).unwrap();
        assert_eq!(parsed, RsvpStatus::Pending);
        assert!(serde_json::from_value::<RsvpStatus>(json!("maybe")).is_err());
    }

    #[test]
    fn short_names_fail_validation() {
        let guest = NewGuest {
            name: "A".to_string(),
            phone: None,
            message: None,
            status: RsvpStatus::Yes,
            guest_code: None,
        };
        assert!(guest.validate().is_err());
    }
}
