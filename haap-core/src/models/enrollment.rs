use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Whatsapp,
    Portal,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Portal => "portal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "whatsapp" => Some(Self::Whatsapp),
            "portal" => Some(Self::Portal),
            _ => None,
        }
    }
}

/// A parent's request to be contacted about preschool enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentOptIn {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub contact_method: ContactMethod,
    pub created_at: DateTime<Utc>,
}
