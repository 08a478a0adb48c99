use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::child::AgeGroup;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Numero,
    Lian,
    Arte,
    Motri,
    Sosyal,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numero => "Numero",
            Self::Lian => "Lian",
            Self::Arte => "Arte",
            Self::Motri => "Motri",
            Self::Sosyal => "Sosyal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Numero" => Some(Self::Numero),
            "Lian" => Some(Self::Lian),
            "Arte" => Some(Self::Arte),
            "Motri" => Some(Self::Motri),
            "Sosyal" => Some(Self::Sosyal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUsageLog {
    pub id: Uuid,
    pub child_id: Uuid,
    pub theme: String,
    pub activity_type: ActivityType,
    /// Age group of the child when the activity was logged.
    pub group: AgeGroup,
    pub is_assessed: bool,
    pub was_successful: bool,
    pub date_accessed: NaiveDate,
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUsageLogInput {
    pub child_id: Uuid,
    pub theme: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub is_assessed: bool,
    #[serde(default)]
    pub was_successful: bool,
    pub date_accessed: NaiveDate,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageLogQuery {
    /// Activity name; an unknown one matches nothing.
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}
