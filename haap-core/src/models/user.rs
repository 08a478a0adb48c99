use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::{Level, LocationSelection, SelectionInput};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    MoeAdmin,
    MunicipalityAnalyst,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::MoeAdmin => "moe_admin",
            Self::MunicipalityAnalyst => "municipality_analyst",
            Self::Teacher => "teacher",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "parent" => Some(Self::Parent),
            "moe_admin" => Some(Self::MoeAdmin),
            "municipality_analyst" => Some(Self::MunicipalityAnalyst),
            "teacher" => Some(Self::Teacher),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Parent => "Parent/Carer",
            Self::MoeAdmin => "MoE Admin",
            Self::MunicipalityAnalyst => "Municipality Analyst",
            Self::Teacher => "Teacher",
        }
    }

    /// Where a freshly logged-in user of this role lands.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::MoeAdmin => "/dashboard/moe-admin",
            Self::Parent => "/children",
            Self::MunicipalityAnalyst => "/dashboard/municipality",
            Self::Teacher => "/dashboard/teacher",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Self::MunicipalityAnalyst | Self::Teacher)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub whatsapp_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub municipality_id: Option<i64>,
    pub administrative_post_id: Option<i64>,
    pub suco_id: Option<i64>,
    pub aldeia_id: Option<i64>,
    pub is_verified: bool,
    pub is_active: bool,
    pub password_reset_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn location(&self) -> LocationSelection {
        LocationSelection {
            municipality: self.municipality_id,
            administrative_post: self.administrative_post_id,
            suco: self.suco_id,
            aldeia: self.aldeia_id,
        }
    }

    pub fn location_id(&self, level: Level) -> Option<i64> {
        self.location().get(level)
    }
}

/// The acting user, passed explicitly into every role-sensitive operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub municipality_id: Option<i64>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            municipality_id: user.municipality_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterParentInput {
    pub first_name: String,
    pub last_name: String,
    pub whatsapp_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(flatten)]
    pub location: SelectionInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterStaffInput {
    pub first_name: String,
    pub last_name: String,
    pub whatsapp_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub location: SelectionInput,
}

/// Admin-driven registration of any non-admin role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserInput {
    pub first_name: String,
    pub last_name: String,
    pub whatsapp_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub role: Role,
    /// The credential was set out of band; no reset link is needed.
    #[serde(default)]
    pub password_set: bool,
    #[serde(flatten)]
    pub location: SelectionInput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    pub parents: Vec<User>,
    pub teachers: Vec<User>,
    pub analysts: Vec<User>,
    pub admins: Vec<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentQuery {
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}
