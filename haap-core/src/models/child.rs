use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HaapError, Result};

pub const MIN_AGE: i32 = 3;
pub const MAX_AGE: i32 = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    /// 3-4 years
    A,
    /// 5-6 years
    B,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }

    pub fn for_age(age: i32) -> Option<Self> {
        match age {
            3 | 4 => Some(Self::A),
            5 | 6 => Some(Self::B),
            _ => None,
        }
    }

    /// Derives the group for a child born in `year_of_birth`, as of `current_year`.
    pub fn for_birth_year(year_of_birth: i32, current_year: i32) -> Result<Self> {
        current_year
            .checked_sub(year_of_birth)
            .and_then(Self::for_age)
            .ok_or_else(|| {
                HaapError::validation(
                    "year_of_birth",
                    format!("Child must be between {}-{} years old.", MIN_AGE, MAX_AGE),
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Child {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub first_name: String,
    pub year_of_birth: i32,
    pub age_group: AgeGroup,
    /// Display/login code, assigned once at creation.
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChildInput {
    pub first_name: String,
    pub year_of_birth: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChildInput {
    pub first_name: Option<String>,
    pub year_of_birth: Option<i32>,
}

/// `MAR-1F3A9C` style code: three letters of the first name plus a random suffix.
pub fn generate_child_code(first_name: &str) -> String {
    let prefix: String = first_name
        .trim()
        .chars()
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("{}-{}", prefix, suffix)
}
