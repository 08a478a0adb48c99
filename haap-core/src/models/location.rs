use std::fmt;

use serde::{Deserialize, Serialize};

/// One level of the administrative hierarchy, root first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Municipality,
    AdministrativePost,
    Suco,
    Aldeia,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Municipality,
        Level::AdministrativePost,
        Level::Suco,
        Level::Aldeia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Municipality => "municipality",
            Self::AdministrativePost => "administrative_post",
            Self::Suco => "suco",
            Self::Aldeia => "aldeia",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "municipality" => Some(Self::Municipality),
            "administrative_post" => Some(Self::AdministrativePost),
            "suco" => Some(Self::Suco),
            "aldeia" => Some(Self::Aldeia),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Level> {
        match self {
            Self::Municipality => None,
            Self::AdministrativePost => Some(Self::Municipality),
            Self::Suco => Some(Self::AdministrativePost),
            Self::Aldeia => Some(Self::Suco),
        }
    }

    pub fn child(&self) -> Option<Level> {
        match self {
            Self::Municipality => Some(Self::AdministrativePost),
            Self::AdministrativePost => Some(Self::Suco),
            Self::Suco => Some(Self::Aldeia),
            Self::Aldeia => None,
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Municipality => "municipalities",
            Self::AdministrativePost => "administrative_posts",
            Self::Suco => "sucos",
            Self::Aldeia => "aldeias",
        }
    }

    /// Column holding the parent's id in this level's table.
    pub(crate) fn parent_column(&self) -> Option<&'static str> {
        self.parent().map(|p| p.user_column())
    }

    /// Column referencing this level from `users` (and from the child table).
    pub(crate) fn user_column(&self) -> &'static str {
        match self {
            Self::Municipality => "municipality_id",
            Self::AdministrativePost => "administrative_post_id",
            Self::Suco => "suco_id",
            Self::Aldeia => "aldeia_id",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationNode {
    pub id: i64,
    pub level: Level,
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationInput {
    pub level: Level,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Raw, untrusted selector values as submitted by a form or query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionInput {
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub administrative_post: Option<String>,
    #[serde(default)]
    pub suco: Option<String>,
    #[serde(default)]
    pub aldeia: Option<String>,
}

impl SelectionInput {
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Municipality => self.municipality.as_deref(),
            Level::AdministrativePost => self.administrative_post.as_deref(),
            Level::Suco => self.suco.as_deref(),
            Level::Aldeia => self.aldeia.as_deref(),
        }
        .filter(|v| !v.trim().is_empty())
    }

    pub fn from_ids(
        municipality: Option<i64>,
        administrative_post: Option<i64>,
        suco: Option<i64>,
        aldeia: Option<i64>,
    ) -> Self {
        Self {
            municipality: municipality.map(|id| id.to_string()),
            administrative_post: administrative_post.map(|id| id.to_string()),
            suco: suco.map(|id| id.to_string()),
            aldeia: aldeia.map(|id| id.to_string()),
        }
    }
}

/// Validated ids, one per level; a deeper level is only set when every
/// level above it is set and is its ancestor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationSelection {
    pub municipality: Option<i64>,
    pub administrative_post: Option<i64>,
    pub suco: Option<i64>,
    pub aldeia: Option<i64>,
}

impl LocationSelection {
    pub fn get(&self, level: Level) -> Option<i64> {
        match level {
            Level::Municipality => self.municipality,
            Level::AdministrativePost => self.administrative_post,
            Level::Suco => self.suco,
            Level::Aldeia => self.aldeia,
        }
    }

    pub(crate) fn set(&mut self, level: Level, id: Option<i64>) {
        match level {
            Level::Municipality => self.municipality = id,
            Level::AdministrativePost => self.administrative_post = id,
            Level::Suco => self.suco = id,
            Level::Aldeia => self.aldeia = id,
        }
    }
}

/// A fully selected municipality → aldeia path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationPath {
    pub municipality: i64,
    pub administrative_post: i64,
    pub suco: i64,
    pub aldeia: i64,
}

impl From<LocationPath> for LocationSelection {
    fn from(path: LocationPath) -> Self {
        Self {
            municipality: Some(path.municipality),
            administrative_post: Some(path.administrative_post),
            suco: Some(path.suco),
            aldeia: Some(path.aldeia),
        }
    }
}

/// Candidate sets for each dropdown plus the resolved selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CascadeOptions {
    pub municipalities: Vec<LocationNode>,
    pub administrative_posts: Vec<LocationNode>,
    pub sucos: Vec<LocationNode>,
    pub aldeias: Vec<LocationNode>,
    pub selection: LocationSelection,
    /// Levels whose submitted value is not a valid choice and must be cleared.
    pub invalidated: Vec<Level>,
}

impl CascadeOptions {
    pub fn candidates(&self, level: Level) -> &[LocationNode] {
        match level {
            Level::Municipality => &self.municipalities,
            Level::AdministrativePost => &self.administrative_posts,
            Level::Suco => &self.sucos,
            Level::Aldeia => &self.aldeias,
        }
    }

    pub(crate) fn candidates_mut(&mut self, level: Level) -> &mut Vec<LocationNode> {
        match level {
            Level::Municipality => &mut self.municipalities,
            Level::AdministrativePost => &mut self.administrative_posts,
            Level::Suco => &mut self.sucos,
            Level::Aldeia => &mut self.aldeias,
        }
    }
}
