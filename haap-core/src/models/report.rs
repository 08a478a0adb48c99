use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::child::AgeGroup;
use super::location::{CascadeOptions, Level, LocationNode};
use super::user::User;
use super::Child;

pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub num_pages: u32,
}

/// Clamps a requested 1-based page into `1..=num_pages`; an empty result
/// set still has one (empty) page.
pub fn clamp_page(requested: Option<u32>, total: u64, per_page: u32) -> (u32, u32) {
    let num_pages = (total.div_ceil(per_page as u64)).max(1) as u32;
    let page = requested.unwrap_or(1).clamp(1, num_pages);
    (page, num_pages)
}

/// One grouped count in the children report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupCount {
    pub level: Level,
    pub id: i64,
    pub name: String,
    /// Ancestor names, municipality first.
    pub ancestors: Vec<String>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildReportRow {
    pub id: Uuid,
    pub first_name: String,
    pub code: String,
    pub year_of_birth: i32,
    pub age_group: AgeGroup,
    pub parent_name: String,
    pub municipality: Option<String>,
    pub administrative_post: Option<String>,
    pub suco: Option<String>,
    pub aldeia: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildrenReport {
    pub children: Vec<ChildReportRow>,
    pub by_municipality: Vec<GroupCount>,
    pub by_administrative_post: Vec<GroupCount>,
    pub by_suco: Vec<GroupCount>,
    pub by_aldeia: Vec<GroupCount>,
    pub options: CascadeOptions,
}

impl ChildrenReport {
    pub fn grouped(&self, level: Level) -> &[GroupCount] {
        match level {
            Level::Municipality => &self.by_municipality,
            Level::AdministrativePost => &self.by_administrative_post,
            Level::Suco => &self.by_suco,
            Level::Aldeia => &self.by_aldeia,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dashboard {
    MoeAdmin {
        all_users: u64,
        parents: u64,
        municipality_analysts: u64,
        children: u64,
    },
    Municipality {
        municipality: Option<LocationNode>,
        children_count: u64,
        parents_count: u64,
        teachers_count: u64,
        children: Vec<Child>,
        parents: Vec<User>,
        teachers: Vec<User>,
    },
    Teacher {
        municipality: Option<LocationNode>,
        children_count: u64,
        parents_count: u64,
        children: Vec<Child>,
        parents: Vec<User>,
    },
    Parent {
        children: Vec<Child>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentExportRow {
    pub name: String,
    pub whatsapp: String,
    pub email: String,
    pub municipality: String,
}

/// Table data handed to the document renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentExport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub filename: String,
    pub header: Vec<String>,
    pub rows: Vec<ParentExportRow>,
}
