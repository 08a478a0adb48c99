use chrono::NaiveDate;
use rusqlite::{params, Row};
use tracing::info;
use uuid::Uuid;

use super::children::get_child;
use super::{count, enum_col, uuid_col, Database};
use crate::error::{HaapError, Result};
use crate::models::{
    clamp_page, ActivityType, Actor, AgeGroup, AppUsageLog, CreateUsageLogInput, Page, Role,
    UsageLogQuery, PAGE_SIZE,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl AppUsageLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let raw_date: String = row.get("date_accessed")?;
        let date_accessed = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Self {
            id: uuid_col(row, "id")?,
            child_id: uuid_col(row, "child_id")?,
            theme: row.get("theme")?,
            activity_type: enum_col(row, "activity_type", ActivityType::from_str)?,
            group: enum_col(row, "group_code", AgeGroup::from_str)?,
            is_assessed: row.get("is_assessed")?,
            was_successful: row.get("was_successful")?,
            date_accessed,
            duration_seconds: row.get("duration_seconds")?,
        })
    }
}

/// Parents see their own children's logs, analysts and teachers their
/// municipality's, admins everything.
fn scope(actor: &Actor) -> (Option<String>, Option<i64>) {
    match actor.role {
        Role::Parent => (Some(actor.user_id.to_string()), None),
        Role::MunicipalityAnalyst | Role::Teacher => (None, actor.municipality_id),
        Role::MoeAdmin => (None, None),
    }
}

fn empty_page() -> Page<AppUsageLog> {
    Page {
        items: Vec::new(),
        page: 1,
        per_page: PAGE_SIZE,
        total: 0,
        num_pages: 1,
    }
}

impl Database {
    /// Record one activity. The group is the child's age group at write time.
    pub fn record_usage(&self, input: CreateUsageLogInput) -> Result<AppUsageLog> {
        let theme = input.theme.trim().to_string();
        if theme.is_empty() {
            return Err(HaapError::validation("theme", "This field is required."));
        }

        self.with_connection(|conn| {
            let child = get_child(conn, input.child_id)?
                .ok_or_else(|| HaapError::not_found("child", input.child_id))?;

            let log = AppUsageLog {
                id: Uuid::new_v4(),
                child_id: child.id,
                theme,
                activity_type: input.activity_type,
                group: child.age_group,
                is_assessed: input.is_assessed,
                was_successful: input.was_successful,
                date_accessed: input.date_accessed,
                duration_seconds: input.duration_seconds,
            };

            conn.execute(
                "INSERT INTO app_usage_logs (id, child_id, theme, activity_type, group_code,
                                             is_assessed, was_successful, date_accessed, duration_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    log.id.to_string(),
                    log.child_id.to_string(),
                    log.theme,
                    log.activity_type.as_str(),
                    log.group.as_str(),
                    log.is_assessed,
                    log.was_successful,
                    log.date_accessed.format(DATE_FORMAT).to_string(),
                    log.duration_seconds,
                ],
            )?;

            info!("Logged {} activity for child {}", log.activity_type.as_str(), log.child_id);
            Ok(log)
        })
    }

    /// Usage logs visible to `actor`, most recent first.
    pub fn list_usage_logs(&self, actor: &Actor, query: &UsageLogQuery) -> Result<Page<AppUsageLog>> {
        let activity = match query.activity.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(raw) => match ActivityType::from_str(raw) {
                Some(activity) => Some(activity.as_str()),
                None => return Ok(empty_page()),
            },
            None => None,
        };
        if matches!(actor.role, Role::MunicipalityAnalyst | Role::Teacher) && actor.municipality_id.is_none() {
            return Ok(empty_page());
        }

        let (parent_id, municipality_id) = scope(actor);
        let base = "FROM app_usage_logs l
             JOIN children c ON c.id = l.child_id
             JOIN users u ON u.id = c.parent_id
             WHERE (?1 IS NULL OR c.parent_id = ?1)
               AND (?2 IS NULL OR u.municipality_id = ?2)
               AND (?3 IS NULL OR l.activity_type = ?3)";

        self.with_connection(|conn| {
            let total = count(conn, &format!("SELECT COUNT(*) {}", base), params![parent_id, municipality_id, activity])?;
            let (page, num_pages) = clamp_page(query.page, total, PAGE_SIZE);

            let sql = format!(
                "SELECT l.* {} ORDER BY l.date_accessed DESC, l.rowid DESC LIMIT ?4 OFFSET ?5",
                base
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![parent_id, municipality_id, activity, PAGE_SIZE, (page - 1) * PAGE_SIZE],
                AppUsageLog::from_row,
            )?;

            Ok(Page {
                items: rows.collect::<rusqlite::Result<Vec<_>>>()?,
                page,
                per_page: PAGE_SIZE,
                total,
                num_pages,
            })
        })
    }
}
