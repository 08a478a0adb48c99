//! Children report, role dashboards and the parent export.
//!
//! Children carry no location of their own; every figure here is credited
//! through the parent's location columns. A child whose parent has no
//! reference at some level does not appear in that level's grouping.

use chrono::Local;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::cascade::{cascade, parse_id};
use super::children::children_of_parent;
use super::locations::get_node;
use super::users::{query_users, require_not_parent, users_with_role};
use super::{count, enum_col, now, uuid_col, Database};
use crate::error::{HaapError, Result};
use crate::models::{
    Actor, AgeGroup, Child, ChildReportRow, ChildrenReport, Dashboard, GroupCount, Level,
    LocationNode, LocationSelection, ParentExport, ParentExportRow, Role, SelectionInput,
};

const LOCATION_FILTER: &str = "(?1 IS NULL OR u.municipality_id = ?1)
       AND (?2 IS NULL OR u.administrative_post_id = ?2)
       AND (?3 IS NULL OR u.suco_id = ?3)
       AND (?4 IS NULL OR u.aldeia_id = ?4)";

/// Each filter value stands on its own; malformed ids are dropped.
fn report_filter(input: &SelectionInput) -> LocationSelection {
    LocationSelection {
        municipality: input.get(Level::Municipality).and_then(parse_id),
        administrative_post: input.get(Level::AdministrativePost).and_then(parse_id),
        suco: input.get(Level::Suco).and_then(parse_id),
        aldeia: input.get(Level::Aldeia).and_then(parse_id),
    }
}

impl ChildReportRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let parent_first: String = row.get("parent_first_name")?;
        let parent_last: String = row.get("parent_last_name")?;
        Ok(Self {
            id: uuid_col(row, "id")?,
            first_name: row.get("first_name")?,
            code: row.get("code")?,
            year_of_birth: row.get("year_of_birth")?,
            age_group: enum_col(row, "age_group", AgeGroup::from_str)?,
            parent_name: format!("{} {}", parent_first, parent_last).trim().to_string(),
            municipality: row.get("municipality")?,
            administrative_post: row.get("administrative_post")?,
            suco: row.get("suco")?,
            aldeia: row.get("aldeia")?,
        })
    }
}

fn report_children(conn: &Connection, filter: &LocationSelection) -> Result<Vec<ChildReportRow>> {
    let sql = format!(
        "SELECT c.id, c.first_name, c.code, c.year_of_birth, c.age_group,
                u.first_name AS parent_first_name, u.last_name AS parent_last_name,
                m.name AS municipality, p.name AS administrative_post, s.name AS suco, a.name AS aldeia
         FROM children c
         JOIN users u ON u.id = c.parent_id
         LEFT JOIN municipalities m ON m.id = u.municipality_id
         LEFT JOIN administrative_posts p ON p.id = u.administrative_post_id
         LEFT JOIN sucos s ON s.id = u.suco_id
         LEFT JOIN aldeias a ON a.id = u.aldeia_id
         WHERE {}
         ORDER BY c.created_at DESC, c.rowid DESC",
        LOCATION_FILTER
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![filter.municipality, filter.administrative_post, filter.suco, filter.aldeia],
        ChildReportRow::from_row,
    )?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Children counted per node of `level`, ordered by parent name then name.
fn grouped_counts(conn: &Connection, level: Level, filter: &LocationSelection) -> Result<Vec<GroupCount>> {
    // n0 is the grouped node, n1 its parent, and so on up to the municipality.
    let mut joins = format!("JOIN {} n0 ON n0.id = u.{}", level.table(), level.user_column());
    let mut ancestor_columns = Vec::new();
    let mut current = level;
    let mut depth = 0;
    while let Some(parent) = current.parent() {
        joins.push_str(&format!(
            "\n         JOIN {} n{} ON n{}.id = n{}.{}",
            parent.table(),
            depth + 1,
            depth + 1,
            depth,
            parent.user_column()
        ));
        ancestor_columns.push(format!("n{}.name", depth + 1));
        current = parent;
        depth += 1;
    }
    ancestor_columns.reverse();

    let select_ancestors: String = ancestor_columns.iter().map(|c| format!(", {}", c)).collect();
    let order = if depth > 0 { "n1.name, n0.name, n0.id" } else { "n0.name, n0.id" };
    let sql = format!(
        "SELECT n0.id, n0.name, COUNT(c.id){}
         FROM children c
         JOIN users u ON u.id = c.parent_id
         {}
         WHERE {}
         GROUP BY n0.id
         ORDER BY {}",
        select_ancestors, joins, LOCATION_FILTER, order
    );
    debug!("Grouping children by {}: {}", level, sql);

    let ancestor_count = ancestor_columns.len();
    let mut stmt = conn.prepare(&sql)?;
    let args = params![filter.municipality, filter.administrative_post, filter.suco, filter.aldeia];
    let rows = stmt.query_map(args, |row| {
        let total: i64 = row.get(2)?;
        let ancestors = (0..ancestor_count)
            .map(|i| row.get::<_, String>(3 + i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(GroupCount {
            level,
            id: row.get(0)?,
            name: row.get(1)?,
            ancestors,
            total: total as u64,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn children_in_municipality(conn: &Connection, municipality_id: Option<i64>) -> Result<Vec<Child>> {
    let mut stmt = conn.prepare(
        "SELECT c.* FROM children c
         JOIN users u ON u.id = c.parent_id
         WHERE u.municipality_id = ?1
         ORDER BY c.created_at DESC, c.rowid DESC",
    )?;
    let rows = stmt.query_map(params![municipality_id], Child::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn municipality_node(conn: &Connection, actor: &Actor) -> Result<Option<LocationNode>> {
    match actor.municipality_id {
        Some(id) => get_node(conn, Level::Municipality, id),
        None => Ok(None),
    }
}

impl Database {
    /// Children matching the location filter, plus counts per hierarchy level.
    /// Analysts and teachers are held to their own municipality.
    pub fn children_report(&self, actor: &Actor, filter: &SelectionInput) -> Result<ChildrenReport> {
        let mut filter = filter.clone();
        match actor.role {
            Role::Parent => {
                return Err(HaapError::Permission("parents cannot view the children report".into()))
            }
            Role::MunicipalityAnalyst | Role::Teacher => {
                // No municipality assigned: an id that can never match.
                filter.municipality = Some(actor.municipality_id.unwrap_or(i64::MAX).to_string());
            }
            Role::MoeAdmin => {}
        }
        let selection = report_filter(&filter);

        self.with_connection(|conn| {
            Ok(ChildrenReport {
                children: report_children(conn, &selection)?,
                by_municipality: grouped_counts(conn, Level::Municipality, &selection)?,
                by_administrative_post: grouped_counts(conn, Level::AdministrativePost, &selection)?,
                by_suco: grouped_counts(conn, Level::Suco, &selection)?,
                by_aldeia: grouped_counts(conn, Level::Aldeia, &selection)?,
                options: cascade(conn, &filter)?,
            })
        })
    }

    /// Landing-page figures, chosen by the actor's role.
    pub fn dashboard(&self, actor: &Actor) -> Result<Dashboard> {
        self.with_connection(|conn| match actor.role {
            Role::MoeAdmin => Ok(Dashboard::MoeAdmin {
                all_users: count(conn, "SELECT COUNT(*) FROM users", [])?,
                parents: count(conn, "SELECT COUNT(*) FROM users WHERE role = 'parent'", [])?,
                municipality_analysts: count(
                    conn,
                    "SELECT COUNT(*) FROM users WHERE role = 'municipality_analyst'",
                    [],
                )?,
                children: count(conn, "SELECT COUNT(*) FROM children", [])?,
            }),
            Role::MunicipalityAnalyst => {
                let children = children_in_municipality(conn, actor.municipality_id)?;
                let parents = users_with_role(conn, Role::Parent, Some(actor.municipality_id))?;
                let teachers = users_with_role(conn, Role::Teacher, Some(actor.municipality_id))?;
                Ok(Dashboard::Municipality {
                    municipality: municipality_node(conn, actor)?,
                    children_count: children.len() as u64,
                    parents_count: parents.len() as u64,
                    teachers_count: teachers.len() as u64,
                    children,
                    parents,
                    teachers,
                })
            }
            Role::Teacher => {
                let children = children_in_municipality(conn, actor.municipality_id)?;
                let parents = users_with_role(conn, Role::Parent, Some(actor.municipality_id))?;
                Ok(Dashboard::Teacher {
                    municipality: municipality_node(conn, actor)?,
                    children_count: children.len() as u64,
                    parents_count: parents.len() as u64,
                    children,
                    parents,
                })
            }
            Role::Parent => Ok(Dashboard::Parent {
                children: children_of_parent(conn, actor.user_id)?,
            }),
        })
    }

    /// Table data for the parent list document. An unknown municipality id
    /// is an error; a malformed one means all municipalities.
    pub fn parents_export(&self, actor: &Actor, municipality: Option<&str>) -> Result<ParentExport> {
        require_not_parent(actor, "export parents")?;
        let municipality_id = municipality.and_then(parse_id);

        self.with_connection(|conn| {
            let title_name = match municipality_id {
                Some(id) => {
                    get_node(conn, Level::Municipality, id)?
                        .ok_or_else(|| HaapError::not_found(Level::Municipality.as_str(), id))?
                        .name
                }
                None => "All Municipalities".to_string(),
            };

            let parents = query_users(
                conn,
                "SELECT * FROM users WHERE role = 'parent' AND (?1 IS NULL OR municipality_id = ?1)
                 ORDER BY created_at DESC, rowid DESC",
                params![municipality_id],
            )?;

            let mut rows = Vec::with_capacity(parents.len());
            for parent in parents {
                let municipality = match parent.municipality_id {
                    Some(id) => get_node(conn, Level::Municipality, id)?.map(|n| n.name),
                    None => None,
                };
                rows.push(ParentExportRow {
                    name: parent.full_name(),
                    whatsapp: parent.whatsapp_number,
                    email: parent.email.unwrap_or_else(|| "-".to_string()),
                    municipality: municipality.unwrap_or_else(|| "-".to_string()),
                });
            }

            Ok(ParentExport {
                title: format!("Lista Parentes - {}", title_name),
                generated_at: now(),
                filename: format!(
                    "parents_list_{}_{}.pdf",
                    title_name.replace(' ', "_"),
                    Local::now().format("%d%m%Y")
                ),
                header: ["Naran", "WhatsApp", "Email", "Munisipiu"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                rows,
            })
        })
    }
}
