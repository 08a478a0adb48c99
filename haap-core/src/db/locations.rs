//! Municipality → administrative post → suco → aldeia tree.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::Database;
use crate::error::{is_unique_violation, HaapError, Result};
use crate::models::{Level, LocationNode};

const MAX_NAME_LEN: usize = 100;

impl LocationNode {
    pub(crate) fn from_row(level: Level, row: &Row) -> rusqlite::Result<Self> {
        let parent_id = match level.parent_column() {
            Some(col) => Some(row.get(col)?),
            None => None,
        };
        Ok(Self {
            id: row.get("id")?,
            level,
            name: row.get("name")?,
            parent_id,
        })
    }
}

pub(crate) fn get_node(conn: &Connection, level: Level, id: i64) -> Result<Option<LocationNode>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?1", level.table());
    let node = conn
        .query_row(&sql, params![id], |row| LocationNode::from_row(level, row))
        .optional()?;
    Ok(node)
}

pub(crate) fn list_children(
    conn: &Connection,
    level: Level,
    parent_id: Option<i64>,
) -> Result<Vec<LocationNode>> {
    let nodes = match (level.parent_column(), parent_id) {
        (None, _) => {
            let sql = format!("SELECT * FROM {} ORDER BY name, id", level.table());
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| LocationNode::from_row(level, row))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        (Some(_), None) => Vec::new(),
        (Some(col), Some(parent_id)) => {
            let sql = format!(
                "SELECT * FROM {} WHERE {} = ?1 ORDER BY name, id",
                level.table(),
                col
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![parent_id], |row| LocationNode::from_row(level, row))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(nodes)
}

/// Names of `node` and every ancestor, municipality first.
pub(crate) fn path_names(conn: &Connection, node: &LocationNode) -> Result<Vec<String>> {
    let mut names = vec![node.name.clone()];
    let mut current = (node.level.parent(), node.parent_id);
    while let (Some(level), Some(id)) = current {
        match get_node(conn, level, id)? {
            Some(parent) => {
                names.push(parent.name);
                current = (level.parent(), parent.parent_id);
            }
            None => break,
        }
    }
    names.reverse();
    Ok(names)
}

impl Database {
    /// Create a node at `level`. Municipalities take no parent; every other
    /// level requires an existing parent at the level above.
    pub fn create_node(&self, level: Level, name: &str, parent_id: Option<i64>) -> Result<LocationNode> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HaapError::validation("name", "This field is required."));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(HaapError::validation(
                "name",
                format!("Ensure this value has at most {} characters.", MAX_NAME_LEN),
            ));
        }

        self.with_connection(|conn| {
            let inserted = match (level.parent(), parent_id) {
                (None, None) => {
                    let sql = format!("INSERT INTO {} (name) VALUES (?1)", level.table());
                    conn.execute(&sql, params![name])
                }
                (None, Some(_)) => {
                    return Err(HaapError::validation(
                        "parent_id",
                        "A municipality has no parent.",
                    ))
                }
                (Some(parent_level), None) => {
                    return Err(HaapError::validation(parent_level.as_str(), "This field is required."))
                }
                (Some(parent_level), Some(pid)) => {
                    if get_node(conn, parent_level, pid)?.is_none() {
                        return Err(HaapError::not_found(parent_level.as_str(), pid));
                    }
                    let sql = format!(
                        "INSERT INTO {} ({}, name) VALUES (?1, ?2)",
                        level.table(),
                        parent_level.user_column()
                    );
                    conn.execute(&sql, params![pid, name])
                }
            };

            inserted.map_err(|e| {
                if is_unique_violation(&e) {
                    HaapError::DuplicateName {
                        level,
                        name: name.to_string(),
                    }
                } else {
                    HaapError::Storage(e)
                }
            })?;

            let node = LocationNode {
                id: conn.last_insert_rowid(),
                level,
                name: name.to_string(),
                parent_id,
            };
            info!("Created {} '{}' ({})", level, node.name, node.id);
            Ok(node)
        })
    }

    /// Delete a node and, through the store's cascade rules, its whole subtree.
    /// Users pointing at any removed node keep existing with the reference cleared.
    pub fn delete_node(&self, level: Level, id: i64) -> Result<bool> {
        self.with_connection(|conn| {
            let sql = format!("DELETE FROM {} WHERE id = ?1", level.table());
            let deleted = conn.execute(&sql, params![id])?;
            if deleted > 0 {
                info!("Deleted {} {} and its descendants", level, id);
            }
            Ok(deleted > 0)
        })
    }

    pub fn get_node(&self, level: Level, id: i64) -> Result<Option<LocationNode>> {
        self.with_connection(|conn| get_node(conn, level, id))
    }

    /// Nodes at `level` under `parent_id`, ordered by name. Municipalities
    /// ignore the parent; other levels return nothing for an absent or
    /// unknown parent.
    pub fn list_children(&self, level: Level, parent_id: Option<i64>) -> Result<Vec<LocationNode>> {
        debug!("Listing {} under {:?}", level, parent_id);
        self.with_connection(|conn| list_children(conn, level, parent_id))
    }

    pub fn list_municipalities(&self) -> Result<Vec<LocationNode>> {
        self.list_children(Level::Municipality, None)
    }

    pub fn location_path_names(&self, level: Level, id: i64) -> Result<Option<Vec<String>>> {
        self.with_connection(|conn| match get_node(conn, level, id)? {
            Some(node) => Ok(Some(path_names(conn, &node)?)),
            None => Ok(None),
        })
    }
}
