use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use super::users::get_user;
use super::{current_year, datetime_col, enum_col, now, timestamp, uuid_col, Database};
use crate::error::{HaapError, Result};
use crate::models::{
    generate_child_code, Actor, AgeGroup, Child, CreateChildInput, Role, UpdateChildInput,
};

const MAX_NAME_LEN: usize = 50;

impl Child {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: uuid_col(row, "id")?,
            parent_id: uuid_col(row, "parent_id")?,
            first_name: row.get("first_name")?,
            year_of_birth: row.get("year_of_birth")?,
            age_group: enum_col(row, "age_group", AgeGroup::from_str)?,
            code: row.get("code")?,
            created_at: datetime_col(row, "created_at")?,
            updated_at: datetime_col(row, "updated_at")?,
        })
    }
}

fn first_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(HaapError::validation("first_name", "This field is required."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(HaapError::validation(
            "first_name",
            format!("Ensure this value has at most {} characters.", MAX_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

pub(crate) fn get_child(conn: &Connection, id: Uuid) -> Result<Option<Child>> {
    let child = conn
        .query_row("SELECT * FROM children WHERE id = ?1", params![id.to_string()], Child::from_row)
        .optional()?;
    Ok(child)
}

pub(crate) fn children_of_parent(conn: &Connection, parent_id: Uuid) -> Result<Vec<Child>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM children WHERE parent_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![parent_id.to_string()], Child::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The child, provided `actor` is its parent.
fn owned_child(conn: &Connection, actor: &Actor, id: Uuid) -> Result<Child> {
    let child = get_child(conn, id)?.ok_or_else(|| HaapError::not_found("child", id))?;
    if child.parent_id != actor.user_id {
        return Err(HaapError::Permission(format!(
            "child {} belongs to another parent",
            id
        )));
    }
    Ok(child)
}

impl Database {
    pub fn register_child(&self, actor: &Actor, input: CreateChildInput) -> Result<Child> {
        self.register_child_in_year(actor, input, current_year())
    }

    /// Register a child for the acting parent, deriving the age group as of
    /// `current_year`.
    pub fn register_child_in_year(&self, actor: &Actor, input: CreateChildInput, current_year: i32) -> Result<Child> {
        if actor.role != Role::Parent {
            return Err(HaapError::Permission(format!(
                "{} cannot register children",
                actor.role.display_name()
            )));
        }
        let first_name = first_name(&input.first_name)?;
        let age_group = AgeGroup::for_birth_year(input.year_of_birth, current_year)?;

        self.with_connection(|conn| {
            if get_user(conn, actor.user_id)?.is_none() {
                return Err(HaapError::not_found("user", actor.user_id));
            }

            let created = now();
            let child = Child {
                id: Uuid::new_v4(),
                parent_id: actor.user_id,
                code: generate_child_code(&first_name),
                first_name,
                year_of_birth: input.year_of_birth,
                age_group,
                created_at: created,
                updated_at: created,
            };

            conn.execute(
                "INSERT INTO children (id, parent_id, first_name, year_of_birth, age_group, code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    child.id.to_string(),
                    child.parent_id.to_string(),
                    child.first_name,
                    child.year_of_birth,
                    child.age_group.as_str(),
                    child.code,
                    timestamp(&child.created_at),
                    timestamp(&child.updated_at),
                ],
            )?;

            info!("Registered child {} ({}) in group {}", child.code, child.id, child.age_group.as_str());
            Ok(child)
        })
    }

    pub fn update_child(&self, actor: &Actor, id: Uuid, input: UpdateChildInput) -> Result<Child> {
        self.update_child_in_year(actor, id, input, current_year())
    }

    /// Update a child owned by the actor. The display code is kept as is.
    pub fn update_child_in_year(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateChildInput,
        current_year: i32,
    ) -> Result<Child> {
        self.with_transaction(|tx| {
            let mut child = owned_child(tx, actor, id)?;

            if let Some(name) = input.first_name.as_deref() {
                child.first_name = first_name(name)?;
            }
            if let Some(year) = input.year_of_birth {
                child.age_group = AgeGroup::for_birth_year(year, current_year)?;
                child.year_of_birth = year;
            }
            child.updated_at = now();

            tx.execute(
                "UPDATE children SET first_name = ?2, year_of_birth = ?3, age_group = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    child.id.to_string(),
                    child.first_name,
                    child.year_of_birth,
                    child.age_group.as_str(),
                    timestamp(&child.updated_at),
                ],
            )?;
            info!("Updated child {}", child.id);
            Ok(child)
        })
    }

    /// Delete a child owned by the actor, together with its usage logs.
    pub fn delete_child(&self, actor: &Actor, id: Uuid) -> Result<Child> {
        self.with_transaction(|tx| {
            let child = owned_child(tx, actor, id)?;
            tx.execute("DELETE FROM children WHERE id = ?1", params![id.to_string()])?;
            info!("Deleted child {}", id);
            Ok(child)
        })
    }

    pub fn get_child(&self, id: Uuid) -> Result<Option<Child>> {
        self.with_connection(|conn| get_child(conn, id))
    }

    /// The actor's own children, newest first.
    pub fn children_for_parent(&self, actor: &Actor) -> Result<Vec<Child>> {
        self.with_connection(|conn| children_of_parent(conn, actor.user_id))
    }
}
