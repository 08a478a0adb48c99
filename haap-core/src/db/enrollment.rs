use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use super::{datetime_col, enum_col, now, timestamp, uuid_col, Database};
use crate::error::{HaapError, Result};
use crate::models::{Actor, ContactMethod, EnrollmentOptIn, Role};

impl EnrollmentOptIn {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: uuid_col(row, "id")?,
            parent_id: uuid_col(row, "parent_id")?,
            contact_method: enum_col(row, "contact_method", ContactMethod::from_str)?,
            created_at: datetime_col(row, "created_at")?,
        })
    }
}

fn find_opt_in(conn: &Connection, parent_id: Uuid) -> Result<Option<EnrollmentOptIn>> {
    let opt_in = conn
        .query_row(
            "SELECT * FROM preschool_enrollment_optins WHERE parent_id = ?1",
            params![parent_id.to_string()],
            EnrollmentOptIn::from_row,
        )
        .optional()?;
    Ok(opt_in)
}

impl Database {
    /// Record that a parent wants preschool enrollment information. A parent
    /// opts in once; later calls return the original record.
    pub fn opt_in_enrollment(&self, actor: &Actor, method: ContactMethod) -> Result<EnrollmentOptIn> {
        if actor.role != Role::Parent {
            return Err(HaapError::Permission("only parents can opt in to enrollment".into()));
        }

        self.with_transaction(|tx| {
            if let Some(existing) = find_opt_in(tx, actor.user_id)? {
                return Ok(existing);
            }

            let opt_in = EnrollmentOptIn {
                id: Uuid::new_v4(),
                parent_id: actor.user_id,
                contact_method: method,
                created_at: now(),
            };
            tx.execute(
                "INSERT INTO preschool_enrollment_optins (id, parent_id, contact_method, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    opt_in.id.to_string(),
                    opt_in.parent_id.to_string(),
                    opt_in.contact_method.as_str(),
                    timestamp(&opt_in.created_at),
                ],
            )?;
            info!("Parent {} opted in to enrollment via {}", actor.user_id, method.as_str());
            Ok(opt_in)
        })
    }

    pub fn enrollment_opt_in(&self, parent_id: Uuid) -> Result<Option<EnrollmentOptIn>> {
        self.with_connection(|conn| find_opt_in(conn, parent_id))
    }
}
