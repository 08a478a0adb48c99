use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, warn};
use uuid::Uuid;

use super::cascade::{parse_id, require_full_path, resolve_partial};
use super::{count, datetime_col, enum_col, now, timestamp, uuid_col, Database};
use crate::error::{is_unique_violation, HaapError, Result};
use crate::models::{
    clamp_page, Actor, LocationSelection, MessageTemplate, Page, ParentQuery, RegisterParentInput,
    RegisterStaffInput, RegisterUserInput, Role, User, UserDirectory, PAGE_SIZE,
};
use crate::notify::{Notification, Notifier};

const MAX_WHATSAPP_LEN: usize = 15;
const DEFAULT_IMAGE: &str = "defaults/user.png";

impl User {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: uuid_col(row, "id")?,
            role: enum_col(row, "role", Role::from_str)?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            whatsapp_number: row.get("whatsapp_number")?,
            email: row.get("email")?,
            address: row.get("address")?,
            image: row.get("image")?,
            municipality_id: row.get("municipality_id")?,
            administrative_post_id: row.get("administrative_post_id")?,
            suco_id: row.get("suco_id")?,
            aldeia_id: row.get("aldeia_id")?,
            is_verified: row.get("is_verified")?,
            is_active: row.get("is_active")?,
            password_reset_required: row.get("password_reset_required")?,
            created_at: datetime_col(row, "created_at")?,
            updated_at: datetime_col(row, "updated_at")?,
        })
    }
}

/// Validate a WhatsApp number: an optional `+` followed by 9-15 digits,
/// at most 15 characters overall. Returns the trimmed number.
pub fn normalize_whatsapp(raw: &str) -> Result<String> {
    let number = raw.trim();
    let digits = number.strip_prefix('+').unwrap_or(number);
    let valid = number.len() <= MAX_WHATSAPP_LEN
        && digits.len() >= 9
        && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(HaapError::validation(
            "whatsapp_number",
            "Enter a WhatsApp number (e.g., +67077123456).",
        ));
    }
    Ok(number.to_string())
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HaapError::validation(field, "This field is required."));
    }
    Ok(value.to_string())
}

fn optional_email(email: Option<&str>) -> Result<Option<String>> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(HaapError::validation("email", "Enter a valid email address."));
    }
    Ok(Some(email.to_string()))
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

struct NewUser {
    role: Role,
    first_name: String,
    last_name: String,
    whatsapp_number: String,
    email: Option<String>,
    address: Option<String>,
    location: LocationSelection,
    is_verified: bool,
    is_active: bool,
    password_reset_required: bool,
}

fn duplicate_whatsapp() -> HaapError {
    HaapError::validation("whatsapp_number", "User with this WhatsApp number already exists.")
}

fn whatsapp_taken(conn: &Connection, number: &str) -> Result<bool> {
    Ok(count(conn, "SELECT COUNT(*) FROM users WHERE whatsapp_number = ?1", params![number])? > 0)
}

fn insert_user(conn: &Connection, new: NewUser) -> Result<User> {
    if whatsapp_taken(conn, &new.whatsapp_number)? {
        return Err(duplicate_whatsapp());
    }

    let created = now();
    let user = User {
        id: Uuid::new_v4(),
        role: new.role,
        first_name: new.first_name,
        last_name: new.last_name,
        whatsapp_number: new.whatsapp_number,
        email: new.email,
        address: new.address,
        image: Some(DEFAULT_IMAGE.to_string()),
        municipality_id: new.location.municipality,
        administrative_post_id: new.location.administrative_post,
        suco_id: new.location.suco,
        aldeia_id: new.location.aldeia,
        is_verified: new.is_verified,
        is_active: new.is_active,
        password_reset_required: new.password_reset_required,
        created_at: created,
        updated_at: created,
    };

    conn.execute(
        "INSERT INTO users (id, role, first_name, last_name, whatsapp_number, email, address, image,
                            municipality_id, administrative_post_id, suco_id, aldeia_id,
                            is_verified, is_active, password_reset_required, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            user.id.to_string(),
            user.role.as_str(),
            user.first_name,
            user.last_name,
            user.whatsapp_number,
            user.email,
            user.address,
            user.image,
            user.municipality_id,
            user.administrative_post_id,
            user.suco_id,
            user.aldeia_id,
            user.is_verified,
            user.is_active,
            user.password_reset_required,
            timestamp(&user.created_at),
            timestamp(&user.updated_at),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_whatsapp()
        } else {
            HaapError::Storage(e)
        }
    })?;

    info!("Registered {} {} ({})", user.role.as_str(), user.full_name(), user.id);
    Ok(user)
}

pub(crate) fn get_user(conn: &Connection, id: Uuid) -> Result<Option<User>> {
    let user = conn
        .query_row("SELECT * FROM users WHERE id = ?1", params![id.to_string()], User::from_row)
        .optional()?;
    Ok(user)
}

pub(crate) fn require_admin(actor: &Actor, action: &str) -> Result<()> {
    if actor.role != Role::MoeAdmin {
        return Err(HaapError::Permission(format!(
            "{} cannot {}",
            actor.role.display_name(),
            action
        )));
    }
    Ok(())
}

pub(crate) fn require_not_parent(actor: &Actor, action: &str) -> Result<()> {
    if actor.role == Role::Parent {
        return Err(HaapError::Permission(format!(
            "{} cannot {}",
            actor.role.display_name(),
            action
        )));
    }
    Ok(())
}

pub(crate) fn query_users(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, User::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn users_with_role(conn: &Connection, role: Role, municipality: Option<Option<i64>>) -> Result<Vec<User>> {
    match municipality {
        None => query_users(
            conn,
            "SELECT * FROM users WHERE role = ?1 ORDER BY created_at DESC, rowid DESC",
            params![role.as_str()],
        ),
        Some(municipality_id) => query_users(
            conn,
            "SELECT * FROM users WHERE role = ?1 AND municipality_id = ?2
             ORDER BY created_at DESC, rowid DESC",
            params![role.as_str(), municipality_id],
        ),
    }
}

fn staff_notification(user: &User) -> Notification {
    let content = format!(
        "Hello {}, an account has been created for you. Please follow the link sent with this message to set your password.",
        user.first_name
    );
    match &user.email {
        Some(email) => Notification::email(email, MessageTemplate::PasswordSetup, content),
        None => Notification::whatsapp(&user.whatsapp_number, MessageTemplate::PasswordSetup, content),
    }
}

impl Database {
    /// The account is already committed; a failure to log the message must
    /// not surface as a failed registration.
    fn notify_created(&self, user: &User, notifier: &dyn Notifier, notification: &Notification) {
        if let Err(e) = self.dispatch(notifier, notification) {
            warn!(user = %user.id, "Failed to record account notification: {}", e);
        }
    }

    /// Self-registration of a parent. The account starts unverified and
    /// inactive until the WhatsApp verification link is followed.
    pub fn register_parent(&self, input: RegisterParentInput, notifier: &dyn Notifier) -> Result<User> {
        let first_name = required("first_name", &input.first_name)?;
        let last_name = required("last_name", &input.last_name)?;
        let whatsapp_number = normalize_whatsapp(&input.whatsapp_number)?;
        let email = optional_email(input.email.as_deref())?;
        let address = blank_to_none(input.address.as_deref());

        let user = self.with_transaction(|tx| {
            let path = require_full_path(tx, &input.location)?;
            insert_user(
                tx,
                NewUser {
                    role: Role::Parent,
                    first_name,
                    last_name,
                    whatsapp_number,
                    email,
                    address,
                    location: path.into(),
                    is_verified: false,
                    is_active: false,
                    password_reset_required: false,
                },
            )
        })?;

        let content = format!(
            "Hello {}, thank you for registering. Follow the verification link to activate your account.",
            user.first_name
        );
        self.notify_created(
            &user,
            notifier,
            &Notification::whatsapp(&user.whatsapp_number, MessageTemplate::Verification, content),
        );
        Ok(user)
    }

    /// Admin registration of a teacher or municipality analyst. Location is
    /// optional; the account must set its password through the link sent.
    pub fn register_staff(&self, actor: &Actor, input: RegisterStaffInput, notifier: &dyn Notifier) -> Result<User> {
        require_admin(actor, "register staff")?;
        if !input.role.is_staff() {
            return Err(HaapError::validation("role", "Select a valid choice."));
        }
        self.register_user(
            actor,
            RegisterUserInput {
                first_name: input.first_name,
                last_name: input.last_name,
                whatsapp_number: input.whatsapp_number,
                email: input.email,
                address: None,
                role: input.role,
                password_set: false,
                location: input.location,
            },
            notifier,
        )
    }

    /// Admin registration of a parent, teacher or analyst. Parents need the
    /// full location path; staff may give any valid prefix of it.
    pub fn register_user(&self, actor: &Actor, input: RegisterUserInput, notifier: &dyn Notifier) -> Result<User> {
        require_admin(actor, "register users")?;
        if input.role == Role::MoeAdmin {
            return Err(HaapError::validation("role", "Select a valid choice."));
        }
        let first_name = required("first_name", &input.first_name)?;
        let last_name = required("last_name", &input.last_name)?;
        let whatsapp_number = normalize_whatsapp(&input.whatsapp_number)?;
        let email = optional_email(input.email.as_deref())?;
        let address = blank_to_none(input.address.as_deref());

        let user = self.with_transaction(|tx| {
            let location = match input.role {
                Role::Parent => require_full_path(tx, &input.location)?.into(),
                _ => resolve_partial(tx, &input.location)?,
            };
            insert_user(
                tx,
                NewUser {
                    role: input.role,
                    first_name,
                    last_name,
                    whatsapp_number,
                    email,
                    address,
                    location,
                    is_verified: false,
                    is_active: true,
                    password_reset_required: !input.password_set,
                },
            )
        })?;

        if user.password_reset_required {
            self.notify_created(&user, notifier, &staff_notification(&user));
        }
        Ok(user)
    }

    /// Create a ministry administrator. Nothing else can create one, so this
    /// is how a fresh install gets its first account.
    pub fn create_admin(&self, first_name: &str, last_name: &str, whatsapp_number: &str, email: Option<&str>) -> Result<User> {
        let new = NewUser {
            role: Role::MoeAdmin,
            first_name: required("first_name", first_name)?,
            last_name: required("last_name", last_name)?,
            whatsapp_number: normalize_whatsapp(whatsapp_number)?,
            email: optional_email(email)?,
            address: None,
            location: LocationSelection::default(),
            is_verified: true,
            is_active: true,
            password_reset_required: true,
        };
        self.with_connection(|conn| insert_user(conn, new))
    }

    /// Mark a parent as verified and active. Returns false for unknown ids
    /// and for non-parent accounts.
    pub fn verify_parent(&self, user_id: Uuid) -> Result<bool> {
        self.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE users SET is_verified = 1, is_active = 1, updated_at = ?2
                 WHERE id = ?1 AND role = 'parent'",
                params![user_id.to_string(), timestamp(&now())],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn whatsapp_number_exists(&self, number: &str) -> Result<bool> {
        let number = number.trim();
        if number.is_empty() {
            return Err(HaapError::validation("number", "WhatsApp number not provided"));
        }
        self.with_connection(|conn| whatsapp_taken(conn, number))
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_connection(|conn| get_user(conn, id))
    }

    /// Load the acting user's context.
    pub fn actor(&self, user_id: Uuid) -> Result<Actor> {
        self.get_user(user_id)?
            .map(|user| Actor::from(&user))
            .ok_or_else(|| HaapError::not_found("user", user_id))
    }

    /// Remove a user and their children. Locations are never touched.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.with_connection(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
            if deleted > 0 {
                info!("Deleted user {}", id);
            }
            Ok(deleted > 0)
        })
    }

    /// Point the actor's profile image at `path` and return the previous
    /// upload, if any, so the caller can remove it from file storage.
    pub fn replace_profile_image(&self, actor: &Actor, path: &str) -> Result<Option<String>> {
        let path = required("image", path)?;
        self.with_transaction(|tx| {
            let user = get_user(tx, actor.user_id)?.ok_or_else(|| HaapError::not_found("user", actor.user_id))?;
            tx.execute(
                "UPDATE users SET image = ?2, updated_at = ?3 WHERE id = ?1",
                params![actor.user_id.to_string(), path, timestamp(&now())],
            )?;
            Ok(user
                .image
                .filter(|old| old != DEFAULT_IMAGE && *old != path))
        })
    }

    pub fn user_directory(&self, actor: &Actor) -> Result<UserDirectory> {
        require_admin(actor, "manage users")?;
        self.with_connection(|conn| {
            Ok(UserDirectory {
                parents: users_with_role(conn, Role::Parent, None)?,
                teachers: users_with_role(conn, Role::Teacher, None)?,
                analysts: users_with_role(conn, Role::MunicipalityAnalyst, None)?,
                admins: users_with_role(conn, Role::MoeAdmin, None)?,
            })
        })
    }

    /// Parents, newest first, optionally limited to one municipality.
    /// A malformed municipality id is ignored.
    pub fn list_parents(&self, actor: &Actor, query: &ParentQuery) -> Result<Page<User>> {
        require_not_parent(actor, "list parents")?;
        let municipality = query.municipality.as_deref().and_then(parse_id);
        self.with_connection(|conn| {
            let total = count(
                conn,
                "SELECT COUNT(*) FROM users WHERE role = 'parent' AND (?1 IS NULL OR municipality_id = ?1)",
                params![municipality],
            )?;
            let (page, num_pages) = clamp_page(query.page, total, PAGE_SIZE);
            let items = query_users(
                conn,
                "SELECT * FROM users WHERE role = 'parent' AND (?1 IS NULL OR municipality_id = ?1)
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
                params![municipality, PAGE_SIZE, (page - 1) * PAGE_SIZE],
            )?;
            Ok(Page {
                items,
                page,
                per_page: PAGE_SIZE,
                total,
                num_pages,
            })
        })
    }
}
