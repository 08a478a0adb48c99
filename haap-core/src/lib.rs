//! Core library for HAAP.
//!
//! This crate provides the domain models, the SQLite store and the
//! notification seam for HAAP, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use haap_core::models::*;
//! use haap_core::Database;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let dili = db.create_node(Level::Municipality, "Dili", None)?;
//! let posts = db.list_children(Level::AdministrativePost, Some(dili.id))?;
//! # Ok::<(), haap_core::HaapError>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod notify;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{HaapError, Result};
pub use notify::{LogNotifier, Notification, Notifier};
