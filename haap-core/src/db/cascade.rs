//! The dependent-dropdown protocol shared by every registration and
//! filter form: each level's candidates are the children of the level
//! above, and only once that level holds a valid selection.

use rusqlite::Connection;
use tracing::debug;

use super::locations::list_children;
use super::Database;
use crate::error::{HaapError, Result};
use crate::models::{CascadeOptions, Level, LocationNode, LocationPath, LocationSelection, SelectionInput};

/// Parse a submitted hierarchy id. Anything that is not a positive integer
/// counts as no selection.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

pub(crate) fn cascade(conn: &Connection, input: &SelectionInput) -> Result<CascadeOptions> {
    let mut options = CascadeOptions::default();
    let mut parent: Option<i64> = None;

    for level in Level::ALL {
        let candidates = match level {
            Level::Municipality => list_children(conn, level, None)?,
            _ => match parent {
                Some(pid) => list_children(conn, level, Some(pid))?,
                None => Vec::new(),
            },
        };

        let submitted = input.get(level);
        let chosen = submitted
            .and_then(parse_id)
            .filter(|id| candidates.iter().any(|node| node.id == *id));
        if submitted.is_some() && chosen.is_none() {
            debug!("Invalidated {} selection {:?}", level, submitted);
            options.invalidated.push(level);
        }

        *options.candidates_mut(level) = candidates;
        options.selection.set(level, chosen);
        parent = chosen;
    }

    Ok(options)
}

fn check_selection(options: &CascadeOptions, required: bool) -> Result<LocationSelection> {
    for level in Level::ALL {
        if options.invalidated.contains(&level) {
            return Err(HaapError::validation(
                level.as_str(),
                "Select a valid choice. That choice is not one of the available choices.",
            ));
        }
        if required && options.selection.get(level).is_none() {
            return Err(HaapError::validation(level.as_str(), "This field is required."));
        }
    }
    Ok(options.selection)
}

pub(crate) fn require_full_path(conn: &Connection, input: &SelectionInput) -> Result<LocationPath> {
    let selection = check_selection(&cascade(conn, input)?, true)?;
    match selection {
        LocationSelection {
            municipality: Some(municipality),
            administrative_post: Some(administrative_post),
            suco: Some(suco),
            aldeia: Some(aldeia),
        } => Ok(LocationPath {
            municipality,
            administrative_post,
            suco,
            aldeia,
        }),
        _ => Err(HaapError::validation(Level::Municipality.as_str(), "This field is required.")),
    }
}

pub(crate) fn resolve_partial(conn: &Connection, input: &SelectionInput) -> Result<LocationSelection> {
    check_selection(&cascade(conn, input)?, false)
}

impl Database {
    /// Valid children of the node `raw_parent_id` at `parent_level`.
    /// Malformed or unknown ids yield an empty list, never an error.
    pub fn children_of(&self, parent_level: Level, raw_parent_id: &str) -> Result<Vec<LocationNode>> {
        let Some(child_level) = parent_level.child() else {
            return Ok(Vec::new());
        };
        let Some(parent_id) = parse_id(raw_parent_id) else {
            debug!("Ignoring malformed {} id {:?}", parent_level, raw_parent_id);
            return Ok(Vec::new());
        };
        self.list_children(child_level, Some(parent_id))
    }

    /// Candidate sets for every level given a partially filled selection.
    pub fn cascade(&self, input: &SelectionInput) -> Result<CascadeOptions> {
        self.with_connection(|conn| cascade(conn, input))
    }

    /// All four levels selected and each one a child of the one above.
    pub fn require_full_path(&self, input: &SelectionInput) -> Result<LocationPath> {
        self.with_connection(|conn| require_full_path(conn, input))
    }

    /// Any prefix of the hierarchy may be selected, but nothing invalid.
    pub fn resolve_partial(&self, input: &SelectionInput) -> Result<LocationSelection> {
        self.with_connection(|conn| resolve_partial(conn, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_positive_integers() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("3.5"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("0"), None);
    }
}
