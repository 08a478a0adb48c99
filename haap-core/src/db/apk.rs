//! Mobile app releases. At most one release is marked latest at any time:
//! the flag is moved inside a single transaction and the partial unique
//! index `idx_one_latest_apk` rejects any second latest row.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use url::Url;
use uuid::Uuid;

use super::users::require_admin;
use super::{datetime_col, now, timestamp, uuid_col, Database};
use crate::error::{HaapError, Result};
use crate::models::{Actor, ApkVersion, PublishApkInput, UpdateApkInput};

const MAX_VERSION_LEN: usize = 20;

impl ApkVersion {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: uuid_col(row, "id")?,
            version_name: row.get("version_name")?,
            download_url: row.get("download_url")?,
            is_latest: row.get("is_latest")?,
            released_at: datetime_col(row, "released_at")?,
        })
    }
}

fn version_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(HaapError::validation("version_name", "This field is required."));
    }
    if name.chars().count() > MAX_VERSION_LEN {
        return Err(HaapError::validation(
            "version_name",
            format!("Ensure this value has at most {} characters.", MAX_VERSION_LEN),
        ));
    }
    Ok(name.to_string())
}

fn download_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(raw.to_string()),
        _ => Err(HaapError::validation("download_url", "Enter a valid URL.")),
    }
}

fn clear_latest(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("UPDATE apk_versions SET is_latest = 0 WHERE is_latest = 1", [])?)
}

fn get_apk(conn: &Connection, id: Uuid) -> Result<Option<ApkVersion>> {
    let apk = conn
        .query_row("SELECT * FROM apk_versions WHERE id = ?1", params![id.to_string()], ApkVersion::from_row)
        .optional()?;
    Ok(apk)
}

impl Database {
    /// Publish a release. With `is_latest` set, every other release loses the
    /// flag in the same transaction that inserts this one.
    pub fn publish_apk(&self, actor: &Actor, input: PublishApkInput) -> Result<ApkVersion> {
        require_admin(actor, "publish app releases")?;
        let apk = ApkVersion {
            id: Uuid::new_v4(),
            version_name: version_name(&input.version_name)?,
            download_url: download_url(&input.download_url)?,
            is_latest: input.is_latest,
            released_at: now(),
        };

        self.with_transaction(|tx| {
            if apk.is_latest {
                clear_latest(tx)?;
            }
            tx.execute(
                "INSERT INTO apk_versions (id, version_name, download_url, is_latest, released_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    apk.id.to_string(),
                    apk.version_name,
                    apk.download_url,
                    apk.is_latest,
                    timestamp(&apk.released_at),
                ],
            )?;
            Ok(())
        })?;

        info!(
            "Published APK {} ({}){}",
            apk.version_name,
            apk.id,
            if apk.is_latest { " as latest" } else { "" }
        );
        Ok(apk)
    }

    /// Edit a release. Returns `None` for an unknown id.
    pub fn update_apk(&self, actor: &Actor, id: Uuid, input: UpdateApkInput) -> Result<Option<ApkVersion>> {
        require_admin(actor, "edit app releases")?;
        let name = input.version_name.as_deref().map(version_name).transpose()?;
        let url = input.download_url.as_deref().map(download_url).transpose()?;

        self.with_transaction(|tx| {
            let Some(mut apk) = get_apk(tx, id)? else {
                return Ok(None);
            };
            if let Some(name) = name {
                apk.version_name = name;
            }
            if let Some(url) = url {
                apk.download_url = url;
            }
            if let Some(is_latest) = input.is_latest {
                if is_latest && !apk.is_latest {
                    clear_latest(tx)?;
                }
                apk.is_latest = is_latest;
            }

            tx.execute(
                "UPDATE apk_versions SET version_name = ?2, download_url = ?3, is_latest = ?4 WHERE id = ?1",
                params![apk.id.to_string(), apk.version_name, apk.download_url, apk.is_latest],
            )?;
            info!("Updated APK {} ({})", apk.version_name, apk.id);
            Ok(Some(apk))
        })
    }

    /// All releases, newest first.
    pub fn list_apks(&self) -> Result<Vec<ApkVersion>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM apk_versions ORDER BY released_at DESC, rowid DESC")?;
            let rows = stmt.query_map([], ApkVersion::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn latest_apk(&self) -> Result<Option<ApkVersion>> {
        self.with_connection(|conn| {
            let apk = conn
                .query_row("SELECT * FROM apk_versions WHERE is_latest = 1", [], ApkVersion::from_row)
                .optional()?;
            Ok(apk)
        })
    }

    pub fn get_apk(&self, id: Uuid) -> Result<Option<ApkVersion>> {
        self.with_connection(|conn| get_apk(conn, id))
    }
}
