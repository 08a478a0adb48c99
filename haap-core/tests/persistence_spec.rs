use speculate2::speculate;

speculate! {
    use haap_core::models::*;
    use haap_core::{Database, HaapError};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> Database {
        let db = Database::open(dir.path().join("data").join("haap.db")).expect("Failed to open database");
        db.migrate().expect("Failed to migrate");
        db
    }

    describe "on-disk database" {
        it "keeps data across reopen" {
            let dir = TempDir::new().unwrap();
            let dili_id = {
                let db = open(&dir);
                db.create_node(Level::Municipality, "Dili", None).unwrap().id
            };

            let db = open(&dir);
            let node = db.get_node(Level::Municipality, dili_id).unwrap().unwrap();
            assert_eq!(node.name, "Dili");
        }

        it "enforces foreign keys after reopen" {
            let dir = TempDir::new().unwrap();
            let (dili_id, post_id) = {
                let db = open(&dir);
                let dili = db.create_node(Level::Municipality, "Dili", None).unwrap();
                let post = db.create_node(Level::AdministrativePost, "Cristo Rei", Some(dili.id)).unwrap();
                (dili.id, post.id)
            };

            let db = open(&dir);
            db.delete_node(Level::Municipality, dili_id).unwrap();
            assert!(db.get_node(Level::AdministrativePost, post_id).unwrap().is_none());
        }

        it "rejects a second latest release written behind the API" {
            let dir = TempDir::new().unwrap();
            let db = open(&dir);
            let insert = |id: &str| {
                db.with_connection(|conn| {
                    conn.execute(
                        "INSERT INTO apk_versions (id, version_name, download_url, is_latest, released_at)
                         VALUES (?1, '1.0', 'https://example.tl/a.apk', 1, '2025-01-01T00:00:00.000000Z')",
                        [id],
                    )?;
                    Ok(())
                })
            };

            insert("00000000-0000-0000-0000-000000000001").unwrap();
            assert!(matches!(
                insert("00000000-0000-0000-0000-000000000002").unwrap_err(),
                HaapError::Storage(_)
            ));
        }
    }
}
