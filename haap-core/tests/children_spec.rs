use speculate2::speculate;

speculate! {
    use haap_core::models::*;
    use haap_core::notify::RecordingNotifier;
    use haap_core::{Database, HaapError};

    const YEAR: i32 = 2025;

    fn setup_db() -> Database {
        Database::open_memory().expect("Failed to create test database")
    }

    fn register_parent(db: &Database, number: &str) -> Actor {
        let dili = match db.list_municipalities().unwrap().into_iter().next() {
            Some(node) => node,
            None => db.create_node(Level::Municipality, "Dili", None).unwrap(),
        };
        let post = db.create_node(Level::AdministrativePost, &format!("Post {number}"), Some(dili.id)).unwrap();
        let suco = db.create_node(Level::Suco, "Becora", Some(post.id)).unwrap();
        let aldeia = db.create_node(Level::Aldeia, "Aldeia 1", Some(suco.id)).unwrap();
        let parent = db
            .register_parent(
                RegisterParentInput {
                    first_name: "Maria".into(),
                    last_name: "Soares".into(),
                    whatsapp_number: number.into(),
                    location: SelectionInput::from_ids(Some(dili.id), Some(post.id), Some(suco.id), Some(aldeia.id)),
                    ..Default::default()
                },
                &RecordingNotifier::default(),
            )
            .unwrap();
        Actor::from(&parent)
    }

    fn child_input(name: &str, year_of_birth: i32) -> CreateChildInput {
        CreateChildInput {
            first_name: name.into(),
            year_of_birth,
        }
    }

    describe "register_child" {
        it "assigns group A to three and four year olds" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");

            for year in [YEAR - 3, YEAR - 4] {
                let child = db.register_child_in_year(&parent, child_input("Maria", year), YEAR).unwrap();
                assert_eq!(child.age_group, AgeGroup::A);
            }
        }

        it "assigns group B to five and six year olds" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");

            for year in [YEAR - 5, YEAR - 6] {
                let child = db.register_child_in_year(&parent, child_input("Maria", year), YEAR).unwrap();
                assert_eq!(child.age_group, AgeGroup::B);
            }
        }

        it "rejects ages outside three to six" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");

            for year in [YEAR - 2, YEAR - 7] {
                let err = db.register_child_in_year(&parent, child_input("Maria", year), YEAR).unwrap_err();
                assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "year_of_birth"));
            }
            assert!(db.children_for_parent(&parent).unwrap().is_empty());
        }

        it "rejects absurd birth years without panicking" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");

            for year in [i32::MIN, i32::MAX] {
                let err = db.register_child(&parent, child_input("Maria", year)).unwrap_err();
                assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "year_of_birth"));
            }

            let child = db.register_child_in_year(&parent, child_input("Maria", YEAR - 4), YEAR).unwrap();
            let err = db
                .update_child_in_year(
                    &parent,
                    child.id,
                    UpdateChildInput {
                        first_name: None,
                        year_of_birth: Some(i32::MIN),
                    },
                    YEAR,
                )
                .unwrap_err();
            assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "year_of_birth"));
        }

        it "derives the code from the first name" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let child = db.register_child_in_year(&parent, child_input("maria", YEAR - 4), YEAR).unwrap();

            let (prefix, suffix) = child.code.split_once('-').unwrap();
            assert_eq!(prefix, "MAR");
            assert_eq!(suffix.len(), 6);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }

        it "is reserved to parents" {
            let db = setup_db();
            let admin = Actor::from(&db.create_admin("Ana", "Admin", "+67077999999", None).unwrap());
            let err = db.register_child_in_year(&admin, child_input("Maria", YEAR - 4), YEAR).unwrap_err();
            assert!(matches!(err, HaapError::Permission(_)));
        }
    }

    describe "update_child" {
        it "recomputes the group and keeps the code" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let child = db.register_child_in_year(&parent, child_input("Maria", YEAR - 3), YEAR).unwrap();

            let updated = db
                .update_child_in_year(
                    &parent,
                    child.id,
                    UpdateChildInput {
                        first_name: Some("Joana".into()),
                        year_of_birth: Some(YEAR - 6),
                    },
                    YEAR,
                )
                .unwrap();

            assert_eq!(updated.age_group, AgeGroup::B);
            assert_eq!(updated.first_name, "Joana");
            assert_eq!(updated.code, child.code);
            assert_eq!(db.get_child(child.id).unwrap(), Some(updated));
        }

        it "refuses children of another parent" {
            let db = setup_db();
            let owner = register_parent(&db, "+67077000001");
            let other = register_parent(&db, "+67077000002");
            let child = db.register_child_in_year(&owner, child_input("Maria", YEAR - 3), YEAR).unwrap();

            let err = db
                .update_child_in_year(&other, child.id, UpdateChildInput::default(), YEAR)
                .unwrap_err();
            assert!(matches!(err, HaapError::Permission(_)));
        }

        it "reports unknown children" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let err = db
                .update_child_in_year(&parent, uuid::Uuid::new_v4(), UpdateChildInput::default(), YEAR)
                .unwrap_err();
            assert!(matches!(err, HaapError::NotFound { entity: "child", .. }));
        }
    }

    describe "delete_child" {
        it "removes the child and its usage logs" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let child = db.register_child_in_year(&parent, child_input("Maria", YEAR - 4), YEAR).unwrap();
            db.record_usage(CreateUsageLogInput {
                child_id: child.id,
                theme: "Animals".into(),
                activity_type: ActivityType::Lian,
                is_assessed: false,
                was_successful: true,
                date_accessed: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                duration_seconds: Some(120),
            })
            .unwrap();

            db.delete_child(&parent, child.id).unwrap();

            assert_eq!(db.get_child(child.id).unwrap(), None);
            assert_eq!(db.list_usage_logs(&parent, &UsageLogQuery::default()).unwrap().total, 0);
        }

        it "refuses children of another parent" {
            let db = setup_db();
            let owner = register_parent(&db, "+67077000001");
            let other = register_parent(&db, "+67077000002");
            let child = db.register_child_in_year(&owner, child_input("Maria", YEAR - 4), YEAR).unwrap();

            assert!(matches!(db.delete_child(&other, child.id).unwrap_err(), HaapError::Permission(_)));
            assert!(db.get_child(child.id).unwrap().is_some());
        }
    }

    describe "children_for_parent" {
        it "lists only the parent's children, newest first" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let other = register_parent(&db, "+67077000002");
            let first = db.register_child_in_year(&parent, child_input("Maria", YEAR - 4), YEAR).unwrap();
            let second = db.register_child_in_year(&parent, child_input("Joana", YEAR - 5), YEAR).unwrap();
            db.register_child_in_year(&other, child_input("Tomas", YEAR - 5), YEAR).unwrap();

            let ids: Vec<_> = db.children_for_parent(&parent).unwrap().into_iter().map(|c| c.id).collect();
            assert_eq!(ids, vec![second.id, first.id]);
        }

        it "go with the parent when the parent is deleted" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");
            let child = db.register_child_in_year(&parent, child_input("Maria", YEAR - 4), YEAR).unwrap();

            db.delete_user(parent.user_id).unwrap();
            assert_eq!(db.get_child(child.id).unwrap(), None);
        }
    }

    describe "opt_in_enrollment" {
        it "records one opt-in per parent" {
            let db = setup_db();
            let parent = register_parent(&db, "+67077000001");

            let first = db.opt_in_enrollment(&parent, ContactMethod::Whatsapp).unwrap();
            let again = db.opt_in_enrollment(&parent, ContactMethod::Portal).unwrap();

            assert_eq!(first.id, again.id);
            assert_eq!(again.contact_method, ContactMethod::Whatsapp);
            assert_eq!(db.enrollment_opt_in(parent.user_id).unwrap().map(|o| o.id), Some(first.id));
        }

        it "is reserved to parents" {
            let db = setup_db();
            let admin = Actor::from(&db.create_admin("Ana", "Admin", "+67077999999", None).unwrap());
            assert!(matches!(
                db.opt_in_enrollment(&admin, ContactMethod::Portal).unwrap_err(),
                HaapError::Permission(_)
            ));
        }
    }
}
