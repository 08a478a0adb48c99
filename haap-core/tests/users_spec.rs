use speculate2::speculate;

speculate! {
    use haap_core::models::*;
    use haap_core::notify::RecordingNotifier;
    use haap_core::{Database, HaapError};

    fn setup_db() -> Database {
        Database::open_memory().expect("Failed to create test database")
    }

    fn full_path(db: &Database) -> SelectionInput {
        let dili = db.create_node(Level::Municipality, "Dili", None).unwrap();
        let post = db.create_node(Level::AdministrativePost, "Cristo Rei", Some(dili.id)).unwrap();
        let suco = db.create_node(Level::Suco, "Becora", Some(post.id)).unwrap();
        let aldeia = db.create_node(Level::Aldeia, "Aldeia 1", Some(suco.id)).unwrap();
        SelectionInput::from_ids(Some(dili.id), Some(post.id), Some(suco.id), Some(aldeia.id))
    }

    fn parent_input(number: &str, location: SelectionInput) -> RegisterParentInput {
        RegisterParentInput {
            first_name: "Maria".into(),
            last_name: "Soares".into(),
            whatsapp_number: number.into(),
            location,
            ..Default::default()
        }
    }

    fn admin(db: &Database) -> Actor {
        let user = db.create_admin("Ana", "Admin", "+67077999999", Some("ana@moe.gov.tl")).unwrap();
        Actor::from(&user)
    }

    fn staff_input(role: Role, number: &str, location: SelectionInput) -> RegisterStaffInput {
        RegisterStaffInput {
            first_name: "Jose".into(),
            last_name: "Guterres".into(),
            whatsapp_number: number.into(),
            email: None,
            role,
            location,
        }
    }

    describe "register_parent" {
        it "creates an unverified, inactive parent and sends a verification message" {
            let db = setup_db();
            let location = full_path(&db);
            let notifier = RecordingNotifier::default();

            let parent = db.register_parent(parent_input("+67077000001", location), &notifier).unwrap();

            assert_eq!(parent.role, Role::Parent);
            assert!(!parent.is_verified);
            assert!(!parent.is_active);
            assert!(parent.aldeia_id.is_some());

            let sent = notifier.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].template, MessageTemplate::Verification);
            assert_eq!(sent[0].recipient, "+67077000001");

            let log = db.list_messages(Some("+67077000001")).unwrap();
            assert_eq!(log.len(), 1);
            assert_eq!(log[0].status, DeliveryStatus::Sent);
        }

        it "records failed deliveries without failing the registration" {
            let db = setup_db();
            let location = full_path(&db);
            let notifier = RecordingNotifier::new(DeliveryStatus::Failed);

            assert!(db.register_parent(parent_input("+67077000001", location), &notifier).is_ok());
            assert_eq!(db.list_messages(None).unwrap()[0].status, DeliveryStatus::Failed);
        }

        it "returns the committed parent when the message log cannot be written" {
            let db = setup_db();
            let location = full_path(&db);
            db.with_connection(|conn| {
                conn.execute_batch("DROP TABLE whatsapp_messages")?;
                Ok(())
            })
            .unwrap();

            let parent = db
                .register_parent(parent_input("+67077000001", location), &RecordingNotifier::default())
                .unwrap();
            assert_eq!(db.get_user(parent.id).unwrap().map(|u| u.id), Some(parent.id));
            assert!(db.whatsapp_number_exists("+67077000001").unwrap());
        }

        it "requires the full location path" {
            let db = setup_db();
            let mut location = full_path(&db);
            location.aldeia = None;

            let err = db
                .register_parent(parent_input("+67077000001", location), &RecordingNotifier::default())
                .unwrap_err();
            assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "aldeia"));
        }

        it "rejects a number that is already registered" {
            let db = setup_db();
            let location = full_path(&db);
            let notifier = RecordingNotifier::default();
            db.register_parent(parent_input("+67077000001", location.clone()), &notifier).unwrap();

            let err = db.register_parent(parent_input("+67077000001", location), &notifier).unwrap_err();
            assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "whatsapp_number"));
            assert_eq!(notifier.sent().len(), 1);
        }

        it "rejects malformed numbers" {
            let db = setup_db();
            let location = full_path(&db);
            let err = db
                .register_parent(parent_input("7712", location), &RecordingNotifier::default())
                .unwrap_err();
            assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "whatsapp_number"));
        }
    }

    describe "verify_parent" {
        it "activates the account" {
            let db = setup_db();
            let location = full_path(&db);
            let parent = db
                .register_parent(parent_input("+67077000001", location), &RecordingNotifier::default())
                .unwrap();

            assert!(db.verify_parent(parent.id).unwrap());
            let parent = db.get_user(parent.id).unwrap().unwrap();
            assert!(parent.is_verified);
            assert!(parent.is_active);
        }

        it "ignores staff accounts" {
            let db = setup_db();
            let admin = admin(&db);
            assert!(!db.verify_parent(admin.user_id).unwrap());
        }
    }

    describe "whatsapp_number_exists" {
        it "reports registered numbers" {
            let db = setup_db();
            let location = full_path(&db);
            db.register_parent(parent_input("+67077000001", location), &RecordingNotifier::default())
                .unwrap();

            assert!(db.whatsapp_number_exists("+67077000001").unwrap());
            assert!(!db.whatsapp_number_exists("+67077000002").unwrap());
        }

        it "rejects a blank number" {
            let db = setup_db();
            assert!(matches!(db.whatsapp_number_exists("  ").unwrap_err(), HaapError::Validation { .. }));
        }
    }

    describe "register_staff" {
        it "creates a teacher with a partial location and a password link" {
            let db = setup_db();
            let admin = admin(&db);
            let location = full_path(&db);
            let notifier = RecordingNotifier::default();
            let partial = SelectionInput {
                municipality: location.municipality.clone(),
                ..Default::default()
            };

            let teacher = db
                .register_staff(&admin, staff_input(Role::Teacher, "+67077000010", partial), &notifier)
                .unwrap();

            assert_eq!(teacher.role, Role::Teacher);
            assert!(teacher.password_reset_required);
            assert!(teacher.municipality_id.is_some());
            assert_eq!(teacher.suco_id, None);
            assert_eq!(notifier.sent()[0].template, MessageTemplate::PasswordSetup);
        }

        it "sends the password link by email when one is given" {
            let db = setup_db();
            let admin = admin(&db);
            let notifier = RecordingNotifier::default();
            let mut input = staff_input(Role::MunicipalityAnalyst, "+67077000011", SelectionInput::default());
            input.email = Some("jose@moe.gov.tl".into());

            db.register_staff(&admin, input, &notifier).unwrap();

            let sent = notifier.sent();
            assert_eq!(sent[0].channel, Channel::Email);
            assert_eq!(sent[0].recipient, "jose@moe.gov.tl");
            assert!(db.list_messages(None).unwrap().is_empty());
        }

        it "only accepts staff roles" {
            let db = setup_db();
            let admin = admin(&db);
            let err = db
                .register_staff(
                    &admin,
                    staff_input(Role::Parent, "+67077000012", SelectionInput::default()),
                    &RecordingNotifier::default(),
                )
                .unwrap_err();
            assert!(matches!(err, HaapError::Validation { ref field, .. } if field == "role"));
        }

        it "is reserved to ministry administrators" {
            let db = setup_db();
            let admin = admin(&db);
            let notifier = RecordingNotifier::default();
            let teacher = db
                .register_staff(&admin, staff_input(Role::Teacher, "+67077000013", SelectionInput::default()), &notifier)
                .unwrap();

            let err = db
                .register_staff(
                    &Actor::from(&teacher),
                    staff_input(Role::Teacher, "+67077000014", SelectionInput::default()),
                    &notifier,
                )
                .unwrap_err();
            assert!(matches!(err, HaapError::Permission(_)));
        }
    }

    describe "register_user" {
        it "skips the password link when the password was set" {
            let db = setup_db();
            let admin = admin(&db);
            let location = full_path(&db);
            let notifier = RecordingNotifier::default();

            let parent = db
                .register_user(
                    &admin,
                    RegisterUserInput {
                        first_name: "Rosa".into(),
                        last_name: "Belo".into(),
                        whatsapp_number: "+67077000020".into(),
                        email: None,
                        address: Some("Rua de Becora".into()),
                        role: Role::Parent,
                        password_set: true,
                        location,
                    },
                    &notifier,
                )
                .unwrap();

            assert!(parent.is_active);
            assert!(!parent.password_reset_required);
            assert!(notifier.sent().is_empty());
        }

        it "refuses to create administrators" {
            let db = setup_db();
            let admin = admin(&db);
            let err = db
                .register_user(
                    &admin,
                    RegisterUserInput {
                        first_name: "Rosa".into(),
                        last_name: "Belo".into(),
                        whatsapp_number: "+67077000021".into(),
                        email: None,
                        address: None,
                        role: Role::MoeAdmin,
                        password_set: false,
                        location: SelectionInput::default(),
                    },
                    &RecordingNotifier::default(),
                )
                .unwrap_err();
            assert!(matches!(err, HaapError::Validation { .. }));
        }
    }

    describe "delete_user" {
        it "removes the user but keeps the hierarchy" {
            let db = setup_db();
            let location = full_path(&db);
            let parent = db
                .register_parent(parent_input("+67077000001", location), &RecordingNotifier::default())
                .unwrap();
            let municipality_id = parent.municipality_id.unwrap();

            assert!(db.delete_user(parent.id).unwrap());

            assert_eq!(db.get_user(parent.id).unwrap(), None);
            assert!(db.get_node(Level::Municipality, municipality_id).unwrap().is_some());
            assert!(!db.delete_user(parent.id).unwrap());
        }
    }

    describe "replace_profile_image" {
        it "returns the previous upload but never the default image" {
            let db = setup_db();
            let actor = admin(&db);

            assert_eq!(db.replace_profile_image(&actor, "uploads/a.png").unwrap(), None);
            assert_eq!(
                db.replace_profile_image(&actor, "uploads/b.png").unwrap().as_deref(),
                Some("uploads/a.png")
            );
            assert_eq!(db.get_user(actor.user_id).unwrap().unwrap().image.as_deref(), Some("uploads/b.png"));
        }
    }

    describe "user_directory" {
        it "groups users by role for administrators" {
            let db = setup_db();
            let admin = admin(&db);
            let location = full_path(&db);
            let notifier = RecordingNotifier::default();
            db.register_parent(parent_input("+67077000001", location), &notifier).unwrap();
            db.register_staff(&admin, staff_input(Role::Teacher, "+67077000010", SelectionInput::default()), &notifier)
                .unwrap();

            let directory = db.user_directory(&admin).unwrap();
            assert_eq!(directory.parents.len(), 1);
            assert_eq!(directory.teachers.len(), 1);
            assert!(directory.analysts.is_empty());
            assert_eq!(directory.admins.len(), 1);
        }
    }

    describe "actor" {
        it "loads the acting context of a user" {
            let db = setup_db();
            let admin = admin(&db);
            assert_eq!(db.actor(admin.user_id).unwrap(), admin);
        }

        it "reports unknown users" {
            let db = setup_db();
            assert!(matches!(db.actor(uuid::Uuid::new_v4()).unwrap_err(), HaapError::NotFound { .. }));
        }
    }

    describe "role" {
        it "maps each role to its landing page" {
            assert_eq!(Role::MoeAdmin.dashboard_path(), "/dashboard/moe-admin");
            assert_eq!(Role::Parent.dashboard_path(), "/children");
            assert_eq!(Role::MunicipalityAnalyst.dashboard_path(), "/dashboard/municipality");
            assert_eq!(Role::Teacher.dashboard_path(), "/dashboard/teacher");
        }
    }
}
