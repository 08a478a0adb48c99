pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS municipalities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS administrative_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    municipality_id INTEGER NOT NULL REFERENCES municipalities(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE (municipality_id, name)
);

CREATE TABLE IF NOT EXISTS sucos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    administrative_post_id INTEGER NOT NULL REFERENCES administrative_posts(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE (administrative_post_id, name)
);

CREATE TABLE IF NOT EXISTS aldeias (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    suco_id INTEGER NOT NULL REFERENCES sucos(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    UNIQUE (suco_id, name)
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    role TEXT NOT NULL CHECK (role IN ('parent', 'moe_admin', 'municipality_analyst', 'teacher')),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    whatsapp_number TEXT NOT NULL UNIQUE,
    email TEXT,
    address TEXT,
    image TEXT,
    municipality_id INTEGER REFERENCES municipalities(id) ON DELETE SET NULL,
    administrative_post_id INTEGER REFERENCES administrative_posts(id) ON DELETE SET NULL,
    suco_id INTEGER REFERENCES sucos(id) ON DELETE SET NULL,
    aldeia_id INTEGER REFERENCES aldeias(id) ON DELETE SET NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    password_reset_required INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS children (
    id TEXT PRIMARY KEY,
    parent_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL,
    year_of_birth INTEGER NOT NULL,
    age_group TEXT NOT NULL CHECK (age_group IN ('A', 'B')),
    code TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS app_usage_logs (
    id TEXT PRIMARY KEY,
    child_id TEXT NOT NULL REFERENCES children(id) ON DELETE CASCADE,
    theme TEXT NOT NULL,
    activity_type TEXT NOT NULL CHECK (activity_type IN ('Numero', 'Lian', 'Arte', 'Motri', 'Sosyal')),
    group_code TEXT NOT NULL CHECK (group_code IN ('A', 'B')),
    is_assessed INTEGER NOT NULL DEFAULT 0,
    was_successful INTEGER NOT NULL DEFAULT 0,
    date_accessed TEXT NOT NULL,
    duration_seconds INTEGER
);

CREATE TABLE IF NOT EXISTS preschool_enrollment_optins (
    id TEXT PRIMARY KEY,
    parent_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    contact_method TEXT NOT NULL CHECK (contact_method IN ('whatsapp', 'portal')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS apk_versions (
    id TEXT PRIMARY KEY,
    version_name TEXT NOT NULL,
    download_url TEXT NOT NULL,
    is_latest INTEGER NOT NULL DEFAULT 0,
    released_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS whatsapp_messages (
    id TEXT PRIMARY KEY,
    to_number TEXT NOT NULL,
    template_type TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('sent', 'failed', 'delivered')),
    sent_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_municipality ON administrative_posts(municipality_id);
CREATE INDEX IF NOT EXISTS idx_sucos_post ON sucos(administrative_post_id);
CREATE INDEX IF NOT EXISTS idx_aldeias_suco ON aldeias(suco_id);
CREATE INDEX IF NOT EXISTS idx_users_role_municipality ON users(role, municipality_id);
CREATE INDEX IF NOT EXISTS idx_children_parent ON children(parent_id);
CREATE INDEX IF NOT EXISTS idx_children_age_group ON children(age_group);
CREATE INDEX IF NOT EXISTS idx_usage_child_date ON app_usage_logs(child_id, date_accessed);
CREATE INDEX IF NOT EXISTS idx_usage_activity ON app_usage_logs(activity_type);
CREATE INDEX IF NOT EXISTS idx_usage_date ON app_usage_logs(date_accessed);
CREATE INDEX IF NOT EXISTS idx_messages_to ON whatsapp_messages(to_number);
CREATE INDEX IF NOT EXISTS idx_messages_template ON whatsapp_messages(template_type, sent_at);

-- At most one latest release
CREATE UNIQUE INDEX IF NOT EXISTS idx_one_latest_apk
    ON apk_versions(is_latest) WHERE is_latest = 1;
"#;
