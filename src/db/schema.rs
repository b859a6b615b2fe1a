//! Database schema and migrations for eduboard.
//!
//! Migrations are applied in order when the database is opened. The
//! schema_version table records which ones have run.
//!
//! Documents map to one row each. Array fields (labels, members, entry IDs,
//! picture URIs) are stored as JSON text so a single UPDATE can push or pull
//! an element atomically.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users with an embedded session
    r#"
CREATE TABLE users (
    id                  TEXT PRIMARY KEY,
    email               TEXT NOT NULL,
    name                TEXT NOT NULL DEFAULT '',
    surname             TEXT NOT NULL DEFAULT '',
    password_hash       TEXT NOT NULL,           -- Argon2 PHC string
    session_token       TEXT,                    -- NULL when logged out
    session_expires_at  TEXT,
    created_at          TEXT NOT NULL
);

CREATE UNIQUE INDEX idx_users_email ON users(email);
CREATE UNIQUE INDEX idx_users_session_token ON users(session_token);
"#,
    // v2: courses with member list and entry-index
    r#"
CREATE TABLE courses (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    labels      TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    members     TEXT NOT NULL DEFAULT '[]',   -- JSON array of user IDs
    entry_ids   TEXT NOT NULL DEFAULT '[]',   -- JSON array of entry IDs
    created_at  TEXT NOT NULL
);
"#,
    // v3: course entries
    r#"
CREATE TABLE course_entries (
    id          TEXT PRIMARY KEY,
    course_id   TEXT NOT NULL,
    message     TEXT NOT NULL DEFAULT '',
    pictures    TEXT NOT NULL DEFAULT '[]',   -- JSON array of URIs
    date        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    published   INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_course_entries_course_id ON course_entries(course_id);
"#,
];
