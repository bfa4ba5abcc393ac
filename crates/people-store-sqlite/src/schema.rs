//! SQL schema for the people SQLite store.
//!
//! Executed once at connection startup. The version is stamped into
//! `PRAGMA user_version`; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS people (
    id          TEXT PRIMARY KEY,
    first_name  TEXT NOT NULL CHECK (length(first_name) <= 100),
    last_name   TEXT NOT NULL CHECK (length(last_name)  <= 100),
    email       TEXT NOT NULL CHECK (length(email)      <= 255),
    birth_date  TEXT NOT NULL,           -- ISO 8601 date, YYYY-MM-DD
    document    TEXT NOT NULL CHECK (length(document)   <= 20),
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,           -- RFC 3339 UTC
    updated_at  TEXT                     -- RFC 3339 UTC or NULL
);

-- The final word on uniqueness; handlers only pre-check.
CREATE UNIQUE INDEX IF NOT EXISTS people_email_idx    ON people(email);
CREATE UNIQUE INDEX IF NOT EXISTS people_document_idx ON people(document);
CREATE INDEX        IF NOT EXISTS people_active_idx   ON people(active);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT`, in [`RawPerson`](crate::encode::RawPerson) order.
pub const COLUMNS: &str =
  "id, first_name, last_name, email, birth_date, document, active, created_at, updated_at";
