//! Table definitions, applied idempotently on startup.

/// Users: email is the login key and must be unique
pub const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL
)";

/// Notes: url is globally unique, name is unique per owner
/// `content` and `misc` are untyped so numbers keep their storage class
pub const CREATE_NOTES: &str = "CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id),
    content,
    misc,
    UNIQUE (user_id, name)
)";

/// Sessions: token -> user id + expiry (unix seconds)
/// No foreign key, sessions live independently of users
pub const CREATE_SESSIONS: &str = "CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
)";

pub const CREATE_SESSIONS_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions (expires_at)";

pub const CREATE_NOTES_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)";

/// All statements, in dependency order
pub const ALL: &[&str] = &[
    CREATE_USERS,
    CREATE_NOTES,
    CREATE_SESSIONS,
    CREATE_SESSIONS_EXPIRY_INDEX,
    CREATE_NOTES_OWNER_INDEX,
];
