//! Storage layer for the work session accounting engine.
//!
//! Provides persistence for users, reference data, and work sessions
//! using `rusqlite`, and implements the session state manager: the upsert
//! that keeps at most one open session per user per UTC calendar day.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send`
//! but not `Sync`. A `Database` instance can be moved between threads but
//! cannot be shared across threads without external synchronization.
//!
//! For multi-threaded access, either:
//! - Use a `Mutex<Database>` to serialize access
//! - Create a connection pool (e.g., with `r2d2`)
//! - Use separate `Database` instances per thread
//!
//! Even with separate connections, the open-session invariant holds: the
//! save path runs inside a transaction and a partial unique index on
//! `(user_id, day of start) WHERE end_time IS NULL` rejects any second
//! open session that slips past the read-modify-write.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.,
//! `2024-01-15T10:30:00Z`), always UTC. Lexicographic ordering matches
//! chronological ordering, so window queries compare strings directly and
//! `substr(start_time, 1, 10)` is the UTC calendar day.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use zeit_core::model::{Location, Project, SessionDraft, User, WorkSession};
use zeit_core::regulation::{Regulation, RegulationTable};
use zeit_core::types::{
    LocationId, ProjectId, RegulationId, SessionId, UserId, ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for session {session_id}: {timestamp}")]
    TimestampParse {
        session_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored record failed core validation (e.g., non-positive ID).
    #[error("invalid stored record: {0}")]
    InvalidRecord(#[from] ValidationError),
    /// A referenced user does not exist.
    #[error("no user with ID {0}")]
    UnknownUser(UserId),
}

/// Formats a timestamp for storage.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a stored timestamp back into UTC.
fn parse_timestamp(session_id: i64, raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            session_id,
            timestamp: raw.to_string(),
            source,
        })
}

/// Raw session row before timestamp parsing and ID validation.
struct SessionRow {
    id: i64,
    user_id: i64,
    start_time: String,
    end_time: Option<String>,
    location_id: Option<i64>,
    project_id: Option<i64>,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            location_id: row.get(4)?,
            project_id: row.get(5)?,
        })
    }

    fn into_session(self) -> Result<WorkSession, DbError> {
        let start = parse_timestamp(self.id, &self.start_time)?;
        let end = self
            .end_time
            .as_deref()
            .map(|raw| parse_timestamp(self.id, raw))
            .transpose()?;
        Ok(WorkSession {
            id: SessionId::new(self.id)?,
            user_id: UserId::new(self.user_id)?,
            start,
            end,
            location_id: self.location_id.map(LocationId::new).transpose()?,
            project_id: self.project_id.map(ProjectId::new).transpose()?,
        })
    }
}

const SESSION_COLUMNS: &str = "id, user_id, start_time, end_time, location_id, project_id";

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE CHECK (username <> ''),
                working_hours_weekly INTEGER NOT NULL CHECK (working_hours_weekly > 0)
            );

            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_locations_user ON locations(user_id);

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);

            -- Reference data: break deduction thresholds
            CREATE TABLE IF NOT EXISTS regulations (
                id INTEGER PRIMARY KEY,
                working_hours INTEGER NOT NULL,
                break_minutes INTEGER NOT NULL
            );

            -- Work sessions: start_time/end_time in ISO 8601 UTC
            -- end_time NULL means the session is open
            CREATE TABLE IF NOT EXISTS work_sessions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                location_id INTEGER,
                project_id INTEGER,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (location_id) REFERENCES locations(id) ON DELETE SET NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user_start
                ON work_sessions(user_id, start_time);

            -- At most one open session per user per UTC calendar day
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_open_day
                ON work_sessions(user_id, substr(start_time, 1, 10))
                WHERE end_time IS NULL;
            ",
        )?;
        Ok(())
    }

    // ========== Users ==========

    /// Inserts a user and returns the stored record.
    ///
    /// Validation runs before the insert so a rejected submission leaves
    /// no row behind.
    pub fn insert_user(
        &self,
        username: &str,
        working_hours_weekly: u32,
    ) -> Result<User, DbError> {
        if username.is_empty() {
            return Err(ValidationError::Empty { field: "username" }.into());
        }
        if working_hours_weekly == 0 {
            return Err(ValidationError::ZeroWeeklyTarget.into());
        }
        self.conn.execute(
            "INSERT INTO users (username, working_hours_weekly) VALUES (?, ?)",
            params![username, working_hours_weekly],
        )?;
        let id = UserId::new(self.conn.last_insert_rowid())?;
        Ok(User::new(id, username, working_hours_weekly)?)
    }

    /// Fetches a user by ID.
    pub fn get_user(&self, user_id: UserId) -> Result<Option<User>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, working_hours_weekly FROM users WHERE id = ?",
                params![user_id.get()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(id, username, weekly)| {
            Ok(User::new(UserId::new(id)?, username, weekly)?)
        })
        .transpose()
    }

    /// Fetches a user, failing when the ID is unknown.
    pub fn require_user(&self, user_id: UserId) -> Result<User, DbError> {
        self.get_user(user_id)?.ok_or(DbError::UnknownUser(user_id))
    }

    /// Lists all users ordered by ID.
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, working_hours_weekly FROM users ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;
        let mut users = Vec::new();
        for row in rows {
            let (id, username, weekly) = row?;
            users.push(User::new(UserId::new(id)?, username, weekly)?);
        }
        Ok(users)
    }

    // ========== Locations & projects ==========

    /// Inserts a location for a user.
    pub fn insert_location(
        &self,
        user_id: UserId,
        description: &str,
    ) -> Result<Location, DbError> {
        self.require_user(user_id)?;
        self.conn.execute(
            "INSERT INTO locations (user_id, description) VALUES (?, ?)",
            params![user_id.get(), description],
        )?;
        Ok(Location {
            id: LocationId::new(self.conn.last_insert_rowid())?,
            user_id,
            description: description.to_string(),
        })
    }

    /// Lists a user's locations ordered by ID.
    pub fn list_locations(&self, user_id: UserId) -> Result<Vec<Location>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description FROM locations WHERE user_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id.get()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut locations = Vec::new();
        for row in rows {
            let (id, description) = row?;
            locations.push(Location {
                id: LocationId::new(id)?,
                user_id,
                description,
            });
        }
        Ok(locations)
    }

    /// Inserts a project for a user.
    pub fn insert_project(
        &self,
        user_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, DbError> {
        self.require_user(user_id)?;
        self.conn.execute(
            "INSERT INTO projects (user_id, name, description) VALUES (?, ?, ?)",
            params![user_id.get(), name, description],
        )?;
        Ok(Project {
            id: ProjectId::new(self.conn.last_insert_rowid())?,
            user_id,
            name: name.to_string(),
            description: description.map(String::from),
        })
    }

    /// Lists a user's projects ordered by ID.
    pub fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description FROM projects WHERE user_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id.get()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;
        let mut projects = Vec::new();
        for row in rows {
            let (id, name, description) = row?;
            projects.push(Project {
                id: ProjectId::new(id)?,
                user_id,
                name,
                description,
            });
        }
        Ok(projects)
    }

    /// Location descriptions keyed by ID, for export resolution.
    pub fn location_descriptions(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<LocationId, String>, DbError> {
        Ok(self
            .list_locations(user_id)?
            .into_iter()
            .map(|l| (l.id, l.description))
            .collect())
    }

    /// Project names keyed by ID, for export resolution.
    pub fn project_names(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<ProjectId, String>, DbError> {
        Ok(self
            .list_projects(user_id)?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect())
    }

    // ========== Regulations ==========

    /// Inserts a break regulation.
    pub fn insert_regulation(
        &self,
        working_hours: u32,
        break_minutes: u32,
    ) -> Result<Regulation, DbError> {
        self.conn.execute(
            "INSERT INTO regulations (working_hours, break_minutes) VALUES (?, ?)",
            params![working_hours, break_minutes],
        )?;
        Ok(Regulation {
            id: RegulationId::new(self.conn.last_insert_rowid())?,
            working_hours,
            break_minutes,
        })
    }

    /// Lists all regulations ordered by threshold.
    pub fn list_regulations(&self) -> Result<Vec<Regulation>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, working_hours, break_minutes FROM regulations
             ORDER BY working_hours ASC, break_minutes ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;
        let mut regulations = Vec::new();
        for row in rows {
            let (id, working_hours, break_minutes) = row?;
            regulations.push(Regulation {
                id: RegulationId::new(id)?,
                working_hours,
                break_minutes,
            });
        }
        Ok(regulations)
    }

    /// Loads the regulation table for the resolver.
    pub fn regulation_table(&self) -> Result<RegulationTable, DbError> {
        Ok(RegulationTable::new(self.list_regulations()?))
    }

    // ========== Session state manager ==========

    /// Saves a session submission for a user.
    ///
    /// This is an upsert keyed by (user, UTC day of `start`, open-ness):
    /// when an open session exists for the draft's day its fields are
    /// overwritten in place (the row ID is preserved), otherwise a new
    /// session is inserted. Repeated identical submissions therefore
    /// leave exactly one stored session.
    pub fn save_session(
        &mut self,
        user_id: UserId,
        draft: &SessionDraft,
    ) -> Result<WorkSession, DbError> {
        self.require_user(user_id)?;
        let day = draft.day().to_string();
        let start = format_timestamp(draft.start);
        let end = draft.end.map(format_timestamp);
        let location_id = draft.location_id.map(LocationId::get);
        let project_id = draft.project_id.map(ProjectId::get);

        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM work_sessions
                 WHERE user_id = ? AND substr(start_time, 1, 10) = ? AND end_time IS NULL",
                params![user_id.get(), day],
                |row| row.get(0),
            )
            .optional()?;

        let id = if let Some(id) = existing {
            tracing::debug!(user = user_id.get(), session = id, %day, "overwriting open session");
            tx.execute(
                "UPDATE work_sessions
                 SET start_time = ?, end_time = ?, location_id = ?, project_id = ?
                 WHERE id = ?",
                params![start, end, location_id, project_id, id],
            )?;
            id
        } else {
            tx.execute(
                "INSERT INTO work_sessions (user_id, start_time, end_time, location_id, project_id)
                 VALUES (?, ?, ?, ?, ?)",
                params![user_id.get(), start, end, location_id, project_id],
            )?;
            tx.last_insert_rowid()
        };
        tx.commit()?;

        Ok(WorkSession {
            id: SessionId::new(id)?,
            user_id,
            start: draft.start,
            end: draft.end,
            location_id: draft.location_id,
            project_id: draft.project_id,
        })
    }

    /// The open session for a user on a UTC calendar day, if any.
    pub fn open_session_on(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<Option<WorkSession>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM work_sessions
                     WHERE user_id = ? AND substr(start_time, 1, 10) = ? AND end_time IS NULL"
                ),
                params![user_id.get(), day.to_string()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    /// All sessions with start in `[start, end)`, ordered by start then ID.
    pub fn sessions_in_window(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkSession>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions
             WHERE user_id = ? AND start_time >= ? AND start_time < ?
             ORDER BY start_time ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![user_id.get(), format_timestamp(start), format_timestamp(end)],
            SessionRow::from_row,
        )?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Closed sessions with `start >= start` and `end < end`.
    ///
    /// This is the weekly-total selection: open sessions are excluded
    /// even when their start falls inside the window.
    pub fn closed_sessions_in_window(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkSession>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions
             WHERE user_id = ? AND start_time >= ? AND end_time IS NOT NULL AND end_time < ?
             ORDER BY start_time ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![user_id.get(), format_timestamp(start), format_timestamp(end)],
            SessionRow::from_row,
        )?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }
}
