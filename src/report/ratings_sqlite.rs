use crate::common::config::RatingsConfig;
use crate::common::errors::AppError;
use crate::report::ratings::{RatingConnection, RatingQuery, RatingRow, RatingStore};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tvr_ratings (
    channel     TEXT NOT NULL,
    program     TEXT NOT NULL,
    region      TEXT NOT NULL,
    demographic TEXT NOT NULL,
    week        INTEGER NOT NULL,
    tvr         REAL
);
CREATE INDEX IF NOT EXISTS idx_tvr_ratings_lookup
    ON tvr_ratings (program, region, demographic, week);
"#;

// Read-only ratings database. Every connect() opens a fresh connection.
pub struct SqliteRatingStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteRatingStore {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn from_config(config: &RatingsConfig) -> Option<Self> {
        config
            .database
            .as_ref()
            .map(|path| Self::new(path, Duration::from_millis(config.busy_timeout_ms)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init_schema(conn: &Connection) -> Result<(), AppError> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl RatingStore for SqliteRatingStore {
    fn connect(&self) -> Result<Box<dyn RatingConnection + '_>, AppError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        debug!(path = %self.path.display(), "opened ratings connection");
        Ok(Box::new(SqliteRatingConnection { conn }))
    }
}

struct SqliteRatingConnection {
    conn: Connection,
}

impl RatingConnection for SqliteRatingConnection {
    fn fetch(&mut self, query: &RatingQuery) -> Result<Vec<RatingRow>, AppError> {
        let channels: Vec<String> = query
            .channels
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        // ?1..?5 are fixed; the channel list follows as ?6, ?7, ...
        let placeholders = (0..channels.len())
            .map(|i| format!("?{}", i + 6))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT channel, tvr
            FROM tvr_ratings
            WHERE program = ?1
              AND region = ?2
              AND demographic = ?3
              AND week BETWEEN ?4 AND ?5
              AND tvr IS NOT NULL
              AND lower(trim(channel)) IN ({placeholders})
            ORDER BY week, rowid
            "#
        );

        let mut values: Vec<rusqlite::types::Value> = vec![
            query.program.clone().into(),
            query.region.clone().into(),
            query.demographic.clone().into(),
            query.period_start.into(),
            query.period_end.into(),
        ];
        values.extend(channels.into_iter().map(rusqlite::types::Value::from));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |r| {
            Ok(RatingRow {
                channel: r.get(0)?,
                tvr: r.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
