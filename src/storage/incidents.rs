//! Incident persistence -- the store trait and its SQLite implementation.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Row};
use uuid::Uuid;

use super::{Pool, StoreError};
use crate::incident::{Category, Incident, NewIncident, Priority, Severity, Status};

/// Persistence for incidents.
///
/// Implementations own identifier generation and timestamps.
pub trait IncidentStore: Send + Sync {
    fn create(&self, incident: NewIncident) -> Result<Incident, StoreError>;

    fn list_all(&self) -> Result<Vec<Incident>, StoreError>;
}

macro_rules! text_column {
    ($($ty:ty),+) => {$(
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )+};
}

text_column!(Status, Priority, Severity, Category);

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// SQLite-backed [`IncidentStore`].
#[derive(Clone)]
pub struct SqliteIncidentStore {
    pool: Pool,
}

impl SqliteIncidentStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl IncidentStore for SqliteIncidentStore {
    fn create(&self, incident: NewIncident) -> Result<Incident, StoreError> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        let record = Incident {
            id: Uuid::new_v4().to_string(),
            title: incident.title,
            description: incident.description,
            status: incident.status,
            priority: incident.priority,
            ai_severity: incident.ai_severity,
            ai_category: incident.ai_category,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO incidents
                (id, title, description, status, priority, ai_severity, ai_category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.title,
                record.description,
                record.status,
                record.priority,
                record.ai_severity,
                record.ai_category,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        )?;

        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<Incident>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, status, priority, ai_severity, ai_category, created_at, updated_at
             FROM incidents ORDER BY created_at, id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Incident {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                status: row.get(3)?,
                priority: row.get(4)?,
                ai_severity: row.get(5)?,
                ai_category: row.get(6)?,
                created_at: parse_timestamp(row, 7)?,
                updated_at: parse_timestamp(row, 8)?,
            })
        })?;

        let mut incidents = Vec::new();
        for r in rows {
            incidents.push(r?);
        }
        Ok(incidents)
    }
}
