use crate::db::models::{Category, Profile, Report};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::types::Type;
use duckdb::{params, Connection, Result as DbResult, Row};
use tracing::warn;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct DbService;

impl DbService {
    fn parse_category(row: &Row, idx: usize) -> DbResult<Category> {
        let raw: String = row.get(idx)?;
        raw.parse::<Category>()
            .map_err(|e| duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    // Timestamps are selected AS VARCHAR, DuckDB renders them without a zone.
    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|e| {
                warn!("Unparseable created_at {:?}, using current time: {}", raw, e);
                Utc::now()
            })
    }

    fn row_to_profile(row: &Row) -> DbResult<Profile> {
        let created_str: String = row.get(4)?;

        Ok(Profile {
            user_id: row.get(0)?,
            category: Self::parse_category(row, 1)?,
            description: row.get(2)?,
            website: row.get(3)?,
            created_at: Self::parse_timestamp(&created_str),
        })
    }

    fn row_to_report(row: &Row) -> DbResult<Report> {
        Ok(Report {
            id: row.get(0)?,
            category: Self::parse_category(row, 1)?,
            title: row.get(2)?,
            source: row.get(3)?,
            file_path: row.get(4)?,
        })
    }

    // --- Profile Operations ---

    /// Create-or-replace: a second submission overwrites the whole row.
    pub fn upsert_profile(
        conn: &Connection,
        user_id: i64,
        category: Category,
        description: &str,
        website: &str,
    ) -> DbResult<Profile> {
        let created_at = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        conn.execute(
            "INSERT OR REPLACE INTO users (user_id, category, description, website, created_at)
             VALUES (?, ?, ?, ?, CAST(? AS TIMESTAMP))",
            params![user_id, category.as_str(), description, website, created_at],
        )?;

        Self::get_profile(conn, user_id)?.ok_or(duckdb::Error::QueryReturnedNoRows)
    }

    pub fn get_profile(conn: &Connection, user_id: i64) -> DbResult<Option<Profile>> {
        let mut stmt = conn.prepare(
            "SELECT user_id, category, description, website, CAST(created_at AS VARCHAR)
             FROM users WHERE user_id = ?",
        )?;
        let mut rows = stmt.query_map(params![user_id], Self::row_to_profile)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn list_profiles(conn: &Connection) -> DbResult<Vec<Profile>> {
        let mut stmt = conn.prepare(
            "SELECT user_id, category, description, website, CAST(created_at AS VARCHAR)
             FROM users ORDER BY created_at ASC, user_id ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_profile)?;

        rows.collect()
    }

    // --- Report Operations ---

    pub fn reports_by_category(conn: &Connection, category: Category) -> DbResult<Vec<Report>> {
        let mut stmt = conn.prepare(
            "SELECT id, category, title, source, file_path
             FROM reports WHERE category = ? ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![category.as_str()], Self::row_to_report)?;

        rows.collect()
    }

    pub fn list_reports(conn: &Connection) -> DbResult<Vec<Report>> {
        let mut stmt = conn.prepare(
            "SELECT id, category, title, source, file_path FROM reports ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_report)?;

        rows.collect()
    }
}
