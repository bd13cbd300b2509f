use crate::config::DatabaseConfig;
use crate::db::models::Category;
use duckdb::{params, Connection, Result as DbResult};
use std::sync::{Arc, Mutex};
use tracing::info;

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS seq_reports_id;

CREATE TABLE IF NOT EXISTS users (
    user_id BIGINT PRIMARY KEY,
    category VARCHAR NOT NULL,
    description VARCHAR NOT NULL,
    website VARCHAR NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS reports (
    id BIGINT PRIMARY KEY DEFAULT nextval('seq_reports_id'),
    category VARCHAR NOT NULL,
    title VARCHAR NOT NULL,
    source VARCHAR NOT NULL,
    file_path VARCHAR NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_category ON reports(category);
"#;

const SAMPLE_REPORTS: [(Category, &str, &str, &str); 6] = [
    (
        Category::FinTech,
        "2024 FinTech Market Analysis",
        "McKinsey Global",
        "fintech_report_2024.pdf",
    ),
    (Category::FinTech, "Digital Banking Trends 2025", "Deloitte", "digital_banking_2025.pdf"),
    (Category::Automotive, "EV Market Report 2024", "Bloomberg", "ev_market_2024.pdf"),
    (Category::Automotive, "Future of Autonomous Vehicles", "Forbes", "autonomous_vehicles.pdf"),
    (Category::Retail, "E-commerce Trends 2025", "eMarketer", "ecommerce_2025.pdf"),
    (Category::Retail, "Digital Retail Innovation", "Gartner", "retail_innovation.pdf"),
];

pub fn get_connection(config: &DatabaseConfig) -> DbResult<DbPool> {
    info!("Connecting to DuckDB at {}", config.path);
    let conn = Connection::open(&config.path)?;

    init_schema(&conn)?;
    seed_reports(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

fn init_schema(conn: &Connection) -> DbResult<()> {
    info!("Initializing database schema");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Replaces the report catalog with the bundled sample entries.
pub fn seed_reports(conn: &Connection) -> DbResult<()> {
    conn.execute("BEGIN TRANSACTION", [])?;

    if let Err(e) = insert_sample_reports(conn) {
        let _ = conn.execute("ROLLBACK", []);
        return Err(e);
    }

    conn.execute("COMMIT", [])?;
    info!("Seeded {} sample reports", SAMPLE_REPORTS.len());
    Ok(())
}

fn insert_sample_reports(conn: &Connection) -> DbResult<()> {
    conn.execute("DELETE FROM reports", [])?;

    let mut stmt = conn.prepare(
        "INSERT INTO reports (category, title, source, file_path) VALUES (?, ?, ?, ?)",
    )?;
    for (category, title, source, file_path) in SAMPLE_REPORTS {
        stmt.execute(params![category.as_str(), title, source, file_path])?;
    }
    Ok(())
}
