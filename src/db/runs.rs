use crate::errors::StoreError;
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct PipelineRun {
    pub id: i64,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub items_ok: Option<i64>,
    pub items_failed: Option<i64>,
    pub success: Option<bool>,
    pub error_message: Option<String>,
}

pub fn start_run(conn: &Connection, now: i64) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO pipeline_runs (started_at, success) VALUES (?, 0)",
        params![now],
    )
    .map_err(|e| StoreError::DbError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn end_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    items_ok: usize,
    items_failed: usize,
    success: bool,
    error: Option<String>,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE pipeline_runs SET finished_at = ?, items_ok = ?, items_failed = ?, success = ?, error_message = ? WHERE id = ?",
        params![now, items_ok, items_failed, success, error, run_id],
    ).map_err(|e| StoreError::DbError(e.to_string()))?;
    Ok(())
}

pub fn get_recent_runs(conn: &Connection) -> Result<Vec<PipelineRun>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, started_at, finished_at, items_ok, items_failed, success, error_message FROM pipeline_runs ORDER BY started_at DESC LIMIT 50")
        .map_err(|e| StoreError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PipelineRun {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                items_ok: row.get(3)?,
                items_failed: row.get(4)?,
                success: row.get(5)?,
                error_message: row.get(6)?,
            })
        })
        .map_err(|e| StoreError::DbError(e.to_string()))?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r.map_err(|e| StoreError::DbError(e.to_string()))?);
    }
    Ok(runs)
}
