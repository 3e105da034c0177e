use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};

/// Initialize a fresh test DB using the production schema.
/// Each test gets its own file; libtest runs each test on its own thread,
/// so the thread-local connection slot never crosses tests.
pub fn init_test_db(tag: &str) -> Database {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "price_watch_test_{tag}_{}.sqlite3",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}

/// Config with no pauses and no retry delays so tests run fast.
pub fn test_config() -> AppConfig {
    let mut exports = std::env::temp_dir();
    exports.push(format!("price_watch_test_exports_{}", std::process::id()));

    AppConfig {
        alertzy_account_key: "test-key".to_string(),
        spreadsheet_id: "test-spreadsheet".to_string(),
        sheets_token: "test-token".to_string(),
        threshold_percent: 10.0,
        sync_attempts: 3,
        sync_retry_secs: 0,
        max_pages: 3,
        db_path: ":memory:".to_string(),
        items_path: "items.json".to_string(),
        exports_dir: exports.to_string_lossy().into_owned(),
        item_pause_min_secs: 0,
        item_pause_max_secs: 0,
    }
}
