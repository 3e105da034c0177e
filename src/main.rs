use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::notify::AlertzyNotifier;
use crate::scraper::AmazonSearch;
use crate::sheets::GoogleSheets;
use std::time::Instant;

mod config;
mod db;
mod domain;
mod errors;
mod items;
mod notify;
mod pipeline;
mod scraper;
mod sheets;
mod spreadsheets;
mod sync;

#[cfg(test)]
mod tests;

fn main() {
    // 1️⃣ Configuration first: never run partially configured
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("❌ Exiting... Please fix your environment setup.");
            std::process::exit(1);
        }
    };

    // 2️⃣ Snapshot store
    let db = Database::new(config.db_path.as_str());
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Tracked item list (editable between runs, fixed within one)
    let items = match items::read_items(&config.items_path) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("❌ Failed to load tracked items: {e}");
            std::process::exit(1);
        }
    };
    if items.is_empty() {
        println!("📦 No tracked items in {}; nothing to do.", config.items_path);
        return;
    }
    println!("📦 Items to search: {items:?}");

    // 4️⃣ External collaborators
    let mut source = match AmazonSearch::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Listing source init failed: {e}");
            std::process::exit(1);
        }
    };
    let notifier = AlertzyNotifier::new(config.alertzy_account_key.clone());
    let sheets = GoogleSheets::new(config.spreadsheet_id.clone(), config.sheets_token.clone());

    // 5️⃣ Run the batch
    let start = Instant::now();
    let summary = pipeline::run(&config, &db, &mut source, &notifier, &sheets, &items);

    println!(
        "⏰ Done: {} ok, {} failed in {:.2} minutes",
        summary.items_ok,
        summary.items_failed,
        start.elapsed().as_secs_f64() / 60.0
    );
}
