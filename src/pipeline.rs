// src/pipeline.rs

use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::db::{runs, snapshots};
use crate::domain::alert::select_and_format;
use crate::domain::diff::compute_deltas;
use crate::domain::normalize::normalize_listings;
use crate::domain::record::PriceDelta;
use crate::notify::Notifier;
use crate::scraper::models::RawListing;
use crate::scraper::ListingSource;
use crate::sheets::SheetStore;
use crate::spreadsheets::export_snapshot_xlsx;
use crate::sync::SyncCoordinator;
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Per-item state machine. Any step can fail; failure is terminal for the
/// item only, never for the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch,
    Normalize,
    Diff,
    Persist,
    Alert,
    Export,
    Sync,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Fetch => "fetch",
            Step::Normalize => "normalize",
            Step::Diff => "diff",
            Step::Persist => "persist",
            Step::Alert => "alert",
            Step::Export => "export",
            Step::Sync => "sync",
        }
    }
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub cause: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step '{}' failed: {}", self.step.name(), self.cause)
    }
}

impl std::error::Error for StepFailure {}

fn fail(step: Step, cause: impl fmt::Display) -> StepFailure {
    StepFailure {
        step,
        cause: cause.to_string(),
    }
}

/// For steps whose failure is reported but never fails the item.
fn report_nonfatal(item_label: &str, step: Step, err: impl fmt::Display) {
    eprintln!(
        "❌ '{item_label}' step '{}' failed (continuing): {err}",
        step.name()
    );
}

#[derive(Debug)]
pub struct ItemReport {
    pub pages_fetched: usize,
    pub records: usize,
    pub skipped_no_price: usize,
    pub malformed: usize,
    pub deltas: Vec<PriceDelta>,
    pub alerted: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub items_ok: usize,
    pub items_failed: usize,
}

/// Runs the whole tracked-item batch sequentially.
///
/// One item's failure is logged and the batch moves on; only startup
/// (config, db init) can stop a run before it visits every item.
pub fn run<S, N, G>(
    config: &AppConfig,
    db: &Database,
    source: &mut S,
    notifier: &N,
    sheets: &G,
    items: &[String],
) -> RunSummary
where
    S: ListingSource,
    N: Notifier,
    G: SheetStore,
{
    let now_start = chrono::Utc::now().timestamp();
    let run_id = db
        .with_conn(|conn| runs::start_run(conn, now_start))
        .unwrap_or(0);

    let mut summary = RunSummary::default();

    for (i, item_label) in items.iter().enumerate() {
        println!("🛒 Processing '{item_label}' ({}/{})", i + 1, items.len());

        match run_item(config, db, source, notifier, sheets, item_label) {
            Ok(report) => {
                summary.items_ok += 1;
                println!(
                    "✅ '{item_label}': {} records over {} pages, {} deltas{}",
                    report.records,
                    report.pages_fetched,
                    report.deltas.len(),
                    if report.alerted { ", alert sent" } else { "" },
                );
                if report.skipped_no_price > 0 || report.malformed > 0 {
                    println!(
                        "⚠️ '{item_label}': skipped {} unpriced, {} malformed",
                        report.skipped_no_price, report.malformed
                    );
                }
            }
            Err(e) => {
                summary.items_failed += 1;
                eprintln!("❌ '{item_label}' {e}");
            }
        }

        if i + 1 < items.len() && config.item_pause_max_secs > 0 {
            let secs = rand::thread_rng()
                .gen_range(config.item_pause_min_secs..=config.item_pause_max_secs);
            std::thread::sleep(Duration::from_secs(secs));
        }
    }

    let now_end = chrono::Utc::now().timestamp();
    let _ = db.with_conn(|conn| {
        runs::end_run(
            conn,
            run_id,
            now_end,
            summary.items_ok,
            summary.items_failed,
            summary.items_failed == 0,
            None,
        )
    });

    summary
}

/// fetch → normalize → diff (against the old previous) → persist (demoting
/// current to previous) → alert → export → sync. Diff must run before
/// persist, and persist before sync.
pub fn run_item<S, N, G>(
    config: &AppConfig,
    db: &Database,
    source: &mut S,
    notifier: &N,
    sheets: &G,
    item_label: &str,
) -> Result<ItemReport, StepFailure>
where
    S: ListingSource,
    N: Notifier,
    G: SheetStore,
{
    // FETCH
    let (raw, pages_fetched) = fetch_pages(source, item_label, config.max_pages)?;

    // NORMALIZE
    let outcome = normalize_listings(&raw);

    // DIFF: the baseline is the previously recorded snapshot, which still
    // sits in the CURRENT generation until persist demotes it. Must run
    // before persist discards the older generation.
    let baseline = snapshots::read_current(db, item_label).map_err(|e| fail(Step::Diff, e))?;
    let deltas = match &baseline {
        Some(prev) => compute_deltas(&outcome.records, prev),
        None => {
            println!("🆕 First run for '{item_label}', no previous snapshot to diff");
            Vec::new()
        }
    };

    // PERSIST
    snapshots::write_current(db, item_label, &outcome.records)
        .map_err(|e| fail(Step::Persist, e))?;

    // ALERT: delivery failures are logged, not retried, not fatal.
    let mut alerted = false;
    if let Some(message) = select_and_format(&deltas, config.threshold_percent) {
        match notifier.notify(&message) {
            Ok(()) => {
                alerted = true;
                println!(
                    "📲 Alert sent for '{item_label}' ({}% threshold)",
                    config.threshold_percent
                );
            }
            Err(e) => report_nonfatal(item_label, Step::Alert, e),
        }
    }

    // EXPORT: local mirror, best effort.
    match export_snapshot_xlsx(&outcome.records, &config.exports_dir, item_label) {
        Ok(path) => println!("💾 Snapshot exported to {path}"),
        Err(e) => report_nonfatal(item_label, Step::Export, e),
    }

    // SYNC
    let coordinator = SyncCoordinator::new(
        config.sync_attempts,
        Duration::from_secs(config.sync_retry_secs),
    );
    coordinator
        .sync(sheets, item_label, &outcome.records)
        .map_err(|e| fail(Step::Sync, e))?;

    Ok(ItemReport {
        pages_fetched,
        records: outcome.records.len(),
        skipped_no_price: outcome.skipped_no_price,
        malformed: outcome.malformed,
        deltas,
        alerted,
    })
}

/// Retrieves up to `max_pages` result pages. A failure on the first page
/// fails the item; a failure after that truncates retrieval and keeps what
/// was already collected.
fn fetch_pages<S: ListingSource>(
    source: &mut S,
    item_label: &str,
    max_pages: u32,
) -> Result<(Vec<RawListing>, usize), StepFailure> {
    let mut raw = Vec::new();
    let mut pages_fetched = 0;

    for page in 1..=max_pages {
        match source.fetch_page(item_label) {
            Ok(listings) => {
                raw.extend(listings);
                pages_fetched += 1;
            }
            Err(e) if pages_fetched == 0 => return Err(fail(Step::Fetch, e)),
            Err(e) => {
                eprintln!("🛑 Page {page} for '{item_label}' failed, truncating: {e}");
                break;
            }
        }

        if page == max_pages || !source.has_next_page() {
            break;
        }
        if let Err(e) = source.go_next_page() {
            eprintln!("🛑 Pagination for '{item_label}' stopped: {e}");
            break;
        }
    }

    Ok((raw, pages_fetched))
}
