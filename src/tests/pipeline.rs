use crate::db::snapshots::{read_current, read_previous, write_current};
use crate::domain::record::ListingRecord;
use crate::notify::{Notifier, NotifyError};
use crate::pipeline::{run, run_item, Step};
use crate::scraper::models::RawListing;
use crate::scraper::{ListingSource, ScraperError};
use crate::sheets::{SheetError, SheetStore};
use crate::tests::utils::{init_test_db, test_config};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// Serves a scripted sequence of pages across fetch calls.
struct ScriptedSource {
    pages: VecDeque<Result<Vec<RawListing>, ScraperError>>,
}

impl ScriptedSource {
    fn new(pages: Vec<Result<Vec<RawListing>, ScraperError>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }
}

impl ListingSource for ScriptedSource {
    fn fetch_page(&mut self, _search_term: &str) -> Result<Vec<RawListing>, ScraperError> {
        self.pages.pop_front().unwrap_or(Err(ScraperError::NoResults))
    }

    fn has_next_page(&self) -> bool {
        !self.pages.is_empty()
    }

    fn go_next_page(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }
}

struct CollectingNotifier {
    messages: RefCell<Vec<String>>,
}

impl CollectingNotifier {
    fn new() -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}

struct MemorySheets {
    sheets: RefCell<HashMap<String, Vec<Vec<String>>>>,
}

impl MemorySheets {
    fn new() -> Self {
        Self {
            sheets: RefCell::new(HashMap::new()),
        }
    }
}

impl SheetStore for MemorySheets {
    fn delete_sheet(&self, name: &str) -> Result<(), SheetError> {
        self.sheets.borrow_mut().remove(name);
        Ok(())
    }

    fn create_sheet(&self, name: &str) -> Result<(), SheetError> {
        self.sheets.borrow_mut().insert(name.to_string(), vec![]);
        Ok(())
    }

    fn write_rows(&self, name: &str, rows: &[Vec<String>]) -> Result<(), SheetError> {
        self.sheets
            .borrow_mut()
            .insert(name.to_string(), rows.to_vec());
        Ok(())
    }
}

fn raw(title: &str, whole: &str, fraction: &str, id: &str) -> RawListing {
    RawListing {
        title: title.to_string(),
        price_whole: Some(whole.to_string()),
        price_fraction: Some(fraction.to_string()),
        product_id: id.to_string(),
    }
}

fn seeded(id: &str, title: &str, cents: i64) -> ListingRecord {
    ListingRecord {
        title: title.to_string(),
        price_cents: cents,
        product_id: id.to_string(),
    }
}

#[test]
fn end_to_end_single_item() {
    let config = test_config();
    let db = init_test_db("e2e");
    write_current(&db, "toy", &[seeded("A1", "item A1", 2000)]).unwrap();

    let mut source = ScriptedSource::new(vec![Ok(vec![
        raw("item A1", "18", "00", "A1"),
        raw("item B2", "5", "00", "B2"),
    ])]);
    let notifier = CollectingNotifier::new();
    let sheets = MemorySheets::new();

    let report = run_item(&config, &db, &mut source, &notifier, &sheets, "toy").unwrap();

    // B2 has no prior record, so only A1 produces a delta
    assert_eq!(report.records, 2);
    assert_eq!(report.deltas.len(), 1);
    assert_eq!(report.deltas[0].product_id, "A1");
    assert!((report.deltas[0].drop_percent - (-10.0)).abs() < 1e-9);

    // a -10% change does not pass the literal >= +10 threshold
    assert!(!report.alerted);
    assert!(notifier.messages.borrow().is_empty());

    // the diffed baseline is now the previous generation
    assert_eq!(
        read_previous(&db, "toy").unwrap().unwrap(),
        vec![seeded("A1", "item A1", 2000)]
    );
    let current = read_current(&db, "toy").unwrap().unwrap();
    assert_eq!(current.len(), 2);

    // replace-sync mirrored header + both records
    let stored = sheets.sheets.borrow();
    let rows = stored.get("toy").unwrap();
    assert_eq!(rows[0], vec!["Title", "Price", "ProductId"]);
    assert_eq!(rows.len(), 3);
}

#[test]
fn price_jump_over_threshold_sends_alert() {
    let config = test_config();
    let db = init_test_db("alert");
    write_current(&db, "toy", &[seeded("A1", "item A1", 10_000)]).unwrap();

    let mut source = ScriptedSource::new(vec![Ok(vec![raw("item A1", "112", "00", "A1")])]);
    let notifier = CollectingNotifier::new();
    let sheets = MemorySheets::new();

    let report = run_item(&config, &db, &mut source, &notifier, &sheets, "toy").unwrap();

    assert!(report.alerted);
    let messages = notifier.messages.borrow();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("item A1"));
    assert!(messages[0].contains("ASIN: A1"));
    assert!(messages[0].contains("Old: $100.00"));
    assert!(messages[0].contains("New: $112.00"));
}

#[test]
fn first_page_failure_fails_item_only() {
    let config = test_config();
    let db = init_test_db("isolation");

    // first item: fetch dies on page one; second item: one good page
    let mut source = ScriptedSource::new(vec![
        Err(ScraperError::Network("connection reset".into())),
        Ok(vec![raw("item C9", "50", "00", "C9")]),
    ]);
    let notifier = CollectingNotifier::new();
    let sheets = MemorySheets::new();

    let items = vec!["alpha".to_string(), "beta".to_string()];
    let summary = run(&config, &db, &mut source, &notifier, &sheets, &items);

    assert_eq!(summary.items_failed, 1);
    assert_eq!(summary.items_ok, 1);

    // the failed item never persisted or synced; the good one did
    assert!(read_current(&db, "alpha").unwrap().is_none());
    assert!(read_current(&db, "beta").unwrap().is_some());
    let stored = sheets.sheets.borrow();
    assert!(!stored.contains_key("alpha"));
    assert!(stored.contains_key("beta"));
}

#[test]
fn later_page_failure_truncates_but_item_succeeds() {
    let config = test_config();
    let db = init_test_db("truncate");

    let mut source = ScriptedSource::new(vec![
        Ok(vec![raw("item A1", "20", "00", "A1")]),
        Err(ScraperError::Network("pagination timed out".into())),
    ]);
    let notifier = CollectingNotifier::new();
    let sheets = MemorySheets::new();

    let report = run_item(&config, &db, &mut source, &notifier, &sheets, "toy").unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.records, 1);
}

#[test]
fn page_retrieval_capped_at_max_pages() {
    let config = test_config(); // max_pages = 3
    let db = init_test_db("cap");

    let page = |n: u32| Ok(vec![raw("item", "10", "00", &format!("B{n}"))]);
    let mut source = ScriptedSource::new(vec![page(1), page(2), page(3), page(4), page(5)]);
    let notifier = CollectingNotifier::new();
    let sheets = MemorySheets::new();

    let report = run_item(&config, &db, &mut source, &notifier, &sheets, "toy").unwrap();

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.records, 3);
}

#[test]
fn sync_exhaustion_is_reported_as_sync_step() {
    struct DeadSheets;
    impl SheetStore for DeadSheets {
        fn delete_sheet(&self, _name: &str) -> Result<(), SheetError> {
            Err(SheetError::RequestFailed("offline".into()))
        }
        fn create_sheet(&self, _name: &str) -> Result<(), SheetError> {
            Err(SheetError::RequestFailed("offline".into()))
        }
        fn write_rows(&self, _name: &str, _rows: &[Vec<String>]) -> Result<(), SheetError> {
            Err(SheetError::RequestFailed("offline".into()))
        }
    }

    let config = test_config();
    let db = init_test_db("sync_fail");
    let mut source = ScriptedSource::new(vec![Ok(vec![raw("item A1", "20", "00", "A1")])]);
    let notifier = CollectingNotifier::new();

    let err = run_item(&config, &db, &mut source, &notifier, &DeadSheets, "toy").unwrap_err();
    assert_eq!(err.step, Step::Sync);

    // persist happened before the sync failure
    assert!(read_current(&db, "toy").unwrap().is_some());
}
