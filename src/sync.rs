// src/sync.rs

use crate::domain::record::{format_cents, ListingRecord};
use crate::sheets::{SheetError, SheetStore};
use std::error::Error;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum SyncError {
    /// All attempts failed; carries the last underlying cause.
    Exhausted { attempts: u32, last: SheetError },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Exhausted { attempts, last } => {
                write!(f, "Sync failed after {attempts} attempts: {last}")
            }
        }
    }
}

impl Error for SyncError {}

pub struct SyncCoordinator {
    attempts: u32,
    retry_delay: Duration,
}

impl SyncCoordinator {
    pub fn new(attempts: u32, retry_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    /// Destructive-replace upload of a snapshot to its sheet.
    ///
    /// The whole delete-create-write sequence is retried as a unit. A failure
    /// mid-sequence can leave the sheet absent until the next attempt; the
    /// store's delete treats that as a no-op and create/write are repeatable.
    pub fn sync<S: SheetStore>(
        &self,
        store: &S,
        item_label: &str,
        records: &[ListingRecord],
    ) -> Result<(), SyncError> {
        let rows = snapshot_rows(records);
        let mut last_err = None;

        for attempt in 1..=self.attempts {
            match replace_sheet(store, item_label, &rows) {
                Ok(()) => {
                    println!("✅ Synced '{item_label}' ({} rows)", rows.len());
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("❌ Sync attempt {attempt} for '{item_label}' failed: {e}");
                    last_err = Some(e);
                    if attempt < self.attempts {
                        eprintln!("🔁 Retrying...");
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }

        Err(SyncError::Exhausted {
            attempts: self.attempts,
            last: last_err
                .unwrap_or_else(|| SheetError::RequestFailed("sync retry loop failed".into())),
        })
    }
}

fn replace_sheet<S: SheetStore>(
    store: &S,
    name: &str,
    rows: &[Vec<String>],
) -> Result<(), SheetError> {
    store.delete_sheet(name)?;
    store.create_sheet(name)?;
    store.write_rows(name, rows)
}

/// Header row plus one row per record.
pub fn snapshot_rows(records: &[ListingRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(vec![
        "Title".to_string(),
        "Price".to_string(),
        "ProductId".to_string(),
    ]);
    for rec in records {
        rows.push(vec![
            rec.title.clone(),
            format_cents(rec.price_cents),
            rec.product_id.clone(),
        ]);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Fails the first `fail_times` write_rows calls, succeeds afterwards.
    struct FlakySheets {
        fail_times: u32,
        attempts: RefCell<u32>,
        sheets: RefCell<HashMap<String, Vec<Vec<String>>>>,
    }

    impl FlakySheets {
        fn new(fail_times: u32) -> Self {
            Self {
                fail_times,
                attempts: RefCell::new(0),
                sheets: RefCell::new(HashMap::new()),
            }
        }
    }

    impl SheetStore for FlakySheets {
        fn delete_sheet(&self, name: &str) -> Result<(), SheetError> {
            // absent sheet is a no-op, like the real store
            self.sheets.borrow_mut().remove(name);
            Ok(())
        }

        fn create_sheet(&self, name: &str) -> Result<(), SheetError> {
            self.sheets.borrow_mut().insert(name.to_string(), vec![]);
            Ok(())
        }

        fn write_rows(&self, name: &str, rows: &[Vec<String>]) -> Result<(), SheetError> {
            let mut attempts = self.attempts.borrow_mut();
            *attempts += 1;
            if *attempts <= self.fail_times {
                return Err(SheetError::RequestFailed("simulated outage".into()));
            }
            self.sheets
                .borrow_mut()
                .insert(name.to_string(), rows.to_vec());
            Ok(())
        }
    }

    fn records() -> Vec<ListingRecord> {
        vec![ListingRecord {
            title: "Wooden Train Set".to_string(),
            price_cents: 1999,
            product_id: "B0TOY".to_string(),
        }]
    }

    fn coordinator() -> SyncCoordinator {
        SyncCoordinator::new(3, Duration::ZERO)
    }

    #[test]
    fn succeeds_on_third_attempt() {
        let store = FlakySheets::new(2);
        coordinator().sync(&store, "toy", &records()).unwrap();

        assert_eq!(*store.attempts.borrow(), 3);
        let sheets = store.sheets.borrow();
        let rows = sheets.get("toy").unwrap();
        assert_eq!(rows[0], vec!["Title", "Price", "ProductId"]);
        assert_eq!(rows[1], vec!["Wooden Train Set", "19.99", "B0TOY"]);
    }

    #[test]
    fn gives_up_after_exactly_three_attempts() {
        let store = FlakySheets::new(u32::MAX);
        let err = coordinator().sync(&store, "toy", &records()).unwrap_err();

        assert_eq!(*store.attempts.borrow(), 3);
        let SyncError::Exhausted { attempts, .. } = err;
        assert_eq!(attempts, 3);
    }

    #[test]
    fn header_row_comes_first() {
        let rows = snapshot_rows(&records());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Title", "Price", "ProductId"]);
    }
}
