use crate::db::connection::Database;
use crate::domain::record::ListingRecord;
use crate::errors::StoreError;
use chrono::Utc;
use rusqlite::params;

/// Exactly one snapshot per (item_label, generation) at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Current,
    Previous,
}

impl Generation {
    fn as_str(self) -> &'static str {
        match self {
            Generation::Current => "current",
            Generation::Previous => "previous",
        }
    }
}

/// Persists `records` as the CURRENT snapshot for `item_label`.
///
/// The old PREVIOUS is discarded, the old CURRENT becomes PREVIOUS, and the
/// new rows land as CURRENT, all inside one transaction so readers never see
/// a half-promoted pair.
pub fn write_current(
    db: &Database,
    item_label: &str,
    records: &[ListingRecord],
) -> Result<(), StoreError> {
    let now = Utc::now().naive_utc();

    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::DbError(e.to_string()))?;

        tx.execute(
            "DELETE FROM snapshots WHERE item_label = ?1 AND generation = 'previous'",
            params![item_label],
        )
        .map_err(|e| StoreError::DbError(e.to_string()))?;

        tx.execute(
            "UPDATE snapshots SET generation = 'previous'
             WHERE item_label = ?1 AND generation = 'current'",
            params![item_label],
        )
        .map_err(|e| StoreError::DbError(e.to_string()))?;

        for rec in records {
            tx.execute(
                r#"
                INSERT INTO snapshots (item_label, generation, product_id, title, price_cents, recorded_at)
                VALUES (?1, 'current', ?2, ?3, ?4, ?5)
                ON CONFLICT(item_label, generation, product_id) DO UPDATE SET
                    title = excluded.title,
                    price_cents = excluded.price_cents,
                    recorded_at = excluded.recorded_at
                "#,
                params![item_label, rec.product_id, rec.title, rec.price_cents, now],
            )
            .map_err(|e| StoreError::DbError(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| StoreError::DbError(e.to_string()))?;

        Ok(())
    })
}

/// Returns `None` when no snapshot of that generation exists yet, which is
/// the normal case on an item's first run.
pub fn read_snapshot(
    db: &Database,
    item_label: &str,
    generation: Generation,
) -> Result<Option<Vec<ListingRecord>>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "SELECT product_id, title, price_cents FROM snapshots
                 WHERE item_label = ?1 AND generation = ?2
                 ORDER BY product_id",
            )
            .map_err(|e| StoreError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params![item_label, generation.as_str()], |row| {
                Ok(ListingRecord {
                    product_id: row.get(0)?,
                    title: row.get(1)?,
                    price_cents: row.get(2)?,
                })
            })
            .map_err(|e| StoreError::DbError(e.to_string()))?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r.map_err(|e| StoreError::DbError(e.to_string()))?);
        }

        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    })
}

pub fn read_previous(
    db: &Database,
    item_label: &str,
) -> Result<Option<Vec<ListingRecord>>, StoreError> {
    read_snapshot(db, item_label, Generation::Previous)
}

pub fn read_current(
    db: &Database,
    item_label: &str,
) -> Result<Option<Vec<ListingRecord>>, StoreError> {
    read_snapshot(db, item_label, Generation::Current)
}
