use crate::domain::record::ListingRecord;
use crate::errors::StoreError;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Writes the snapshot to a local workbook for offline inspection,
/// mirroring the layout pushed to the remote sheet.
pub fn export_snapshot_xlsx(
    records: &[ListingRecord],
    exports_dir: &str,
    item_label: &str,
) -> Result<String, StoreError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let headers = ["Title", "Price", "ProductId"];
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                StoreError::IoError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    for (i, rec) in records.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_string(r, 0, &rec.title)
            .map_err(|e| StoreError::IoError(format!("Failed to write title: {}", e)))?;

        worksheet
            .write_number(r, 1, rec.price_cents as f64 / 100.0)
            .map_err(|e| StoreError::IoError(format!("Failed to write price: {}", e)))?;

        worksheet
            .write_string(r, 2, &rec.product_id)
            .map_err(|e| StoreError::IoError(format!("Failed to write product id: {}", e)))?;
    }

    std::fs::create_dir_all(exports_dir)
        .map_err(|e| StoreError::IoError(format!("Failed to create {exports_dir}: {e}")))?;

    let file_tag = item_label.replace(' ', "_");
    let path = Path::new(exports_dir).join(format!("{file_tag}.xlsx"));
    let path_str = path.to_string_lossy().into_owned();

    workbook
        .save(&path)
        .map_err(|e| StoreError::IoError(format!("Failed to save workbook: {}", e)))?;

    Ok(path_str)
}
