// src/sheets.rs

use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SheetError {
    RequestFailed(String),
    ApiError(String),
    UnexpectedShape(String),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::RequestFailed(msg) => write!(f, "Request failed: {msg}"),
            SheetError::ApiError(msg) => write!(f, "Sheets API error: {msg}"),
            SheetError::UnexpectedShape(msg) => write!(f, "Unexpected response shape: {msg}"),
        }
    }
}

impl Error for SheetError {}

/// Remote tabular store, one sheet (tab) per tracked item.
///
/// `delete_sheet` must treat an absent sheet as a no-op: a failed sync
/// attempt can leave the sheet deleted, and the retry runs the full
/// delete-create-write sequence again.
pub trait SheetStore {
    fn delete_sheet(&self, name: &str) -> Result<(), SheetError>;
    fn create_sheet(&self, name: &str) -> Result<(), SheetError>;
    fn write_rows(&self, name: &str, rows: &[Vec<String>]) -> Result<(), SheetError>;
}

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct GoogleSheets {
    spreadsheet_id: String,
    token: String,
    client: Client,
}

impl GoogleSheets {
    pub fn new(spreadsheet_id: String, token: String) -> Self {
        Self {
            spreadsheet_id,
            token,
            client: Client::new(),
        }
    }

    fn get_json(&self, url: &str) -> Result<Value, SheetError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .map_err(|e| SheetError::UnexpectedShape(e.to_string()))?;

        if !status.is_success() {
            return Err(SheetError::ApiError(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    fn post_json(&self, url: &str, payload: &Value) -> Result<(), SheetError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SheetError::ApiError(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }

    /// Numeric sheetId for a tab title, or `None` if no such tab exists.
    fn find_sheet_id(&self, name: &str) -> Result<Option<i64>, SheetError> {
        let url = format!(
            "{SHEETS_API}/{}?fields=sheets.properties",
            self.spreadsheet_id
        );
        let meta = self.get_json(&url)?;

        let sheets = meta["sheets"]
            .as_array()
            .ok_or_else(|| SheetError::UnexpectedShape("sheets missing".to_string()))?;

        for sheet in sheets {
            let props = &sheet["properties"];
            if props["title"].as_str() == Some(name) {
                let id = props["sheetId"]
                    .as_i64()
                    .ok_or_else(|| SheetError::UnexpectedShape("sheetId missing".to_string()))?;
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn batch_update(&self, request: Value) -> Result<(), SheetError> {
        let url = format!("{SHEETS_API}/{}:batchUpdate", self.spreadsheet_id);
        self.post_json(&url, &json!({ "requests": [request] }))
    }
}

impl SheetStore for GoogleSheets {
    fn delete_sheet(&self, name: &str) -> Result<(), SheetError> {
        match self.find_sheet_id(name)? {
            Some(sheet_id) => self.batch_update(json!({ "deleteSheet": { "sheetId": sheet_id } })),
            None => Ok(()), // already gone
        }
    }

    fn create_sheet(&self, name: &str) -> Result<(), SheetError> {
        self.batch_update(json!({ "addSheet": { "properties": { "title": name } } }))
    }

    fn write_rows(&self, name: &str, rows: &[Vec<String>]) -> Result<(), SheetError> {
        let url = format!(
            "{SHEETS_API}/{}/values/{}!A1?valueInputOption=RAW",
            self.spreadsheet_id, name
        );

        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .map_err(|e| SheetError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SheetError::ApiError(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}
