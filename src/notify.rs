// src/notify.rs

use reqwest::blocking::Client;
use serde::Serialize;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum NotifyError {
    RequestFailed(String),
    ApiError(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            NotifyError::ApiError(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl Error for NotifyError {}

/// Delivery failures are logged by the caller, never retried, never fatal.
pub trait Notifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

const ALERTZY_URL: &str = "https://alertzy.app/send";

pub struct AlertzyNotifier {
    account_key: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlertzyPayload<'a> {
    account_key: &'a str,
    title: &'a str,
    message: &'a str,
    group: &'a str,
}

impl AlertzyNotifier {
    pub fn new(account_key: String) -> Self {
        Self {
            account_key,
            client: Client::new(),
        }
    }

    /// The account key must never leak into logs through error text.
    fn scrub(&self, text: String) -> String {
        text.replace(&self.account_key, "[SECRET]")
    }
}

impl Notifier for AlertzyNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let payload = AlertzyPayload {
            account_key: &self.account_key,
            title: "Price Drop Alert",
            message,
            group: "Amazon Price Watch",
        };

        let resp = self
            .client
            .post(ALERTZY_URL)
            .json(&payload)
            .send()
            .map_err(|e| NotifyError::RequestFailed(self.scrub(e.to_string())))?;

        if !resp.status().is_success() {
            let error_body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::ApiError(self.scrub(format!(
                "Failed to send alert: {}",
                error_body
            ))));
        }

        Ok(())
    }
}
