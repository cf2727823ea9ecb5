// src/http.rs
use crate::errors::BotError;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("everylot/", env!("CARGO_PKG_VERSION"));

/// Blocking client shared by every collaborator. No custom timeout: callers
/// that need bounded latency wrap the process.
pub fn http_client() -> Result<Client, BotError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| BotError::Network(format!("failed to build HTTP client: {e}")))
}

/// Read an error body for logging without failing on it.
pub(crate) fn error_body(resp: reqwest::blocking::Response) -> String {
    resp.text().unwrap_or_else(|_| "(no body)".to_string())
}
