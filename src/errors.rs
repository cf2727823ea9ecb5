// errors.rs
use crate::domain::lot::Platform;
use thiserror::Error;

/// Errors from the bot itself (configuration, selection, location) or from
/// the services it talks to (dataset, Google, publishers, SQLite).
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or malformed setting. Aborts the run before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{service} returned HTTP {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Publishing to {platform} failed: {message}")]
    Publish { platform: Platform, message: String },

    #[error("No usable location: {0}")]
    NoLocation(String),

    #[error("Database error: {0}")]
    Db(String),
}

impl BotError {
    /// Errors that stop the whole run rather than one step of it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Configuration(_) | BotError::Db(_))
    }

    pub(crate) fn upstream(service: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        BotError::Upstream {
            service,
            status: status.as_u16(),
            message: body,
        }
    }
}

impl From<rusqlite::Error> for BotError {
    fn from(err: rusqlite::Error) -> Self {
        BotError::Db(err.to_string())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_and_db_errors_are_fatal() {
        assert!(BotError::Configuration("x".into()).is_fatal());
        assert!(BotError::Db("locked".into()).is_fatal());
        assert!(!BotError::NoLocation("x".into()).is_fatal());
        assert!(!BotError::Publish {
            platform: Platform::Bluesky,
            message: "rate limited".into()
        }
        .is_fatal());
    }

    #[test]
    fn publish_error_names_the_platform() {
        let err = BotError::Publish {
            platform: Platform::Twitter,
            message: "401".into(),
        };
        assert_eq!(err.to_string(), "Publishing to Twitter failed: 401");
    }
}
