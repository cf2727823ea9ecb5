// src/config.rs
use crate::domain::lot::Platform;
use crate::errors::BotError;
use std::env;

pub const DEFAULT_DATABASE: &str = "cook_county_lots.db";
pub const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Every setting the bot and the ingestion job recognize. Built once at
/// startup from the environment, then adjusted by command-line flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,

    pub enable_twitter: bool,
    pub enable_bluesky: bool,

    /// Street View / geocoding query, e.g. `"{address}, CHICAGO, IL"`.
    pub search_format: String,
    /// Post text. `{address}` is the sanitized street address here.
    pub print_format: String,

    pub google_api_key: Option<String>,
    /// Overrides the pitch chosen by camera framing.
    pub streetview_pitch: Option<f64>,
    pub streetview_size: String,

    /// PIN10 to resume a series from.
    pub start_id: Option<String>,
    pub dry_run: bool,

    pub twitter_consumer_key: Option<String>,
    pub twitter_consumer_secret: Option<String>,
    pub twitter_access_token: Option<String>,
    pub twitter_access_token_secret: Option<String>,

    pub bluesky_identifier: Option<String>,
    pub bluesky_password: Option<String>,
    pub bluesky_service: String,

    pub data_portal_token: Option<String>,
    pub ingest_batch_size: usize,
    pub ingest_year: String,
    pub ingest_city: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE.to_string(),
            enable_twitter: false,
            enable_bluesky: true,
            search_format: "{address}".to_string(),
            print_format: "{address}".to_string(),
            google_api_key: None,
            streetview_pitch: None,
            streetview_size: "1000x1000".to_string(),
            start_id: None,
            dry_run: false,
            twitter_consumer_key: None,
            twitter_consumer_secret: None,
            twitter_access_token: None,
            twitter_access_token_secret: None,
            bluesky_identifier: None,
            bluesky_password: None,
            bluesky_service: DEFAULT_BLUESKY_SERVICE.to_string(),
            data_portal_token: None,
            ingest_batch_size: DEFAULT_BATCH_SIZE,
            ingest_year: "2023".to_string(),
            ingest_city: "CHICAGO".to_string(),
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, BotError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(BotError::Configuration(format!(
            "{key} must be true or false, got {raw:?}"
        ))),
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, BotError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(v) = get("DATABASE_PATH") {
            cfg.database_path = v;
        }
        if let Some(v) = get("ENABLE_TWITTER") {
            cfg.enable_twitter = parse_bool("ENABLE_TWITTER", &v)?;
        }
        if let Some(v) = get("ENABLE_BLUESKY") {
            cfg.enable_bluesky = parse_bool("ENABLE_BLUESKY", &v)?;
        }
        if let Some(v) = get("SEARCH_FORMAT") {
            cfg.search_format = v;
        }
        if let Some(v) = get("PRINT_FORMAT") {
            cfg.print_format = v;
        }
        if let Some(v) = get("STREETVIEW_PITCH") {
            let pitch = v.trim().parse::<f64>().map_err(|_| {
                BotError::Configuration(format!("STREETVIEW_PITCH must be a number, got {v:?}"))
            })?;
            cfg.streetview_pitch = Some(pitch);
        }
        if let Some(v) = get("STREETVIEW_SIZE") {
            cfg.streetview_size = v;
        }
        if let Some(v) = get("BLUESKY_SERVICE") {
            cfg.bluesky_service = v;
        }
        if let Some(v) = get("INGEST_BATCH_SIZE") {
            cfg.ingest_batch_size = match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(BotError::Configuration(format!(
                        "INGEST_BATCH_SIZE must be a positive integer, got {v:?}"
                    )))
                }
            };
        }
        if let Some(v) = get("INGEST_YEAR") {
            cfg.ingest_year = v;
        }
        if let Some(v) = get("INGEST_CITY") {
            cfg.ingest_city = v;
        }

        cfg.google_api_key = get("GOOGLE_API_KEY");
        cfg.start_id = get("START_PIN10");
        cfg.twitter_consumer_key = get("TWITTER_CONSUMER_KEY");
        cfg.twitter_consumer_secret = get("TWITTER_CONSUMER_SECRET");
        cfg.twitter_access_token = get("TWITTER_ACCESS_TOKEN");
        cfg.twitter_access_token_secret = get("TWITTER_ACCESS_TOKEN_SECRET");
        cfg.bluesky_identifier = get("BLUESKY_IDENTIFIER");
        cfg.bluesky_password = get("BLUESKY_PASSWORD");
        cfg.data_portal_token = get("CHICAGO_DATA_PORTAL_TOKEN");

        Ok(cfg)
    }

    /// Platforms to post to, Twitter first.
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| match p {
                Platform::Twitter => self.enable_twitter,
                Platform::Bluesky => self.enable_bluesky,
            })
            .collect()
    }
}
