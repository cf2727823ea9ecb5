// src/ingest/client.rs
use reqwest::blocking::Client;
use tracing::{debug, info};

use super::models::{ParcelRow, SELECT_COLUMNS};
use crate::domain::address::capitalize;
use crate::errors::BotError;
use crate::http::error_body;

const DATASET_URL: &str = "https://datacatalog.cookcountyil.gov/resource/3723-97qp.json";

/// Reader for the county's Socrata (SODA) parcel-address dataset.
pub struct SodaClient {
    client: Client,
    url: String,
    token: String,
    batch_size: usize,
}

/// Quote a SoQL string literal.
fn soql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `"OAK PARK"` -> `"Oak Park"`.
pub fn title_case(s: &str) -> String {
    s.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

impl SodaClient {
    /// Fails with a configuration error when no app token is configured;
    /// nothing is requested in that case.
    pub fn new(client: Client, token: Option<&str>, batch_size: usize) -> Result<Self, BotError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::Configuration("CHICAGO_DATA_PORTAL_TOKEN not found in environment".into()))?;
        if batch_size == 0 {
            return Err(BotError::Configuration("batch size must be positive".into()));
        }

        Ok(Self {
            client,
            url: DATASET_URL.to_string(),
            token: token.to_string(),
            batch_size,
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn where_clause(year: &str, city: &str) -> String {
        format!(
            "year = {} AND caseless_one_of(prop_address_city_name, {}, {})",
            soql_string(year),
            soql_string(city),
            soql_string(&title_case(city))
        )
    }

    fn fetch_page(&self, filter: &str, offset: usize) -> Result<Vec<ParcelRow>, BotError> {
        let limit = self.batch_size.to_string();
        let offset = offset.to_string();

        let resp = self
            .client
            .get(&self.url)
            .header("X-App-Token", &self.token)
            .query(&[
                ("$select", SELECT_COLUMNS),
                ("$where", filter),
                ("$order", "pin ASC"),
                ("$limit", limit.as_str()),
                ("$offset", offset.as_str()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::upstream("Cook County data portal", status, error_body(resp)));
        }

        resp.json()
            .map_err(|e| BotError::Decode(format!("dataset page at offset {offset}: {e}")))
    }

    /// Every row for `year` and `city`, ordered by 14-digit PIN. Pages are
    /// requested until one comes back short. Any failed page fails the whole
    /// fetch.
    pub fn fetch_all(&self, year: &str, city: &str) -> Result<Vec<ParcelRow>, BotError> {
        let filter = Self::where_clause(year, city);
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            debug!(offset, limit = self.batch_size, "fetching dataset page");
            let page = self.fetch_page(&filter, offset)?;
            let n = page.len();
            rows.extend(page);
            info!(page_rows = n, total = rows.len(), "fetched dataset page");

            if n < self.batch_size {
                break;
            }
            offset += n;
        }

        Ok(rows)
    }
}
