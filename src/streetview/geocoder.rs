// src/streetview/geocoder.rs
use crate::errors::BotError;
use crate::http::error_body;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::GOOGLE_MAPS_BASE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Free-text address to best-match coordinate.
pub trait Geocoder {
    /// `Ok(None)` when the service found nothing.
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, BotError>;
}

// {"results":[{"geometry":{"location":{"lat":..,"lng":..}}}],"status":"OK"}
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API.
pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: GOOGLE_MAPS_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, BotError> {
        if self.api_key.is_empty() {
            return Err(BotError::Configuration("GOOGLE_API_KEY is required for geocoding".into()));
        }

        let resp = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::upstream("Google Geocoding", status, error_body(resp)));
        }

        let body: GeocodeResponse = resp
            .json()
            .map_err(|e| BotError::Decode(format!("geocode response: {e}")))?;

        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                return Err(BotError::Decode(format!(
                    "geocoder status {other}: {}",
                    body.error_message.unwrap_or_default()
                )))
            }
        }

        let found = body.results.into_iter().next().map(|r| Coordinate {
            lat: r.geometry.location.lat,
            lon: r.geometry.location.lng,
        });
        debug!(address, ?found, "geocoded");
        Ok(found)
    }
}
