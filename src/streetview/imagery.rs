// src/streetview/imagery.rs
use crate::domain::camera::CameraParams;
use crate::errors::BotError;
use crate::http::error_body;
use reqwest::blocking::Client;
use tracing::debug;

use super::GOOGLE_MAPS_BASE;

/// Street-level photo source.
pub trait Imagery {
    fn fetch(&self, location: &str, camera: CameraParams) -> Result<Vec<u8>, BotError>;
}

/// Google Street View Static API.
pub struct StreetViewClient {
    client: Client,
    base_url: String,
    api_key: String,
    size: String,
}

impl StreetViewClient {
    pub fn new(client: Client, api_key: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            client,
            base_url: GOOGLE_MAPS_BASE.to_string(),
            api_key: api_key.into(),
            size: size.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Imagery for StreetViewClient {
    fn fetch(&self, location: &str, camera: CameraParams) -> Result<Vec<u8>, BotError> {
        if self.api_key.is_empty() {
            return Err(BotError::Configuration(
                "GOOGLE_API_KEY is required for Street View".into(),
            ));
        }

        let fov = camera.fov.to_string();
        let pitch = camera.pitch.to_string();
        let resp = self
            .client
            .get(format!("{}/maps/api/streetview", self.base_url))
            .query(&[
                ("location", location),
                ("size", self.size.as_str()),
                ("fov", fov.as_str()),
                ("pitch", pitch.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::upstream("Street View", status, error_body(resp)));
        }

        let bytes = resp.bytes()?;
        debug!(location, bytes = bytes.len(), "fetched Street View image");
        Ok(bytes.to_vec())
    }
}
