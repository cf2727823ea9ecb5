// src/publish/bluesky.rs
use chrono::{SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{Post, Publisher};
use crate::config::Config;
use crate::domain::lot::Platform;
use crate::errors::BotError;
use crate::http::error_body;

const IMAGE_ALT: &str = "Property photo";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
struct UploadedBlob {
    blob: Value,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    uri: String,
}

/// Posts to a Bluesky PDS over XRPC. Logs in once when built.
pub struct BlueskyPublisher {
    client: Client,
    service: String,
    session: Session,
}

fn publish_error(message: impl Into<String>) -> BotError {
    BotError::Publish {
        platform: Platform::Bluesky,
        message: message.into(),
    }
}

impl BlueskyPublisher {
    pub fn login(
        client: Client,
        service: &str,
        identifier: &str,
        password: &str,
    ) -> Result<Self, BotError> {
        if identifier.is_empty() || password.is_empty() {
            return Err(BotError::Auth("missing Bluesky credentials".into()));
        }

        let service = service.trim_end_matches('/').to_string();
        let resp = client
            .post(format!("{service}/xrpc/com.atproto.server.createSession"))
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .map_err(|e| BotError::Auth(format!("Bluesky login request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::Auth(format!(
                "Bluesky login HTTP {status}: {}",
                error_body(resp)
            )));
        }

        let session: Session = resp
            .json()
            .map_err(|e| BotError::Auth(format!("Bluesky session response: {e}")))?;
        debug!(did = %session.did, "logged into Bluesky");

        Ok(Self {
            client,
            service,
            session,
        })
    }

    pub fn from_config(client: Client, config: &Config) -> Result<Self, BotError> {
        let identifier = config.bluesky_identifier.as_deref().unwrap_or_default();
        let password = config.bluesky_password.as_deref().unwrap_or_default();
        Self::login(client, &config.bluesky_service, identifier, password)
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{method}", self.service)
    }

    fn upload_blob(&self, image: &[u8]) -> Result<Value, BotError> {
        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&self.session.access_jwt)
            .header("Content-Type", "image/jpeg")
            .body(image.to_vec())
            .send()
            .map_err(|e| publish_error(format!("blob upload request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(publish_error(format!("blob upload HTTP {status}: {}", error_body(resp))));
        }

        let uploaded: UploadedBlob = resp
            .json()
            .map_err(|e| publish_error(format!("blob upload response: {e}")))?;
        Ok(uploaded.blob)
    }
}

impl Publisher for BlueskyPublisher {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    fn publish(&self, post: &Post) -> Result<String, BotError> {
        let mut record = json!({
            "$type": "app.bsky.feed.post",
            "text": post.text,
            "createdAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        if let Some(image) = &post.image {
            let blob = self.upload_blob(image)?;
            record["embed"] = json!({
                "$type": "app.bsky.embed.images",
                "images": [{ "image": blob, "alt": IMAGE_ALT }],
            });
        }

        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&self.session.access_jwt)
            .json(&json!({
                "repo": self.session.did,
                "collection": "app.bsky.feed.post",
                "record": record,
            }))
            .send()
            .map_err(|e| publish_error(format!("create record request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(publish_error(format!("create record HTTP {status}: {}", error_body(resp))));
        }

        let created: CreatedRecord = resp
            .json()
            .map_err(|e| publish_error(format!("create record response: {e}")))?;
        debug!(uri = %created.uri, "posted to Bluesky");
        Ok(created.uri)
    }
}
