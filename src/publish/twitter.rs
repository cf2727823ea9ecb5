// src/publish/twitter.rs
use base64::Engine;
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::oauth::{authorization_header, nonce, OAuth1Keys};
use super::{Post, Publisher};
use crate::config::Config;
use crate::domain::lot::Platform;
use crate::errors::BotError;
use crate::http::error_body;

const UPLOAD_BASE: &str = "https://upload.twitter.com";
const API_BASE: &str = "https://api.twitter.com";

#[derive(Debug, Deserialize)]
struct MediaUpload {
    media_id_string: String,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

pub struct TwitterPublisher {
    client: Client,
    keys: OAuth1Keys,
    upload_base: String,
    api_base: String,
}

fn publish_error(message: impl Into<String>) -> BotError {
    BotError::Publish {
        platform: Platform::Twitter,
        message: message.into(),
    }
}

impl TwitterPublisher {
    pub fn new(client: Client, keys: OAuth1Keys) -> Self {
        Self {
            client,
            keys,
            upload_base: UPLOAD_BASE.to_string(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Fails with `BotError::Auth` naming every missing credential.
    pub fn from_config(client: Client, config: &Config) -> Result<Self, BotError> {
        let creds = [
            ("TWITTER_CONSUMER_KEY", &config.twitter_consumer_key),
            ("TWITTER_CONSUMER_SECRET", &config.twitter_consumer_secret),
            ("TWITTER_ACCESS_TOKEN", &config.twitter_access_token),
            ("TWITTER_ACCESS_TOKEN_SECRET", &config.twitter_access_token_secret),
        ];
        let missing: Vec<&str> = creds
            .iter()
            .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(BotError::Auth(format!(
                "missing Twitter credentials: {}",
                missing.join(", ")
            )));
        }

        let get = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(Self::new(
            client,
            OAuth1Keys {
                consumer_key: get(&config.twitter_consumer_key),
                consumer_secret: get(&config.twitter_consumer_secret),
                access_token: get(&config.twitter_access_token),
                access_token_secret: get(&config.twitter_access_token_secret),
            },
        ))
    }

    pub fn with_endpoints(mut self, upload_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.upload_base = upload_base.into();
        self.api_base = api_base.into();
        self
    }

    fn upload_media(&self, image: &[u8]) -> Result<String, BotError> {
        let url = format!("{}/1.1/media/upload.json", self.upload_base);
        let media_data = base64::engine::general_purpose::STANDARD.encode(image);
        let form = [("media_data", media_data.as_str())];
        let auth = authorization_header(&self.keys, "POST", &url, &form, &nonce(), Utc::now().timestamp())?;

        let resp = self
            .client
            .post(&url)
            .header("Authorization", auth)
            .form(&form)
            .send()
            .map_err(|e| publish_error(format!("media upload request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(publish_error(format!("media upload HTTP {status}: {}", error_body(resp))));
        }

        let media: MediaUpload = resp
            .json()
            .map_err(|e| publish_error(format!("media upload response: {e}")))?;
        debug!(media_id = %media.media_id_string, "uploaded media to Twitter");
        Ok(media.media_id_string)
    }
}

impl Publisher for TwitterPublisher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn publish(&self, post: &Post) -> Result<String, BotError> {
        let mut body = json!({ "text": post.text });
        if let Some(image) = &post.image {
            let media_id = self.upload_media(image)?;
            body["media"] = json!({ "media_ids": [media_id] });
        }

        let url = format!("{}/2/tweets", self.api_base);
        let auth = authorization_header(&self.keys, "POST", &url, &[], &nonce(), Utc::now().timestamp())?;

        let resp = self
            .client
            .post(&url)
            .header("Authorization", auth)
            .json(&body)
            .send()
            .map_err(|e| publish_error(format!("tweet request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(publish_error(format!("tweet HTTP {status}: {}", error_body(resp))));
        }

        let created: CreatedTweet = resp
            .json()
            .map_err(|e| publish_error(format!("tweet response: {e}")))?;
        debug!(tweet_id = %created.data.id, "posted to Twitter");
        Ok(created.data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::http_client;
    use mockito::Matcher;

    fn keys() -> OAuth1Keys {
        OAuth1Keys {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        }
    }

    fn publisher(server: &mockito::Server) -> TwitterPublisher {
        TwitterPublisher::new(http_client().unwrap(), keys()).with_endpoints(server.url(), server.url())
    }

    #[test]
    fn uploads_image_then_tweets_with_media_id() {
        let mut server = mockito::Server::new();
        let upload = server
            .mock("POST", "/1.1/media/upload.json")
            .match_header("authorization", Matcher::Regex("^OAuth .*oauth_signature=".into()))
            .match_body(Matcher::UrlEncoded("media_data".into(), "aW1n".into()))
            .with_status(200)
            .with_body(r#"{"media_id":710511363345354753,"media_id_string":"710511363345354753"}"#)
            .create();
        let tweet = server
            .mock("POST", "/2/tweets")
            .match_header("authorization", Matcher::Regex("^OAuth ".into()))
            .match_body(Matcher::Json(json!({
                "text": "123 Main Street",
                "media": { "media_ids": ["710511363345354753"] }
            })))
            .with_status(201)
            .with_body(r#"{"data":{"id":"1445880548472328192","text":"123 Main Street"}}"#)
            .create();

        let id = publisher(&server)
            .publish(&Post { text: "123 Main Street".into(), image: Some(b"img".to_vec()) })
            .unwrap();

        assert_eq!(id, "1445880548472328192");
        upload.assert();
        tweet.assert();
    }

    #[test]
    fn text_only_post_skips_upload() {
        let mut server = mockito::Server::new();
        let upload = server.mock("POST", "/1.1/media/upload.json").expect(0).create();
        let _mock = server
            .mock("POST", "/2/tweets")
            .match_body(Matcher::Json(json!({ "text": "hello" })))
            .with_status(201)
            .with_body(r#"{"data":{"id":"1"}}"#)
            .create();

        let id = publisher(&server)
            .publish(&Post { text: "hello".into(), image: None })
            .unwrap();
        assert_eq!(id, "1");
        upload.assert();
    }

    #[test]
    fn rejected_tweet_is_publish_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/2/tweets")
            .with_status(429)
            .with_body(r#"{"title":"Too Many Requests"}"#)
            .create();

        let err = publisher(&server)
            .publish(&Post { text: "hello".into(), image: None })
            .unwrap_err();
        match err {
            BotError::Publish { platform, message } => {
                assert_eq!(platform, Platform::Twitter);
                assert!(message.contains("429"));
            }
            other => panic!("expected Publish, got: {:?}", other),
        }
    }

    #[test]
    fn missing_credentials_are_auth_error() {
        let mut config = Config::default();
        config.twitter_consumer_key = Some("ck".into());
        config.twitter_access_token = Some(String::new());

        let err = TwitterPublisher::from_config(http_client().unwrap(), &config)
            .err()
            .expect("should fail");
        let msg = err.to_string();
        assert!(matches!(err, BotError::Auth(_)));
        assert!(msg.contains("TWITTER_CONSUMER_SECRET"));
        assert!(msg.contains("TWITTER_ACCESS_TOKEN,"));
        assert!(!msg.contains("TWITTER_CONSUMER_KEY"));
    }
}
