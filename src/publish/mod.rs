mod bluesky;
pub mod oauth;
mod twitter;

pub use bluesky::BlueskyPublisher;
pub use twitter::TwitterPublisher;

use crate::config::Config;
use crate::domain::lot::Platform;
use crate::errors::BotError;
use reqwest::blocking::Client;

/// What gets sent to every platform for one lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: String,
    /// JPEG bytes, absent when no photo could be fetched.
    pub image: Option<Vec<u8>>,
}

/// A social network account the bot posts to.
pub trait Publisher {
    fn platform(&self) -> Platform;

    /// Create exactly one post and return its platform id.
    fn publish(&self, post: &Post) -> Result<String, BotError>;
}

/// Builds (and logs in) publishers on demand, so dry runs never touch the
/// networks.
pub trait PublisherFactory {
    fn connect(&self, platform: Platform) -> Result<Box<dyn Publisher>, BotError>;
}

/// Real publishers configured from `Config`.
pub struct LivePublishers<'a> {
    client: Client,
    config: &'a Config,
}

impl<'a> LivePublishers<'a> {
    pub fn new(client: Client, config: &'a Config) -> Self {
        Self { client, config }
    }
}

impl PublisherFactory for LivePublishers<'_> {
    fn connect(&self, platform: Platform) -> Result<Box<dyn Publisher>, BotError> {
        let client = self.client.clone();
        Ok(match platform {
            Platform::Twitter => Box::new(TwitterPublisher::from_config(client, self.config)?),
            Platform::Bluesky => Box::new(BlueskyPublisher::from_config(client, self.config)?),
        })
    }
}
