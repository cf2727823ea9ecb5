// src/bot.rs
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::connection::Database;
use crate::db::lots::{count_lots, mark_published};
use crate::domain::address::sanitize_address;
use crate::domain::camera::camera_for;
use crate::domain::lot::{LotRecord, Platform};
use crate::domain::template::Template;
use crate::errors::BotError;
use crate::publish::{Post, PublisherFactory};
use crate::selector::{select, Selection};
use crate::streetview::{Geocoder, Imagery, LocationResolver};

/// Post id stored for lots skipped because they have no usable location.
pub const SKIPPED_MARKER: &str = "skipped";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing left to post.
    NoLot,
    DryRun {
        lot_id: String,
        text: String,
    },
    /// At least one platform accepted the post; those are now recorded.
    Posted {
        lot_id: String,
        post_ids: Vec<(Platform, String)>,
    },
    /// Every platform failed or none still needed the lot. The lot stays
    /// available.
    NothingPosted {
        lot_id: String,
    },
    /// Neither address nor coordinates locate the lot. Nothing was posted and
    /// the lot is marked skipped so the series moves on.
    Skipped {
        lot_id: String,
        reason: String,
    },
}

/// One posting run: select a lot, photograph it, post it, record it.
pub struct Bot<'a> {
    config: &'a Config,
    db: &'a Database,
    geocoder: &'a dyn Geocoder,
    imagery: &'a dyn Imagery,
    publishers: &'a dyn PublisherFactory,
    search: Template,
    print: Template,
}

fn template(name: &str, source: &str) -> Result<Template, BotError> {
    Template::parse(source).map_err(|e| BotError::Configuration(format!("{name} {source:?}: {e}")))
}

impl<'a> Bot<'a> {
    /// Fails with a configuration error when either format string is invalid.
    pub fn new(
        config: &'a Config,
        db: &'a Database,
        geocoder: &'a dyn Geocoder,
        imagery: &'a dyn Imagery,
        publishers: &'a dyn PublisherFactory,
    ) -> Result<Self, BotError> {
        Ok(Self {
            search: template("search format", &config.search_format)?,
            print: template("print format", &config.print_format)?,
            config,
            db,
            geocoder,
            imagery,
            publishers,
        })
    }

    pub fn run(&self, explicit_id: Option<&str>) -> Result<RunOutcome, BotError> {
        let platforms = self.config.enabled_platforms();
        if platforms.is_empty() {
            return Err(BotError::Configuration(
                "no platform enabled; set ENABLE_TWITTER or ENABLE_BLUESKY".into(),
            ));
        }

        if self.config.google_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(BotError::Configuration("GOOGLE_API_KEY not found in environment".into()));
        }

        let selection = Selection {
            explicit_id,
            floor: self.config.start_id.as_deref(),
        };
        let Some(lot) = self.db.with_conn(|conn| select(conn, selection, &platforms))? else {
            let total = self.db.with_conn(|conn| count_lots(conn))?;
            info!(lots = total, ?platforms, "no available lot");
            return Ok(RunOutcome::NoLot);
        };
        info!(lot_id = %lot.id, address = %lot.address, "selected lot");

        let location = match LocationResolver::new(&self.search, self.geocoder).resolve(&lot) {
            Ok(location) => location,
            Err(BotError::NoLocation(reason)) => return self.skip(&lot, &platforms, reason),
            Err(e) => return Err(e),
        };
        let image = self.fetch_image(&lot, &location)?;
        let text = self.compose(&lot);

        if self.config.dry_run {
            info!(lot_id = %lot.id, %text, has_image = image.is_some(), "dry run, not posting");
            return Ok(RunOutcome::DryRun { lot_id: lot.id, text });
        }

        let post = Post { text, image };
        let post_ids = self.publish_everywhere(&lot, &platforms, &post);

        if post_ids.is_empty() {
            warn!(lot_id = %lot.id, "nothing was posted, lot stays available");
            return Ok(RunOutcome::NothingPosted { lot_id: lot.id });
        }

        self.db.with_conn(|conn| {
            for (platform, post_id) in &post_ids {
                mark_published(conn, &lot.id, *platform, post_id)?;
            }
            Ok(())
        })?;

        Ok(RunOutcome::Posted {
            lot_id: lot.id,
            post_ids,
        })
    }

    /// Mark a lot that cannot be photographed as skipped on every platform
    /// still missing it. A dry run only reports it.
    fn skip(&self, lot: &LotRecord, platforms: &[Platform], reason: String) -> Result<RunOutcome, BotError> {
        warn!(lot_id = %lot.id, %reason, "no usable location, skipping lot");

        if !self.config.dry_run {
            self.db.with_conn(|conn| {
                for &platform in platforms {
                    if lot.is_available_on(platform) {
                        mark_published(conn, &lot.id, platform, SKIPPED_MARKER)?;
                    }
                }
                Ok(())
            })?;
        }

        Ok(RunOutcome::Skipped {
            lot_id: lot.id.clone(),
            reason,
        })
    }

    /// Street View photo at `location`, or `None` when the fetch failed.
    /// Only a configuration problem aborts.
    fn fetch_image(&self, lot: &LotRecord, location: &str) -> Result<Option<Vec<u8>>, BotError> {
        let camera = camera_for(lot.floors, self.config.streetview_pitch);
        match self.imagery.fetch(location, camera) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(lot_id = %lot.id, %location, error = %e, "photo fetch failed, posting without a photo");
                Ok(None)
            }
        }
    }

    /// Post text. A lot without an address is named by its PIN; a format
    /// that still cannot be filled falls back to that name alone.
    fn compose(&self, lot: &LotRecord) -> String {
        let mut address = sanitize_address(&lot.address);
        if address.trim().is_empty() {
            address = lot.id.clone();
        }

        self.print.render(lot, &address).unwrap_or_else(|e| {
            warn!(lot_id = %lot.id, error = %e, "print format failed, posting the address alone");
            address
        })
    }

    /// Post to every platform that has not published the lot yet. A failure
    /// on one platform is logged and does not stop the others.
    fn publish_everywhere(&self, lot: &LotRecord, platforms: &[Platform], post: &Post) -> Vec<(Platform, String)> {
        let mut post_ids = Vec::new();

        for &platform in platforms {
            if !lot.is_available_on(platform) {
                info!(lot_id = %lot.id, %platform, "already published here, skipping");
                continue;
            }

            let result = self
                .publishers
                .connect(platform)
                .and_then(|publisher| {
                    debug!(lot_id = %lot.id, platform = %publisher.platform(), "publishing");
                    publisher.publish(post)
                });
            match result {
                Ok(post_id) => {
                    info!(lot_id = %lot.id, %platform, %post_id, "posted");
                    post_ids.push((platform, post_id));
                }
                Err(e) => error!(lot_id = %lot.id, %platform, error = %e, "posting failed"),
            }
        }

        post_ids
    }
}
