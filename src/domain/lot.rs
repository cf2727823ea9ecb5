use std::fmt;

/// Social networks a lot can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Twitter,
    Bluesky,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Twitter, Platform::Bluesky];

    /// Column in `lots` holding this platform's post id.
    pub fn column(self) -> &'static str {
        match self {
            Platform::Twitter => "published_twitter",
            Platform::Bluesky => "published_bluesky",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Bluesky => "Bluesky",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Post id per platform. `None` means the lot has not been published there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publications {
    pub twitter: Option<String>,
    pub bluesky: Option<String>,
}

impl Publications {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Twitter => self.twitter.as_deref(),
            Platform::Bluesky => self.bluesky.as_deref(),
        }
    }

    #[cfg(test)]
    pub fn set(&mut self, platform: Platform, post_id: impl Into<String>) {
        let slot = match platform {
            Platform::Twitter => &mut self.twitter,
            Platform::Bluesky => &mut self.bluesky,
        };
        *slot = Some(post_id.into());
    }
}

/// One parcel from the `lots` table.
#[derive(Debug, Clone, PartialEq)]
pub struct LotRecord {
    /// 10-digit PIN.
    pub id: String,
    pub address: String,
    /// 0.0 means unknown.
    pub lat: f64,
    pub lon: f64,
    pub floors: Option<f64>,
    pub published: Publications,
}

impl LotRecord {
    pub fn has_coordinates(&self) -> bool {
        !(self.lat == 0.0 && self.lon == 0.0)
    }

    /// `"lat,lon"` as accepted by the Street View `location` parameter.
    pub fn coordinate_string(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    pub fn is_available_on(&self, platform: Platform) -> bool {
        self.published.get(platform).is_none()
    }
}
