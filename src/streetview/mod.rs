mod geocoder;
mod imagery;
mod resolver;

pub use geocoder::{Coordinate, Geocoder, GoogleGeocoder};
pub use imagery::{Imagery, StreetViewClient};
pub use resolver::LocationResolver;

pub(crate) const GOOGLE_MAPS_BASE: &str = "https://maps.googleapis.com";
