// src/streetview/resolver.rs
use crate::domain::lot::LotRecord;
use crate::domain::template::Template;
use crate::errors::BotError;
use tracing::{debug, warn};

use super::geocoder::{Coordinate, Geocoder};

/// Half-width of the box around the stored coordinates, in degrees (~0.5 mi).
pub const MAX_DRIFT_DEGREES: f64 = 0.007;

/// Chooses what to send to Street View for a lot: the formatted address when
/// it geocodes close to the parcel, otherwise the stored coordinates.
pub struct LocationResolver<'a> {
    search: &'a Template,
    geocoder: &'a dyn Geocoder,
}

/// True when `point` is inside the box centered on `center` (edges included).
pub fn within_drift(center: Coordinate, point: Coordinate) -> bool {
    (center.lat - MAX_DRIFT_DEGREES..=center.lat + MAX_DRIFT_DEGREES).contains(&point.lat)
        && (center.lon - MAX_DRIFT_DEGREES..=center.lon + MAX_DRIFT_DEGREES).contains(&point.lon)
}

impl<'a> LocationResolver<'a> {
    pub fn new(search: &'a Template, geocoder: &'a dyn Geocoder) -> Self {
        Self { search, geocoder }
    }

    pub fn resolve(&self, lot: &LotRecord) -> Result<String, BotError> {
        let formatted = match self.search.render(lot, &lot.address) {
            Ok(f) => f,
            Err(e) => return fall_back(lot, &e.to_string()),
        };

        if !lot.has_coordinates() {
            debug!(lot_id = %lot.id, location = %formatted, "no stored coordinates, using address");
            return Ok(formatted);
        }

        let stored = Coordinate {
            lat: lot.lat,
            lon: lot.lon,
        };
        match self.geocoder.geocode(&formatted) {
            Ok(Some(found)) if within_drift(stored, found) => {
                debug!(lot_id = %lot.id, location = %formatted, "address matches stored coordinates");
                Ok(formatted)
            }
            Ok(Some(found)) => {
                debug!(
                    lot_id = %lot.id,
                    geocoded = ?found,
                    "address geocodes too far from parcel, using coordinates"
                );
                Ok(lot.coordinate_string())
            }
            Ok(None) => fall_back(lot, "geocoder found nothing"),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => fall_back(lot, &e.to_string()),
        }
    }
}

fn fall_back(lot: &LotRecord, reason: &str) -> Result<String, BotError> {
    if !lot.has_coordinates() {
        return Err(BotError::NoLocation(format!("lot {}: {reason}", lot.id)));
    }
    warn!(lot_id = %lot.id, reason, "could not use address, using coordinates");
    Ok(lot.coordinate_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lot::Publications;
    use std::cell::RefCell;

    #[derive(Clone, Copy)]
    enum Failure {
        Refused,
        NoKey,
    }

    struct FakeGeocoder {
        answer: Result<Option<Coordinate>, Failure>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeGeocoder {
        fn answering(answer: Result<Option<Coordinate>, Failure>) -> Self {
            Self {
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Geocoder for FakeGeocoder {
        fn geocode(&self, address: &str) -> Result<Option<Coordinate>, BotError> {
            self.calls.borrow_mut().push(address.to_string());
            self.answer.map_err(|failure| match failure {
                Failure::Refused => BotError::Network("connection refused".into()),
                Failure::NoKey => BotError::Configuration("GOOGLE_API_KEY not found in environment".into()),
            })
        }
    }

    fn lot(address: &str, lat: f64, lon: f64) -> LotRecord {
        LotRecord {
            id: "1407115016".into(),
            address: address.into(),
            lat,
            lon,
            floors: None,
            published: Publications::default(),
        }
    }

    fn search() -> Template {
        Template::parse("{address}, Chicago, IL").unwrap()
    }

    #[test]
    fn nearby_geocode_keeps_address() {
        let geo = FakeGeocoder::answering(Ok(Some(Coordinate { lat: 41.8781, lon: -87.6298 })));
        let t = search();
        let loc = LocationResolver::new(&t, &geo)
            .resolve(&lot("123 Main St", 41.8781, -87.6298))
            .unwrap();

        assert_eq!(loc, "123 Main St, Chicago, IL");
        assert_eq!(*geo.calls.borrow(), ["123 Main St, Chicago, IL"]);
    }

    #[test]
    fn distant_geocode_uses_coordinates() {
        let geo = FakeGeocoder::answering(Ok(Some(Coordinate { lat: 42.0, lon: -88.0 })));
        let t = search();
        let loc = LocationResolver::new(&t, &geo)
            .resolve(&lot("123 Main St", 41.8781, -87.6298))
            .unwrap();

        assert_eq!(loc, "41.8781,-87.6298");
    }

    #[test]
    fn sentinel_coordinates_skip_geocoding() {
        let geo = FakeGeocoder::answering(Ok(None));
        let t = search();
        let loc = LocationResolver::new(&t, &geo)
            .resolve(&lot("123 Main St", 0.0, 0.0))
            .unwrap();

        assert_eq!(loc, "123 Main St, Chicago, IL");
        assert!(geo.calls.borrow().is_empty());
    }

    #[test]
    fn geocoder_failure_or_empty_result_uses_coordinates() {
        let t = search();
        for answer in [Err(Failure::Refused), Ok(None)] {
            let geo = FakeGeocoder::answering(answer);
            let loc = LocationResolver::new(&t, &geo)
                .resolve(&lot("123 Main St", 41.8781, -87.6298))
                .unwrap();
            assert_eq!(loc, "41.8781,-87.6298");
        }
    }

    #[test]
    fn configuration_error_from_geocoder_is_not_swallowed() {
        let geo = FakeGeocoder::answering(Err(Failure::NoKey));
        let t = search();
        let err = LocationResolver::new(&t, &geo)
            .resolve(&lot("123 Main St", 41.8781, -87.6298))
            .unwrap_err();

        assert!(matches!(err, BotError::Configuration(_)));
    }

    #[test]
    fn missing_address_uses_coordinates_without_geocoding() {
        let geo = FakeGeocoder::answering(Ok(None));
        let t = search();
        let loc = LocationResolver::new(&t, &geo)
            .resolve(&lot("", 41.8781, -87.6298))
            .unwrap();

        assert_eq!(loc, "41.8781,-87.6298");
        assert!(geo.calls.borrow().is_empty());
    }

    #[test]
    fn nothing_usable_is_no_location() {
        let geo = FakeGeocoder::answering(Ok(None));
        let t = search();
        let err = LocationResolver::new(&t, &geo)
            .resolve(&lot("", 0.0, 0.0))
            .unwrap_err();

        assert!(matches!(err, BotError::NoLocation(_)));
    }

    #[test]
    fn drift_box_edges_are_inclusive() {
        let center = Coordinate { lat: 41.0, lon: -87.0 };
        let edge = Coordinate { lat: 41.0 + 0.005, lon: -87.0 - 0.005 };
        let outside = Coordinate { lat: 41.0 + 0.0071, lon: -87.0 };

        assert!(within_drift(center, center));
        assert!(within_drift(center, edge));
        assert!(within_drift(center, Coordinate { lat: center.lat + MAX_DRIFT_DEGREES, lon: center.lon }));
        assert!(!within_drift(center, outside));
    }
}
