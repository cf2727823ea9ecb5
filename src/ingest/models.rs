use serde::Deserialize;

// One row of the Cook County "Assessor - Parcel Addresses" dataset, as SODA
// returns it in JSON. Every value is a string; null columns are omitted.
//
// pin                        14-digit PIN (parcel + sub-unit)
// pin10                      10-digit PIN (parcel)
// year                       tax year
// prop_address_full          "123 MAIN ST"
// prop_address_city_name     "CHICAGO"
// prop_address_state         "IL"
// prop_address_zipcode_1     "60601"

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParcelRow {
    pub pin: String,
    #[serde(default)]
    pub pin10: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub prop_address_full: Option<String>,
    #[serde(default)]
    pub prop_address_city_name: Option<String>,
    #[serde(default)]
    pub prop_address_state: Option<String>,
    #[serde(default)]
    pub prop_address_zipcode_1: Option<String>,
}

/// Columns requested from the dataset.
pub const SELECT_COLUMNS: &str = "pin, pin10, year, prop_address_full, prop_address_city_name, \
                                  prop_address_state, prop_address_zipcode_1";

fn trimmed(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

impl ParcelRow {
    /// The 10-digit PIN, derived from the 14-digit one when the row lacks it.
    pub fn coarse_key(&self) -> String {
        match self.pin10.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => self.pin.trim().chars().take(10).collect(),
        }
    }

    /// `"123 MAIN ST, CHICAGO, IL 60601"`, leaving out empty parts.
    pub fn lot_address(&self) -> String {
        let state_zip = format!(
            "{} {}",
            trimmed(&self.prop_address_state),
            trimmed(&self.prop_address_zipcode_1)
        );
        [
            trimmed(&self.prop_address_full),
            trimmed(&self.prop_address_city_name),
            state_zip.trim(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}
