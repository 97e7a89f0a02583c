//! Point-of-interest records from the tourism JSON export
//!
//! The export is an array of deeply nested objects with localized values
//! (`{"de": ..., "en": ...}`). Only the German variants and a handful of
//! contact fields are kept.

use crate::geometry::GeoPoint;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Format of `lastChangeTime`, e.g. `2023-04-18 09:12:44.123456`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Default, Deserialize)]
pub struct Localized {
    #[serde(default)]
    pub de: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPoi {
    #[serde(default)]
    pub title: Option<Localized>,
    #[serde(default)]
    pub short_description: Option<Localized>,
    #[serde(default)]
    pub html_head_title: Option<Localized>,
    #[serde(default)]
    pub html_head_meta_description: Option<Localized>,
    #[serde(default)]
    pub last_change_time: Option<String>,
    #[serde(default)]
    pub contact1: Option<Contact>,
    #[serde(default)]
    pub regions: Option<Vec<Region>>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub street_no: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub phone1: Option<String>,
    #[serde(default)]
    pub homepage: Option<Localized>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Region {
    #[serde(default, rename = "i18nName")]
    pub i18n_name: Option<Localized>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A POI flattened to the columns of the target table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiRecord {
    /// German region names joined with `", "`; empty when there are none
    pub regions: String,
    pub updated_at: Option<NaiveDateTime>,
    pub website: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub housenumber: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
}

fn german(value: Option<Localized>) -> Option<String> {
    value.and_then(|v| v.de)
}

impl From<RawPoi> for PoiRecord {
    fn from(raw: RawPoi) -> Self {
        let regions = raw
            .regions
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| german(r.i18n_name))
            .collect::<Vec<_>>()
            .join(", ");

        let updated_at = raw.last_change_time.as_deref().and_then(|raw_time| {
            match NaiveDateTime::parse_from_str(raw_time, TIMESTAMP_FORMAT) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    warn!(value = raw_time, error = %e, "unparseable lastChangeTime");
                    None
                }
            }
        });

        let location = raw
            .location
            .and_then(|l| l.coordinates)
            .and_then(|c| Some(GeoPoint::new(c.longitude?, c.latitude?)));

        let address = raw.contact1.and_then(|c| c.address).unwrap_or_default();

        Self {
            regions,
            updated_at,
            website: german(address.homepage),
            meta_title: german(raw.html_head_title),
            meta_description: german(raw.html_head_meta_description),
            phone: address.phone1,
            street: address.street,
            city: address.city,
            postal_code: address.zipcode,
            housenumber: address.street_no,
            title: german(raw.title),
            description: german(raw.short_description),
            location,
        }
    }
}

/// Records mapped from an export, plus the number of entries that did not
/// match the expected shape
#[derive(Debug, Default)]
pub struct ParsedPois {
    pub records: Vec<PoiRecord>,
    pub rejected: usize,
}

/// Map every element of a JSON array export
///
/// An element whose fields have unexpected types is logged and counted in
/// [`ParsedPois::rejected`]; the rest of the export is still mapped.
pub fn parse_records(export: Value) -> serde_json::Result<ParsedPois> {
    let items: Vec<Value> = serde_json::from_value(export)?;
    let mut parsed = ParsedPois::default();

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawPoi>(item) {
            Ok(raw) => parsed.records.push(PoiRecord::from(raw)),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed POI entry");
                parsed.rejected += 1;
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    fn sample() -> Value {
        json!([
            {
                "id": 12,
                "title": {"de": "Phänomenta", "en": "Phaenomenta"},
                "shortDescription": {"de": "Science Center"},
                "htmlHeadTitle": {"de": "Phänomenta Flensburg"},
                "htmlHeadMetaDescription": {"de": "Mitmachen und staunen"},
                "lastChangeTime": "2023-04-18 09:12:44.123456",
                "creationTime": "2020-01-01 00:00:00.000000",
                "contact1": {
                    "address": {
                        "city": "Flensburg",
                        "street": "Norderstraße",
                        "streetNo": "157-163",
                        "zipcode": "24939",
                        "phone1": "+49 461 144490",
                        "email": "info@example.org",
                        "homepage": {"de": "https://example.org"}
                    }
                },
                "regions": [
                    {"i18nName": {"de": "Flensburger Förde"}},
                    {"i18nName": {"en": "Baltic Sea"}},
                    {"i18nName": {"de": "Ostsee"}}
                ],
                "location": {"coordinates": {"latitude": 54.7935, "longitude": 9.4328}}
            },
            {"title": {"en": "Untitled"}}
        ])
    }

    #[test]
    fn test_full_record() {
        let parsed = parse_records(sample()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.rejected, 0);

        let poi = &parsed.records[0];
        assert_eq!(poi.title.as_deref(), Some("Phänomenta"));
        assert_eq!(poi.description.as_deref(), Some("Science Center"));
        assert_eq!(poi.meta_title.as_deref(), Some("Phänomenta Flensburg"));
        assert_eq!(poi.meta_description.as_deref(), Some("Mitmachen und staunen"));
        assert_eq!(poi.city.as_deref(), Some("Flensburg"));
        assert_eq!(poi.street.as_deref(), Some("Norderstraße"));
        assert_eq!(poi.housenumber.as_deref(), Some("157-163"));
        assert_eq!(poi.postal_code.as_deref(), Some("24939"));
        assert_eq!(poi.phone.as_deref(), Some("+49 461 144490"));
        assert_eq!(poi.website.as_deref(), Some("https://example.org"));
        assert_eq!(poi.regions, "Flensburger Förde, Ostsee");

        let location = poi.location.unwrap();
        assert_eq!(location.lon(), 9.4328);
        assert_eq!(location.lat(), 54.7935);

        let updated = poi.updated_at.unwrap();
        assert_eq!(updated.date(), NaiveDate::from_ymd_opt(2023, 4, 18).unwrap());
        assert_eq!(updated.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_sparse_record() {
        let parsed = parse_records(sample()).unwrap();
        let poi = &parsed.records[1];

        assert_eq!(poi.title, None);
        assert_eq!(poi.regions, "");
        assert!(poi.location.is_none());
        assert!(poi.updated_at.is_none());
    }

    #[test]
    fn test_bad_timestamp_is_dropped() {
        let parsed = parse_records(json!([{"lastChangeTime": "18.04.2023"}])).unwrap();
        assert!(parsed.records[0].updated_at.is_none());
    }

    #[test]
    fn test_partial_coordinates_are_dropped() {
        let parsed =
            parse_records(json!([{"location": {"coordinates": {"latitude": 54.0}}}])).unwrap();
        assert!(parsed.records[0].location.is_none());
    }

    #[test]
    fn test_malformed_entry_is_rejected() {
        let parsed = parse_records(json!([
            {"title": {"de": "Ok"}},
            {"title": "not localized"}
        ]))
        .unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn test_export_must_be_array() {
        assert!(parse_records(json!({"items": []})).is_err());
    }
}
