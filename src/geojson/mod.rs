//! CSV venue/event rows to a GeoJSON point FeatureCollection

pub mod feature;

pub use feature::{CRS84, Crs, Feature, FeatureCollection, PointGeometry};

use crate::error::{IngestError, Result};
use crate::geometry::GeoPoint;
use crate::slug::{generate_slug, is_clean_slug};
use crate::source::{CsvRow, read_rows};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const NAME_COLUMN: &str = "venue_name";
pub const CITY_COLUMN: &str = "venue_city";
pub const STREET_COLUMN: &str = "venue_street";
pub const LAT_COLUMN: &str = "venue_lat";
pub const LON_COLUMN: &str = "venue_lon";

/// Source `id` column, emitted as `event_id`
const ID_COLUMN: &str = "id";
const ID_PROPERTY: &str = "event_id";
const SLUG_PROPERTY: &str = "slug";

/// Result of a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub features: usize,
    /// Slugs with leading/trailing/double hyphens or non-ASCII characters
    pub unclean_slugs: usize,
}

/// `<dir>/<stem>.geojson` next to the source file
pub fn default_output_path(src: &Path) -> PathBuf {
    src.with_extension("geojson")
}

/// Build a feature from one CSV row
///
/// # Properties
/// Every column except the coordinate columns is copied as a string, in
/// header order, with `id` renamed to `event_id`. The computed slug is
/// appended as `slug`.
///
/// # Errors
/// Missing name/city/street/coordinate columns, or an empty or non-numeric
/// coordinate.
pub fn venue_feature(row: &CsvRow) -> Result<Feature> {
    let slug = generate_slug(
        row.get(NAME_COLUMN)?,
        row.get(CITY_COLUMN)?,
        row.get(STREET_COLUMN)?,
    );

    let lat = required_coordinate(row, LAT_COLUMN)?;
    let lon = required_coordinate(row, LON_COLUMN)?;

    let mut properties = Map::new();
    for (column, value) in row.fields() {
        if column == LAT_COLUMN || column == LON_COLUMN {
            continue;
        }
        let key = if column == ID_COLUMN {
            ID_PROPERTY
        } else {
            column
        };
        properties.insert(key.to_string(), Value::String(value.to_string()));
    }
    properties.insert(SLUG_PROPERTY.to_string(), Value::String(slug));

    Ok(Feature::point(GeoPoint::from_lat_lon(lat, lon), properties))
}

fn required_coordinate(row: &CsvRow, column: &str) -> Result<f64> {
    row.parse::<f64>(column)?
        .ok_or_else(|| IngestError::InvalidValue {
            row: row.number,
            column: column.to_string(),
            value: String::new(),
        })
}

/// Convert all rows, failing on the first malformed row
pub fn build_collection(rows: &[CsvRow]) -> Result<(FeatureCollection, ConversionSummary)> {
    let mut summary = ConversionSummary::default();
    let mut features = Vec::with_capacity(rows.len());

    for row in rows {
        let feature = venue_feature(row)?;

        if let Some(Value::String(slug)) = feature.properties.get(SLUG_PROPERTY) {
            debug!(row = row.number, slug = %slug, "built feature");
            if !is_clean_slug(slug) {
                warn!(row = row.number, slug = %slug, "slug is not clean kebab-case");
                summary.unclean_slugs += 1;
            }
        }

        features.push(feature);
    }

    summary.features = features.len();
    Ok((FeatureCollection::new(features), summary))
}

/// Serialize `collection` to `path` as UTF-8 JSON (non-ASCII unescaped)
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path).map_err(|e| IngestError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, collection)?;
    writer.flush().map_err(|e| IngestError::io(path, e))?;

    Ok(())
}

/// Read `src`, convert every row and write the collection to `dest`
pub fn convert(src: &Path, dest: &Path) -> Result<ConversionSummary> {
    let rows = read_rows(src)?;
    let (collection, summary) = build_collection(&rows)?;
    write_geojson(dest, &collection)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::read_rows_from;
    use std::fs;
    use tempfile::tempdir;

    const EVENTS: &str = "\
id,venue_name,venue_street,venue_housenumber,venue_city,venue_lat,venue_lon,event_title
7,Kino Müller,Hauptstraße,5,Köln,50.9375,6.9603,Filmabend
8,Hafenbar,Am Hafen 2,,Kiel,54.3233,10.1228,Konzert
";

    #[test]
    fn test_venue_feature_swaps_coordinates() {
        let rows = read_rows_from(EVENTS.as_bytes()).unwrap();
        let feature = venue_feature(&rows[0]).unwrap();

        assert_eq!(feature.geometry.coordinates, [6.9603, 50.9375]);
        assert_eq!(feature.geometry.type_, "Point");
    }

    #[test]
    fn test_venue_feature_properties() {
        let rows = read_rows_from(EVENTS.as_bytes()).unwrap();
        let feature = venue_feature(&rows[0]).unwrap();
        let props = &feature.properties;

        assert_eq!(props["event_id"], "7");
        assert!(props.get("id").is_none());
        assert!(props.get("venue_lat").is_none());
        assert!(props.get("venue_lon").is_none());
        assert_eq!(props["event_title"], "Filmabend");
        assert_eq!(props["slug"], "kino-mueller-hauptstrasse-koeln");

        let keys: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(keys.first(), Some(&"event_id"));
        assert_eq!(keys.last(), Some(&"slug"));
    }

    #[test]
    fn test_missing_coordinate_is_error() {
        let csv = "venue_name,venue_street,venue_city,venue_lat,venue_lon\nKino,Weg 1,Kiel,,10.1\n";
        let rows = read_rows_from(csv.as_bytes()).unwrap();
        let err = venue_feature(&rows[0]).unwrap_err();
        assert!(matches!(err, IngestError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_missing_name_column_is_error() {
        let csv = "venue_street,venue_city,venue_lat,venue_lon\nWeg 1,Kiel,54.3,10.1\n";
        let rows = read_rows_from(csv.as_bytes()).unwrap();
        let err = venue_feature(&rows[0]).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn test_build_collection_counts_unclean_slugs() {
        let csv = "venue_name,venue_street,venue_city,venue_lat,venue_lon\n©,,Kiel,54.3,10.1\nKino,Weg 1,Kiel,54.3,10.1\n";
        let rows = read_rows_from(csv.as_bytes()).unwrap();
        let (collection, summary) = build_collection(&rows).unwrap();

        assert_eq!(collection.features.len(), 2);
        assert_eq!(summary.features, 2);
        assert_eq!(summary.unclean_slugs, 1);
    }

    #[test]
    fn test_convert_writes_feature_collection() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("events.csv");
        fs::write(&src, EVENTS).unwrap();

        let dest = default_output_path(&src);
        assert_eq!(dest, dir.path().join("events.geojson"));

        let summary = convert(&src, &dest).unwrap();
        assert_eq!(summary.features, 2);

        let text = fs::read_to_string(&dest).unwrap();
        assert!(text.contains("Kino Müller"), "non-ASCII must not be escaped");

        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["crs"]["type"], "name");
        assert_eq!(json["crs"]["properties"]["name"], CRS84);
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
        // "Hafen" is a street token, so it is cut out of "Hafenbar"
        assert_eq!(json["features"][1]["properties"]["slug"], "bar-am-hafen-2-kiel");
        assert_eq!(
            json["features"][1]["geometry"]["coordinates"],
            serde_json::json!([10.1228, 54.3233])
        );
    }
}
