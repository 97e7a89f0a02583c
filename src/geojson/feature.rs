use crate::geometry::GeoPoint;
use serde::Serialize;
use serde_json::{Map, Value};

/// Decimal places kept in written coordinates (about 0.1 m)
pub const COORDINATE_PRECISION: i32 = 6;

/// CRS name written into every collection (WGS84, lon/lat axis order)
pub const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub features: Vec<Feature>,
    pub crs: Crs,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            type_: "FeatureCollection",
            features,
            crs: Crs::named(CRS84),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub geometry: PointGeometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn point(point: GeoPoint, properties: Map<String, Value>) -> Self {
        Self {
            type_: "Feature",
            geometry: PointGeometry::from(point),
            properties,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub type_: &'static str,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for PointGeometry {
    fn from(point: GeoPoint) -> Self {
        Self {
            type_: "Point",
            coordinates: point.coordinates().map(round_coordinate),
        }
    }
}

fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    (value * scale).round() / scale
}

/// Named coordinate reference system member (GeoJSON 2008 style)
#[derive(Debug, Serialize)]
pub struct Crs {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub properties: CrsProperties,
}

#[derive(Debug, Serialize)]
pub struct CrsProperties {
    pub name: String,
}

impl Crs {
    pub fn named(name: &str) -> Self {
        Self {
            type_: "name",
            properties: CrsProperties {
                name: name.to_string(),
            },
        }
    }
}
