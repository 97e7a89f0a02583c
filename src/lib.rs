//! kultur-ingest - Convert cultural venue and event data into GeoJSON and
//! PostGIS-ready rows

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod logging;
pub mod slug;
pub mod source;

pub use error::{IngestError, Result};
pub use slug::generate_slug;
