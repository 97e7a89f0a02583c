pub mod point;
pub mod wkb;

pub use point::GeoPoint;
pub use wkb::{WGS84_SRID, point_to_ewkb_hex, point_to_wkb};
