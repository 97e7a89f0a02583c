use geo::Point;

/// A WGS84 position stored as `x = longitude`, `y = latitude`
///
/// Source data lists coordinates as `(lat, lon)`; GeoJSON and WKB both expect
/// `(lon, lat)`. Construct through [`GeoPoint::from_lat_lon`] when reading
/// source columns so the swap happens in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint(Point<f64>);

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self(Point::new(lon, lat))
    }

    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self::new(lon, lat)
    }

    pub fn lon(&self) -> f64 {
        self.0.x()
    }

    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    /// GeoJSON position order
    pub fn coordinates(&self) -> [f64; 2] {
        [self.lon(), self.lat()]
    }
}
