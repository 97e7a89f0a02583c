use super::GeoPoint;

/// SRID of WGS84 longitude/latitude
pub const WGS84_SRID: u32 = 4326;

const BYTE_ORDER_LITTLE_ENDIAN: u8 = 1;
const WKB_POINT: u32 = 1;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Encode a point as ISO WKB, little endian
///
/// Layout (21 bytes):
/// - 1 byte byte-order marker (1 = little endian)
/// - 4 byte u32 geometry type (1 = point)
/// - 2 x f64 coordinates, x then y
pub fn point_to_wkb(point: &GeoPoint) -> Vec<u8> {
    let mut buf = Vec::with_capacity(21);
    buf.push(BYTE_ORDER_LITTLE_ENDIAN);
    buf.extend_from_slice(&WKB_POINT.to_le_bytes());
    write_coordinates(&mut buf, point);
    buf
}

/// Encode a point as PostGIS extended WKB carrying `srid`
///
/// Same as [`point_to_wkb`] with the SRID flag set on the type word and a
/// u32 SRID inserted before the coordinates (25 bytes).
pub fn point_to_ewkb(point: &GeoPoint, srid: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(25);
    buf.push(BYTE_ORDER_LITTLE_ENDIAN);
    buf.extend_from_slice(&(WKB_POINT | EWKB_SRID_FLAG).to_le_bytes());
    buf.extend_from_slice(&srid.to_le_bytes());
    write_coordinates(&mut buf, point);
    buf
}

/// Uppercase hex form of [`point_to_ewkb`], as accepted by a PostGIS
/// geometry column in a text parameter
pub fn point_to_ewkb_hex(point: &GeoPoint, srid: u32) -> String {
    hex::encode_upper(point_to_ewkb(point, srid))
}

fn write_coordinates(buf: &mut Vec<u8>, point: &GeoPoint) {
    buf.extend_from_slice(&point.lon().to_le_bytes());
    buf.extend_from_slice(&point.lat().to_le_bytes());
}
