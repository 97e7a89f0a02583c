use crate::error::Result;
use crate::geometry::{GeoPoint, point_to_wkb};
use crate::source::CsvRow;
use std::ops::RangeInclusive;

pub const FIRST_YEAR: u16 = 2008;
pub const LAST_YEAR: u16 = 2024;

/// Years with a budget column, `"2008"` through `"2024"`
pub fn budget_years() -> RangeInclusive<u16> {
    FIRST_YEAR..=LAST_YEAR
}

/// One line of the cultural funding budget sheet
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRow {
    pub funding_type: String,
    pub designation: String,
    /// One entry per [`budget_years`], in order; `None` for an empty cell
    pub amounts: Vec<Option<f64>>,
    pub street: String,
    pub housenumber: String,
    pub postcode: String,
    pub city: String,
    pub location: Option<GeoPoint>,
}

impl BudgetRow {
    /// Map a CSV row with the columns `type`, `designation`, one column per
    /// year, `street`, `housenumber`, `postcode`, `city`, `lat` and `lon`
    pub fn from_csv(row: &CsvRow) -> Result<Self> {
        let amounts = budget_years()
            .map(|year| row.parse::<f64>(&year.to_string()))
            .collect::<Result<Vec<_>>>()?;

        let lat = row.parse::<f64>("lat")?;
        let lon = row.parse::<f64>("lon")?;
        let location = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::from_lat_lon(lat, lon)),
            _ => None,
        };

        Ok(Self {
            funding_type: row.get("type")?.to_string(),
            designation: row.get("designation")?.to_string(),
            amounts,
            street: row.get("street")?.to_string(),
            housenumber: row.get("housenumber")?.to_string(),
            postcode: row.get("postcode")?.to_string(),
            city: row.get("city")?.to_string(),
            location,
        })
    }

    /// Little-endian WKB point, when both coordinates are present
    pub fn wkb_geometry(&self) -> Option<Vec<u8>> {
        self.location.as_ref().map(point_to_wkb)
    }
}
