pub mod budget;
pub mod poi;

pub use budget::{BudgetRow, budget_years};
pub use poi::{ParsedPois, PoiRecord, RawPoi, parse_records};
