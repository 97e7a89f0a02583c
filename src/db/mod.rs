//! PostgreSQL sink for the budget and POI loaders
//!
//! A single connection is opened per run. Tables are expected to exist; the
//! insert statements only name their columns.

pub mod budget;
pub mod poi;

pub use budget::{budget_insert_sql, load_budget};
pub use poi::{load_pois, poi_insert_sql};

use crate::config::DbCredentials;
use crate::domain::{BudgetRow, PoiRecord};
use crate::error::{IngestError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{Connection, PgConnection};
use std::fmt;
use tracing::info;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("identifier pattern is valid")
});

pub async fn connect(credentials: &DbCredentials) -> Result<PgConnection> {
    let conn = PgConnection::connect_with(&credentials.connect_options()).await?;
    info!(
        host = %credentials.host,
        database = %credentials.name,
        "connection to database established"
    );
    Ok(conn)
}

/// Destination of mapped rows, implemented for [`PgConnection`]
#[allow(async_fn_in_trait)]
pub trait RowSink {
    /// Insert a budget row and return its id
    async fn insert_budget(&mut self, sql: &str, row: &BudgetRow) -> Result<String>;

    /// Insert a POI; `None` when an existing row made the insert a no-op
    async fn upsert_poi(&mut self, sql: &str, poi: &PoiRecord) -> Result<Option<String>>;
}

impl RowSink for PgConnection {
    async fn insert_budget(&mut self, sql: &str, row: &BudgetRow) -> Result<String> {
        budget::insert_budget_row(self, sql, row).await
    }

    async fn upsert_poi(&mut self, sql: &str, poi: &PoiRecord) -> Result<Option<String>> {
        poi::upsert_poi(self, sql, poi).await
    }
}

/// Accept `table` or `schema.table` made of plain identifier characters
///
/// Table names are interpolated into SQL text, so anything else is refused.
pub fn validate_table_name(name: &str) -> Result<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(IngestError::InvalidIdentifier(name.to_string()))
    }
}

/// `$1, $2, …, $n`
pub(crate) fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-run row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Rows the database ignored because they already exist
    pub skipped: usize,
    pub failed: usize,
}

impl ImportReport {
    /// Count one row: an id is an insert, `None` a conflict, an error a failure
    pub fn record<T>(&mut self, outcome: &Result<Option<T>>) {
        match outcome {
            Ok(Some(_)) => self.inserted += 1,
            Ok(None) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Rows seen, whatever their outcome
    pub fn total(&self) -> usize {
        self.inserted + self.skipped + self.failed
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} skipped, {} failed",
            self.inserted, self.skipped, self.failed
        )
    }
}

/// In-memory [`RowSink`] keyed by designation or title
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::future::Future;

    #[derive(Debug, Default)]
    pub struct MemorySink {
        pub keys: Vec<String>,
        /// Key whose insert fails
        pub reject: Option<String>,
    }

    impl MemorySink {
        fn check(&self, key: &str) -> Result<()> {
            if self.reject.as_deref() == Some(key) {
                return Err(IngestError::Database(sqlx::Error::RowNotFound));
            }
            Ok(())
        }
    }

    impl RowSink for MemorySink {
        async fn insert_budget(&mut self, _sql: &str, row: &BudgetRow) -> Result<String> {
            self.check(&row.designation)?;
            self.keys.push(row.designation.clone());
            Ok(self.keys.len().to_string())
        }

        async fn upsert_poi(&mut self, _sql: &str, poi: &PoiRecord) -> Result<Option<String>> {
            let title = poi.title.clone().unwrap_or_default();
            self.check(&title)?;
            if self.keys.contains(&title) {
                return Ok(None);
            }
            self.keys.push(title);
            Ok(Some(self.keys.len().to_string()))
        }
    }

    pub fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("sh_cultural_poi").is_ok());
        assert!(validate_table_name("public.sh_cultural_poi").is_ok());
        assert!(validate_table_name("_t1").is_ok());

        for bad in ["", "1table", "poi; DROP TABLE x", "a.b.c", "poi-2024", "\"poi\""] {
            assert!(
                matches!(validate_table_name(bad), Err(IngestError::InvalidIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "$1, $2, $3");
        assert_eq!(placeholders(0), "");
    }

    #[test]
    fn test_report_display() {
        let report = ImportReport {
            inserted: 3,
            skipped: 1,
            failed: 2,
        };
        assert_eq!(report.total(), 6);
        assert_eq!(report.to_string(), "3 inserted, 1 skipped, 2 failed");
    }

    #[test]
    fn test_report_record() {
        let mut report = ImportReport::default();
        report.record(&Ok(Some("7".to_string())));
        report.record(&Ok(Some("8".to_string())));
        report.record::<String>(&Ok(None));
        report.record::<String>(&Err(IngestError::MissingEnv("DB_NAME")));

        assert_eq!(
            report,
            ImportReport {
                inserted: 2,
                skipped: 1,
                failed: 1,
            }
        );
        assert_eq!(report.total(), 4);
    }
}
