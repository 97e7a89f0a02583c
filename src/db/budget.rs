use super::{ImportReport, RowSink, placeholders};
use crate::domain::{BudgetRow, budget_years};
use crate::error::Result;
use crate::source::CsvRow;
use sqlx::PgConnection;
use tracing::{error, info};

fn budget_columns() -> Vec<String> {
    let mut columns = vec!["funding_type".to_string(), "designation".to_string()];
    columns.extend(budget_years().map(|year| format!("year_{year}")));
    columns.extend(
        ["street", "housenumber", "postcode", "city", "wkb_geometry"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

/// `INSERT` for one budget row; `table` must already be validated
pub fn budget_insert_sql(table: &str) -> String {
    let columns = budget_columns();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING id::text",
        columns.join(", "),
        placeholders(columns.len())
    )
}

/// Insert one row and return its id
pub async fn insert_budget_row(conn: &mut PgConnection, sql: &str, row: &BudgetRow) -> Result<String> {
    let mut query = sqlx::query_scalar::<_, String>(sql)
        .bind(&row.funding_type)
        .bind(&row.designation);

    for amount in &row.amounts {
        query = query.bind(*amount);
    }

    let id = query
        .bind(&row.street)
        .bind(&row.housenumber)
        .bind(&row.postcode)
        .bind(&row.city)
        .bind(row.wkb_geometry())
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

/// Map and insert every CSV row
///
/// A row that fails to map or insert is logged and counted; the remaining
/// rows are still loaded.
pub async fn load_budget<S: RowSink>(sink: &mut S, table: &str, rows: &[CsvRow]) -> ImportReport {
    let sql = budget_insert_sql(table);
    let mut report = ImportReport::default();

    for row in rows {
        let outcome = match BudgetRow::from_csv(row) {
            Ok(budget) => match sink.insert_budget(&sql, &budget).await {
                Ok(id) => {
                    info!("inserted {} with id {}", budget.designation, id);
                    Ok(Some(id))
                }
                Err(e) => {
                    error!(row = row.number, designation = %budget.designation, error = %e, "insert failed");
                    Err(e)
                }
            },
            Err(e) => {
                error!(row = row.number, error = %e, "skipping budget row");
                Err(e)
            }
        };
        report.record(&outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{MemorySink, block_on};
    use crate::source::read_rows_from;

    fn budget_csv(lines: &[&str]) -> String {
        let years: Vec<String> = budget_years().map(|y| y.to_string()).collect();
        let empty = vec![""; years.len()].join(",");
        let mut csv = format!(
            "type,designation,{},street,housenumber,postcode,city,lat,lon\n",
            years.join(",")
        );
        for line in lines {
            csv.push_str(&line.replace("{years}", &empty));
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn test_budget_insert_sql() {
        let sql = budget_insert_sql("fl_cultural_funding");

        assert!(sql.starts_with(
            "INSERT INTO fl_cultural_funding (funding_type, designation, year_2008, year_2009,"
        ));
        assert!(sql.contains("year_2024, street, housenumber, postcode, city, wkb_geometry)"));
        assert!(sql.contains("$24)"));
        assert!(!sql.contains("$25"));
        assert!(sql.ends_with("RETURNING id::text"));
    }

    #[test]
    fn test_column_count_matches_bindings() {
        // funding_type, designation, one per year, four address fields, geometry
        assert_eq!(budget_columns().len(), 2 + budget_years().count() + 4 + 1);
    }

    #[test]
    fn test_load_budget_counts_failures_and_continues() {
        let csv = budget_csv(&[
            "Projekt,Theater,{years},Rathausplatz,1,24937,Flensburg,54.78,9.43",
            "Projekt,Kurz",
            "Projekt,Museum,{years},Hafen,2,24937,Flensburg,,",
            "Projekt,Kaputt,{years},Weg,3,24937,Flensburg,nord,9.4",
            "Projekt,Abgelehnt,{years},Weg,4,24937,Flensburg,,",
            "Projekt,Archiv,{years},Weg,5,24937,Flensburg,,",
        ]);
        let rows = read_rows_from(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 6);

        let mut sink = MemorySink {
            reject: Some("Abgelehnt".to_string()),
            ..MemorySink::default()
        };
        let report = block_on(load_budget(&mut sink, "fl_cultural_funding", &rows));

        assert_eq!(
            report,
            ImportReport {
                inserted: 3,
                skipped: 0,
                failed: 3,
            }
        );
        assert_eq!(sink.keys, vec!["Theater", "Museum", "Archiv"]);
    }
}
