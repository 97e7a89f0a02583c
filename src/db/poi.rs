use super::{ImportReport, RowSink, placeholders};
use crate::domain::PoiRecord;
use crate::error::Result;
use crate::geometry::{WGS84_SRID, point_to_ewkb_hex};
use sqlx::PgConnection;
use tracing::{debug, error, info};

const POI_COLUMNS: [&str; 13] = [
    "regions",
    "updated_at",
    "website",
    "meta_title",
    "meta_description",
    "phone",
    "street",
    "city",
    "postal_code",
    "housenumber",
    "title",
    "description",
    "wkb_geometry",
];

/// `INSERT … ON CONFLICT DO NOTHING`; `table` must already be validated
pub fn poi_insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT DO NOTHING RETURNING id::text",
        POI_COLUMNS.join(", "),
        placeholders(POI_COLUMNS.len())
    )
}

/// Insert one record; `None` when an existing row made the insert a no-op
pub async fn upsert_poi(conn: &mut PgConnection, sql: &str, poi: &PoiRecord) -> Result<Option<String>> {
    let geometry = poi
        .location
        .as_ref()
        .map(|p| point_to_ewkb_hex(p, WGS84_SRID));

    let id = sqlx::query_scalar::<_, String>(sql)
        .bind(&poi.regions)
        .bind(poi.updated_at)
        .bind(&poi.website)
        .bind(&poi.meta_title)
        .bind(&poi.meta_description)
        .bind(&poi.phone)
        .bind(&poi.street)
        .bind(&poi.city)
        .bind(&poi.postal_code)
        .bind(&poi.housenumber)
        .bind(&poi.title)
        .bind(&poi.description)
        .bind(geometry)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(id)
}

pub async fn load_pois<S: RowSink>(sink: &mut S, table: &str, records: &[PoiRecord]) -> ImportReport {
    let sql = poi_insert_sql(table);
    let mut report = ImportReport::default();

    for poi in records {
        let title = poi.title.as_deref().unwrap_or("<untitled>");

        let outcome = sink.upsert_poi(&sql, poi).await;
        match &outcome {
            Ok(Some(id)) => info!("inserted {} with id {}", title, id),
            Ok(None) => debug!(title, "already present"),
            Err(e) => error!(title, error = %e, "insert failed"),
        }
        report.record(&outcome);
    }

    report
}
