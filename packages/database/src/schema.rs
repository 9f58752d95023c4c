//! Table bootstrap for empty databases.
//!
//! Production databases arrive fully populated from the importer. The
//! statements here only run `CREATE TABLE IF NOT EXISTS`, so pointing the
//! server at an existing file never alters it, while a fresh file (or a
//! test database) gets the same layout the importer produces.

use conflict_atlas_records_models::{Column, EventColumn, LandTitleColumn};
use switchy_database::Database;

use crate::DbError;
use crate::filter::quote_ident;

/// Storage types of the conflict events table, in importer order.
const EVENT_COLUMNS: &[(EventColumn, &str)] = &[
    (EventColumn::EventId, "INTEGER"),
    (EventColumn::RelatedEventId, "INTEGER"),
    (EventColumn::Year, "INTEGER"),
    (EventColumn::Month, "INTEGER"),
    (EventColumn::Quarter, "INTEGER"),
    (EventColumn::ReportedDate, "VARCHAR"),
    (EventColumn::Commune, "VARCHAR"),
    (EventColumn::Province, "VARCHAR"),
    (EventColumn::Region, "VARCHAR"),
    (EventColumn::LocationType, "VARCHAR"),
    (EventColumn::Rural, "VARCHAR"),
    (EventColumn::EventType, "VARCHAR"),
    (EventColumn::EventSpecific, "VARCHAR"),
    (EventColumn::Actor1Type, "VARCHAR"),
    (EventColumn::Actor1Name, "VARCHAR"),
    (EventColumn::Actor1Specific, "VARCHAR"),
    (EventColumn::Actor1SpecificCount, "VARCHAR"),
    (EventColumn::Actor1SpecificWeapons, "VARCHAR"),
    (EventColumn::Actor1Related, "VARCHAR"),
    (EventColumn::Actor2Type, "VARCHAR"),
    (EventColumn::Actor2Name, "VARCHAR"),
    (EventColumn::Actor2Specific, "VARCHAR"),
    (EventColumn::Actor2SpecificCount, "VARCHAR"),
    (EventColumn::Actor2SpecificWeapons, "VARCHAR"),
    (EventColumn::Actor2Related, "VARCHAR"),
    (EventColumn::ActorIndigenous, "VARCHAR"),
    (EventColumn::IndigenousIdentified, "VARCHAR"),
    (EventColumn::Confrontation, "VARCHAR"),
    (EventColumn::Initiator, "VARCHAR"),
    (EventColumn::Description, "VARCHAR"),
    (EventColumn::PropertyDestroyed, "VARCHAR"),
    (EventColumn::PropertyDamaged, "VARCHAR"),
    (EventColumn::PropertyStolen, "VARCHAR"),
    (EventColumn::EstimatedLoss, "FLOAT"),
    (EventColumn::Arrests, "INTEGER"),
    (EventColumn::Injured, "INTEGER"),
    (EventColumn::Killed, "INTEGER"),
    (EventColumn::MercurioIndex, "FLOAT"),
    (EventColumn::MellaIndex, "FLOAT"),
    (EventColumn::OsalIndex, "FLOAT"),
    (EventColumn::CitizenFlag, "VARCHAR"),
    (EventColumn::BiobioFlag, "VARCHAR"),
];

/// Storage types of the land-title grants table, in importer order.
const LAND_TITLE_COLUMNS: &[(LandTitleColumn, &str)] = &[
    (LandTitleColumn::RegionId, "INTEGER"),
    (LandTitleColumn::RegionName, "VARCHAR"),
    (LandTitleColumn::ProvinceId, "INTEGER"),
    (LandTitleColumn::ProvinceName, "VARCHAR"),
    (LandTitleColumn::CommuneId, "INTEGER"),
    (LandTitleColumn::CommuneName, "VARCHAR"),
    (LandTitleColumn::Place, "VARCHAR"),
    (LandTitleColumn::Beneficiary, "VARCHAR"),
    (LandTitleColumn::GrantYear, "INTEGER"),
    (LandTitleColumn::OriginalReference, "VARCHAR"),
    (LandTitleColumn::GrantNumber, "VARCHAR"),
    (LandTitleColumn::GrantLetter, "VARCHAR"),
    (LandTitleColumn::Area, "VARCHAR"),
    (LandTitleColumn::GeoArea, "VARCHAR"),
    (LandTitleColumn::Perimeter, "VARCHAR"),
    (LandTitleColumn::Longitude, "FLOAT"),
    (LandTitleColumn::Latitude, "FLOAT"),
];

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for `C`'s table with
/// an autoincrement `id` primary key followed by `columns`.
fn create_table_sql<C: Column>(columns: &[(C, &str)]) -> String {
    let mut defs = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    defs.extend(
        columns
            .iter()
            .map(|(column, sql_type)| format!("{} {sql_type}", quote_ident(column.name()))),
    );

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        C::TABLE,
        defs.join(",\n    ")
    )
}

/// Creates both dataset tables if they don't already exist.
///
/// # Errors
///
/// Returns [`DbError`] if a statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(&create_table_sql(EVENT_COLUMNS)).await?;
    db.exec_raw(&create_table_sql(LAND_TITLE_COLUMNS)).await?;

    log::debug!(
        "Ensured tables {} and {}",
        EventColumn::TABLE,
        LandTitleColumn::TABLE
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_statement_quotes_importer_columns() {
        let sql = create_table_sql(&[
            (LandTitleColumn::GrantYear, "INTEGER"),
            (LandTitleColumn::Area, "VARCHAR"),
        ]);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS tierras_titulomerced (\n    \
             id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
             \"tdm_año\" INTEGER,\n    \
             \"tdm_area\" VARCHAR\n)"
        );
    }

    #[test]
    fn event_table_covers_every_non_id_column() {
        assert_eq!(EVENT_COLUMNS.len(), 42);
        assert!(EVENT_COLUMNS.iter().all(|(c, _)| *c != EventColumn::Id));
        assert_eq!(LAND_TITLE_COLUMNS.len(), 17);
    }
}
