//! CSV persistence for the star schema and for scraped listings.
//!
//! Every file gets a header row (also when the table is empty), comma
//! delimiter, no index column. `None` is written as an empty cell.

use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{ExportError, ExportResult};
use crate::models::{RawListing, StarSchema, REQUIRED_COLUMNS};

pub const PROPERTY_FILE: &str = "Dim_Property.csv";
pub const LOCATION_FILE: &str = "Dim_Location.csv";
pub const TIME_FILE: &str = "Dim_Time.csv";
pub const AMENITIES_FILE: &str = "Dim_Amenities.csv";
pub const FACT_FILE: &str = "Fact_PropertyListings.csv";

pub const PROPERTY_COLUMNS: [&str; 6] = [
    "property_id",
    "property_name",
    "property_types",
    "floor_level",
    "completion_year",
    "facing",
];
pub const LOCATION_COLUMNS: [&str; 5] = ["location_id", "address", "commune", "district", "city"];
pub const TIME_COLUMNS: [&str; 6] = ["date_id", "date", "day_of_week", "month", "quarter", "year"];
pub const AMENITIES_COLUMNS: [&str; 3] = ["amenity_id", "property_id", "amenity_name"];
pub const FACT_COLUMNS: [&str; 9] = [
    "property_id",
    "price",
    "listed_date",
    "updated_date",
    "land_area",
    "floor_area",
    "bedrooms",
    "bathrooms",
    "location_id",
];

/// A table written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTable {
    pub path: PathBuf,
    pub rows: usize,
}

/// Write the five tables into `dir`, creating it if needed.
pub fn write_star_schema(schema: &StarSchema, dir: &Path) -> ExportResult<Vec<ExportedTable>> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    Ok(vec![
        write_table(&dir.join(PROPERTY_FILE), &PROPERTY_COLUMNS, &schema.property)?,
        write_table(&dir.join(LOCATION_FILE), &LOCATION_COLUMNS, &schema.location)?,
        write_table(&dir.join(TIME_FILE), &TIME_COLUMNS, &schema.time)?,
        write_table(&dir.join(AMENITIES_FILE), &AMENITIES_COLUMNS, &schema.amenities)?,
        write_table(&dir.join(FACT_FILE), &FACT_COLUMNS, &schema.facts)?,
    ])
}

/// Write scraped listings in the layout [`crate::parser`] reads back.
pub fn write_listings(records: &[RawListing], path: &Path) -> ExportResult<ExportedTable> {
    let mut columns = vec!["property_id"];
    columns.extend(REQUIRED_COLUMNS);
    write_table(path, &columns, records)
}

/// Write one table. `columns` must follow the field order of `T`.
pub fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> ExportResult<ExportedTable> {
    let table = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let csv_err = |source: csv::Error| ExportError::Csv {
        table: table.clone(),
        source,
    };

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(columns).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(ExportedTable {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes_auto;
    use crate::transform::passes::transform;
    use tempfile::tempdir;

    fn sample() -> Vec<RawListing> {
        vec![
            RawListing {
                property_name: Some("Rose Villa".into()),
                address: Some("12 St 1, BKK1".into()),
                commune: Some("BKK1".into()),
                district: Some("Chamkarmon".into()),
                city: Some("Phnom Penh".into()),
                listed_date: Some("01/01/2024".into()),
                updated_date: Some("05/01/2024".into()),
                price: Some("$250,000".into()),
                amenities: Some("Pool, Gym".into()),
                ..Default::default()
            },
            RawListing {
                property_name: Some("Flat".into()),
                listed_date: Some("bad".into()),
                ..Default::default()
            },
        ]
    }

    fn read(path: &Path) -> Vec<String> {
        fs::read_to_string(path).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn test_writes_five_files_with_headers() {
        let dir = tempdir().unwrap();
        let schema = transform(&sample());
        let tables = write_star_schema(&schema, dir.path()).unwrap();

        assert_eq!(tables.len(), 5);
        assert_eq!(read(&dir.path().join(PROPERTY_FILE))[0], PROPERTY_COLUMNS.join(","));
        assert_eq!(read(&dir.path().join(LOCATION_FILE))[0], LOCATION_COLUMNS.join(","));
        assert_eq!(read(&dir.path().join(TIME_FILE))[0], TIME_COLUMNS.join(","));
        assert_eq!(read(&dir.path().join(AMENITIES_FILE))[0], AMENITIES_COLUMNS.join(","));
        assert_eq!(read(&dir.path().join(FACT_FILE))[0], FACT_COLUMNS.join(","));
    }

    #[test]
    fn test_row_content() {
        let dir = tempdir().unwrap();
        write_star_schema(&transform(&sample()), dir.path()).unwrap();

        let time = read(&dir.path().join(TIME_FILE));
        assert_eq!(time[1], "date_1,2024-01-01,Monday,January,Q1,2024");
        assert_eq!(time[2], "date_2,2024-01-05,Friday,January,Q1,2024");

        let facts = read(&dir.path().join(FACT_FILE));
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[1], "property_1,\"$250,000\",date_1,date_2,,,,,location_1");
        assert_eq!(facts[2], "property_2,,,,,,,,location_2");

        let amenities = read(&dir.path().join(AMENITIES_FILE));
        assert_eq!(amenities[1..], ["amenity_1,property_1,Pool", "amenity_2,property_1,Gym", "No_amenities,property_2,No amenities"]);

        let location = read(&dir.path().join(LOCATION_FILE));
        assert_eq!(location[1], "location_1,\"12 St 1, BKK1\",BKK1,Chamkarmon,Phnom Penh");
    }

    #[test]
    fn test_empty_tables_keep_header() {
        let dir = tempdir().unwrap();
        let tables = write_star_schema(&StarSchema::default(), dir.path()).unwrap();

        assert!(tables.iter().all(|t| t.rows == 0));
        assert_eq!(read(&dir.path().join(FACT_FILE)), vec![FACT_COLUMNS.join(",")]);
    }

    #[test]
    fn test_creates_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("tables");
        write_star_schema(&StarSchema::default(), &nested).unwrap();
        assert!(nested.join(PROPERTY_FILE).exists());
    }

    #[test]
    fn test_listings_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("realestate.csv");
        let records = sample();

        let table = write_listings(&records, &path).unwrap();
        assert_eq!(table.rows, 2);

        let parsed = parse_bytes_auto(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed.delimiter, ',');
        assert_eq!(parsed.records, records);
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempdir().unwrap();
        let err = write_table::<RawListing>(&dir.path().join("missing").join("x.csv"), &["a"], &[]).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
