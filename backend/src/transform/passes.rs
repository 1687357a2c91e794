//! The dimensional passes.
//!
//! ```text
//!  records ──▶ property_pass ──▶ Dim_Property + property keys ──┐
//!          ──▶ location_pass ──▶ Dim_Location + LocationIndex ──┤
//!          ──▶ time_pass     ──▶ Dim_Time     + TimeIndex     ──┼──▶ fact_pass ──▶ Fact
//!          ──▶ amenity_pass (+ property keys) ──▶ Dim_Amenities │
//! ```
//!
//! Each pass owns its key generator and dedup map and hands the map back,
//! so the fact pass resolves against exactly what the dimension passes
//! assigned. The n-th property key always belongs to the n-th record.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use super::dates::{day_of_week, month_name, parse_listing_date, quarter};
use super::keys::{KeyGenerator, AMENITY_PREFIX, DATE_PREFIX, LOCATION_PREFIX, PROPERTY_PREFIX};
use crate::models::{
    AmenityBridgeRow, FactRow, LocationRow, PropertyRow, RawListing, StarSchema, TimeRow,
};

/// Bridge key used for listings without amenities. Shared by every such listing.
pub const NO_AMENITIES_ID: &str = "No_amenities";
pub const NO_AMENITIES_LABEL: &str = "No amenities";

/// Separator between amenity names in the source field.
pub const AMENITY_SEPARATOR: &str = ", ";

/// Stand-in for an absent location part inside the dedup key.
const MISSING_PART: &str = "nan";

// =============================================================================
// Dedup indexes
// =============================================================================

/// Location dedup key → `location_n`.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    keys: HashMap<String, String>,
}

impl LocationIndex {
    /// `address_commune_district_city`, verbatim.
    pub fn dedup_key(record: &RawListing) -> String {
        let part = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING_PART.to_string());
        format!(
            "{}_{}_{}_{}",
            part(&record.address),
            part(&record.commune),
            part(&record.district),
            part(&record.city)
        )
    }

    pub fn get(&self, record: &RawListing) -> Option<&String> {
        self.keys.get(&Self::dedup_key(record))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Calendar date → `date_n`.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    keys: HashMap<NaiveDate, String>,
}

impl TimeIndex {
    pub fn get(&self, date: &NaiveDate) -> Option<&String> {
        self.keys.get(date)
    }

    /// Parse a raw date field and resolve it.
    pub fn resolve(&self, value: Option<&str>) -> Option<String> {
        parse_listing_date(value).and_then(|d| self.keys.get(&d).cloned())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// =============================================================================
// Passes
// =============================================================================

/// One `Dim_Property` row per record, plus the positional key list.
pub fn property_pass(records: &[RawListing]) -> (Vec<PropertyRow>, Vec<String>) {
    let mut ids = KeyGenerator::new(PROPERTY_PREFIX);
    let mut rows = Vec::with_capacity(records.len());
    let mut keys = Vec::with_capacity(records.len());

    for record in records {
        let property_id = ids.next_key();
        rows.push(PropertyRow {
            property_id: property_id.clone(),
            property_name: record.property_name.clone(),
            property_types: record.property_types.clone(),
            floor_level: record.floor_level.clone(),
            completion_year: record.completion_year.clone(),
            facing: record.facing.clone(),
        });
        keys.push(property_id);
    }

    (rows, keys)
}

/// One `Dim_Location` row per distinct location; first occurrence wins.
pub fn location_pass(records: &[RawListing]) -> (Vec<LocationRow>, LocationIndex) {
    let mut ids = KeyGenerator::new(LOCATION_PREFIX);
    let mut index = LocationIndex::default();
    let mut rows = Vec::new();

    for record in records {
        let key = LocationIndex::dedup_key(record);
        if index.keys.contains_key(&key) {
            continue;
        }
        let location_id = ids.next_key();
        rows.push(LocationRow {
            location_id: location_id.clone(),
            address: record.address.clone(),
            commune: record.commune.clone(),
            district: record.district.clone(),
            city: record.city.clone(),
        });
        index.keys.insert(key, location_id);
    }

    (rows, index)
}

/// One `Dim_Time` row per distinct date across `listed_date` and `updated_date`.
///
/// All listed dates are scanned before any updated date. Unparseable values
/// are skipped.
pub fn time_pass(records: &[RawListing]) -> (Vec<TimeRow>, TimeIndex) {
    let mut ids = KeyGenerator::new(DATE_PREFIX);
    let mut index = TimeIndex::default();
    let mut rows = Vec::new();

    let listed = records.iter().map(|r| r.listed_date.as_deref());
    let updated = records.iter().map(|r| r.updated_date.as_deref());

    for value in listed.chain(updated) {
        let Some(date) = parse_listing_date(value) else {
            continue;
        };
        if index.keys.contains_key(&date) {
            continue;
        }
        let date_id = ids.next_key();
        rows.push(TimeRow {
            date_id: date_id.clone(),
            date,
            day_of_week: day_of_week(date),
            month: month_name(date),
            quarter: quarter(date),
            year: date.year(),
        });
        index.keys.insert(date, date_id);
    }

    (rows, index)
}

/// Amenity ↔ property bridge rows.
///
/// Amenity keys are shared by name across the whole batch. Repeats inside
/// one record each get a row.
pub fn amenity_pass(records: &[RawListing], property_keys: &[String]) -> Vec<AmenityBridgeRow> {
    debug_assert_eq!(records.len(), property_keys.len());

    let mut ids = KeyGenerator::new(AMENITY_PREFIX);
    let mut amenity_keys: HashMap<String, String> = HashMap::new();
    let mut rows = Vec::new();

    for (record, property_id) in records.iter().zip(property_keys) {
        let Some(amenities) = record.amenity_list() else {
            rows.push(AmenityBridgeRow {
                amenity_id: NO_AMENITIES_ID.to_string(),
                property_id: property_id.clone(),
                amenity_name: NO_AMENITIES_LABEL.to_string(),
            });
            continue;
        };

        for name in amenities.split(AMENITY_SEPARATOR) {
            let amenity_id = amenity_keys
                .entry(name.to_string())
                .or_insert_with(|| ids.next_key())
                .clone();
            rows.push(AmenityBridgeRow {
                amenity_id,
                property_id: property_id.clone(),
                amenity_name: name.to_string(),
            });
        }
    }

    rows
}

/// One `Fact_PropertyListings` row per record.
///
/// Date and location lookups that miss degrade to `None`.
pub fn fact_pass(
    records: &[RawListing],
    property_keys: &[String],
    locations: &LocationIndex,
    times: &TimeIndex,
) -> Vec<FactRow> {
    debug_assert_eq!(records.len(), property_keys.len());

    records
        .iter()
        .zip(property_keys)
        .map(|(record, property_id)| FactRow {
            property_id: property_id.clone(),
            price: record.price.clone(),
            listed_date: times.resolve(record.listed_date.as_deref()),
            updated_date: times.resolve(record.updated_date.as_deref()),
            land_area: record.land_area.clone(),
            floor_area: record.floor_area.clone(),
            bedrooms: record.bedrooms.clone(),
            bathrooms: record.bathrooms.clone(),
            location_id: locations.get(record).cloned(),
        })
        .collect()
}

/// Run every pass over one batch.
pub fn transform(records: &[RawListing]) -> StarSchema {
    let (property, property_keys) = property_pass(records);
    let (location, locations) = location_pass(records);
    let (time, times) = time_pass(records);
    let amenities = amenity_pass(records, &property_keys);
    let facts = fact_pass(records, &property_keys, &locations, &times);

    StarSchema {
        property,
        location,
        time,
        amenities,
        facts,
    }
}

/// Date fields that are present but cannot be parsed.
pub fn unparseable_dates(records: &[RawListing]) -> Vec<(usize, &'static str, String)> {
    let mut bad = Vec::new();
    for (i, record) in records.iter().enumerate() {
        for (field, value) in [
            ("listed_date", &record.listed_date),
            ("updated_date", &record.updated_date),
        ] {
            if let Some(v) = value {
                if parse_listing_date(Some(v)).is_none() {
                    bad.push((i, field, v.clone()));
                }
            }
        }
    }
    bad
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn listing(address: &str, listed: &str, updated: &str, amenities: Option<&str>) -> RawListing {
        RawListing {
            property_name: Some(format!("{address} home")),
            property_types: Some("Flat".into()),
            address: Some(address.into()),
            commune: Some("BKK1".into()),
            district: Some("Chamkarmon".into()),
            city: Some("Phnom Penh".into()),
            listed_date: Some(listed.into()),
            updated_date: Some(updated.into()),
            price: Some("$100,000".into()),
            bedrooms: Some("2".into()),
            amenities: amenities.map(String::from),
            ..Default::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_record_example() {
        let records = vec![listing("12 St 1", "01/01/2024", "05/01/2024", Some("Pool, Gym"))];
        let schema = transform(&records);

        assert_eq!(schema.property.len(), 1);
        assert_eq!(schema.property[0].property_id, "property_1");

        assert_eq!(schema.location.len(), 1);
        assert_eq!(schema.location[0].location_id, "location_1");
        assert_eq!(schema.location[0].city.as_deref(), Some("Phnom Penh"));

        assert_eq!(schema.time.len(), 2);
        assert_eq!(schema.time[0].date_id, "date_1");
        assert_eq!(schema.time[0].date, ymd(2024, 1, 1));
        assert_eq!(schema.time[0].day_of_week, "Monday");
        assert_eq!(schema.time[0].month, "January");
        assert_eq!(schema.time[0].quarter, "Q1");
        assert_eq!(schema.time[0].year, 2024);
        assert_eq!(schema.time[1].date_id, "date_2");
        assert_eq!(schema.time[1].date, ymd(2024, 1, 5));

        let bridge: Vec<(&str, &str, &str)> = schema
            .amenities
            .iter()
            .map(|r| (r.amenity_id.as_str(), r.property_id.as_str(), r.amenity_name.as_str()))
            .collect();
        assert_eq!(
            bridge,
            vec![("amenity_1", "property_1", "Pool"), ("amenity_2", "property_1", "Gym")]
        );

        let fact = &schema.facts[0];
        assert_eq!(fact.property_id, "property_1");
        assert_eq!(fact.listed_date.as_deref(), Some("date_1"));
        assert_eq!(fact.updated_date.as_deref(), Some("date_2"));
        assert_eq!(fact.location_id.as_deref(), Some("location_1"));
        assert_eq!(fact.price.as_deref(), Some("$100,000"));
        assert_eq!(fact.bedrooms.as_deref(), Some("2"));
    }

    #[test]
    fn test_property_and_fact_one_per_record() {
        let records: Vec<RawListing> = (0..5)
            .map(|_| listing("Same St", "01/01/2024", "01/01/2024", None))
            .enumerate()
            .map(|(i, mut r)| {
                r.price = Some(format!("{i}"));
                r
            })
            .collect();
        let schema = transform(&records);

        assert_eq!(schema.property.len(), 5);
        assert_eq!(schema.facts.len(), 5);
        for (i, (p, f)) in schema.property.iter().zip(&schema.facts).enumerate() {
            assert_eq!(p.property_id, format!("property_{}", i + 1));
            assert_eq!(f.property_id, p.property_id);
            assert_eq!(f.price.as_deref(), Some(i.to_string().as_str()));
        }
    }

    #[test]
    fn test_location_dedup_first_wins() {
        let mut second = listing("12 St 1", "01/01/2024", "01/01/2024", None);
        second.property_name = Some("Other".into());
        let records = vec![
            listing("12 St 1", "01/01/2024", "01/01/2024", None),
            listing("99 St 2", "01/01/2024", "01/01/2024", None),
            second,
        ];
        let schema = transform(&records);

        assert_eq!(schema.location.len(), 2);
        assert_eq!(schema.facts[0].location_id.as_deref(), Some("location_1"));
        assert_eq!(schema.facts[1].location_id.as_deref(), Some("location_2"));
        assert_eq!(schema.facts[2].location_id.as_deref(), Some("location_1"));
    }

    #[test]
    fn test_location_not_normalized() {
        let records = vec![
            listing("12 St 1", "01/01/2024", "01/01/2024", None),
            listing("12 st 1", "01/01/2024", "01/01/2024", None),
            listing("12 St 1 ", "01/01/2024", "01/01/2024", None),
        ];
        let (rows, index) = location_pass(&records);
        assert_eq!(rows.len(), 3);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_location_missing_parts_share_key() {
        let mut a = listing("12 St 1", "01/01/2024", "01/01/2024", None);
        a.commune = None;
        let b = a.clone();
        assert_eq!(LocationIndex::dedup_key(&a), "12 St 1_nan_Chamkarmon_Phnom Penh");

        let (rows, _) = location_pass(&[a, b]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commune, None);
    }

    #[test]
    fn test_time_pooled_across_fields() {
        let records = vec![
            listing("A", "01/01/2024", "03/01/2024", None),
            listing("B", "02/01/2024", "01/01/2024", None),
            listing("C", "03/01/2024", "02/01/2024", None),
        ];
        let (rows, index) = time_pass(&records);

        assert_eq!(rows.len(), 3);
        assert_eq!(index.len(), 3);
        let dates: HashSet<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates.len(), 3);
        // listed dates first, in record order
        assert_eq!(rows[0].date, ymd(2024, 1, 1));
        assert_eq!(rows[1].date, ymd(2024, 1, 2));
        assert_eq!(rows[2].date, ymd(2024, 1, 3));
    }

    #[test]
    fn test_time_listed_before_updated() {
        let records = vec![
            listing("A", "01/01/2024", "09/09/2024", None),
            listing("B", "02/02/2024", "01/01/2024", None),
        ];
        let (rows, _) = time_pass(&records);
        let ids: Vec<(&str, NaiveDate)> = rows.iter().map(|r| (r.date_id.as_str(), r.date)).collect();
        assert_eq!(
            ids,
            vec![
                ("date_1", ymd(2024, 1, 1)),
                ("date_2", ymd(2024, 2, 2)),
                ("date_3", ymd(2024, 9, 9)),
            ]
        );
    }

    #[test]
    fn test_time_dedup_by_date_value() {
        let records = vec![listing("A", "01/01/2024", " 01/01/2024", None)];
        let (rows, _) = time_pass(&records);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_quarter_matches_month() {
        let records: Vec<RawListing> = (1..=12)
            .map(|m| listing("A", &format!("15/{m:02}/2023"), "", None))
            .collect();
        let (rows, _) = time_pass(&records);

        assert_eq!(rows.len(), 12);
        for row in rows {
            let month = row.date.month();
            assert_eq!(row.quarter, format!("Q{}", (month - 1) / 3 + 1));
        }
    }

    #[test]
    fn test_unparseable_dates_become_null() {
        let mut bad = listing("A", "N/A", "05/01/2024", None);
        bad.updated_date = Some("2024-01-05".into());
        let mut missing = listing("B", "01/01/2024", "", None);
        missing.updated_date = None;

        let records = vec![bad, missing];
        let schema = transform(&records);

        assert_eq!(schema.time.len(), 1);
        assert_eq!(schema.facts[0].listed_date, None);
        assert_eq!(schema.facts[0].updated_date, None);
        assert_eq!(schema.facts[1].listed_date.as_deref(), Some("date_1"));
        assert_eq!(schema.facts[1].updated_date, None);

        let reported = unparseable_dates(&records);
        assert_eq!(reported.len(), 2);
        assert_eq!(reported[0], (0, "listed_date", "N/A".to_string()));
        assert_eq!(reported[1], (0, "updated_date", "2024-01-05".to_string()));
    }

    #[test]
    fn test_amenity_keys_shared_across_records() {
        let records = vec![
            listing("A", "01/01/2024", "01/01/2024", Some("Pool, Gym")),
            listing("B", "01/01/2024", "01/01/2024", Some("Gym, Parking, Pool")),
        ];
        let (_, keys) = property_pass(&records);
        let rows = amenity_pass(&records, &keys);

        let mut by_name: HashMap<&str, HashSet<&str>> = HashMap::new();
        for row in &rows {
            by_name
                .entry(row.amenity_name.as_str())
                .or_default()
                .insert(row.amenity_id.as_str());
        }
        assert_eq!(by_name["Pool"], HashSet::from(["amenity_1"]));
        assert_eq!(by_name["Gym"], HashSet::from(["amenity_2"]));
        assert_eq!(by_name["Parking"], HashSet::from(["amenity_3"]));
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].property_id, "property_2");
    }

    #[test]
    fn test_amenity_repeats_within_record() {
        let records = vec![listing("A", "01/01/2024", "01/01/2024", Some("Lift, Lift"))];
        let (_, keys) = property_pass(&records);
        let rows = amenity_pass(&records, &keys);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.amenity_id == "amenity_1"));
    }

    #[test]
    fn test_no_amenities_sentinel_per_property() {
        let records = vec![
            listing("A", "01/01/2024", "01/01/2024", None),
            listing("B", "01/01/2024", "01/01/2024", Some("")),
            listing("C", "01/01/2024", "01/01/2024", Some("Pool")),
        ];
        let (_, keys) = property_pass(&records);
        let rows = amenity_pass(&records, &keys);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amenity_id, NO_AMENITIES_ID);
        assert_eq!(rows[0].amenity_name, NO_AMENITIES_LABEL);
        assert_eq!(rows[0].property_id, "property_1");
        assert_eq!(rows[1].amenity_id, NO_AMENITIES_ID);
        assert_eq!(rows[1].property_id, "property_2");
        // the sentinel does not consume an amenity key
        assert_eq!(rows[2].amenity_id, "amenity_1");
    }

    #[test]
    fn test_property_keys_agree_across_tables() {
        let records = vec![
            listing("A", "01/01/2024", "01/01/2024", Some("Pool")),
            listing("B", "01/01/2024", "01/01/2024", None),
            listing("C", "01/01/2024", "01/01/2024", Some("Gym, Pool")),
        ];
        let schema = transform(&records);

        let amenity_props: Vec<&str> = schema.amenities.iter().map(|r| r.property_id.as_str()).collect();
        assert_eq!(amenity_props, vec!["property_1", "property_2", "property_3", "property_3"]);
        for (p, f) in schema.property.iter().zip(&schema.facts) {
            assert_eq!(p.property_id, f.property_id);
        }
    }

    #[test]
    fn test_missing_lookups_degrade_to_none() {
        let records = vec![listing("A", "01/01/2024", "02/01/2024", None)];
        let (_, keys) = property_pass(&records);
        let facts = fact_pass(&records, &keys, &LocationIndex::default(), &TimeIndex::default());

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].location_id, None);
        assert_eq!(facts[0].listed_date, None);
        assert_eq!(facts[0].updated_date, None);
    }

    #[test]
    fn test_deterministic_rerun() {
        let records = vec![
            listing("A", "01/01/2024", "05/03/2024", Some("Pool, Gym")),
            listing("B", "07/07/2023", "01/01/2024", None),
            listing("A", "09/10/2024", "09/10/2024", Some("Gym")),
        ];
        assert_eq!(transform(&records), transform(&records));
    }

    #[test]
    fn test_empty_batch() {
        let schema = transform(&[]);
        assert_eq!(schema, StarSchema::default());
    }
}
