use std::collections::{HashMap, HashSet};
use std::fs;

use propstar::export::{AMENITIES_FILE, FACT_FILE, LOCATION_FILE, PROPERTY_FILE, TIME_FILE};
use propstar::{run_file, TransformOptions, REQUIRED_COLUMNS};
use tempfile::tempdir;

const ROWS: [&str; 4] = [
    "Rose Villa,Villa,2,2020,East,12 St 1,BKK1,Chamkarmon,Phnom Penh,01/01/2024,05/01/2024,200,180,4,3,\"$250,000\",\"Pool, Gym\"",
    "Sky Condo,Condo,12,2021,,12 St 1,BKK1,Chamkarmon,Phnom Penh,05/01/2024,01/01/2024,,80,2,1,\"$120,000\",\"Gym, Parking\"",
    "Old Flat,Flat,,,,,Toul Kork,Toul Kork,Phnom Penh,15/06/2023,,,,,,$40000,",
    "Shop,Shophouse,,,,7 St 2,Svay Dangkum,Siem Reap,Siem Reap,bad date,15/06/2023,,,,,$90000,Parking",
];

fn listings_csv() -> String {
    let mut csv = REQUIRED_COLUMNS.join(",");
    for row in ROWS {
        csv.push('\n');
        csv.push_str(row);
    }
    csv
}

fn read_table(path: &std::path::Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().clone();
    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            headers.iter().map(String::from).zip(r.iter().map(String::from)).collect()
        })
        .collect()
}

#[test]
fn transforms_listings_file_into_five_tables() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("realestate.csv");
    fs::write(&input, listings_csv()).unwrap();
    let out = dir.path().join("warehouse");

    let report = run_file(&input, TransformOptions::default().with_output_dir(&out)).unwrap();
    assert_eq!(report.exported.len(), 5);
    assert_eq!(report.unparseable_dates, 1);

    let property = read_table(&out.join(PROPERTY_FILE));
    let location = read_table(&out.join(LOCATION_FILE));
    let time = read_table(&out.join(TIME_FILE));
    let amenities = read_table(&out.join(AMENITIES_FILE));
    let facts = read_table(&out.join(FACT_FILE));

    // One property and one fact per listing, aligned by position.
    assert_eq!(property.len(), ROWS.len());
    assert_eq!(facts.len(), ROWS.len());
    for (i, (p, f)) in property.iter().zip(&facts).enumerate() {
        assert_eq!(p["property_id"], format!("property_{}", i + 1));
        assert_eq!(f["property_id"], p["property_id"]);
    }

    // Shared location tuple collapses to one row.
    assert_eq!(location.len(), 3);
    assert_eq!(facts[0]["location_id"], "location_1");
    assert_eq!(facts[1]["location_id"], "location_1");
    assert_eq!(facts[2]["location_id"], "location_2");
    assert_eq!(location[1]["address"], "");

    // Distinct dates across both fields, first-seen order (listed, then updated).
    let dates: Vec<&str> = time.iter().map(|t| t["date"].as_str()).collect();
    assert_eq!(dates, ["2024-01-01", "2024-01-05", "2023-06-15"]);
    assert_eq!(time[2]["quarter"], "Q2");
    assert_eq!(time[2]["day_of_week"], "Thursday");
    assert_eq!(facts[1]["listed_date"], "date_2");
    assert_eq!(facts[1]["updated_date"], "date_1");
    assert_eq!(facts[3]["listed_date"], "");
    assert_eq!(facts[3]["updated_date"], "date_3");

    // Amenity names keep one key everywhere; empty cell gets the sentinel.
    let mut by_name: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in &amenities {
        by_name
            .entry(row["amenity_name"].as_str())
            .or_default()
            .insert(row["amenity_id"].as_str());
    }
    assert!(by_name.values().all(|ids| ids.len() == 1));
    assert_eq!(by_name["Gym"], HashSet::from(["amenity_2"]));
    assert_eq!(by_name["Parking"], HashSet::from(["amenity_3"]));

    let sentinel: Vec<_> = amenities
        .iter()
        .filter(|r| r["property_id"] == "property_3")
        .collect();
    assert_eq!(sentinel.len(), 1);
    assert_eq!(sentinel[0]["amenity_id"], "No_amenities");
    assert_eq!(sentinel[0]["amenity_name"], "No amenities");
}

#[test]
fn rerun_is_deterministic() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("realestate.csv");
    fs::write(&input, listings_csv()).unwrap();

    let first = run_file(&input, TransformOptions::default().with_output_dir(dir.path().join("a"))).unwrap();
    let second = run_file(&input, TransformOptions::default().with_output_dir(dir.path().join("b"))).unwrap();

    assert_eq!(first.schema, second.schema);
    for name in [PROPERTY_FILE, LOCATION_FILE, TIME_FILE, AMENITIES_FILE, FACT_FILE] {
        let a = fs::read(dir.path().join("a").join(name)).unwrap();
        let b = fs::read(dir.path().join("b").join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
    }
}
