//! Domain models for the Propstar pipeline.
//!
//! - [`RawListing`] - one scraped listing, all fields as found in the source
//! - [`PropertyRow`], [`LocationRow`], [`TimeRow`] - dimension rows
//! - [`AmenityBridgeRow`] - amenity ↔ property bridge
//! - [`FactRow`] - one row per listing referencing the dimensions
//! - [`StarSchema`] - the five tables produced by a transform

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Listing
// =============================================================================

/// Columns every listings file must carry.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "property_name",
    "property_types",
    "floor_level",
    "completion_year",
    "facing",
    "address",
    "commune",
    "district",
    "city",
    "listed_date",
    "updated_date",
    "land_area",
    "floor_area",
    "bedrooms",
    "bathrooms",
    "price",
    "amenities",
];

/// A listing as scraped, before any modeling.
///
/// Values are kept verbatim. `None` means the cell was empty or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Site-assigned listing id. Carried through the raw CSV only.
    #[serde(default)]
    pub property_id: Option<String>,
    pub property_name: Option<String>,
    pub property_types: Option<String>,
    pub floor_level: Option<String>,
    pub completion_year: Option<String>,
    pub facing: Option<String>,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub listed_date: Option<String>,
    pub updated_date: Option<String>,
    pub land_area: Option<String>,
    pub floor_area: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub price: Option<String>,
    pub amenities: Option<String>,
}

impl RawListing {
    /// Get a mutable slot by column name.
    pub fn field_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        let slot = match column {
            "property_id" => &mut self.property_id,
            "property_name" => &mut self.property_name,
            "property_types" => &mut self.property_types,
            "floor_level" => &mut self.floor_level,
            "completion_year" => &mut self.completion_year,
            "facing" => &mut self.facing,
            "address" => &mut self.address,
            "commune" => &mut self.commune,
            "district" => &mut self.district,
            "city" => &mut self.city,
            "listed_date" => &mut self.listed_date,
            "updated_date" => &mut self.updated_date,
            "land_area" => &mut self.land_area,
            "floor_area" => &mut self.floor_area,
            "bedrooms" => &mut self.bedrooms,
            "bathrooms" => &mut self.bathrooms,
            "price" => &mut self.price,
            "amenities" => &mut self.amenities,
            _ => return None,
        };
        Some(slot)
    }

    /// Amenities if present and non-empty.
    pub fn amenity_list(&self) -> Option<&str> {
        self.amenities.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Dimension Rows
// =============================================================================

/// `Dim_Property` row. One per listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRow {
    pub property_id: String,
    pub property_name: Option<String>,
    pub property_types: Option<String>,
    pub floor_level: Option<String>,
    pub completion_year: Option<String>,
    pub facing: Option<String>,
}

/// `Dim_Location` row. One per distinct address/commune/district/city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub location_id: String,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
}

/// `Dim_Time` row. One per distinct calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRow {
    pub date_id: String,
    pub date: chrono::NaiveDate,
    pub day_of_week: String,
    pub month: String,
    pub quarter: String,
    pub year: i32,
}

/// `Dim_Amenities` bridge row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityBridgeRow {
    pub amenity_id: String,
    pub property_id: String,
    pub amenity_name: String,
}

// =============================================================================
// Fact Row
// =============================================================================

/// `Fact_PropertyListings` row.
///
/// `listed_date` and `updated_date` hold `Dim_Time` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub property_id: String,
    pub price: Option<String>,
    pub listed_date: Option<String>,
    pub updated_date: Option<String>,
    pub land_area: Option<String>,
    pub floor_area: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub location_id: Option<String>,
}

// =============================================================================
// Star Schema
// =============================================================================

/// The five tables produced from one batch of listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarSchema {
    pub property: Vec<PropertyRow>,
    pub location: Vec<LocationRow>,
    pub time: Vec<TimeRow>,
    pub amenities: Vec<AmenityBridgeRow>,
    pub facts: Vec<FactRow>,
}

impl StarSchema {
    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "{} properties, {} locations, {} dates, {} amenity links, {} facts",
            self.property.len(),
            self.location.len(),
            self.time.len(),
            self.amenities.len(),
            self.facts.len()
        )
    }
}
