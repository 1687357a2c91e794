//! Dimensional transform.
//!
//! - Keys: `<prefix>_<n>` surrogate key generators
//! - Dates: `DD/MM/YYYY` parsing and calendar attributes
//! - Passes: property, location, time, amenity and fact passes
//! - Pipeline: parse → transform → export

pub mod dates;
pub mod keys;
pub mod passes;
pub mod pipeline;

pub use keys::KeyGenerator;
pub use passes::{
    amenity_pass, fact_pass, location_pass, property_pass, time_pass, transform, LocationIndex,
    TimeIndex, NO_AMENITIES_ID, NO_AMENITIES_LABEL,
};
pub use pipeline::*;
