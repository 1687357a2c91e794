//! Surrogate key generation.
//!
//! Keys look like `property_1`, `property_2`, ... One generator per
//! dimension; counters are never shared or reset.

pub const PROPERTY_PREFIX: &str = "property";
pub const LOCATION_PREFIX: &str = "location";
pub const AMENITY_PREFIX: &str = "amenity";
pub const DATE_PREFIX: &str = "date";

/// Unbounded `<prefix>_<n>` sequence.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    prefix: String,
    next: u64,
}

impl KeyGenerator {
    /// Start counting at 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }

    /// Draw the next key.
    pub fn next_key(&mut self) -> String {
        let key = format!("{}_{}", self.prefix, self.next);
        self.next += 1;
        key
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Iterator for KeyGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_key())
    }
}
