use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header cell that marks a table as machine-type pricing data
pub const MACHINE_TYPE_HEADER: &str = "Machine type";

/// Zero-based position of the price info cell in machine-type rows
pub const PRICE_COLUMN: usize = 3;

/// Key inside the price info cell holding the region -> price mapping
pub const PRICE_BY_REGION_KEY: &str = "priceByRegion";

/// One canonical pricing table
///
/// Rows stay loosely typed: cells are positionally aligned to `header`
/// and may be strings, numbers or nested objects.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Whether rows of this table describe machine types
    pub fn is_machine_type_table(&self) -> bool {
        self.header.iter().any(|h| h == MACHINE_TYPE_HEADER)
    }
}

/// A pricing table as handed over by the upstream extractor
///
/// Only the `layout` attribute is consumed; any other attribute the
/// element carried is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTable {
    #[serde(default)]
    pub layout: Option<String>,
}

impl RawTable {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: Some(layout.into()),
        }
    }
}
