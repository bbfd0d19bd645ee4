//! In-memory pricing catalog and the lookups served over HTTP.
//!
//! The catalog is loaded once and never mutated. Every query is a linear
//! scan over the rows of machine-type tables, in table order then row order,
//! driven by [`Catalog::machines`].

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::models::{Cell, Table, PRICE_BY_REGION_KEY, PRICE_COLUMN};
use crate::regions::default_regions;

/// Absolute tolerance for memory comparisons in fuzzy matching (GB)
pub const MEMORY_TOLERANCE_GB: f64 = 0.01;

const MACHINE_TYPE_COLUMN: usize = 0;
const CPUS_COLUMN: usize = 1;
const MEMORY_COLUMN: usize = 2;

/// Dataset could not be loaded at startup
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read pricing dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pricing dataset {} is not a valid table list: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A query matched nothing usable
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("Price not found for the specified CPU type or region")]
    PriceNotFound,

    #[error("Table with specified CPU type not found")]
    TypeNotFound,

    #[error("No pricing data available for machine type '{machine_type}' in the specified region: {region}")]
    NoRegionPricing { machine_type: String, region: String },

    #[error("No matching machine type found for the given specifications")]
    NoMatchingMachine,

    #[error("No machine types found with {cpus} CPUs and {memory_gb}GB memory")]
    NoCandidates { cpus: u32, memory_gb: f64 },

    #[error("No region has pricing data for {cpus} CPUs and {memory_gb}GB memory")]
    NoPricedRegion { cpus: u32, memory_gb: f64 },
}

/// A row that does not have the machine-type layout
#[derive(Debug, Error, PartialEq)]
pub enum RowShapeError {
    #[error("row has no cell at column {0}")]
    MissingCell(usize),

    #[error("cell at column {column} is not a number: {value}")]
    NotANumber { column: usize, value: String },

    #[error("machine type cell is not text")]
    MachineType,
}

/// Price of one machine type in one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostQuote {
    pub machine_type: String,
    pub cpus: u32,
    pub memory_gb: u32,
    pub region: String,
    pub cost: f64,
}

/// A machine type whose shape matches a CPU/memory request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineMatch {
    pub machine_type: String,
    pub cpus: u32,
    pub memory_gb: f64,
    pub price_info: Value,
}

/// Cheapest machine/region pair for a requested quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestRegion {
    pub machine_type: String,
    pub region: String,
    pub total_cost: f64,
}

/// machine type -> region -> cost
pub type ScaledCosts = BTreeMap<String, BTreeMap<String, f64>>;

/// Borrowed view of a machine-type row
#[derive(Debug, Clone, Copy)]
pub struct MachineRow<'a> {
    cells: &'a [Value],
}

impl<'a> MachineRow<'a> {
    pub fn new(cells: &'a [Value]) -> Self {
        Self { cells }
    }

    fn cell(&self, column: usize) -> Result<Cell<'a>, RowShapeError> {
        self.cells
            .get(column)
            .map(Cell::new)
            .ok_or(RowShapeError::MissingCell(column))
    }

    pub fn machine_type(&self) -> Result<&'a str, RowShapeError> {
        self.cell(MACHINE_TYPE_COLUMN)?
            .into_scalar()
            .as_str()
            .ok_or(RowShapeError::MachineType)
    }

    pub fn cpus(&self) -> Result<u32, RowShapeError> {
        let value = self.cell(CPUS_COLUMN)?.into_scalar();
        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| not_a_number(CPUS_COLUMN, value))
    }

    /// Memory in GB; text cells look like `"16GB"` or `" 3.75 GB"`
    pub fn memory_gb(&self) -> Result<f64, RowShapeError> {
        let value = self.cell(MEMORY_COLUMN)?.into_scalar();
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let s = s.trim();
                s.strip_suffix("GB").unwrap_or(s).trim().parse::<f64>().ok()
            }
            _ => None,
        };
        parsed
            .filter(|gb| gb.is_finite())
            .ok_or_else(|| not_a_number(MEMORY_COLUMN, value))
    }

    /// The price info cell as stored
    pub fn price_info(&self) -> Option<&'a Value> {
        self.cells.get(PRICE_COLUMN)
    }

    /// Price in `region`, if the row has one
    pub fn price_in(&self, region: &str) -> Option<f64> {
        let info = Cell::new(self.price_info()?).into_scalar();
        info.get(PRICE_BY_REGION_KEY)?.get(region)?.as_f64()
    }

    fn to_match(self) -> Result<MachineMatch, RowShapeError> {
        Ok(MachineMatch {
            machine_type: self.machine_type()?.to_string(),
            cpus: self.cpus()?,
            memory_gb: self.memory_gb()?,
            price_info: self.price_info().cloned().unwrap_or(Value::Null),
        })
    }
}

fn not_a_number(column: usize, value: &Value) -> RowShapeError {
    RowShapeError::NotANumber {
        column,
        value: value.to_string(),
    }
}

/// Immutable pricing dataset plus the region enumeration used by
/// multi-region queries
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Vec<Table>,
    regions: Vec<String>,
}

impl Catalog {
    pub fn new(tables: Vec<Table>, regions: Vec<String>) -> Self {
        Self { tables, regions }
    }

    pub fn with_default_regions(tables: Vec<Table>) -> Self {
        Self::new(tables, default_regions())
    }

    /// Load the canonical dataset written by the normalizer
    pub fn load(path: &Path, regions: Vec<String>) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables: Vec<Table> =
            serde_json::from_str(&content).map_err(|source| DatasetError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::new(tables, regions);
        info!(
            path = %path.display(),
            tables = catalog.tables.len(),
            machine_rows = catalog.machine_row_count(),
            regions = catalog.regions.len(),
            "Loaded pricing dataset"
        );
        Ok(catalog)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Number of rows across machine-type tables
    pub fn machine_row_count(&self) -> usize {
        self.machines(|_| true).count()
    }

    /// Rows of machine-type tables accepted by `predicate`, in scan order.
    ///
    /// This is the single selection primitive behind every lookup.
    pub fn machines<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = MachineRow<'a>> + 'a
    where
        P: FnMut(&MachineRow<'a>) -> bool + 'a,
    {
        self.tables
            .iter()
            .filter(|table| table.is_machine_type_table())
            .flat_map(|table| table.rows.iter())
            .map(|row| MachineRow::new(row))
            .filter(move |row| predicate(row))
    }

    /// Price of `machine_type` in `region`. The first row naming the machine
    /// type decides the outcome.
    pub fn price(&self, machine_type: &str, region: &str) -> Result<f64, LookupError> {
        let row = self
            .machines(|row| row.machine_type().ok() == Some(machine_type))
            .next()
            .ok_or(LookupError::TypeNotFound)?;

        row.price_in(region).ok_or(LookupError::PriceNotFound)
    }

    /// Cost of the first machine with exactly `cpus` CPUs and `memory_gb` GB
    /// (stored memory truncated to whole GB) in `region`
    pub fn cost(&self, cpus: u32, memory_gb: u32, region: &str) -> Result<CostQuote, LookupError> {
        let row = self
            .machines(|row| {
                row.cpus().ok() == Some(cpus)
                    && row.memory_gb().map(f64::trunc).ok() == Some(f64::from(memory_gb))
            })
            .next()
            .ok_or(LookupError::NoMatchingMachine)?;

        // Rows without a text machine type are reported by their raw cell
        let machine_type = row
            .machine_type()
            .map(str::to_string)
            .unwrap_or_else(|_| row.cells[MACHINE_TYPE_COLUMN].to_string());

        match row.price_in(region) {
            Some(cost) => Ok(CostQuote {
                machine_type,
                cpus,
                memory_gb,
                region: region.to_string(),
                cost,
            }),
            None => Err(LookupError::NoRegionPricing {
                machine_type,
                region: region.to_string(),
            }),
        }
    }

    fn fuzzy_rows<'a>(&'a self, cpus: u32, memory_gb: f64) -> impl Iterator<Item = MachineRow<'a>> + 'a {
        self.machines(move |row| {
            row.machine_type().is_ok()
                && row.cpus().ok() == Some(cpus)
                && row
                    .memory_gb()
                    .map(|gb| (gb - memory_gb).abs() < MEMORY_TOLERANCE_GB)
                    .unwrap_or(false)
        })
    }

    /// All machine types with `cpus` CPUs and memory within
    /// [`MEMORY_TOLERANCE_GB`] of `memory_gb`. Malformed rows are skipped.
    pub fn matching_machines(&self, cpus: u32, memory_gb: f64) -> Vec<MachineMatch> {
        self.fuzzy_rows(cpus, memory_gb)
            .filter_map(|row| row.to_match().ok())
            .collect()
    }

    /// Per-region cost of every matching machine, multiplied by `scale`.
    /// Machines without any regional price are left out.
    pub fn scaled_costs(
        &self,
        cpus: u32,
        memory_gb: f64,
        scale: u32,
    ) -> Result<ScaledCosts, LookupError> {
        let candidates: Vec<_> = self.fuzzy_rows(cpus, memory_gb).collect();
        if candidates.is_empty() {
            return Err(LookupError::NoCandidates { cpus, memory_gb });
        }

        let mut costs = ScaledCosts::new();
        for row in candidates {
            let by_region: BTreeMap<String, f64> = self
                .regions
                .iter()
                .filter_map(|region| {
                    row.price_in(region)
                        .map(|price| (region.clone(), price * f64::from(scale)))
                })
                .collect();

            if by_region.is_empty() {
                continue;
            }
            if let Ok(machine_type) = row.machine_type() {
                costs.entry(machine_type.to_string()).or_insert(by_region);
            }
        }

        Ok(costs)
    }

    /// Cheapest `quantity` of a matching machine over all regions. Ties go to
    /// the first machine found, then to the earlier region.
    pub fn cheapest_region(
        &self,
        cpus: u32,
        memory_gb: f64,
        quantity: u32,
    ) -> Result<CheapestRegion, LookupError> {
        let mut best: Option<CheapestRegion> = None;

        for row in self.fuzzy_rows(cpus, memory_gb) {
            let Ok(machine_type) = row.machine_type() else {
                continue;
            };
            for region in &self.regions {
                let Some(price) = row.price_in(region) else {
                    continue;
                };
                let total_cost = price * f64::from(quantity);
                if best.as_ref().map_or(true, |b| total_cost < b.total_cost) {
                    best = Some(CheapestRegion {
                        machine_type: machine_type.to_string(),
                        region: region.clone(),
                        total_cost,
                    });
                }
            }
        }

        best.ok_or(LookupError::NoPricedRegion { cpus, memory_gb })
    }
}
