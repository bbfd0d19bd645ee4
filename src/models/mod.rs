pub mod cell;
pub mod table;

pub use cell::Cell;
pub use table::{RawTable, Table, MACHINE_TYPE_HEADER, PRICE_BY_REGION_KEY, PRICE_COLUMN};
