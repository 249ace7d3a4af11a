//! Domain types for StockSnap

pub mod granularity;
pub mod payload;
pub mod record;
pub mod series;
pub mod symbol;
pub mod window;

pub use granularity::Granularity;
pub use payload::RawTimeSeriesPayload;
pub use record::PriceRecord;
pub use series::{PriceSeries, SeriesOrderError};
pub use symbol::{Symbol, SymbolError};
pub use window::{ParseWindowError, WindowSelector};
