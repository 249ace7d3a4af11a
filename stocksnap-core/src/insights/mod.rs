//! Market insights: sector performance and daily gainers.

pub mod gainers;
pub mod sectors;

pub use gainers::{top_gainers, ChangeError, ChangeRange, DailyChange};
pub use sectors::{sector_performance, SectorPerformance};
