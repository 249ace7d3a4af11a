//! TimeSeriesWindower — raw payload → ordered series → lookback window.
//!
//! Both operations are pure functions over immutable inputs:
//! - [`normalize`] parses a provider payload into a strictly ascending
//!   [`PriceSeries`](crate::domain::PriceSeries)
//! - [`window`] slices a series to a [`WindowSelector`](crate::domain::WindowSelector)
//!   relative to an injected `now`

pub mod normalize;
pub mod window;

pub use normalize::{normalize, parse_timestamp, NormalizeError};
pub use window::{cutoff, window, WindowError};
