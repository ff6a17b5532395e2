//! Services for data transformation and aggregation

pub mod aggregator;
pub mod analyzer;
pub mod csv_export;
pub mod month_order;
pub mod transform;

pub use aggregator::{Aggregator, DEFAULT_TOP_N};
pub use analyzer::{GeminiClient, Summarizer};
pub use csv_export::to_csv;
pub use month_order::sort_months;
pub use transform::transform;
