mod counts;
mod snapshot;
pub mod views;

pub use counts::{count_by_category, founding_year_series, network_breakdown, top_categories};
pub use snapshot::{AnalyticsSettings, AnalyticsSnapshot, AreaSummary, MAX_REPORT_YEAR};
pub use views::{CategoryCount, NetworkBreakdown, YearCount};
