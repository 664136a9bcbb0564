use super::super::domain::{Business, DISTRICTS, SUB_DISTRICTS};
use super::counts::{count_by_category, founding_year_series, network_breakdown, top_categories};
use super::views::{CategoryCount, NetworkBreakdown, YearCount};
use serde::Serialize;

pub const DEFAULT_TOP_SUB_DISTRICTS: usize = 8;
pub const DEFAULT_GROWTH_WINDOW_YEARS: usize = 10;
/// Latest reporting year accepted from callers.
pub const MAX_REPORT_YEAR: i32 = 9999;

/// Presentation dials for the analytics dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsSettings {
    pub top_sub_districts: usize,
    pub growth_window_years: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            top_sub_districts: DEFAULT_TOP_SUB_DISTRICTS,
            growth_window_years: DEFAULT_GROWTH_WINDOW_YEARS,
        }
    }
}

/// Every chart series the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub total: usize,
    pub current_year: i32,
    pub active_districts: usize,
    pub active_sub_districts: usize,
    pub by_district: Vec<CategoryCount>,
    pub top_sub_districts: Vec<CategoryCount>,
    pub founding_years: Vec<YearCount>,
    pub network: NetworkBreakdown,
}

impl AnalyticsSnapshot {
    pub fn compute(records: &[Business], settings: AnalyticsSettings, current_year: i32) -> Self {
        let by_district = count_by_category(records, &DISTRICTS, |business| {
            business.district.as_str()
        });
        let by_sub_district = count_by_category(records, &SUB_DISTRICTS, |business| {
            business.sub_district.as_str()
        });
        let top_sub_districts = top_categories(
            records,
            &SUB_DISTRICTS,
            |business| business.sub_district.as_str(),
            settings.top_sub_districts,
        );

        Self {
            total: records.len(),
            current_year,
            active_districts: nonzero(&by_district),
            active_sub_districts: nonzero(&by_sub_district),
            by_district,
            top_sub_districts,
            founding_years: founding_year_series(
                records,
                current_year,
                settings.growth_window_years,
            ),
            network: network_breakdown(records),
        }
    }
}

/// Headline counts for the registry dashboard over whatever records the viewer sees.
#[derive(Debug, Clone, Serialize)]
pub struct AreaSummary {
    pub total: usize,
    pub active_districts: usize,
    pub active_sub_districts: usize,
    pub by_district: Vec<CategoryCount>,
    pub by_sub_district: Vec<CategoryCount>,
}

impl AreaSummary {
    pub fn compute(records: &[Business]) -> Self {
        let by_district = count_by_category(records, &DISTRICTS, |business| {
            business.district.as_str()
        });
        let by_sub_district = count_by_category(records, &SUB_DISTRICTS, |business| {
            business.sub_district.as_str()
        });

        Self {
            total: records.len(),
            active_districts: nonzero(&by_district),
            active_sub_districts: nonzero(&by_sub_district),
            by_district,
            by_sub_district,
        }
    }
}

fn nonzero(counts: &[CategoryCount]) -> usize {
    counts.iter().filter(|entry| entry.count > 0).count()
}
