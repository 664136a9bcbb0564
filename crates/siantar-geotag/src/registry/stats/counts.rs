use super::super::domain::{Business, NetworkType};
use super::views::{CategoryCount, NetworkBreakdown, YearCount};
use std::collections::HashMap;

/// Counts records per category, one entry per category in the order given.
///
/// Categories without matches are kept with a zero count; records whose
/// selected value is not a listed category are ignored.
pub fn count_by_category<S, F>(
    records: &[Business],
    categories: &[S],
    selector: F,
) -> Vec<CategoryCount>
where
    S: AsRef<str>,
    F: Fn(&Business) -> &str,
{
    let mut tally: HashMap<&str, usize> = HashMap::new();
    for business in records {
        *tally.entry(selector(business)).or_default() += 1;
    }

    categories
        .iter()
        .map(|category| {
            let name = category.as_ref();
            CategoryCount {
                name: name.to_string(),
                count: tally.get(name).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// The `limit` busiest categories, highest count first.
///
/// Ties keep the supplied category order, so zero-count categories fill the
/// tail in their original order.
pub fn top_categories<S, F>(
    records: &[Business],
    categories: &[S],
    selector: F,
    limit: usize,
) -> Vec<CategoryCount>
where
    S: AsRef<str>,
    F: Fn(&Business) -> &str,
{
    let mut counts = count_by_category(records, categories, selector);
    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts.truncate(limit);
    counts
}

/// Businesses founded per year over the `window` years ending at
/// `current_year`, oldest first.
pub fn founding_year_series(
    records: &[Business],
    current_year: i32,
    window: usize,
) -> Vec<YearCount> {
    if window == 0 {
        return Vec::new();
    }

    let span = i32::try_from(window - 1).unwrap_or(i32::MAX);
    let first_year = current_year.saturating_sub(span);

    let mut tally: HashMap<i32, usize> = HashMap::new();
    for business in records {
        if (first_year..=current_year).contains(&business.founding_year) {
            *tally.entry(business.founding_year).or_default() += 1;
        }
    }

    (first_year..=current_year)
        .map(|year| YearCount {
            year,
            count: tally.get(&year).copied().unwrap_or(0),
        })
        .collect()
}

pub fn network_breakdown(records: &[Business]) -> NetworkBreakdown {
    records
        .iter()
        .fold(NetworkBreakdown::default(), |mut breakdown, business| {
            match business.network_type {
                NetworkType::Single => breakdown.single += 1,
                NetworkType::Branch => breakdown.branch += 1,
            }
            breakdown
        })
}
