//! Group-by aggregations feeding every chart.
//!
//! Areas are summed and then rounded to two decimals; percentages are taken
//! from the rounded areas and rounded again, so the values shown in bar
//! labels are exactly the ones the shares were computed from. Rounding is
//! half-to-even.

use std::collections::BTreeMap;

use sad_alert_models::{AlertRecord, MONITORING_START_MONTH, month_code};
use sad_dashboard_models::{
    LandUseShare, MonitoringPoint, RegionYearShare, YearMonth, YearTotal,
};

/// Rounds to two decimal places, ties to even.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Area by (state, year) with each state's share of the year total.
///
/// `region` is set to the state abbreviation. Rows are ordered by state,
/// then year.
pub fn state_year_shares<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
) -> Vec<RegionYearShare> {
    group_shares(records, |r| (r.state.as_str(), r.state.as_str()))
}

/// Area by (region, state, year) with each region's share of the year
/// total. Rows are ordered by region, state, then year.
pub fn region_year_shares<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
) -> Vec<RegionYearShare> {
    group_shares(records, |r| (r.region.as_str(), r.state.as_str()))
}

fn group_shares<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
    key: impl Fn(&'a AlertRecord) -> (&'a str, &'a str),
) -> Vec<RegionYearShare> {
    let mut sums: BTreeMap<(&str, &str, i32), f64> = BTreeMap::new();
    for record in records {
        let (region, state) = key(record);
        *sums.entry((region, state, record.year)).or_default() += record.area_km2;
    }

    let mut year_totals: BTreeMap<i32, f64> = BTreeMap::new();
    let rounded: Vec<((&str, &str, i32), f64)> = sums
        .into_iter()
        .map(|(k, area)| {
            let area = round2(area);
            *year_totals.entry(k.2).or_default() += area;
            (k, area)
        })
        .collect();

    rounded
        .into_iter()
        .map(|((region, state, year), area_km2)| {
            let total = year_totals.get(&year).copied().unwrap_or_default();
            let percent = if total > 0.0 {
                round2(area_km2 / total * 100.0)
            } else {
                0.0
            };
            RegionYearShare {
                region: region.to_string(),
                state: state.to_string(),
                year,
                area_km2,
                percent,
            }
        })
        .collect()
}

/// Rows for `year`, restricted to `states` when non-empty, largest area
/// first, at most `top_n` rows.
///
/// Ties are broken by region name so the ranking is deterministic.
#[must_use]
pub fn ranked_for_year(
    shares: &[RegionYearShare],
    year: i32,
    states: &[String],
    top_n: usize,
) -> Vec<RegionYearShare> {
    let mut rows: Vec<RegionYearShare> = shares
        .iter()
        .filter(|s| s.year == year)
        .filter(|s| states.is_empty() || states.contains(&s.state))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        b.area_km2
            .total_cmp(&a.area_km2)
            .then_with(|| a.region.cmp(&b.region))
    });
    rows.truncate(top_n);
    rows
}

/// Rows summed over every year in `shares`, one per (region, state),
/// ranked like [`ranked_for_year`]. Percentages are each row's share of the
/// summed total; `year` is the latest year the row has area in.
#[must_use]
pub fn ranked_over_period(
    shares: &[RegionYearShare],
    states: &[String],
    top_n: usize,
) -> Vec<RegionYearShare> {
    let mut sums: BTreeMap<(&str, &str), (f64, i32)> = BTreeMap::new();
    for share in shares
        .iter()
        .filter(|s| states.is_empty() || states.contains(&s.state))
    {
        let entry = sums
            .entry((share.region.as_str(), share.state.as_str()))
            .or_insert((0.0, share.year));
        entry.0 += share.area_km2;
        entry.1 = entry.1.max(share.year);
    }

    let total: f64 = sums.values().map(|(area, _)| round2(*area)).sum();
    let mut rows: Vec<RegionYearShare> = sums
        .into_iter()
        .map(|((region, state), (area, year))| {
            let area_km2 = round2(area);
            let percent = if total > 0.0 {
                round2(area_km2 / total * 100.0)
            } else {
                0.0
            };
            RegionYearShare {
                region: region.to_string(),
                state: state.to_string(),
                year,
                area_km2,
                percent,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.area_km2
            .total_cmp(&a.area_km2)
            .then_with(|| a.region.cmp(&b.region))
    });
    rows.truncate(top_n);
    rows
}

/// Ranked rows limited to the selected regions, or all ranked rows when
/// nothing is selected.
#[must_use]
pub fn map_subset(ranked: &[RegionYearShare], selected: &[String]) -> Vec<RegionYearShare> {
    ranked
        .iter()
        .filter(|s| selected.is_empty() || selected.contains(&s.region))
        .cloned()
        .collect()
}

/// One named line of the timeline chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Region name.
    pub name: String,
    /// Area per year, ascending by year.
    pub points: Vec<YearTotal>,
}

/// All (region, year) rows, restricted to `states` when non-empty, split
/// into one series per region ordered by region name.
#[must_use]
pub fn timeline(shares: &[RegionYearShare], states: &[String]) -> Vec<Series> {
    let mut by_region: BTreeMap<&str, Vec<YearTotal>> = BTreeMap::new();
    for share in shares
        .iter()
        .filter(|s| states.is_empty() || states.contains(&s.state))
    {
        by_region
            .entry(share.region.as_str())
            .or_default()
            .push(YearTotal {
                year: share.year,
                area_km2: share.area_km2,
            });
    }

    by_region
        .into_iter()
        .map(|(name, mut points)| {
            points.sort_by_key(|p| p.year);
            Series {
                name: name.to_string(),
                points,
            }
        })
        .collect()
}

/// Whether a raw record passes the state and region pickers.
fn selected(record: &AlertRecord, states: &[String], regions: &[String]) -> bool {
    (states.is_empty() || states.contains(&record.state))
        && (regions.is_empty() || regions.contains(&record.region))
}

/// Total area per year of the records matching `states` and `regions`
/// (each ignored when empty), ascending by year.
pub fn yearly_totals<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
    states: &[String],
    regions: &[String],
) -> Vec<YearTotal> {
    let mut sums: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records
        .into_iter()
        .filter(|r| selected(r, states, regions))
    {
        *sums.entry(record.year).or_default() += record.area_km2;
    }

    sums.into_iter()
        .map(|(year, area)| YearTotal {
            year,
            area_km2: round2(area),
        })
        .collect()
}

/// The two land use rankings shown on conservation unit dashboards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandUseBreakdown {
    /// Area by land use (label) and jurisdiction (group).
    pub by_use: Vec<LandUseShare>,
    /// Area by unit (label) and land use (group).
    pub by_unit: Vec<LandUseShare>,
}

/// Land use rankings for `year`, restricted to `states` when non-empty,
/// each limited to the `limit` largest groups.
///
/// Records lacking the grouping attributes are left out.
pub fn land_use_breakdown<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
    year: i32,
    states: &[String],
    limit: usize,
) -> LandUseBreakdown {
    let mut by_use: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut by_unit: BTreeMap<(&str, &str), f64> = BTreeMap::new();

    for record in records
        .into_iter()
        .filter(|r| r.year == year)
        .filter(|r| selected(r, states, &[]))
    {
        let Some(land_use) = record.land_use.as_deref() else {
            continue;
        };
        if let Some(jurisdiction) = record.jurisdiction.as_deref() {
            *by_use.entry((land_use, jurisdiction)).or_default() += record.area_km2;
        }
        *by_unit
            .entry((record.region.as_str(), land_use))
            .or_default() += record.area_km2;
    }

    LandUseBreakdown {
        by_use: largest(by_use, limit),
        by_unit: largest(by_unit, limit),
    }
}

fn largest(groups: BTreeMap<(&str, &str), f64>, limit: usize) -> Vec<LandUseShare> {
    let mut rows: Vec<LandUseShare> = groups
        .into_iter()
        .map(|((label, group), area)| LandUseShare {
            label: label.to_string(),
            group: group.to_string(),
            area_km2: round2(area),
        })
        .collect();
    rows.sort_by(|a, b| b.area_km2.total_cmp(&a.area_km2));
    rows.truncate(limit);
    rows
}

/// Month-by-month area split into Aug-Jul monitoring years.
///
/// Monitoring years start in August of `first_year` and continue while their
/// first month is not after `last`. Each is labelled `"{noun} {y}-{y+1}"`.
/// Only records with a month contribute. Points are ordered by monitoring
/// year, then calendar month within it.
pub fn monitoring_periods<'a>(
    records: impl IntoIterator<Item = &'a AlertRecord>,
    noun: &str,
    first_year: i32,
    last: YearMonth,
) -> Vec<MonitoringPoint> {
    let mut sums: BTreeMap<(i32, u8), f64> = BTreeMap::new();
    for record in records {
        if let Some(month) = record.month {
            *sums.entry((record.year, month)).or_default() += record.area_km2;
        }
    }

    let mut points = Vec::new();
    let mut year = first_year;
    while (YearMonth {
        year,
        month: MONITORING_START_MONTH,
    }) <= last
    {
        let label = format!("{noun} {year}-{}", year + 1);
        let start = (year, MONITORING_START_MONTH);
        let end = (year + 1, MONITORING_START_MONTH - 1);
        for (&(y, m), &area) in sums.range(start..=end) {
            let Some(code) = month_code(m) else {
                continue;
            };
            points.push(MonitoringPoint {
                period_label: label.clone(),
                month_label: code.to_string(),
                year: y,
                month: m,
                area_km2: round2(area),
            });
        }
        year += 1;
    }
    points
}
