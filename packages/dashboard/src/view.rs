//! The update loop: event in, selection and every chart out.

use std::collections::BTreeSet;

use sad_alert_models::{AlertRecord, RegionLevel};
use sad_dashboard_models::{
    DashboardEvent, DashboardFigures, DashboardLayout, DashboardView, SelectOption,
    SelectionState, YearMonth,
};

use crate::{
    LoadedDashboard, aggregate, figures,
    reducer::{initial_state, reduce},
};

/// Slices in each land use pie.
const LAND_USE_SLICES: usize = 10;

/// Applies `event` to `state` and rebuilds every chart.
///
/// Pure: reads only the immutable dashboard data.
#[must_use]
pub fn update(
    dashboard: &LoadedDashboard,
    state: SelectionState,
    event: &DashboardEvent,
) -> DashboardView {
    let state = reduce(state, event, dashboard);
    let figures = render(dashboard, &state);
    DashboardView { state, figures }
}

fn matches(record: &AlertRecord, states: &[String], regions: &[String]) -> bool {
    (states.is_empty() || states.contains(&record.state))
        && (regions.is_empty() || regions.contains(&record.region))
}

/// Builds every chart for `state` without changing it.
#[must_use]
pub fn render(dashboard: &LoadedDashboard, state: &SelectionState) -> DashboardFigures {
    let descriptor = &dashboard.descriptor;
    let dataset = &dashboard.dataset;
    let records: Vec<&AlertRecord> = dataset.records_in(state.period.as_ref()).collect();

    let state_level = descriptor.level == RegionLevel::State;
    let shares = if state_level {
        aggregate::state_year_shares(records.iter().copied())
    } else {
        aggregate::region_year_shares(records.iter().copied())
    };

    // A month range ranks its whole span; otherwise only the chosen year.
    let (ranked, when) = match state.period {
        Some(period) => (
            aggregate::ranked_over_period(&shares, &state.states, descriptor.top_n),
            figures::period_label(period),
        ),
        None => (
            aggregate::ranked_for_year(&shares, state.year, &state.states, descriptor.top_n),
            state.year.to_string(),
        ),
    };
    let on_map = aggregate::map_subset(&ranked, &state.selected_regions);

    // On state dashboards the clicked states drive the timeline when the
    // picker is empty.
    let timeline_states = if state_level && state.states.is_empty() {
        &state.selected_regions
    } else {
        &state.states
    };
    let series = aggregate::timeline(&shares, timeline_states);

    let totals = aggregate::yearly_totals(
        records.iter().copied(),
        &state.states,
        &state.selected_regions,
    );

    let (land_use_pie, unit_use_pie) = if descriptor.land_use_breakdown {
        let breakdown = aggregate::land_use_breakdown(
            records.iter().copied(),
            state.year,
            &state.states,
            LAND_USE_SLICES,
        );
        (
            Some(figures::land_use_pie(descriptor, &breakdown.by_use)),
            Some(figures::unit_use_pie(descriptor, &breakdown.by_unit)),
        )
    } else {
        (None, None)
    };

    let monitoring_line = (descriptor.monitoring_periods && dataset.has_months()).then(|| {
        let selected: Vec<&AlertRecord> = records
            .iter()
            .copied()
            .filter(|r| matches(r, &state.states, &state.selected_regions))
            .collect();
        let (first_year, last) = state.period.map_or_else(
            || (dataset.min_year(), latest_month(dataset.records())),
            |p| (p.start.year, p.end),
        );
        let points = aggregate::monitoring_periods(
            selected,
            descriptor.kind.noun(),
            first_year,
            last,
        );
        figures::monitoring_line(descriptor, &points, &state.states, &state.selected_regions)
    });

    log::debug!(
        "render {}: year={} ranked={} on_map={} series={} totals={}",
        descriptor.id,
        state.year,
        ranked.len(),
        on_map.len(),
        series.len(),
        totals.len()
    );

    DashboardFigures {
        totals_bar: figures::totals_bar(
            descriptor,
            &totals,
            &state.states,
            &state.selected_regions,
        ),
        ranked_bar: figures::ranked_bar(
            descriptor,
            &ranked,
            &state.selected_regions,
            &state.states,
            &when,
        ),
        choropleth: figures::choropleth(
            descriptor,
            dashboard.boundaries.as_ref(),
            &on_map,
            &when,
        ),
        timeline: figures::timeline(descriptor, &series, &state.states),
        land_use_pie,
        unit_use_pie,
        monitoring_line,
    }
}

/// Latest month carried by any record.
fn latest_month(records: &[AlertRecord]) -> YearMonth {
    records
        .iter()
        .filter_map(|r| r.month.map(|month| YearMonth { year: r.year, month }))
        .max()
        .unwrap_or(YearMonth { year: 0, month: 1 })
}

/// Region picker options, sorted by name, limited to `states` when
/// non-empty.
#[must_use]
pub fn region_options(dashboard: &LoadedDashboard, states: &[String]) -> Vec<SelectOption> {
    let regions: BTreeSet<&str> = dashboard
        .dataset
        .records()
        .iter()
        .filter(|r| states.is_empty() || states.contains(&r.state))
        .map(|r| r.region.as_str())
        .collect();

    regions
        .into_iter()
        .map(|region| SelectOption {
            label: region.to_string(),
            value: region.to_string(),
        })
        .collect()
}

/// Static page metadata for the dashboard.
#[must_use]
pub fn layout(dashboard: &LoadedDashboard) -> DashboardLayout {
    let descriptor = &dashboard.descriptor;
    let dataset = &dashboard.dataset;

    let mut states: Vec<&String> = dataset.states().iter().collect();
    states.sort();

    DashboardLayout {
        id: descriptor.id.clone(),
        title: descriptor.title.clone(),
        base_path: descriptor.base_path.clone(),
        kind: descriptor.kind,
        level: descriptor.level,
        years: dataset.years().to_vec(),
        min_year: dataset.min_year(),
        max_year: dataset.max_year(),
        initial_state: initial_state(dashboard),
        state_options: states
            .into_iter()
            .map(|s| SelectOption {
                label: s.clone(),
                value: s.clone(),
            })
            .collect(),
        region_options: region_options(dashboard, &[]),
        top_n: descriptor.top_n,
        has_months: dataset.has_months(),
        has_boundaries: dashboard.boundaries.is_some(),
        land_use_breakdown: descriptor.land_use_breakdown,
        monitoring_periods: descriptor.monitoring_periods,
        export_filename: descriptor.export_filename.clone(),
    }
}
