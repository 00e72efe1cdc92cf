//! Selection state transitions.
//!
//! Every interaction arrives as exactly one [`DashboardEvent`]; [`reduce`]
//! maps the previous [`SelectionState`] and that event to the next state.
//! Nothing else mutates selection.

use sad_dashboard_models::{
    DashboardEvent, ModalState, ModalTrigger, MonthRange, SelectionState, YearMonth,
};

use crate::LoadedDashboard;

/// Selection shown on first load and after a reset: nothing highlighted,
/// latest year, all states, the dashboard's default period.
#[must_use]
pub fn initial_state(dashboard: &LoadedDashboard) -> SelectionState {
    SelectionState {
        selected_regions: Vec::new(),
        year: dashboard.dataset.max_year(),
        states: Vec::new(),
        period: dashboard.descriptor.default_period,
    }
}

/// Adds `value` to `list` if absent, removes it if present.
pub fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

/// First occurrence of each value, in order.
fn unique(values: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(value) {
            unique.push(value.clone());
        }
    }
    unique
}

/// The twelve months of `year`.
const fn calendar_year(year: i32) -> MonthRange {
    MonthRange {
        start: YearMonth { year, month: 1 },
        end: YearMonth { year, month: 12 },
    }
}

/// Applies one event to the selection.
#[must_use]
pub fn reduce(
    mut state: SelectionState,
    event: &DashboardEvent,
    dashboard: &LoadedDashboard,
) -> SelectionState {
    let dataset = &dashboard.dataset;

    match event {
        DashboardEvent::Initialize => {
            if !dataset.contains_year(state.year) {
                state.year = dataset.max_year();
            }
        }
        DashboardEvent::ResetClicked => {
            state = initial_state(dashboard);
        }
        DashboardEvent::YearChanged { year } => {
            state.year = *year;
        }
        DashboardEvent::TotalsBarClicked { year } => {
            state.year = *year;
            // With a month range active the clicked year becomes the range.
            if state.period.is_some() {
                state.period = Some(calendar_year(*year));
            }
        }
        DashboardEvent::RegionClicked { region } | DashboardEvent::BarClicked { region } => {
            toggle(&mut state.selected_regions, region);
        }
        DashboardEvent::RegionsSelected { regions } => {
            // A cleared picker keeps the clicked selection.
            if !regions.is_empty() {
                state.selected_regions = unique(regions);
            }
        }
        DashboardEvent::StateSelected { states } => {
            state.states = unique(states);
        }
        DashboardEvent::PeriodChanged { start, end } => {
            let period = MonthRange::new(YearMonth::from(*start), YearMonth::from(*end));
            if dataset.contains_year(period.end.year) {
                state.year = period.end.year;
            }
            state.period = Some(period);
        }
    }

    log::debug!(
        "reduce: {event:?} -> year={} regions={:?} states={:?} period={:?}",
        state.year,
        state.selected_regions,
        state.states,
        state.period
    );
    state
}

/// Flips a modal open or closed. Either button toggles, matching the
/// dialog's single visibility flag.
#[must_use]
pub const fn toggle_modal(modal: ModalState, trigger: ModalTrigger) -> ModalState {
    match trigger {
        ModalTrigger::Open | ModalTrigger::Close => ModalState { open: !modal.open },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sad_alert_models::{AlertKind, RegionLevel};

    use super::*;
    use crate::test_support::{descriptor, loaded, monthly, municipality_records, record};

    fn dashboard() -> LoadedDashboard {
        loaded(
            descriptor(AlertKind::Degradation, RegionLevel::Municipality),
            municipality_records(),
        )
    }

    fn indigenous_lands() -> LoadedDashboard {
        let mut d = descriptor(AlertKind::Deforestation, RegionLevel::IndigenousLand);
        d.monitoring_periods = true;
        d.default_period = Some(MonthRange::new(
            YearMonth { year: 2022, month: 8 },
            YearMonth { year: 2024, month: 7 },
        ));
        loaded(
            d,
            vec![
                monthly("Yanomami", "RR", 2020, 9, 1.0),
                monthly("Yanomami", "RR", 2022, 9, 2.0),
                monthly("Kayapó", "PA", 2023, 3, 3.0),
                monthly("Kayapó", "PA", 2024, 2, 4.0),
            ],
        )
    }

    fn click(region: &str) -> DashboardEvent {
        DashboardEvent::RegionClicked {
            region: region.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn initial_state_uses_latest_year() {
        let state = initial_state(&dashboard());
        assert_eq!(state.year, 2024);
        assert!(state.selected_regions.is_empty());
        assert!(state.states.is_empty());
        assert_eq!(state.period, None);
    }

    #[test]
    fn initial_state_starts_from_default_period() {
        let state = initial_state(&indigenous_lands());
        let period = state.period.unwrap();
        assert_eq!(period.start, YearMonth { year: 2022, month: 8 });
        assert_eq!(period.end, YearMonth { year: 2024, month: 7 });
    }

    #[test]
    fn clicking_twice_restores_selection() {
        let d = dashboard();
        let start = SelectionState {
            selected_regions: vec!["Altamira".to_string()],
            ..initial_state(&d)
        };

        let once = reduce(start.clone(), &click("Colniza"), &d);
        assert_eq!(once.selected_regions, vec!["Altamira", "Colniza"]);

        let twice = reduce(once, &click("Colniza"), &d);
        assert_eq!(twice, start);
    }

    #[test]
    fn toggle_membership_is_order_independent() {
        let mut list = strings(&["A", "B", "C"]);
        toggle(&mut list, "A");
        toggle(&mut list, "A");
        let mut sorted = list.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C"]);
    }

    #[test]
    fn map_and_bar_clicks_share_the_selection() {
        let d = dashboard();
        let state = reduce(initial_state(&d), &click("Xingu"), &d);
        assert_eq!(state.selected_regions, vec!["Xingu"]);

        let state = reduce(
            state,
            &DashboardEvent::BarClicked {
                region: "Xingu".to_string(),
            },
            &d,
        );
        assert!(state.selected_regions.is_empty());
    }

    #[test]
    fn region_picker_replaces_selection() {
        let d = dashboard();
        let state = reduce(initial_state(&d), &click("Colniza"), &d);

        let state = reduce(
            state,
            &DashboardEvent::RegionsSelected {
                regions: strings(&["Altamira", "Feijó", "Altamira"]),
            },
            &d,
        );
        assert_eq!(state.selected_regions, vec!["Altamira", "Feijó"]);

        let state = reduce(
            state,
            &DashboardEvent::RegionsSelected {
                regions: Vec::new(),
            },
            &d,
        );
        assert_eq!(state.selected_regions, vec!["Altamira", "Feijó"]);
    }

    #[test]
    fn totals_bar_click_sets_year_exactly() {
        let d = dashboard();
        let state = reduce(
            initial_state(&d),
            &DashboardEvent::TotalsBarClicked { year: 2022 },
            &d,
        );
        assert_eq!(state.year, 2022);
        assert_eq!(state.period, None);

        let state = reduce(state, &DashboardEvent::YearChanged { year: 2023 }, &d);
        assert_eq!(state.year, 2023);
    }

    #[test]
    fn totals_bar_click_narrows_active_period_to_that_year() {
        let d = indigenous_lands();
        let state = reduce(
            initial_state(&d),
            &DashboardEvent::TotalsBarClicked { year: 2023 },
            &d,
        );
        assert_eq!(state.year, 2023);
        let period = state.period.unwrap();
        assert_eq!(period.start, YearMonth { year: 2023, month: 1 });
        assert_eq!(period.end, YearMonth { year: 2023, month: 12 });
    }

    #[test]
    fn reset_clears_everything() {
        let d = dashboard();
        let dirty = SelectionState {
            selected_regions: vec!["Altamira".to_string()],
            year: 2022,
            states: vec!["PA".to_string()],
            period: Some(MonthRange::new(
                YearMonth { year: 2022, month: 8 },
                YearMonth { year: 2023, month: 7 },
            )),
        };
        let state = reduce(dirty, &DashboardEvent::ResetClicked, &d);
        assert_eq!(state, initial_state(&d));
        assert_eq!(state.period, None);
    }

    #[test]
    fn reset_restores_default_period() {
        let d = indigenous_lands();
        let state = reduce(
            initial_state(&d),
            &DashboardEvent::PeriodChanged {
                start: NaiveDate::from_ymd_opt(2020, 8, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2021, 7, 31).unwrap(),
            },
            &d,
        );
        let state = reduce(state, &DashboardEvent::ResetClicked, &d);
        assert_eq!(state.period, d.descriptor.default_period);
    }

    #[test]
    fn reset_scenario_over_many_years() {
        let records: Vec<_> = (2008..=2024)
            .flat_map(|year| {
                ["AC", "PA", "MT"]
                    .into_iter()
                    .map(move |uf| record("Xingu", uf, year, 1.0))
            })
            .collect();
        let d = loaded(
            descriptor(AlertKind::Degradation, RegionLevel::Municipality),
            records,
        );

        let state = reduce(
            SelectionState {
                selected_regions: vec!["Altamira".to_string()],
                year: 2010,
                states: Vec::new(),
                period: None,
            },
            &DashboardEvent::ResetClicked,
            &d,
        );
        assert_eq!(state.year, 2024);
        assert!(state.selected_regions.is_empty());

        let state = reduce(state, &click("Xingu"), &d);
        assert_eq!(state.selected_regions, vec!["Xingu"]);
        let state = reduce(state, &click("Xingu"), &d);
        assert!(state.selected_regions.is_empty());
    }

    #[test]
    fn state_selection_replaces_and_dedups() {
        let d = dashboard();
        let state = reduce(
            initial_state(&d),
            &DashboardEvent::StateSelected {
                states: strings(&["PA", "MT", "PA"]),
            },
            &d,
        );
        assert_eq!(state.states, vec!["PA", "MT"]);

        let state = reduce(
            state,
            &DashboardEvent::StateSelected { states: Vec::new() },
            &d,
        );
        assert!(state.states.is_empty());
    }

    #[test]
    fn initialize_repairs_unknown_year_only() {
        let d = dashboard();
        let mut state = initial_state(&d);
        state.year = 1999;
        assert_eq!(reduce(state, &DashboardEvent::Initialize, &d).year, 2024);

        let mut state = initial_state(&d);
        state.year = 2023;
        assert_eq!(reduce(state, &DashboardEvent::Initialize, &d).year, 2023);
    }

    #[test]
    fn period_change_normalizes_bounds_and_moves_year() {
        let d = dashboard();
        let state = reduce(
            initial_state(&d),
            &DashboardEvent::PeriodChanged {
                start: NaiveDate::from_ymd_opt(2023, 4, 30).unwrap(),
                end: NaiveDate::from_ymd_opt(2022, 8, 1).unwrap(),
            },
            &d,
        );
        let period = state.period.unwrap();
        assert_eq!(period.start, YearMonth { year: 2022, month: 8 });
        assert_eq!(period.end, YearMonth { year: 2023, month: 4 });
        assert_eq!(state.year, 2023);
    }

    #[test]
    fn modal_flips_on_either_trigger() {
        let closed = ModalState::default();
        let open = toggle_modal(closed, ModalTrigger::Open);
        assert!(open.open);
        assert!(!toggle_modal(open, ModalTrigger::Close).open);
        assert!(toggle_modal(closed, ModalTrigger::Close).open);
    }
}
