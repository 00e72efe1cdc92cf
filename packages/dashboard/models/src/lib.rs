#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard descriptor, selection state, and view types.
//!
//! A single generic dashboard implementation is driven by a
//! [`DashboardDescriptor`] per variant (states, municipalities, settlements,
//! indigenous lands, conservation units; degradation or deforestation). The
//! client round-trips a [`SelectionState`] and a [`DashboardEvent`] on every
//! interaction and receives a [`DashboardView`] back.

pub mod figure;

use chrono::{Datelike as _, NaiveDate};
use sad_alert_models::{AlertKind, RegionLevel};
use serde::{Deserialize, Serialize};

use crate::figure::Figure;

// ── Descriptor ───────────────────────────────────────────────────────────

/// Everything that differs between two dashboard variants, deserialized
/// from the embedded TOML registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDescriptor {
    /// Unique identifier (e.g. `"degradacao_estados"`).
    pub id: String,
    /// Page heading.
    pub title: String,
    /// URL prefix the dashboard is served under, with leading and trailing
    /// slash (e.g. `"/sad/degradacao_estados/"`).
    pub base_path: String,
    /// Which alert dataset this dashboard reports.
    pub kind: AlertKind,
    /// Which unit alerts are grouped by.
    pub level: RegionLevel,
    /// Number of rows in the ranked bar chart.
    pub top_n: usize,
    /// Filename offered for CSV downloads.
    pub export_filename: String,
    /// Tabular alert dataset.
    pub dataset: DatasetSource,
    /// Simplified boundary file for the choropleth.
    pub boundaries: BoundarySource,
    /// Initial map viewport.
    #[serde(default)]
    pub map: MapView,
    /// Whether to render the land use / jurisdiction pies.
    #[serde(default)]
    pub land_use_breakdown: bool,
    /// Whether to render the Aug-Jul monitoring year comparison.
    #[serde(default)]
    pub monitoring_periods: bool,
    /// Month range selected on first load and restored by a reset. When
    /// set, rankings cover the whole range instead of a single year.
    #[serde(default)]
    pub default_period: Option<MonthRange>,
}

impl DashboardDescriptor {
    /// Returns the dashboard identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Column the region identifier is read from.
    #[must_use]
    pub fn region_column(&self) -> &str {
        self.dataset
            .region_column
            .as_deref()
            .unwrap_or_else(|| self.level.default_column())
    }
}

/// Where a dataset lives and how it is encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Download URL.
    pub url: String,
    /// File encoding.
    pub format: DatasetFormat,
    /// Overrides the level's default region column.
    #[serde(default)]
    pub region_column: Option<String>,
}

/// Encoding of a remote alert dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

/// Boundary `GeoJSON` file and the property joined against region names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySource {
    /// Download URL of the `FeatureCollection`.
    pub url: String,
    /// Plotly-style feature key, e.g. `"properties.NM_MUN"`.
    pub feature_id_key: String,
}

impl BoundarySource {
    /// Property name inside each feature's `properties` object.
    #[must_use]
    pub fn property_name(&self) -> &str {
        self.feature_id_key
            .strip_prefix("properties.")
            .unwrap_or(&self.feature_id_key)
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Mapbox zoom level.
    pub zoom: f64,
    /// Centre latitude.
    pub center_lat: f64,
    /// Centre longitude.
    pub center_lon: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            zoom: 3.0,
            center_lat: -14.0,
            center_lon: -55.0,
        }
    }
}

// ── Selection state and events ───────────────────────────────────────────

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Year.
    pub year: i32,
    /// Month (1-12).
    pub month: u8,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            // month() is always 1..=12
            month: u8::try_from(date.month()).unwrap_or(1),
        }
    }
}

/// Inclusive range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    /// First month included.
    pub start: YearMonth,
    /// Last month included.
    pub end: YearMonth,
}

impl MonthRange {
    /// Creates a range, swapping the bounds when given in reverse.
    #[must_use]
    pub fn new(a: YearMonth, b: YearMonth) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Whether the given month falls inside the range.
    #[must_use]
    pub fn contains(&self, year: i32, month: u8) -> bool {
        let ym = YearMonth { year, month };
        self.start <= ym && ym <= self.end
    }
}

/// Per-session selection, held by the client and sent back on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Highlighted regions, in click order.
    #[serde(default)]
    pub selected_regions: Vec<String>,
    /// Active year.
    pub year: i32,
    /// State filter from the state picker. Empty means all states.
    #[serde(default)]
    pub states: Vec<String>,
    /// Month range filter, for monthly datasets.
    #[serde(default)]
    pub period: Option<MonthRange>,
}

/// A single user interaction. Exactly one event is applied per update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// First render; no state change.
    Initialize,
    /// Year slider moved.
    YearChanged {
        /// New year.
        year: i32,
    },
    /// A region was clicked on the choropleth.
    RegionClicked {
        /// Clicked feature's region name.
        region: String,
    },
    /// A bar of the ranked chart was clicked.
    BarClicked {
        /// Clicked bar's region name.
        region: String,
    },
    /// A bar of the totals-by-year chart was clicked.
    TotalsBarClicked {
        /// Clicked bar's year.
        year: i32,
    },
    /// State picker selection changed.
    StateSelected {
        /// Selected state abbreviations.
        states: Vec<String>,
    },
    /// Region picker selection changed. Replaces the highlighted regions.
    RegionsSelected {
        /// Selected region names.
        regions: Vec<String>,
    },
    /// Date range picker changed.
    PeriodChanged {
        /// First day of the range.
        start: NaiveDate,
        /// Last day of the range.
        end: NaiveDate,
    },
    /// "Remover Filtros" pressed.
    ResetClicked,
}

/// Open/closed state of a modal dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState {
    /// Whether the modal is visible.
    pub open: bool,
}

/// Button that toggles a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalTrigger {
    /// The button that opens the modal.
    Open,
    /// The modal's close button.
    Close,
}

// ── Export ───────────────────────────────────────────────────────────────

/// CSV field delimiter offered in the download dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSeparator {
    /// `.`
    #[default]
    #[serde(rename = ".")]
    Dot,
    /// `,`
    #[serde(rename = ",")]
    Comma,
}

impl FieldSeparator {
    /// Delimiter byte handed to the CSV writer.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Dot => b'.',
            Self::Comma => b',',
        }
    }
}

/// Options from the download dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// States to include. Empty selects nothing.
    #[serde(default)]
    pub states: Vec<String>,
    /// Additional region filter. Empty keeps every region of the states.
    #[serde(default)]
    pub regions: Vec<String>,
    /// Field delimiter.
    #[serde(default)]
    pub separator: FieldSeparator,
    /// Transliterate text cells to ASCII.
    #[serde(default)]
    pub strip_accents: bool,
}

// ── Aggregates ───────────────────────────────────────────────────────────

/// Area summed over one (region, state, year) group with its share of the
/// year's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionYearShare {
    /// Region identifier (equal to `state` for state aggregates).
    pub region: String,
    /// State abbreviation.
    pub state: String,
    /// Year.
    pub year: i32,
    /// Summed area, rounded to 2 decimals.
    pub area_km2: f64,
    /// Percentage of the year's total, rounded to 2 decimals.
    pub percent: f64,
}

/// Total alert area for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTotal {
    /// Year.
    pub year: i32,
    /// Summed area, rounded to 2 decimals.
    pub area_km2: f64,
}

/// Area of one slice of a land use pie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandUseShare {
    /// Slice label (land use category or unit name).
    pub label: String,
    /// Colour group (jurisdiction or land use).
    pub group: String,
    /// Summed area, rounded to 2 decimals.
    pub area_km2: f64,
}

/// One month of a monitoring-year series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringPoint {
    /// Series label, e.g. `"Desmatamento 2022-2023"`.
    pub period_label: String,
    /// Portuguese month code, e.g. `"AGO"`.
    pub month_label: String,
    /// Calendar year of the month.
    pub year: i32,
    /// Calendar month.
    pub month: u8,
    /// Summed area, rounded to 2 decimals.
    pub area_km2: f64,
}

// ── Views ────────────────────────────────────────────────────────────────

/// Every chart of a dashboard after one update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFigures {
    /// Totals-by-year bars.
    pub totals_bar: Figure,
    /// Top-N ranked horizontal bars for the active year.
    pub ranked_bar: Figure,
    /// Choropleth of the ranked (or selected) regions.
    pub choropleth: Figure,
    /// One line per region over all years.
    pub timeline: Figure,
    /// Area by land use and jurisdiction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_use_pie: Option<Figure>,
    /// Area by unit and land use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_use_pie: Option<Figure>,
    /// Month-by-month comparison of monitoring years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_line: Option<Figure>,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Selection after the event.
    pub state: SelectionState,
    /// Regenerated charts.
    pub figures: DashboardFigures,
}

/// A labelled option for pickers and checklists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Display label.
    pub label: String,
    /// Submitted value.
    pub value: String,
}

/// Static page metadata for one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    /// Dashboard identifier.
    pub id: String,
    /// Page heading.
    pub title: String,
    /// URL prefix.
    pub base_path: String,
    /// Alert kind.
    pub kind: AlertKind,
    /// Region level.
    pub level: RegionLevel,
    /// Year slider marks, ascending.
    pub years: Vec<i32>,
    /// Slider minimum.
    pub min_year: i32,
    /// Slider maximum.
    pub max_year: i32,
    /// Initial selection.
    pub initial_state: SelectionState,
    /// State picker and download checklist options.
    pub state_options: Vec<SelectOption>,
    /// Region picker options, sorted by name.
    pub region_options: Vec<SelectOption>,
    /// Rows in the ranked chart.
    pub top_n: usize,
    /// Whether the dataset has monthly resolution.
    pub has_months: bool,
    /// Whether boundary geometry is available for the map.
    pub has_boundaries: bool,
    /// Whether land use pies are rendered.
    pub land_use_breakdown: bool,
    /// Whether the monitoring-year comparison is rendered.
    pub monitoring_periods: bool,
    /// Download filename.
    pub export_filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_uses_snake_case_tag() {
        let event: DashboardEvent =
            serde_json::from_str(r#"{"type":"region_clicked","region":"Xingu"}"#).unwrap();
        assert_eq!(
            event,
            DashboardEvent::RegionClicked {
                region: "Xingu".to_string()
            }
        );

        let reset: DashboardEvent = serde_json::from_str(r#"{"type":"reset_clicked"}"#).unwrap();
        assert_eq!(reset, DashboardEvent::ResetClicked);
    }

    #[test]
    fn period_event_parses_iso_dates() {
        let event: DashboardEvent = serde_json::from_str(
            r#"{"type":"period_changed","start":"2023-08-01","end":"2024-04-30"}"#,
        )
        .unwrap();
        let DashboardEvent::PeriodChanged { start, end } = event else {
            panic!("expected period_changed, got {event:?}");
        };
        assert_eq!(YearMonth::from(start), YearMonth { year: 2023, month: 8 });
        assert_eq!(YearMonth::from(end), YearMonth { year: 2024, month: 4 });
    }

    #[test]
    fn month_range_is_inclusive_and_normalized() {
        let range = MonthRange::new(
            YearMonth { year: 2024, month: 4 },
            YearMonth { year: 2023, month: 8 },
        );
        assert_eq!(range.start, YearMonth { year: 2023, month: 8 });
        assert!(range.contains(2023, 8));
        assert!(range.contains(2024, 4));
        assert!(range.contains(2024, 1));
        assert!(!range.contains(2023, 7));
        assert!(!range.contains(2024, 5));
    }

    #[test]
    fn separator_serializes_as_character() {
        assert_eq!(serde_json::to_string(&FieldSeparator::Comma).unwrap(), r#"",""#);
        let opts: ExportOptions =
            serde_json::from_str(r#"{"states":["PA"],"separator":".","stripAccents":true}"#)
                .unwrap();
        assert_eq!(opts.separator, FieldSeparator::Dot);
        assert!(opts.strip_accents);
        assert!(opts.regions.is_empty());
    }

    #[test]
    fn regions_selected_event_parses() {
        let event: DashboardEvent = serde_json::from_str(
            r#"{"type":"regions_selected","regions":["Yanomami","Kayapó"]}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            DashboardEvent::RegionsSelected {
                regions: vec!["Yanomami".to_string(), "Kayapó".to_string()]
            }
        );
    }

    #[test]
    fn default_period_reads_from_toml_shape() {
        let range: MonthRange = serde_json::from_str(
            r#"{"start":{"year":2022,"month":8},"end":{"year":2024,"month":7}}"#,
        )
        .unwrap();
        assert!(range.contains(2023, 1));
        assert!(!range.contains(2024, 8));
    }

    #[test]
    fn selection_state_defaults_optional_fields() {
        let state: SelectionState = serde_json::from_str(r#"{"year":2024}"#).unwrap();
        assert!(state.selected_regions.is_empty());
        assert!(state.states.is_empty());
        assert_eq!(state.period, None);
    }

    #[test]
    fn boundary_property_name_strips_prefix() {
        let source = BoundarySource {
            url: String::new(),
            feature_id_key: "properties.NM_MUN".to_string(),
        };
        assert_eq!(source.property_name(), "NM_MUN");
    }
}
