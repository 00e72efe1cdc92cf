#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! SAD alert record types and the administrative region taxonomy.
//!
//! Every dashboard reads the same tabular alert data (one row per detected
//! deforestation or degradation polygon, pre-aggregated by region) and
//! groups it by one of the [`RegionLevel`]s defined here.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Source column holding the two-letter state abbreviation.
pub const STATE_COLUMN: &str = "ESTADO";
/// Source column holding the alert year.
pub const YEAR_COLUMN: &str = "ANO";
/// Source column holding the alert month (1-12), when present.
pub const MONTH_COLUMN: &str = "MES";
/// Source column holding the alert area in square kilometres.
pub const AREA_COLUMN: &str = "AREAKM2";
/// Source column holding the land use category of a conservation unit.
pub const LAND_USE_COLUMN: &str = "USO";
/// Source column holding the jurisdiction (federal/state) of a conservation unit.
pub const JURISDICTION_COLUMN: &str = "JURISDICAO";

/// Kind of alert a dataset reports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Forest degradation (selective logging, fire scars).
    Degradation,
    /// Clear-cut deforestation.
    Deforestation,
}

impl AlertKind {
    /// Portuguese label used in chart titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Degradation => "Degradação Florestal",
            Self::Deforestation => "Desmatamento",
        }
    }

    /// Subject of the choropleth title.
    #[must_use]
    pub const fn map_label(self) -> &'static str {
        match self {
            Self::Degradation => "Degradação Ambiental",
            Self::Deforestation => "Desmatamento",
        }
    }

    /// Short Portuguese noun used in monitoring period labels.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Degradation => "Degradação",
            Self::Deforestation => "Desmatamento",
        }
    }
}

/// Administrative or protected-area unit a dashboard groups alerts by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionLevel {
    /// States of the Legal Amazon.
    State,
    /// Municipalities.
    Municipality,
    /// Agrarian reform settlements.
    Settlement,
    /// Indigenous lands.
    IndigenousLand,
    /// Conservation units.
    ConservationUnit,
}

impl RegionLevel {
    /// Column name the region identifier is stored under in the SAD
    /// datasets.
    #[must_use]
    pub const fn default_column(self) -> &'static str {
        match self {
            Self::State => STATE_COLUMN,
            Self::Municipality => "MUNICIPIO",
            Self::Settlement => "ASSENTAMEN",
            Self::IndigenousLand => "TERRA_INDI",
            Self::ConservationUnit => "UNID_CONSE",
        }
    }

    /// Portuguese plural used in chart titles.
    #[must_use]
    pub const fn plural_label(self) -> &'static str {
        match self {
            Self::State => "Estados",
            Self::Municipality => "Municípios",
            Self::Settlement => "Assentamentos",
            Self::IndigenousLand => "Terras Indígenas",
            Self::ConservationUnit => "Unidades de Conservação",
        }
    }

    /// Portuguese singular used for axis titles.
    #[must_use]
    pub const fn singular_label(self) -> &'static str {
        match self {
            Self::State => "Estado",
            Self::Municipality => "Município",
            Self::Settlement => "Assentamento",
            Self::IndigenousLand => "Terra Indígena",
            Self::ConservationUnit => "Unidade de Conservação",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::State,
            Self::Municipality,
            Self::Settlement,
            Self::IndigenousLand,
            Self::ConservationUnit,
        ]
    }
}

/// One row of a SAD alert dataset.
///
/// Rows are immutable once loaded. For state-level dashboards `region` is
/// the state abbreviation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Region identifier (municipality, settlement, ... name).
    pub region: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Alert year.
    pub year: i32,
    /// Alert month (1-12), for datasets with monthly resolution.
    pub month: Option<u8>,
    /// Alert area in km².
    pub area_km2: f64,
    /// Land use category (conservation unit datasets only).
    pub land_use: Option<String>,
    /// Jurisdiction (conservation unit datasets only).
    pub jurisdiction: Option<String>,
}

/// Portuguese three-letter month codes, indexed by `month - 1`.
pub const MONTH_CODES: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

/// First month of the SAD monitoring year (August).
pub const MONITORING_START_MONTH: u8 = 8;

/// Returns the Portuguese code for a month number, or `None` when the
/// number is outside 1-12.
#[must_use]
pub fn month_code(month: u8) -> Option<&'static str> {
    MONTH_CODES.get(usize::from(month).checked_sub(1)?).copied()
}

/// Month codes in monitoring-year order (`AGO` .. `JUL`).
#[must_use]
pub fn monitoring_month_order() -> Vec<&'static str> {
    (0..12u8)
        .map(|i| (MONITORING_START_MONTH - 1 + i) % 12)
        .map(|idx| MONTH_CODES[usize::from(idx)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_columns_are_distinct() {
        let mut columns: Vec<&str> = RegionLevel::all()
            .iter()
            .map(|l| l.default_column())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), RegionLevel::all().len());
    }

    #[test]
    fn kind_parses_from_screaming_snake_case() {
        assert_eq!(
            "DEFORESTATION".parse::<AlertKind>().unwrap(),
            AlertKind::Deforestation
        );
        assert_eq!(
            "INDIGENOUS_LAND".parse::<RegionLevel>().unwrap(),
            RegionLevel::IndigenousLand
        );
        assert!("forest".parse::<AlertKind>().is_err());
    }

    #[test]
    fn month_codes_cover_calendar() {
        assert_eq!(month_code(1), Some("JAN"));
        assert_eq!(month_code(8), Some("AGO"));
        assert_eq!(month_code(12), Some("DEZ"));
        assert_eq!(month_code(0), None);
        assert_eq!(month_code(13), None);
    }

    #[test]
    fn monitoring_order_starts_in_august() {
        let order = monitoring_month_order();
        assert_eq!(order.len(), 12);
        assert_eq!(order.first(), Some(&"AGO"));
        assert_eq!(order.last(), Some(&"JUL"));
        assert_eq!(order[5], "JAN");
    }
}
