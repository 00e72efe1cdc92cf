//! Compile-time registry of dashboard variants.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a dashboard requires creating a TOML file in `dashboards/` and
//! adding a corresponding entry here.

use sad_dashboard_models::DashboardDescriptor;

use crate::DashboardError;

/// Number of registered dashboards. Enforced by a test.
#[cfg(test)]
const EXPECTED_DASHBOARD_COUNT: usize = 10;

/// Embedded TOML dashboard descriptors.
const DASHBOARD_TOMLS: &[(&str, &str)] = &[
    (
        "degradacao_estados",
        include_str!("../dashboards/degradacao_estados.toml"),
    ),
    (
        "degradacao_municipio",
        include_str!("../dashboards/degradacao_municipio.toml"),
    ),
    (
        "degradacao_assentamento",
        include_str!("../dashboards/degradacao_assentamento.toml"),
    ),
    (
        "degradacao_terras_indigenas",
        include_str!("../dashboards/degradacao_terras_indigenas.toml"),
    ),
    ("degradacao_uc", include_str!("../dashboards/degradacao_uc.toml")),
    (
        "desmatamento_estados",
        include_str!("../dashboards/desmatamento_estados.toml"),
    ),
    (
        "desmatamento_municipios",
        include_str!("../dashboards/desmatamento_municipios.toml"),
    ),
    (
        "desmatamento_assentamento",
        include_str!("../dashboards/desmatamento_assentamento.toml"),
    ),
    (
        "desmatamento_terras_indigenas",
        include_str!("../dashboards/desmatamento_terras_indigenas.toml"),
    ),
    (
        "desmatamento_uc",
        include_str!("../dashboards/desmatamento_uc.toml"),
    ),
];

/// Parses one dashboard descriptor.
///
/// # Errors
///
/// Returns [`DashboardError::Toml`] if the TOML is malformed or does not
/// match the descriptor schema.
pub fn parse_descriptor(toml_str: &str) -> Result<DashboardDescriptor, DashboardError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns all registered dashboards.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_dashboards() -> Vec<DashboardDescriptor> {
    DASHBOARD_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            parse_descriptor(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dashboard '{name}': {e}"))
        })
        .collect()
}

/// Looks up a dashboard by id.
///
/// # Errors
///
/// Returns [`DashboardError::UnknownDashboard`] if no dashboard has that id.
pub fn find(id: &str) -> Result<DashboardDescriptor, DashboardError> {
    all_dashboards()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DashboardError::UnknownDashboard { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use sad_alert_models::{AlertKind, RegionLevel};
    use sad_dashboard_models::DatasetFormat;

    use super::*;

    #[test]
    fn loads_all_dashboards() {
        let dashboards = all_dashboards();
        assert_eq!(
            dashboards.len(),
            EXPECTED_DASHBOARD_COUNT,
            "Expected {EXPECTED_DASHBOARD_COUNT} dashboards, found {}. \
             Update EXPECTED_DASHBOARD_COUNT after adding/removing dashboards.",
            dashboards.len()
        );
    }

    #[test]
    fn registry_names_match_ids() {
        for ((name, _), descriptor) in DASHBOARD_TOMLS.iter().zip(all_dashboards()) {
            assert_eq!(*name, descriptor.id);
        }
    }

    #[test]
    fn ids_and_base_paths_are_unique() {
        let dashboards = all_dashboards();
        let mut ids = BTreeSet::new();
        let mut paths = BTreeSet::new();
        for d in &dashboards {
            assert!(ids.insert(&d.id), "Duplicate dashboard ID: {}", d.id);
            assert!(
                paths.insert(&d.base_path),
                "Duplicate base path: {}",
                d.base_path
            );
        }
    }

    #[test]
    fn all_dashboards_have_required_fields() {
        for d in &all_dashboards() {
            assert!(!d.title.is_empty(), "Dashboard {} has empty title", d.id);
            assert_eq!(
                d.base_path,
                format!("/sad/{}/", d.id),
                "Dashboard {} base path must be /sad/<id>/",
                d.id
            );
            assert!(d.top_n > 0, "Dashboard {} has top_n = 0", d.id);
            assert!(
                d.export_filename.ends_with(".csv"),
                "Dashboard {} export filename must end in .csv",
                d.id
            );
            assert!(
                d.dataset.url.starts_with("https://"),
                "Dashboard {} has invalid dataset URL",
                d.id
            );
            assert!(
                d.boundaries.url.ends_with(".geojson"),
                "Dashboard {} has invalid boundary URL",
                d.id
            );
            assert!(
                d.boundaries.feature_id_key.starts_with("properties."),
                "Dashboard {} feature key must start with properties.",
                d.id
            );
        }
    }

    #[test]
    fn every_kind_and_level_is_covered() {
        let dashboards = all_dashboards();
        for kind in [AlertKind::Degradation, AlertKind::Deforestation] {
            for level in RegionLevel::all() {
                assert!(
                    dashboards
                        .iter()
                        .any(|d| d.kind == kind && d.level == *level),
                    "No dashboard for {kind} / {level}"
                );
            }
        }
    }

    #[test]
    fn municipality_dashboards_rank_top_ten() {
        for d in all_dashboards() {
            let expected = if d.level == RegionLevel::Municipality {
                10
            } else {
                15
            };
            assert_eq!(d.top_n, expected, "Dashboard {} top_n", d.id);
        }
    }

    #[test]
    fn optional_charts_are_enabled_only_where_the_data_supports_them() {
        let dashboards = all_dashboards();
        let ids = |flag: fn(&DashboardDescriptor) -> bool| -> Vec<String> {
            dashboards
                .iter()
                .filter(|d| flag(*d))
                .map(|d| d.id.clone())
                .collect()
        };

        assert_eq!(
            ids(|d| d.monitoring_periods),
            vec!["desmatamento_terras_indigenas"]
        );
        assert_eq!(
            ids(|d| d.land_use_breakdown),
            vec!["degradacao_uc", "desmatamento_uc"]
        );
        assert_eq!(
            ids(|d| d.default_period.is_some()),
            vec!["desmatamento_terras_indigenas"]
        );
    }

    #[test]
    fn indigenous_land_deforestation_opens_on_two_monitoring_years() {
        let d = find("desmatamento_terras_indigenas").unwrap();
        let period = d.default_period.unwrap();
        assert_eq!((period.start.year, period.start.month), (2022, 8));
        assert_eq!((period.end.year, period.end.month), (2024, 7));
    }

    #[test]
    fn find_resolves_known_ids() {
        let d = find("degradacao_terras_indigenas").unwrap();
        assert_eq!(d.dataset.format, DatasetFormat::Csv);
        assert_eq!(d.region_column(), "TERRA_INDI");
        assert_eq!(d.boundaries.property_name(), "nome_uc");

        let d = find("degradacao_estados").unwrap();
        assert_eq!(d.region_column(), "ESTADO");
        assert!((d.map.center_lat - -14.0).abs() < f64::EPSILON);

        assert!(matches!(
            find("nope"),
            Err(DashboardError::UnknownDashboard { .. })
        ));
    }

    #[test]
    fn parse_descriptor_rejects_unknown_level() {
        let toml = r#"
            id = "x"
            title = "X"
            base_path = "/sad/x/"
            kind = "DEGRADATION"
            level = "COUNTY"
            top_n = 5
            export_filename = "x.csv"

            [dataset]
            url = "https://example.com/x.csv"
            format = "csv"

            [boundaries]
            url = "https://example.com/x.geojson"
            feature_id_key = "properties.x"
        "#;
        assert!(matches!(
            parse_descriptor(toml),
            Err(DashboardError::Toml(_))
        ));
    }
}
