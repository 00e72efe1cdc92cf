#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter-and-aggregate engine behind the SAD alert dashboards.
//!
//! Every dashboard variant shares one implementation parameterized by a
//! [`DashboardDescriptor`]. Data is loaded once by [`loader::load_dashboard`]
//! into an immutable [`LoadedDashboard`]; each user interaction is then a
//! pure call to [`view::update`], which reduces the event into the selection
//! state, recomputes the aggregates, and rebuilds every figure.

pub mod aggregate;
pub mod boundaries;
pub mod dataset;
pub mod export;
pub mod figures;
pub mod loader;
pub mod reducer;
pub mod registry;
pub mod view;

use sad_dashboard_models::DashboardDescriptor;
use thiserror::Error;

use crate::boundaries::Boundaries;
use crate::dataset::AlertDataset;

/// Errors that can occur while loading or serving a dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// `DuckDB` query failed.
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dashboard descriptor TOML is malformed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required dataset column is absent.
    #[error("Missing column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A dataset cell could not be parsed.
    #[error("Parse error at row {row}: {message}")]
    Parse {
        /// 1-based data row number.
        row: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// The dataset contained no usable rows.
    #[error("Dataset contains no records")]
    EmptyDataset,

    /// No dashboard is registered under the given id.
    #[error("Unknown dashboard: {id}")]
    UnknownDashboard {
        /// Requested dashboard id.
        id: String,
    },
}

/// A dashboard with its data loaded, ready to serve updates.
///
/// Immutable after construction and shared read-only across requests.
#[derive(Debug)]
pub struct LoadedDashboard {
    /// Variant configuration.
    pub descriptor: DashboardDescriptor,
    /// Alert records.
    pub dataset: AlertDataset,
    /// Boundary geometry; `None` when the boundary file failed to load.
    pub boundaries: Option<Boundaries>,
}

impl LoadedDashboard {
    /// Bundles already-loaded parts into a dashboard.
    #[must_use]
    pub const fn new(
        descriptor: DashboardDescriptor,
        dataset: AlertDataset,
        boundaries: Option<Boundaries>,
    ) -> Self {
        Self {
            descriptor,
            dataset,
            boundaries,
        }
    }

    /// Returns the dashboard identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.descriptor.id()
    }
}
