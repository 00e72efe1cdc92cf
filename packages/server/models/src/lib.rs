#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SAD dashboard server.
//!
//! Chart and selection payloads reuse the dashboard model types directly;
//! this crate only adds the envelopes specific to the HTTP API.

use sad_alert_models::{AlertKind, RegionLevel};
use sad_dashboard_models::{DashboardDescriptor, DashboardEvent, ModalTrigger, SelectionState};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of dashboards with data loaded.
    pub dashboards_loaded: usize,
}

/// One entry of the dashboard index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboardSummary {
    /// Dashboard identifier.
    pub id: String,
    /// Page heading.
    pub title: String,
    /// URL prefix the dashboard is served under.
    pub base_path: String,
    /// Alert kind.
    pub kind: AlertKind,
    /// Region level.
    pub level: RegionLevel,
    /// Whether the dataset loaded at startup.
    pub loaded: bool,
}

impl ApiDashboardSummary {
    /// Summarizes a registered dashboard.
    #[must_use]
    pub fn new(descriptor: &DashboardDescriptor, loaded: bool) -> Self {
        Self {
            id: descriptor.id.clone(),
            title: descriptor.title.clone(),
            base_path: descriptor.base_path.clone(),
            kind: descriptor.kind,
            level: descriptor.level,
            loaded,
        }
    }
}

/// Body of `POST {base}api/update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Selection before the event. Omitted on first load.
    #[serde(default)]
    pub state: Option<SelectionState>,
    /// The interaction to apply.
    pub event: DashboardEvent,
}

/// Body of `POST {base}api/modal`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModalRequest {
    /// Current visibility.
    pub open: bool,
    /// Button that was pressed.
    pub trigger: ModalTrigger,
}

/// Query string of `GET {base}api/regions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionsQuery {
    /// Comma-separated state abbreviations. Empty lists every region.
    #[serde(default)]
    pub states: String,
}

impl RegionsQuery {
    /// The requested states, trimmed, without empty entries.
    #[must_use]
    pub fn state_list(&self) -> Vec<String> {
        self.states
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
