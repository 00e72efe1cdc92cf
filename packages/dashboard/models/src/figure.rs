//! Chart specifications serialized in Plotly's figure JSON schema.
//!
//! Only the attributes the dashboards actually set are modelled. Every
//! optional attribute is skipped when unset so the client renderer falls
//! back to its own defaults.

use serde::{Deserialize, Serialize};

/// A complete chart: traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Data traces.
    pub data: Vec<Trace>,
    /// Layout.
    pub layout: Layout,
}

impl Figure {
    /// A figure with no traces and only a title, drawn when a filter leaves
    /// nothing to plot.
    #[must_use]
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: Some(Title::centered(title)),
                ..Layout::default()
            },
        }
    }
}

/// A single data trace, tagged by Plotly trace type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// Vertical or horizontal bars.
    Bar(BarTrace),
    /// Lines and/or markers.
    Scatter(ScatterTrace),
    /// Filled polygons on a tile map.
    #[serde(rename = "choroplethmapbox")]
    Choropleth(ChoroplethTrace),
    /// Pie slices.
    Pie(PieTrace),
}

/// A value on a categorical or numeric axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    /// Integer (years).
    Int(i64),
    /// Floating point (areas).
    Number(f64),
    /// Category label.
    Text(String),
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Bar chart trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarTrace {
    /// X values.
    pub x: Vec<Datum>,
    /// Y values.
    pub y: Vec<Datum>,
    /// `"h"` for horizontal bars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// Legend name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Per-bar label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    /// d3-format template applied to `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texttemplate: Option<String>,
    /// Label placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textposition: Option<String>,
    /// Label rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textangle: Option<f64>,
    /// Label font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfont: Option<Font>,
    /// Bar styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Bar opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Line/marker trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterTrace {
    /// X values.
    pub x: Vec<Datum>,
    /// Y values.
    pub y: Vec<Datum>,
    /// Legend name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Draw mode, e.g. `"lines+markers"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Line styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

/// Choropleth trace over a tile map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethTrace {
    /// Boundary `FeatureCollection`; `None` when boundaries failed to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<serde_json::Value>,
    /// Feature property joined against `locations`.
    pub featureidkey: String,
    /// Region names.
    pub locations: Vec<String>,
    /// Colour values.
    pub z: Vec<f64>,
    /// Named colour scale.
    pub colorscale: String,
    /// Colour bar title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    /// Polygon opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Pie trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieTrace {
    /// Slice labels.
    pub labels: Vec<String>,
    /// Slice values.
    pub values: Vec<f64>,
    /// Hover text (colour group per slice).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovertext: Option<Vec<String>>,
    /// Slice label content, e.g. `"percent+label"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textinfo: Option<String>,
    /// Slice label font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfont: Option<Font>,
    /// Slice colours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Marker colour: one colour for all points or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// One colour.
    Single(String),
    /// One colour per point.
    PerPoint(Vec<String>),
}

/// Marker styling shared by bars, polygons and pie slices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Fill colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Pie slice colours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    /// Fill opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Line styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Interpolation, e.g. `"spline"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

/// Colour bar configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    /// Colour bar title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

/// Figure layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Chart title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// X axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    /// Y axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Global font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// Gap between bars (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
    /// Plotly template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Tile map configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapbox: Option<Mapbox>,
    /// Plot margins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    /// Legend configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    /// Resize with the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosize: Option<bool>,
}

/// Title text with optional placement and font.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// Text; may contain `<br>`.
    pub text: String,
    /// Horizontal position (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Title font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    /// A plain title.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A horizontally centred title.
    #[must_use]
    pub fn centered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: Some(0.5),
            font: None,
        }
    }
}

/// Axis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// `"linear"` to label every year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<String>,
    /// Tick label rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<f64>,
    /// Tick label font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
    /// d3-format for tick labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    /// `"reversed"` to draw the first category on top.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autorange: Option<String>,
    /// `"array"` to honour `categoryarray`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<String>,
    /// Explicit category order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<String>>,
}

impl Axis {
    /// An axis with only a title.
    #[must_use]
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(text)),
            ..Self::default()
        }
    }
}

/// Font attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl Font {
    /// A font with only a size.
    #[must_use]
    pub fn sized(size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }
}

/// Tile map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapbox {
    /// Tile style, e.g. `"open-street-map"`.
    pub style: String,
    /// Zoom level.
    pub zoom: f64,
    /// Centre.
    pub center: LatLon,
}

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Plot margins in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Right.
    pub r: f64,
    /// Top.
    pub t: f64,
    /// Left.
    pub l: f64,
    /// Bottom.
    pub b: f64,
}

/// Legend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// `"constant"` to keep legend symbols the same size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itemsizing: Option<String>,
    /// Legend font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    /// `"v"` or `"h"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}
