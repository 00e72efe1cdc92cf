//! Chart builders.
//!
//! One builder per chart kind, shared by every dashboard. Wording is
//! derived from the descriptor's alert kind and region level.

use std::collections::BTreeMap;

use sad_alert_models::{RegionLevel, monitoring_month_order};
use sad_dashboard_models::{
    DashboardDescriptor, LandUseShare, MonitoringPoint, MonthRange, RegionYearShare, YearTotal,
    figure::{
        Axis, BarTrace, ChoroplethTrace, Color, ColorBar, Datum, Figure, Font, LatLon, Layout,
        Legend, Line, Mapbox, Margin, Marker, PieTrace, ScatterTrace, Title, Trace,
    },
};

use crate::aggregate::Series;
use crate::boundaries::Boundaries;

const SELECTED_COLOR: &str = "green";
const UNSELECTED_COLOR: &str = "DarkSeaGreen";
const TOTALS_COLOR: &str = "orange";
const MAP_COLOR_SCALE: &str = "YlOrRd";
const MAP_STYLE: &str = "open-street-map";
const TEMPLATE: &str = "plotly_white";
const AREA_AXIS: &str = "Área (km²)";

/// Sequential reds, cycled over timeline series.
const REDS: [&str; 9] = [
    "rgb(255,245,240)",
    "rgb(254,224,210)",
    "rgb(252,187,161)",
    "rgb(252,146,114)",
    "rgb(251,106,74)",
    "rgb(239,59,44)",
    "rgb(203,24,29)",
    "rgb(165,15,21)",
    "rgb(103,0,13)",
];

/// Qualitative palette for pie colour groups.
const QUALITATIVE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Teal shades for monitoring-year lines.
const TEALS: [&str; 10] = [
    "#007588", "#004c5e", "#00a6b3", "#002f3a", "#00c2d1", "#006072", "#80e5e5", "#003840",
    "#33d1e0", "#001a1f",
];

/// Formats a number the way the charts label it: integers keep one
/// decimal (`15.0`), everything else prints as-is.
fn number_label(value: f64) -> String {
    if value.is_finite() && value.fract().abs() < f64::EPSILON {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Caption for a month range, `2022-08 a 2024-07`.
#[must_use]
pub fn period_label(period: MonthRange) -> String {
    format!(
        "{}-{:02} a {}-{:02}",
        period.start.year, period.start.month, period.end.year, period.end.month
    )
}

fn joined(values: &[String]) -> String {
    values.join(", ")
}

fn small_axis(title: &str) -> Axis {
    Axis {
        title: Some(Title {
            text: title.to_string(),
            x: None,
            font: Some(Font::sized(10.0)),
        }),
        tickfont: Some(Font::sized(10.0)),
        ..Axis::default()
    }
}

/// Title of the totals-by-year chart.
#[must_use]
pub fn totals_title(
    descriptor: &DashboardDescriptor,
    states: &[String],
    regions: &[String],
) -> String {
    let kind = descriptor.kind.label();

    if descriptor.level == RegionLevel::State {
        return if states.is_empty() && regions.is_empty() {
            format!("SAD Alertas de {kind} - Amazônia Legal - Estados")
        } else {
            format!("SAD Alertas de {kind} - Estados Selecionados")
        };
    }

    let plural = descriptor.level.plural_label();
    match (states.is_empty(), regions.is_empty()) {
        (false, false) => format!(
            "SAD Alertas <br> {kind} - {plural} ({}) ({})",
            joined(regions),
            joined(states)
        ),
        (false, true) => format!("SAD Alertas <br> {kind} - {plural} ({})", joined(states)),
        (true, false) => format!("SAD Alertas <br> {kind} - {plural} ({})", joined(regions)),
        (true, true) => format!("SAD Alertas <br> {kind} - Amazônia Legal"),
    }
}

/// Orange bars of total area per year.
#[must_use]
pub fn totals_bar(
    descriptor: &DashboardDescriptor,
    totals: &[YearTotal],
    states: &[String],
    regions: &[String],
) -> Figure {
    let title = totals_title(descriptor, states, regions);

    let trace = BarTrace {
        x: totals.iter().map(|t| Datum::from(t.year)).collect(),
        y: totals.iter().map(|t| Datum::from(t.area_km2)).collect(),
        text: Some(totals.iter().map(|t| number_label(t.area_km2)).collect()),
        texttemplate: Some("%{text:.2s}".to_string()),
        textposition: Some("outside".to_string()),
        textangle: Some(-45.0),
        textfont: Some(Font {
            size: Some(12.0),
            color: Some("black".to_string()),
            family: Some("Arial".to_string()),
        }),
        marker: Some(Marker {
            color: Some(Color::Single(TOTALS_COLOR.to_string())),
            line: Some(Line {
                color: Some(TOTALS_COLOR.to_string()),
                width: Some(1.5),
                shape: None,
            }),
            ..Marker::default()
        }),
        opacity: Some(0.6),
        ..BarTrace::default()
    };

    Figure {
        data: vec![Trace::Bar(trace)],
        layout: Layout {
            title: Some(Title::centered(title)),
            xaxis: Some(Axis {
                tickmode: Some("linear".to_string()),
                tickangle: Some(-45.0),
                ..small_axis("Ano")
            }),
            yaxis: Some(small_axis(AREA_AXIS)),
            font: Some(Font::sized(10.0)),
            template: Some(TEMPLATE.to_string()),
            autosize: Some(true),
            ..Layout::default()
        },
    }
}

/// Horizontal bars of the top regions, largest on top. `when` captions the
/// year or period ranked. Selected regions are drawn in a darker green.
#[must_use]
pub fn ranked_bar(
    descriptor: &DashboardDescriptor,
    ranked: &[RegionYearShare],
    selected: &[String],
    states: &[String],
    when: &str,
) -> Figure {
    let kind = descriptor.kind.label();
    let plural = descriptor.level.plural_label();
    let title = if states.is_empty() {
        format!("SAD Alertas <br> {kind} Acumulado <br> {plural} ({when})")
    } else {
        format!(
            "SAD Alertas <br> {kind} Acumulado <br> {plural} ({}) ({when})",
            joined(states)
        )
    };

    let colors = ranked
        .iter()
        .map(|r| {
            let color = if selected.contains(&r.region) {
                SELECTED_COLOR
            } else {
                UNSELECTED_COLOR
            };
            color.to_string()
        })
        .collect();

    let trace = BarTrace {
        x: ranked.iter().map(|r| Datum::from(r.area_km2)).collect(),
        y: ranked.iter().map(|r| Datum::from(r.region.as_str())).collect(),
        orientation: Some("h".to_string()),
        text: Some(
            ranked
                .iter()
                .map(|r| {
                    format!(
                        "{} km² ({}%)",
                        number_label(r.area_km2),
                        number_label(r.percent)
                    )
                })
                .collect(),
        ),
        textposition: Some("auto".to_string()),
        marker: Some(Marker {
            color: Some(Color::PerPoint(colors)),
            ..Marker::default()
        }),
        ..BarTrace::default()
    };

    Figure {
        data: vec![Trace::Bar(trace)],
        layout: Layout {
            title: Some(Title::centered(title)),
            xaxis: Some(Axis::titled(AREA_AXIS)),
            yaxis: Some(Axis {
                autorange: Some("reversed".to_string()),
                ..Axis::titled(descriptor.level.singular_label())
            }),
            font: Some(Font::sized(10.0)),
            bargap: Some(0.1),
            ..Layout::default()
        },
    }
}

/// Choropleth of `rows` over the boundary geometry.
///
/// Without boundaries the trace carries no geometry and the client draws
/// an empty map.
#[must_use]
pub fn choropleth(
    descriptor: &DashboardDescriptor,
    boundaries: Option<&Boundaries>,
    rows: &[RegionYearShare],
    when: &str,
) -> Figure {
    let trace = ChoroplethTrace {
        geojson: boundaries.map(|b| b.as_json().clone()),
        featureidkey: descriptor.boundaries.feature_id_key.clone(),
        locations: rows.iter().map(|r| r.region.clone()).collect(),
        z: rows.iter().map(|r| r.area_km2).collect(),
        colorscale: MAP_COLOR_SCALE.to_string(),
        colorbar: Some(ColorBar {
            title: Some(Title::new("AREAKM2")),
        }),
        marker: Some(Marker {
            opacity: Some(0.8),
            ..Marker::default()
        }),
    };

    let map = descriptor.map;
    Figure {
        data: vec![Trace::Choropleth(trace)],
        layout: Layout {
            title: Some(Title {
                font: Some(Font::sized(14.0)),
                ..Title::centered(format!(
                    "Mapa de {} (km²) - {when}",
                    descriptor.kind.map_label()
                ))
            }),
            mapbox: Some(Mapbox {
                style: MAP_STYLE.to_string(),
                zoom: map.zoom,
                center: LatLon {
                    lat: map.center_lat,
                    lon: map.center_lon,
                },
            }),
            margin: Some(Margin {
                r: 0.0,
                t: 50.0,
                l: 0.0,
                b: 0.0,
            }),
            ..Layout::default()
        },
    }
}

/// Title of the timeline chart.
#[must_use]
pub fn timeline_title(descriptor: &DashboardDescriptor, states: &[String]) -> String {
    let kind = descriptor.kind.label();
    if descriptor.level == RegionLevel::State {
        return if states.is_empty() {
            format!("SAD Alertas de {kind}<br>Amazônia Legal - Estados")
        } else {
            format!("SAD Alertas de {kind} - Estados Selecionados")
        };
    }

    let plural = descriptor.level.plural_label();
    if states.is_empty() {
        format!("SAD Alertas <br> {kind} - {plural} por Estado")
    } else {
        format!(
            "SAD Alertas <br> {kind} {plural} por Estado ({})",
            joined(states)
        )
    }
}

/// One spline per region across all years.
#[must_use]
pub fn timeline(descriptor: &DashboardDescriptor, series: &[Series], states: &[String]) -> Figure {
    let data = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Trace::Scatter(ScatterTrace {
                x: s.points.iter().map(|p| Datum::from(p.year)).collect(),
                y: s.points.iter().map(|p| Datum::from(p.area_km2)).collect(),
                name: Some(s.name.clone()),
                mode: Some("lines+markers".to_string()),
                line: Some(Line {
                    color: Some(REDS[i % REDS.len()].to_string()),
                    width: None,
                    shape: Some("spline".to_string()),
                }),
            })
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Some(Title::centered(timeline_title(descriptor, states))),
            xaxis: Some(Axis::titled("Ano")),
            yaxis: Some(Axis {
                tickformat: Some(".0f".to_string()),
                ..Axis::titled(AREA_AXIS)
            }),
            font: Some(Font::sized(10.0)),
            template: Some(TEMPLATE.to_string()),
            legend: Some(Legend {
                itemsizing: Some("constant".to_string()),
                ..Legend::default()
            }),
            ..Layout::default()
        },
    }
}

fn pie(title: String, shares: &[LandUseShare]) -> Figure {
    if shares.is_empty() {
        return Figure::empty(title);
    }

    let mut group_colors: BTreeMap<&str, &str> = BTreeMap::new();
    for share in shares {
        let next = QUALITATIVE[group_colors.len() % QUALITATIVE.len()];
        group_colors.entry(share.group.as_str()).or_insert(next);
    }

    let trace = PieTrace {
        labels: shares.iter().map(|s| s.label.clone()).collect(),
        values: shares.iter().map(|s| s.area_km2).collect(),
        hovertext: Some(shares.iter().map(|s| s.group.clone()).collect()),
        textinfo: Some("percent+label".to_string()),
        textfont: Some(Font::sized(8.0)),
        marker: Some(Marker {
            colors: Some(
                shares
                    .iter()
                    .map(|s| {
                        group_colors
                            .get(s.group.as_str())
                            .copied()
                            .unwrap_or(QUALITATIVE[0])
                            .to_string()
                    })
                    .collect(),
            ),
            ..Marker::default()
        }),
    };

    Figure {
        data: vec![Trace::Pie(trace)],
        layout: Layout {
            title: Some(Title {
                font: Some(Font::sized(12.0)),
                ..Title::centered(title)
            }),
            legend: Some(Legend {
                font: Some(Font::sized(8.0)),
                ..Legend::default()
            }),
            ..Layout::default()
        },
    }
}

/// Pie of area by land use, coloured by jurisdiction.
#[must_use]
pub fn land_use_pie(descriptor: &DashboardDescriptor, shares: &[LandUseShare]) -> Figure {
    pie(
        format!(
            "Área de {} por<br>Tipo de Uso e Jurisdição",
            descriptor.kind.noun()
        ),
        shares,
    )
}

/// Pie of area by unit, coloured by land use.
#[must_use]
pub fn unit_use_pie(descriptor: &DashboardDescriptor, shares: &[LandUseShare]) -> Figure {
    pie(
        format!(
            "Área de {} por<br>{} e Uso",
            descriptor.kind.noun(),
            descriptor.level.singular_label()
        ),
        shares,
    )
}

/// One line per monitoring year over the months Aug-Jul.
#[must_use]
pub fn monitoring_line(
    descriptor: &DashboardDescriptor,
    points: &[MonitoringPoint],
    states: &[String],
    regions: &[String],
) -> Figure {
    let mut periods: Vec<(&str, Vec<&MonitoringPoint>)> = Vec::new();
    for point in points {
        match periods.iter_mut().find(|(label, _)| *label == point.period_label) {
            Some((_, members)) => members.push(point),
            None => periods.push((point.period_label.as_str(), vec![point])),
        }
    }

    let data = periods
        .iter()
        .enumerate()
        .map(|(i, (label, members))| {
            Trace::Scatter(ScatterTrace {
                x: members
                    .iter()
                    .map(|p| Datum::from(p.month_label.as_str()))
                    .collect(),
                y: members.iter().map(|p| Datum::from(p.area_km2)).collect(),
                name: Some((*label).to_string()),
                mode: Some("lines+markers".to_string()),
                line: Some(Line {
                    color: Some(TEALS[i % TEALS.len()].to_string()),
                    width: None,
                    shape: None,
                }),
            })
        })
        .collect();

    let state_part = if states.is_empty() {
        String::new()
    } else {
        format!(" - Estados: {}", joined(states))
    };
    let region_part = if regions.is_empty() {
        String::new()
    } else {
        format!(" - {}: {}", descriptor.level.plural_label(), joined(regions))
    };
    let title = format!(
        "Evolução de {} na Amazônia por Período <br>{state_part}{region_part}",
        descriptor.kind.noun()
    );

    Figure {
        data,
        layout: Layout {
            title: Some(Title::centered(title)),
            xaxis: Some(Axis {
                categoryorder: Some("array".to_string()),
                categoryarray: Some(
                    monitoring_month_order()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                ),
                ..Axis::titled("Meses")
            }),
            yaxis: Some(Axis::titled(AREA_AXIS)),
            font: Some(Font::sized(10.0)),
            legend: Some(Legend {
                itemsizing: Some("constant".to_string()),
                ..Legend::default()
            }),
            ..Layout::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use sad_alert_models::{AlertKind, RegionLevel};
    use sad_dashboard_models::YearMonth;

    use super::*;
    use crate::test_support::descriptor;

    fn share(region: &str, area_km2: f64, percent: f64) -> RegionYearShare {
        RegionYearShare {
            region: region.to_string(),
            state: "PA".to_string(),
            year: 2024,
            area_km2,
            percent,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn totals_title_covers_all_four_filter_cases() {
        let d = descriptor(AlertKind::Degradation, RegionLevel::Municipality);
        let states = strings(&["PA", "MT"]);
        let regions = strings(&["Altamira"]);

        assert_eq!(
            totals_title(&d, &states, &regions),
            "SAD Alertas <br> Degradação Florestal - Municípios (Altamira) (PA, MT)"
        );
        assert_eq!(
            totals_title(&d, &states, &[]),
            "SAD Alertas <br> Degradação Florestal - Municípios (PA, MT)"
        );
        assert_eq!(
            totals_title(&d, &[], &regions),
            "SAD Alertas <br> Degradação Florestal - Municípios (Altamira)"
        );
        assert_eq!(
            totals_title(&d, &[], &[]),
            "SAD Alertas <br> Degradação Florestal - Amazônia Legal"
        );
    }

    #[test]
    fn state_level_titles_use_selection_wording() {
        let d = descriptor(AlertKind::Deforestation, RegionLevel::State);
        assert_eq!(
            totals_title(&d, &[], &[]),
            "SAD Alertas de Desmatamento - Amazônia Legal - Estados"
        );
        assert_eq!(
            totals_title(&d, &[], &strings(&["PA"])),
            "SAD Alertas de Desmatamento - Estados Selecionados"
        );
        assert_eq!(
            timeline_title(&d, &strings(&["PA"])),
            "SAD Alertas de Desmatamento - Estados Selecionados"
        );
    }

    #[test]
    fn ranked_bar_highlights_selection_and_labels_shares() {
        let d = descriptor(AlertKind::Degradation, RegionLevel::Municipality);
        let ranked = vec![share("Altamira", 15.0, 50.0), share("Colniza", 4.25, 14.17)];
        let figure = ranked_bar(&d, &ranked, &strings(&["Colniza"]), &[], "2024");

        let Trace::Bar(bar) = &figure.data[0] else {
            panic!("expected a bar trace");
        };
        assert_eq!(bar.orientation.as_deref(), Some("h"));
        assert_eq!(
            bar.text.as_deref().unwrap(),
            &["15.0 km² (50.0%)".to_string(), "4.25 km² (14.17%)".to_string()]
        );
        assert_eq!(
            bar.marker.as_ref().unwrap().color,
            Some(Color::PerPoint(strings(&["DarkSeaGreen", "green"])))
        );
        assert_eq!(
            figure.layout.yaxis.unwrap().autorange.as_deref(),
            Some("reversed")
        );
        assert_eq!(
            figure.layout.title.unwrap().text,
            "SAD Alertas <br> Degradação Florestal Acumulado <br> Municípios (2024)"
        );
    }

    #[test]
    fn choropleth_without_boundaries_omits_geometry() {
        let d = descriptor(AlertKind::Deforestation, RegionLevel::Municipality);
        let figure = choropleth(&d, None, &[share("Altamira", 15.0, 50.0)], "2023");

        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["data"][0]["type"], "choroplethmapbox");
        assert!(json["data"][0].get("geojson").is_none());
        assert_eq!(json["data"][0]["featureidkey"], "properties.NM_MUN");
        assert_eq!(json["data"][0]["locations"][0], "Altamira");
        assert_eq!(json["layout"]["mapbox"]["style"], "open-street-map");
        assert_eq!(json["layout"]["mapbox"]["center"]["lat"], -14.0);
        assert_eq!(
            json["layout"]["title"]["text"],
            "Mapa de Desmatamento (km²) - 2023"
        );
    }

    #[test]
    fn degradation_map_title_names_environmental_degradation() {
        let d = descriptor(AlertKind::Degradation, RegionLevel::State);
        let figure = choropleth(&d, None, &[], "2024");
        assert_eq!(
            figure.layout.title.unwrap().text,
            "Mapa de Degradação Ambiental (km²) - 2024"
        );
    }

    #[test]
    fn period_captions_use_year_month_bounds() {
        let period = MonthRange::new(
            YearMonth { year: 2022, month: 8 },
            YearMonth { year: 2024, month: 7 },
        );
        assert_eq!(period_label(period), "2022-08 a 2024-07");

        let d = descriptor(AlertKind::Deforestation, RegionLevel::IndigenousLand);
        let figure = ranked_bar(&d, &[], &[], &[], &period_label(period));
        assert_eq!(
            figure.layout.title.unwrap().text,
            "SAD Alertas <br> Desmatamento Acumulado <br> Terras Indígenas (2022-08 a 2024-07)"
        );
    }

    #[test]
    fn timeline_has_one_spline_per_series() {
        let d = descriptor(AlertKind::Degradation, RegionLevel::Settlement);
        let series = vec![
            Series {
                name: "PA Tapajós".to_string(),
                points: vec![
                    YearTotal {
                        year: 2022,
                        area_km2: 1.0,
                    },
                    YearTotal {
                        year: 2023,
                        area_km2: 2.0,
                    },
                ],
            },
            Series {
                name: "PDS Esperança".to_string(),
                points: vec![YearTotal {
                    year: 2023,
                    area_km2: 3.0,
                }],
            },
        ];
        let figure = timeline(&d, &series, &strings(&["PA"]));

        assert_eq!(figure.data.len(), 2);
        let Trace::Scatter(first) = &figure.data[0] else {
            panic!("expected a scatter trace");
        };
        assert_eq!(first.name.as_deref(), Some("PA Tapajós"));
        assert_eq!(first.line.as_ref().unwrap().shape.as_deref(), Some("spline"));
        assert_eq!(
            figure.layout.title.unwrap().text,
            "SAD Alertas <br> Degradação Florestal Assentamentos por Estado (PA)"
        );
    }

    #[test]
    fn pie_colours_follow_groups() {
        let d = descriptor(AlertKind::Deforestation, RegionLevel::ConservationUnit);
        let shares = vec![
            LandUseShare {
                label: "APA".to_string(),
                group: "Estadual".to_string(),
                area_km2: 5.0,
            },
            LandUseShare {
                label: "FLONA".to_string(),
                group: "Federal".to_string(),
                area_km2: 3.0,
            },
            LandUseShare {
                label: "RESEX".to_string(),
                group: "Estadual".to_string(),
                area_km2: 1.0,
            },
        ];
        let figure = land_use_pie(&d, &shares);
        let Trace::Pie(pie) = &figure.data[0] else {
            panic!("expected a pie trace");
        };
        let colors = pie.marker.as_ref().unwrap().colors.clone().unwrap();
        assert_eq!(colors[0], colors[2]);
        assert_ne!(colors[0], colors[1]);
        assert_eq!(pie.textinfo.as_deref(), Some("percent+label"));
    }

    #[test]
    fn empty_breakdown_draws_titled_placeholder() {
        let d = descriptor(AlertKind::Degradation, RegionLevel::ConservationUnit);
        let figure = unit_use_pie(&d, &[]);
        assert!(figure.data.is_empty());
        assert_eq!(
            figure.layout.title.unwrap().text,
            "Área de Degradação por<br>Unidade de Conservação e Uso"
        );
    }

    #[test]
    fn monitoring_line_groups_points_by_period() {
        let d = descriptor(AlertKind::Deforestation, RegionLevel::IndigenousLand);
        let point = |label: &str, month_label: &str, year, month, area_km2| MonitoringPoint {
            period_label: label.to_string(),
            month_label: month_label.to_string(),
            year,
            month,
            area_km2,
        };
        let points = vec![
            point("Desmatamento 2022-2023", "AGO", 2022, 8, 1.0),
            point("Desmatamento 2022-2023", "JAN", 2023, 1, 2.0),
            point("Desmatamento 2023-2024", "SET", 2023, 9, 4.0),
        ];
        let figure = monitoring_line(&d, &points, &strings(&["RR"]), &[]);

        assert_eq!(figure.data.len(), 2);
        let Trace::Scatter(first) = &figure.data[0] else {
            panic!("expected a scatter trace");
        };
        assert_eq!(first.x, vec![Datum::from("AGO"), Datum::from("JAN")]);
        let xaxis = figure.layout.xaxis.unwrap();
        assert_eq!(xaxis.categoryarray.unwrap()[0], "AGO");
        assert!(
            figure
                .layout
                .title
                .unwrap()
                .text
                .ends_with(" - Estados: RR")
        );
    }
}
