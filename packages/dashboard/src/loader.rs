//! Startup loading of alert datasets and boundary files.
//!
//! Both files are fetched once over HTTP. A dataset that fails to load is
//! an error; a boundary file that fails to load is logged and replaced with
//! `None` so the dashboard still serves its charts.

use std::path::Path;

use sad_alert_models::{
    AREA_COLUMN, AlertRecord, JURISDICTION_COLUMN, LAND_USE_COLUMN, MONTH_COLUMN, STATE_COLUMN,
    YEAR_COLUMN,
};
use sad_dashboard_models::{DashboardDescriptor, DatasetFormat};

use crate::{
    DashboardError, LoadedDashboard,
    boundaries::Boundaries,
    dataset::{AlertDataset, SourceTable},
};

/// Validated records plus the file cells of each kept row.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    /// Records with every grouping key present.
    pub records: Vec<AlertRecord>,
    /// Header and cells, aligned with `records`.
    pub source: SourceTable,
}

impl ParsedRows {
    fn push(&mut self, record: AlertRecord, cells: Vec<String>) {
        self.records.push(record);
        self.source.rows.push(cells);
    }
}

/// One row as read from a file, before validation.
#[derive(Debug, Default)]
struct RawRecord {
    region: Option<String>,
    state: Option<String>,
    year: Option<i32>,
    month: Option<i32>,
    area_km2: Option<f64>,
    land_use: Option<String>,
    jurisdiction: Option<String>,
}

impl RawRecord {
    /// Validates the row. Rows missing a grouping key or the area are
    /// skipped (`Ok(None)`), matching how group-by drops null keys.
    fn into_record(self, row: usize) -> Result<Option<AlertRecord>, DashboardError> {
        let (Some(region), Some(state), Some(year), Some(area_km2)) =
            (self.region, self.state, self.year, self.area_km2)
        else {
            return Ok(None);
        };

        let month = self
            .month
            .map(|m| {
                u8::try_from(m)
                    .ok()
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| DashboardError::Parse {
                        row,
                        message: format!("month {m} out of range"),
                    })
            })
            .transpose()?;

        Ok(Some(AlertRecord {
            region,
            state,
            year,
            month,
            area_km2,
            land_use: self.land_use,
            jurisdiction: self.jurisdiction,
        }))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Parses an integer cell, accepting a float rendering such as `2024.0`.
fn parse_int(value: &str, column: &str, row: usize) -> Result<Option<i32>, DashboardError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    let digits = value.strip_suffix(".0").unwrap_or(value);
    digits
        .parse::<i32>()
        .map(Some)
        .map_err(|e| DashboardError::Parse {
            row,
            message: format!("{column} '{value}': {e}"),
        })
}

fn parse_float(value: &str, column: &str, row: usize) -> Result<Option<f64>, DashboardError> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|e| DashboardError::Parse {
            row,
            message: format!("{column} '{value}': {e}"),
        })
}

fn required(headers: &csv::StringRecord, column: &str) -> Result<usize, DashboardError> {
    optional(headers, column).ok_or_else(|| DashboardError::MissingColumn {
        column: column.to_string(),
    })
}

fn optional(headers: &csv::StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == column)
}

/// Parses a CSV alert dataset with a header row.
///
/// # Errors
///
/// * [`DashboardError::MissingColumn`] if the region, state, year or area
///   column is absent.
/// * [`DashboardError::Parse`] if a non-empty cell cannot be parsed.
/// * [`DashboardError::Csv`] if the CSV is malformed.
pub fn parse_csv(bytes: &[u8], region_column: &str) -> Result<ParsedRows, DashboardError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let region_idx = required(&headers, region_column)?;
    let state_idx = required(&headers, STATE_COLUMN)?;
    let year_idx = required(&headers, YEAR_COLUMN)?;
    let area_idx = required(&headers, AREA_COLUMN)?;
    let month_idx = optional(&headers, MONTH_COLUMN);
    let land_use_idx = optional(&headers, LAND_USE_COLUMN);
    let jurisdiction_idx = optional(&headers, JURISDICTION_COLUMN);

    let mut parsed = ParsedRows {
        source: SourceTable {
            columns: headers.iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        },
        ..ParsedRows::default()
    };
    let mut skipped = 0_usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let cells = result?;
        let cell = |idx: usize| cells.get(idx).unwrap_or_default();
        let text = |idx: Option<usize>| idx.map(cell).and_then(non_empty).map(str::to_string);

        let raw = RawRecord {
            region: text(Some(region_idx)),
            state: text(Some(state_idx)),
            year: parse_int(cell(year_idx), YEAR_COLUMN, row)?,
            month: month_idx
                .map(|idx| parse_int(cell(idx), MONTH_COLUMN, row))
                .transpose()?
                .flatten(),
            area_km2: parse_float(cell(area_idx), AREA_COLUMN, row)?,
            land_use: text(land_use_idx),
            jurisdiction: text(jurisdiction_idx),
        };

        match raw.into_record(row)? {
            Some(record) => {
                let cells = (0..headers.len()).map(|idx| cell(idx).to_string()).collect();
                parsed.push(record, cells);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} CSV rows with empty key or area cells");
    }

    Ok(parsed)
}

fn quote_ident(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

/// Builds the `DuckDB` query that reads a parquet dataset into the fixed
/// column order expected by [`parse_parquet`].
///
/// The seven typed columns come first; optional ones absent from
/// `available` are selected as `NULL`. Every available column follows as
/// text, in file order, for export.
///
/// # Errors
///
/// Returns [`DashboardError::MissingColumn`] if a required column is not in
/// `available`.
pub fn parquet_select_sql(
    path: &str,
    available: &[String],
    region_column: &str,
) -> Result<String, DashboardError> {
    let has = |column: &str| available.iter().any(|c| c == column);

    let mut select = Vec::new();
    for (column, sql_type, is_required) in [
        (region_column, "VARCHAR", true),
        (STATE_COLUMN, "VARCHAR", true),
        (YEAR_COLUMN, "INTEGER", true),
        (MONTH_COLUMN, "INTEGER", false),
        (AREA_COLUMN, "DOUBLE", true),
        (LAND_USE_COLUMN, "VARCHAR", false),
        (JURISDICTION_COLUMN, "VARCHAR", false),
    ] {
        if has(column) {
            select.push(format!("CAST({} AS {sql_type})", quote_ident(column)));
        } else if is_required {
            return Err(DashboardError::MissingColumn {
                column: column.to_string(),
            });
        } else {
            select.push(format!("CAST(NULL AS {sql_type})"));
        }
    }

    select.extend(
        available
            .iter()
            .map(|column| format!("CAST({} AS VARCHAR)", quote_ident(column))),
    );

    Ok(format!(
        "SELECT {} FROM read_parquet('{}')",
        select.join(", "),
        path.replace('\'', "''")
    ))
}

/// Reads a parquet dataset through an in-memory `DuckDB` connection.
///
/// The bytes are spilled to a uniquely named temporary file, which is
/// removed afterwards.
///
/// # Errors
///
/// * [`DashboardError::Io`] if the temporary file cannot be written.
/// * [`DashboardError::Duckdb`] if the parquet file cannot be read.
/// * [`DashboardError::MissingColumn`] if a required column is absent.
pub fn parse_parquet(bytes: &[u8], region_column: &str) -> Result<ParsedRows, DashboardError> {
    let path =
        std::env::temp_dir().join(format!("sad-dataset-{}.parquet", uuid::Uuid::new_v4()));
    std::fs::write(&path, bytes)?;

    let result = read_parquet_file(&path, region_column);

    if let Err(e) = std::fs::remove_file(&path) {
        log::warn!("Failed to remove {}: {e}", path.display());
    }

    result
}

/// Index of the first text column after the typed ones.
const TYPED_COLUMNS: usize = 7;

fn read_parquet_file(path: &Path, region_column: &str) -> Result<ParsedRows, DashboardError> {
    let path = path.to_string_lossy();
    let conn = duckdb::Connection::open_in_memory()?;

    let available: Vec<String> = {
        let mut stmt = conn.prepare(&format!(
            "SELECT column_name FROM (DESCRIBE SELECT * FROM read_parquet('{}'))",
            path.replace('\'', "''")
        ))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        names
    };
    log::debug!("Parquet columns: {available:?}");

    let sql = parquet_select_sql(&path, &available, region_column)?;
    let mut stmt = conn.prepare(&sql)?;
    let raws: Vec<(RawRecord, Vec<String>)> = stmt
        .query_map([], |row| {
            let raw = RawRecord {
                region: row.get(0)?,
                state: row.get(1)?,
                year: row.get(2)?,
                month: row.get(3)?,
                area_km2: row.get(4)?,
                land_use: row.get(5)?,
                jurisdiction: row.get(6)?,
            };
            let cells: Vec<String> = (0..available.len())
                .map(|j| {
                    row.get::<_, Option<String>>(TYPED_COLUMNS + j)
                        .map(Option::unwrap_or_default)
                })
                .collect::<Result<_, _>>()?;
            Ok((raw, cells))
        })?
        .collect::<Result<_, _>>()?;

    let total = raws.len();
    let mut parsed = ParsedRows {
        source: SourceTable {
            columns: available,
            rows: Vec::with_capacity(total),
        },
        ..ParsedRows::default()
    };
    for (i, (raw, cells)) in raws.into_iter().enumerate() {
        if let Some(record) = raw.into_record(i + 1)? {
            parsed.push(record, cells);
        }
    }
    if parsed.records.len() < total {
        log::warn!(
            "Skipped {} parquet rows with null key or area values",
            total - parsed.records.len()
        );
    }

    Ok(parsed)
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, DashboardError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Downloads and parses the descriptor's alert dataset.
///
/// # Errors
///
/// Returns any fetch or parse error, or [`DashboardError::EmptyDataset`]
/// if no usable rows remain.
pub async fn fetch_dataset(
    client: &reqwest::Client,
    descriptor: &DashboardDescriptor,
) -> Result<AlertDataset, DashboardError> {
    let source = &descriptor.dataset;
    log::info!("{}: fetching dataset {}", descriptor.id, source.url);

    let bytes = fetch_bytes(client, &source.url).await?;
    let parsed = match source.format {
        DatasetFormat::Csv => parse_csv(&bytes, descriptor.region_column())?,
        DatasetFormat::Parquet => parse_parquet(&bytes, descriptor.region_column())?,
    };

    log::info!(
        "{}: loaded {} alert records",
        descriptor.id,
        parsed.records.len()
    );
    AlertDataset::with_source(parsed.records, parsed.source)
}

/// Downloads and parses the descriptor's boundary file.
///
/// Failures are logged and yield `None`.
pub async fn fetch_boundaries(
    client: &reqwest::Client,
    descriptor: &DashboardDescriptor,
) -> Option<Boundaries> {
    let source = &descriptor.boundaries;
    log::info!("{}: fetching boundaries {}", descriptor.id, source.url);

    let result = async {
        let bytes = fetch_bytes(client, &source.url).await?;
        let text = String::from_utf8(bytes).map_err(|e| DashboardError::Conversion {
            message: format!("boundary file is not UTF-8: {e}"),
        })?;
        Boundaries::parse(&text, source.property_name())
    }
    .await;

    match result {
        Ok(boundaries) => {
            log::info!(
                "{}: loaded {} boundary features",
                descriptor.id,
                boundaries.len()
            );
            Some(boundaries)
        }
        Err(e) => {
            log::error!("{}: failed to load boundaries: {e}", descriptor.id);
            None
        }
    }
}

/// Loads the dataset and boundary file of one dashboard concurrently.
///
/// # Errors
///
/// Returns the dataset error if the dataset fails to load. Boundary
/// failures are not errors.
pub async fn load_dashboard(
    client: &reqwest::Client,
    descriptor: DashboardDescriptor,
) -> Result<LoadedDashboard, DashboardError> {
    let (dataset, boundaries) = futures::join!(
        fetch_dataset(client, &descriptor),
        fetch_boundaries(client, &descriptor)
    );
    let dataset = dataset?;
    if let Some(boundaries) = &boundaries {
        warn_unmatched(&descriptor, &dataset, boundaries);
    }
    Ok(LoadedDashboard::new(descriptor, dataset, boundaries))
}

/// Number of unmatched region names spelled out in the warning.
const UNMATCHED_SAMPLE: usize = 10;

/// Logs regions that will not be drawn because no boundary feature has
/// their name.
fn warn_unmatched(
    descriptor: &DashboardDescriptor,
    dataset: &AlertDataset,
    boundaries: &Boundaries,
) {
    let unmatched = boundaries.unmatched(dataset.records().iter().map(|r| r.region.as_str()));
    if unmatched.is_empty() {
        return;
    }
    let sample: Vec<&str> = unmatched.iter().copied().take(UNMATCHED_SAMPLE).collect();
    log::warn!(
        "{}: {} regions have no boundary feature with a matching '{}' property, e.g. {sample:?}",
        descriptor.id,
        unmatched.len(),
        boundaries.property()
    );
}
