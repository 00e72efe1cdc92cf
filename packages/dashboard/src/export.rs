//! CSV download.

use csv::{QuoteStyle, WriterBuilder};
use sad_alert_models::{
    AREA_COLUMN, AlertRecord, JURISDICTION_COLUMN, LAND_USE_COLUMN, MONTH_COLUMN, STATE_COLUMN,
    YEAR_COLUMN,
};
use sad_dashboard_models::{DashboardDescriptor, ExportOptions};

use crate::{
    DashboardError,
    dataset::{AlertDataset, SourceTable},
};

/// A rendered CSV file ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested download filename.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Number of data rows (header excluded).
    pub rows: usize,
}

fn text(value: &str, strip_accents: bool) -> String {
    if strip_accents {
        deunicode::deunicode(value)
    } else {
        value.to_string()
    }
}

/// Serializes the records matching `options` as CSV.
///
/// A record is exported when its state is in `options.states` (an empty
/// list exports nothing) and, if `options.regions` is non-empty, its region
/// is in that list too. Cells containing the chosen delimiter are quoted.
///
/// When the dataset kept its file cells, the file's own columns are
/// written. Otherwise the columns are rebuilt from the parsed records.
///
/// # Errors
///
/// Returns [`DashboardError::Csv`] or [`DashboardError::Io`] if writing
/// fails.
pub fn export_csv(
    dataset: &AlertDataset,
    descriptor: &DashboardDescriptor,
    options: &ExportOptions,
) -> Result<CsvExport, DashboardError> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.separator.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let selected = |r: &AlertRecord| {
        options.states.contains(&r.state)
            && (options.regions.is_empty() || options.regions.contains(&r.region))
    };

    let rows = match dataset.source() {
        Some(source) => write_source(&mut writer, dataset, source, selected, options)?,
        None => write_records(&mut writer, dataset, descriptor, selected, options)?,
    };

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))?;

    log::info!(
        "export {}: {rows} rows, {} bytes, separator {:?}",
        descriptor.id,
        bytes.len(),
        options.separator
    );

    Ok(CsvExport {
        filename: descriptor.export_filename.clone(),
        bytes,
        rows,
    })
}

type CsvWriter = csv::Writer<Vec<u8>>;

fn write_source(
    writer: &mut CsvWriter,
    dataset: &AlertDataset,
    source: &SourceTable,
    selected: impl Fn(&AlertRecord) -> bool,
    options: &ExportOptions,
) -> Result<usize, DashboardError> {
    writer.write_record(&source.columns)?;

    let mut rows = 0;
    for (record, cells) in dataset.records().iter().zip(&source.rows) {
        if !selected(record) {
            continue;
        }
        writer.write_record(cells.iter().map(|c| text(c, options.strip_accents)))?;
        rows += 1;
    }
    Ok(rows)
}

fn write_records(
    writer: &mut CsvWriter,
    dataset: &AlertDataset,
    descriptor: &DashboardDescriptor,
    selected: impl Fn(&AlertRecord) -> bool,
    options: &ExportOptions,
) -> Result<usize, DashboardError> {
    let region_column = descriptor.region_column();
    let with_region = region_column != STATE_COLUMN;
    let with_month = dataset.has_months();
    let with_land_use = dataset.has_land_use();

    let mut header = Vec::new();
    if with_region {
        header.push(region_column);
    }
    header.extend([STATE_COLUMN, YEAR_COLUMN]);
    if with_month {
        header.push(MONTH_COLUMN);
    }
    header.push(AREA_COLUMN);
    if with_land_use {
        header.extend([LAND_USE_COLUMN, JURISDICTION_COLUMN]);
    }
    writer.write_record(&header)?;

    let mut rows = 0;
    for record in dataset.records().iter().filter(|r| selected(*r)) {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        if with_region {
            row.push(text(&record.region, options.strip_accents));
        }
        row.push(text(&record.state, options.strip_accents));
        row.push(record.year.to_string());
        if with_month {
            row.push(record.month.map(|m| m.to_string()).unwrap_or_default());
        }
        // Debug keeps the trailing `.0` on whole numbers.
        row.push(format!("{:?}", record.area_km2));
        if with_land_use {
            for value in [&record.land_use, &record.jurisdiction] {
                row.push(
                    value
                        .as_deref()
                        .map(|v| text(v, options.strip_accents))
                        .unwrap_or_default(),
                );
            }
        }
        writer.write_record(&row)?;
        rows += 1;
    }
    Ok(rows)
}
