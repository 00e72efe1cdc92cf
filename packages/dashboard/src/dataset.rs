//! Immutable in-memory alert dataset.

use sad_alert_models::AlertRecord;
use sad_dashboard_models::MonthRange;

use crate::DashboardError;

/// The dataset file's own header and cells, row-aligned with the parsed
/// records. Export writes these so columns the charts ignore survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    /// Column names in file order.
    pub columns: Vec<String>,
    /// Cell text, one row per kept record.
    pub rows: Vec<Vec<String>>,
}

/// All alert records of one dashboard plus the facets derived from them.
///
/// Built once at startup and never mutated, so it can be shared across
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct AlertDataset {
    records: Vec<AlertRecord>,
    /// Distinct years, ascending.
    years: Vec<i32>,
    /// Distinct states in first-seen order.
    states: Vec<String>,
    has_months: bool,
    has_land_use: bool,
    source: Option<SourceTable>,
}

impl AlertDataset {
    /// Wraps loaded records.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::EmptyDataset`] if `records` is empty.
    pub fn new(records: Vec<AlertRecord>) -> Result<Self, DashboardError> {
        if records.is_empty() {
            return Err(DashboardError::EmptyDataset);
        }

        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();

        let mut states: Vec<String> = Vec::new();
        for record in &records {
            if !states.contains(&record.state) {
                states.push(record.state.clone());
            }
        }

        let has_months = records.iter().any(|r| r.month.is_some());
        let has_land_use = records.iter().any(|r| r.land_use.is_some());

        Ok(Self {
            records,
            years,
            states,
            has_months,
            has_land_use,
            source: None,
        })
    }

    /// Wraps loaded records together with the file cells they came from.
    ///
    /// # Errors
    ///
    /// * [`DashboardError::EmptyDataset`] if `records` is empty.
    /// * [`DashboardError::Conversion`] if `source` does not have exactly
    ///   one row per record.
    pub fn with_source(
        records: Vec<AlertRecord>,
        source: SourceTable,
    ) -> Result<Self, DashboardError> {
        if source.rows.len() != records.len() {
            return Err(DashboardError::Conversion {
                message: format!(
                    "{} source rows for {} records",
                    source.rows.len(),
                    records.len()
                ),
            });
        }
        Ok(Self {
            source: Some(source),
            ..Self::new(records)?
        })
    }

    /// The file's own columns, when the loader kept them.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceTable> {
        self.source.as_ref()
    }

    /// All records in load order.
    #[must_use]
    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; an empty dataset cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Earliest year present.
    #[must_use]
    pub fn min_year(&self) -> i32 {
        self.years.first().copied().unwrap_or_default()
    }

    /// Latest year present; the default slider position.
    #[must_use]
    pub fn max_year(&self) -> i32 {
        self.years.last().copied().unwrap_or_default()
    }

    /// Whether any record falls in `year`.
    #[must_use]
    pub fn contains_year(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// Distinct state abbreviations in first-seen order.
    #[must_use]
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Whether records carry a month.
    #[must_use]
    pub const fn has_months(&self) -> bool {
        self.has_months
    }

    /// Whether records carry land use / jurisdiction attributes.
    #[must_use]
    pub const fn has_land_use(&self) -> bool {
        self.has_land_use
    }

    /// Records inside `period`. Without a period every record is yielded;
    /// with one, records lacking a month are excluded.
    pub fn records_in<'a>(
        &'a self,
        period: Option<&'a MonthRange>,
    ) -> impl Iterator<Item = &'a AlertRecord> + 'a {
        self.records.iter().filter(move |r| match period {
            None => true,
            Some(range) => r.month.is_some_and(|m| range.contains(r.year, m)),
        })
    }
}
