//! Simplified administrative boundary geometry for the choropleth.

use std::collections::{BTreeSet, HashSet};

use geojson::{FeatureCollection, GeoJson};

use crate::DashboardError;

/// A parsed boundary `FeatureCollection` and the property that carries each
/// feature's region name.
#[derive(Debug, Clone)]
pub struct Boundaries {
    collection: FeatureCollection,
    property: String,
    /// Serialized once at load; attached to every choropleth figure.
    json: serde_json::Value,
}

impl Boundaries {
    /// Parses a `GeoJSON` document whose features name their region in
    /// `property`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::GeoJson`] if the document is not valid
    /// `GeoJSON`, or [`DashboardError::Conversion`] if it is not a
    /// `FeatureCollection`.
    pub fn parse(text: &str, property: &str) -> Result<Self, DashboardError> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc,
            other => {
                return Err(DashboardError::Conversion {
                    message: format!(
                        "expected a FeatureCollection, found {}",
                        geojson_type_name(&other)
                    ),
                });
            }
        };

        let json = serde_json::to_value(&collection)?;

        Ok(Self {
            collection,
            property: property.to_string(),
            json,
        })
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    /// Whether the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    /// Region names of all features that carry the id property as a string.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&str> {
        self.collection
            .features
            .iter()
            .filter_map(|f| f.property(&self.property))
            .filter_map(serde_json::Value::as_str)
            .collect()
    }

    /// Distinct `regions` that no feature carries, sorted.
    pub fn unmatched<'a>(&self, regions: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
        let names: HashSet<&str> = self.feature_names().into_iter().collect();
        regions
            .into_iter()
            .filter(|region| !names.contains(*region))
            .collect()
    }

    /// Name of the property joined against region names.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The collection as JSON.
    #[must_use]
    pub const fn as_json(&self) -> &serde_json::Value {
        &self.json
    }
}

const fn geojson_type_name(geojson: &GeoJson) -> &'static str {
    match geojson {
        GeoJson::Geometry(_) => "Geometry",
        GeoJson::Feature(_) => "Feature",
        GeoJson::FeatureCollection(_) => "FeatureCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Estado": "PA" },
                "geometry": { "type": "Point", "coordinates": [-52.0, -4.0] }
            },
            {
                "type": "Feature",
                "properties": { "Estado": "AC" },
                "geometry": { "type": "Point", "coordinates": [-70.0, -9.0] }
            },
            {
                "type": "Feature",
                "properties": { "Other": 1 },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn reads_feature_names_from_property() {
        let boundaries = Boundaries::parse(STATES, "Estado").unwrap();
        assert_eq!(boundaries.len(), 3);
        assert_eq!(boundaries.property(), "Estado");
        assert_eq!(boundaries.feature_names(), vec!["PA", "AC"]);
        assert_eq!(boundaries.as_json()["type"], "FeatureCollection");
    }

    #[test]
    fn reports_regions_without_features() {
        let boundaries = Boundaries::parse(STATES, "Estado").unwrap();
        let unmatched = boundaries.unmatched(["PA", "MT", "AC", "MT", "AM"]);
        assert_eq!(unmatched.into_iter().collect::<Vec<_>>(), vec!["AM", "MT"]);
    }

    #[test]
    fn rejects_bare_geometry() {
        let err = Boundaries::parse(r#"{"type":"Point","coordinates":[0.0,0.0]}"#, "Estado")
            .unwrap_err();
        assert!(matches!(err, DashboardError::Conversion { .. }), "{err}");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Boundaries::parse("not json", "Estado").is_err());
    }
}
