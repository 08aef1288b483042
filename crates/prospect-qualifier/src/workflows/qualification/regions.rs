use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::sources::{self, SourceError};

/// Country code whose subdivisions get their own canonical identifiers.
pub const SUBDIVIDED_COUNTRY: &str = "US";

/// Canonical identifier for a location: the country code, or `US-<state>` for a US state.
///
/// Returns `None` when the country is missing or empty, since such a location cannot be
/// canonicalized. Matching downstream is exact, so no case or whitespace folding happens
/// here either.
pub fn canonical_location(country: Option<&str>, subdivision: Option<&str>) -> Option<String> {
    let country = country.filter(|value| !value.is_empty())?;

    match subdivision {
        Some(subdivision) if country == SUBDIVIDED_COUNTRY && !subdivision.is_empty() => {
            Some(format!("{SUBDIVIDED_COUNTRY}-{subdivision}"))
        }
        _ => Some(country.to_string()),
    }
}

fn is_us_subdivision(country: &str, subdivision: Option<&str>) -> bool {
    country == SUBDIVIDED_COUNTRY && subdivision.is_some_and(|value| !value.is_empty())
}

/// Read-only lookup from canonical location identifier to the regions it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionMap {
    entries: HashMap<String, Vec<String>>,
}

impl RegionMap {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        sources::read_json(path.as_ref())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        sources::parse_json(reader, "<reader>")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Regions recorded under exactly this key, without any country-level union.
    pub fn entry(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every region label a location belongs to.
    ///
    /// A US state resolves to its own entry followed by the `US` entry; duplicates across
    /// the two are kept. Unknown or missing locations resolve to an empty list.
    pub fn regions_for(&self, country: Option<&str>, subdivision: Option<&str>) -> Vec<&str> {
        let Some(location) = canonical_location(country, subdivision) else {
            return Vec::new();
        };

        let mut regions: Vec<&str> = self.entry(&location).iter().map(String::as_str).collect();

        if country.is_some_and(|country| is_us_subdivision(country, subdivision)) {
            regions.extend(self.entry(SUBDIVIDED_COUNTRY).iter().map(String::as_str));
        }

        regions
    }
}

impl<K, V> FromIterator<(K, V)> for RegionMap
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, regions)| {
                (
                    key.into(),
                    regions.into_iter().map(Into::into).collect::<Vec<String>>(),
                )
            })
            .collect();
        Self { entries }
    }
}
