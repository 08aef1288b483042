use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use super::sources::{self, SourceError};

/// Include-list value that admits every location not explicitly excluded.
pub const ALL_LOCATIONS: &str = "All";

/// One user's include/exclude rules. Entries are canonical location identifiers or region
/// labels, matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPreference {
    #[serde(
        rename = "location_include",
        alias = "include",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub include: HashSet<String>,
    #[serde(
        rename = "location_exclude",
        alias = "exclude",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub exclude: HashSet<String>,
}

impl LocationPreference {
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    pub fn includes_all(&self) -> bool {
        self.include.contains(ALL_LOCATIONS)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<HashSet<String>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Preferences keyed by user id, loaded once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceBook {
    users: HashMap<String, LocationPreference>,
}

impl PreferenceBook {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        sources::read_json(path.as_ref())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        sources::parse_json(reader, "<reader>")
    }

    pub fn get(&self, user_id: &str) -> Option<&LocationPreference> {
        self.users.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, LocationPreference)> for PreferenceBook {
    fn from_iter<T: IntoIterator<Item = (K, LocationPreference)>>(iter: T) -> Self {
        Self {
            users: iter
                .into_iter()
                .map(|(user_id, preference)| (user_id.into(), preference))
                .collect(),
        }
    }
}
