use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::Path;

use super::sources::{self, SourceError};

/// One prospect as exported in the prospects CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRow {
    pub user_id: String,
    pub prospect_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub company_country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub company_state: Option<String>,
}

impl ProspectRow {
    pub fn new(
        user_id: impl Into<String>,
        prospect_id: impl Into<String>,
        company_country: Option<&str>,
        company_state: Option<&str>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            prospect_id: prospect_id.into(),
            company_country: company_country.map(str::to_string),
            company_state: company_state.map(str::to_string),
        }
    }

    pub fn country(&self) -> Option<&str> {
        self.company_country.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.company_state.as_deref()
    }
}

/// Reads [`ProspectRow`]s from CSV. Only headers are trimmed; cell values reach the
/// evaluator exactly as exported.
pub struct ProspectCsvReader;

impl ProspectCsvReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ProspectRow>, SourceError> {
        let file = sources::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ProspectRow>, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let mut rows = Vec::new();

        for record in csv_reader.deserialize::<ProspectRow>() {
            rows.push(record?);
        }

        Ok(rows)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.is_empty()))
}
