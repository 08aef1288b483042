use serde::{Deserialize, Serialize};

use super::super::preferences::ALL_LOCATIONS;
use super::rules::{first_match, RuleSet};

/// Why a prospect did or did not qualify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualificationReason {
    /// The prospect has no country, so it cannot be located.
    MissingCountry,
    /// The location or one of its regions is excluded; this beats any inclusion.
    Excluded { rule: String },
    /// The include list carries the `All` sentinel and nothing excluded the location.
    IncludedByAll,
    /// The location or one of its regions is included and nothing excluded it.
    Included { rule: String },
    /// Neither the location nor its regions are included.
    NotIncluded,
    /// The user has no preferences on record; qualified by default without evaluation.
    NoPreferences,
}

impl QualificationReason {
    pub fn summary(&self) -> String {
        match self {
            QualificationReason::MissingCountry => "not qualified: missing country".to_string(),
            QualificationReason::Excluded { rule } => format!("not qualified: excluded by {rule}"),
            QualificationReason::IncludedByAll => {
                format!("qualified: include list contains {ALL_LOCATIONS}")
            }
            QualificationReason::Included { rule } => format!("qualified: included by {rule}"),
            QualificationReason::NotIncluded => {
                "not qualified: no include rule matched".to_string()
            }
            QualificationReason::NoPreferences => {
                "qualified: no location preferences on record".to_string()
            }
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(
            self,
            QualificationReason::IncludedByAll
                | QualificationReason::Included { .. }
                | QualificationReason::NoPreferences
        )
    }
}

/// Verdict for an already canonicalized location.
pub(crate) fn is_admitted<I, E>(
    location: &str,
    regions: &[&str],
    include: &I,
    exclude: &E,
) -> bool
where
    I: RuleSet + ?Sized,
    E: RuleSet + ?Sized,
{
    let included = include.contains_rule(ALL_LOCATIONS)
        || first_match(location, regions, include).is_some();
    let excluded = first_match(location, regions, exclude).is_some();

    included && !excluded
}

/// Same verdict as [`is_admitted`], naming the rule that decided it.
pub(crate) fn decide<I, E>(
    location: &str,
    regions: &[&str],
    include: &I,
    exclude: &E,
) -> QualificationReason
where
    I: RuleSet + ?Sized,
    E: RuleSet + ?Sized,
{
    if let Some(rule) = first_match(location, regions, exclude) {
        return QualificationReason::Excluded {
            rule: rule.to_string(),
        };
    }

    if include.contains_rule(ALL_LOCATIONS) {
        return QualificationReason::IncludedByAll;
    }

    match first_match(location, regions, include) {
        Some(rule) => QualificationReason::Included {
            rule: rule.to_string(),
        },
        None => QualificationReason::NotIncluded,
    }
}
