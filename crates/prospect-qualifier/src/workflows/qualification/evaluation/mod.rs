mod policy;
mod rules;

pub use policy::QualificationReason;
pub use rules::RuleSet;

use super::preferences::LocationPreference;
use super::regions::{canonical_location, RegionMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stateless evaluator applying include/exclude rules over a shared region map.
///
/// The engine never fails: missing countries, unknown locations, and empty rule lists all
/// resolve to a verdict. It holds no mutable state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct QualificationEngine {
    regions: Arc<RegionMap>,
}

impl QualificationEngine {
    pub fn new(regions: Arc<RegionMap>) -> Self {
        Self { regions }
    }

    pub fn regions_for(&self, country: Option<&str>, subdivision: Option<&str>) -> Vec<&str> {
        self.regions.regions_for(country, subdivision)
    }

    /// Whether a prospect at `country`/`subdivision` qualifies.
    ///
    /// Exclusion of the location or any of its regions always wins, including over the
    /// `All` include sentinel.
    pub fn is_qualified<I, E>(
        &self,
        country: Option<&str>,
        subdivision: Option<&str>,
        include: &I,
        exclude: &E,
    ) -> bool
    where
        I: RuleSet + ?Sized,
        E: RuleSet + ?Sized,
    {
        let Some(location) = canonical_location(country, subdivision) else {
            return false;
        };
        let regions = self.regions.regions_for(country, subdivision);

        policy::is_admitted(&location, &regions, include, exclude)
    }

    /// [`Self::is_qualified`] with the matching rule and resolved regions attached.
    pub fn explain<I, E>(
        &self,
        country: Option<&str>,
        subdivision: Option<&str>,
        include: &I,
        exclude: &E,
    ) -> QualificationOutcome
    where
        I: RuleSet + ?Sized,
        E: RuleSet + ?Sized,
    {
        let Some(location) = canonical_location(country, subdivision) else {
            return QualificationOutcome::from_reason(
                None,
                Vec::new(),
                QualificationReason::MissingCountry,
            );
        };
        let regions = self.regions.regions_for(country, subdivision);
        let reason = policy::decide(&location, &regions, include, exclude);
        let regions = regions.into_iter().map(str::to_string).collect();

        QualificationOutcome::from_reason(Some(location), regions, reason)
    }

    pub fn is_qualified_for(
        &self,
        country: Option<&str>,
        subdivision: Option<&str>,
        preference: &LocationPreference,
    ) -> bool {
        self.is_qualified(country, subdivision, &preference.include, &preference.exclude)
    }

    pub fn explain_for(
        &self,
        country: Option<&str>,
        subdivision: Option<&str>,
        preference: &LocationPreference,
    ) -> QualificationOutcome {
        self.explain(country, subdivision, &preference.include, &preference.exclude)
    }
}

/// Verdict plus the trail that produced it, for audits and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationOutcome {
    pub location: Option<String>,
    pub regions: Vec<String>,
    pub qualified: bool,
    pub reason: QualificationReason,
}

impl QualificationOutcome {
    pub(crate) fn from_reason(
        location: Option<String>,
        regions: Vec<String>,
        reason: QualificationReason,
    ) -> Self {
        Self {
            location,
            regions,
            qualified: reason.is_qualified(),
            reason,
        }
    }

    pub fn summary(&self) -> String {
        match &self.location {
            Some(location) => format!("{location}: {}", self.reason.summary()),
            None => self.reason.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const NONE: [&str; 0] = [];

    fn engine(entries: Vec<(&str, Vec<&str>)>) -> QualificationEngine {
        QualificationEngine::new(Arc::new(RegionMap::from_iter(entries)))
    }

    fn coastal() -> QualificationEngine {
        engine(vec![("US-CA", vec!["West Coast"]), ("US", vec!["North America"])])
    }

    fn continental() -> QualificationEngine {
        engine(vec![("UK", vec!["Europe"]), ("NG", vec!["Africa"])])
    }

    #[test]
    fn state_qualifies_through_country_region() {
        let engine = coastal();
        assert!(engine.is_qualified(Some("US"), Some("CA"), &["North America"], &NONE));
    }

    #[test]
    fn excluded_state_beats_country_region_inclusion() {
        let engine = coastal();
        assert!(!engine.is_qualified(Some("US"), Some("CA"), &["North America"], &["US-CA"]));
    }

    #[test]
    fn all_sentinel_admits_unexcluded_country() {
        let engine = continental();
        assert!(engine.is_qualified(Some("UK"), None, &["All"], &["Africa"]));
    }

    #[test]
    fn excluded_region_beats_all_sentinel() {
        let engine = continental();
        assert!(!engine.is_qualified(Some("NG"), None, &["All"], &["Africa"]));
    }

    #[test]
    fn empty_or_missing_country_never_qualifies() {
        let engine = coastal();
        assert!(!engine.is_qualified(Some(""), Some("CA"), &["US-CA"], &NONE));
        assert!(!engine.is_qualified(None, Some("CA"), &["All"], &NONE));
        assert!(!engine.is_qualified(None, None, &["All"], &NONE));
    }

    #[test]
    fn unknown_location_qualifies_with_all_sentinel() {
        let engine = continental();
        assert!(engine.is_qualified(Some("XYZ"), None, &["All"], &NONE));
    }

    #[test]
    fn unknown_location_is_excluded_by_literal_identifier() {
        let engine = continental();
        assert!(!engine.is_qualified(Some("XYZ"), None, &["All"], &["XYZ"]));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let engine = coastal();
        assert!(!engine.is_qualified(Some("us"), Some("ca"), &["US-CA"], &NONE));
        assert!(!engine.is_qualified(Some("US"), Some("CA"), &["north america"], &NONE));
        assert!(engine.is_qualified(Some("US"), Some("CA"), &["All"], &["us-ca"]));
    }

    #[test]
    fn direct_inclusion_loses_to_region_exclusion() {
        let engine = coastal();
        assert!(!engine.is_qualified(Some("US"), Some("CA"), &["US-CA"], &["North America"]));
    }

    #[test]
    fn empty_include_list_admits_nothing() {
        let engine = coastal();
        assert!(!engine.is_qualified(Some("US"), Some("CA"), &NONE, &NONE));
    }

    #[test]
    fn all_sentinel_only_applies_to_include_list() {
        let engine = engine(vec![("FR", vec!["All"])]);
        assert!(!engine.is_qualified(Some("DE"), None, &NONE, &["All"]));
        assert!(!engine.is_qualified(Some("FR"), None, &NONE, &["All"]));
        assert!(engine.is_qualified(Some("FR"), None, &["All"], &NONE));
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let engine = coastal();
        let include: HashSet<String> = ["West Coast".to_string()].into_iter().collect();
        let exclude: HashSet<String> = HashSet::new();
        let first = engine.is_qualified(Some("US"), Some("CA"), &include, &exclude);
        for _ in 0..10 {
            assert_eq!(
                engine.is_qualified(Some("US"), Some("CA"), &include, &exclude),
                first
            );
        }
        assert!(first);
    }

    #[test]
    fn explain_names_the_deciding_rule() {
        let engine = coastal();

        let outcome = engine.explain(Some("US"), Some("CA"), &["North America"], &NONE);
        assert!(outcome.qualified);
        assert_eq!(outcome.location.as_deref(), Some("US-CA"));
        assert_eq!(outcome.regions, vec!["West Coast", "North America"]);
        assert_eq!(
            outcome.reason,
            QualificationReason::Included {
                rule: "North America".to_string()
            }
        );

        let outcome = engine.explain(Some("US"), Some("CA"), &["All"], &["West Coast"]);
        assert!(!outcome.qualified);
        assert_eq!(
            outcome.reason,
            QualificationReason::Excluded {
                rule: "West Coast".to_string()
            }
        );
        assert_eq!(outcome.summary(), "US-CA: not qualified: excluded by West Coast");

        let outcome = engine.explain(None, None, &["All"], &NONE);
        assert_eq!(outcome.reason, QualificationReason::MissingCountry);
        assert!(outcome.location.is_none());
    }

    #[test]
    fn explain_agrees_with_is_qualified() {
        let engine = engine(vec![
            ("US", vec!["North America"]),
            ("US-NY", vec!["East Coast"]),
            ("JP", vec!["Asia", "Japan"]),
            ("FR", vec!["Europe", "European Union"]),
        ]);
        let locations: [(Option<&str>, Option<&str>); 6] = [
            (Some("US"), Some("NY")),
            (Some("US"), None),
            (Some("JP"), None),
            (Some("FR"), Some("IDF")),
            (Some("XYZ"), None),
            (None, None),
        ];
        let rule_sets: [&[&str]; 5] = [
            &[],
            &["All"],
            &["North America", "Asia"],
            &["Japan", "US-NY"],
            &["European Union"],
        ];

        for (country, subdivision) in locations {
            for include in rule_sets {
                for exclude in rule_sets {
                    let verdict = engine.is_qualified(country, subdivision, include, exclude);
                    let outcome = engine.explain(country, subdivision, include, exclude);
                    assert_eq!(
                        verdict, outcome.qualified,
                        "{country:?}/{subdivision:?} include={include:?} exclude={exclude:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn preference_helpers_use_loaded_sets() {
        let engine = continental();
        let preference = LocationPreference::new(["Europe"], ["Africa"]);
        assert!(engine.is_qualified_for(Some("UK"), None, &preference));
        assert!(!engine.is_qualified_for(Some("NG"), None, &preference));
        assert_eq!(
            engine.explain_for(Some("NG"), None, &preference).reason,
            QualificationReason::Excluded {
                rule: "Africa".to_string()
            }
        );
    }
}
