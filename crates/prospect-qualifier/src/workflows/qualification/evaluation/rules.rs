use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

/// Membership test over a user's include or exclude rules.
///
/// Implemented for sets (constant-time lookups for loaded preferences) and for slices,
/// arrays, and vectors so callers can pass ad-hoc lists. Matching is exact.
pub trait RuleSet {
    fn contains_rule(&self, value: &str) -> bool;
}

impl<S: BuildHasher> RuleSet for HashSet<String, S> {
    fn contains_rule(&self, value: &str) -> bool {
        self.contains(value)
    }
}

impl RuleSet for BTreeSet<String> {
    fn contains_rule(&self, value: &str) -> bool {
        self.contains(value)
    }
}

impl<T: AsRef<str>> RuleSet for [T] {
    fn contains_rule(&self, value: &str) -> bool {
        self.iter().any(|rule| rule.as_ref() == value)
    }
}

impl<T: AsRef<str>, const N: usize> RuleSet for [T; N] {
    fn contains_rule(&self, value: &str) -> bool {
        self.as_slice().contains_rule(value)
    }
}

impl<T: AsRef<str>> RuleSet for Vec<T> {
    fn contains_rule(&self, value: &str) -> bool {
        self.as_slice().contains_rule(value)
    }
}

/// First identifier that appears in `rules`: the location itself, then its regions in
/// resolver order.
pub(crate) fn first_match<'a, S>(
    location: &'a str,
    regions: &[&'a str],
    rules: &S,
) -> Option<&'a str>
where
    S: RuleSet + ?Sized,
{
    std::iter::once(location)
        .chain(regions.iter().copied())
        .find(|candidate| rules.contains_rule(candidate))
}
