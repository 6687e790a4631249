//! Configuration management for `markclean-core`.
//!
//! This module defines the cleanup configuration carried by every profile: the
//! attribute and class allow-lists and the ordered tag-rename [`RuleSet`]. It also
//! owns the helpers that turn free-form user input into allow-list entries.
//!
//! License: MIT OR Apache-2.0

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::MarkcleanError;

lazy_static! {
    /// Characters rejected in allow-list and profile-name input.
    static ref INVALID_LIST_CHARS: Regex =
        Regex::new(r#"[ ~!@$%^&*()+=,./';:"?><\[\]\\{}|`#]"#).expect("valid regex pattern");
    /// Separators between entries typed on one line.
    static ref LIST_SEPARATORS: Regex = Regex::new(r"[, ]").expect("valid regex pattern");
}

/// A single tag-rename instruction: every element named `match_tag` becomes
/// `replace_tag`. An empty `match_tag` never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CleanupRule {
    #[serde(rename = "match", default)]
    pub match_tag: String,
    #[serde(rename = "replace", default)]
    pub replace_tag: String,
}

impl CleanupRule {
    pub fn new(match_tag: impl Into<String>, replace_tag: impl Into<String>) -> Self {
        Self { match_tag: match_tag.into(), replace_tag: replace_tag.into() }
    }

    /// The rule that does nothing; new profiles start with one of these.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.match_tag.trim().is_empty()
    }
}

impl fmt::Display for CleanupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.match_tag, self.replace_tag)
    }
}

/// Ordered list of [`CleanupRule`]s. Order is significant: rules are applied one
/// after another against the already-transformed tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<CleanupRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CleanupRule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanupRule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[CleanupRule] {
        &self.rules
    }

    pub fn append(&mut self, rule: CleanupRule) {
        debug!("Appending rule '{}' at index {}.", rule, self.rules.len());
        self.rules.push(rule);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<CleanupRule, MarkcleanError> {
        self.check_index(index)?;
        Ok(self.rules.remove(index))
    }

    /// Swaps the rule with its predecessor. Index 0 (or out of range) is a no-op.
    pub fn move_up(&mut self, index: usize) {
        if index == 0 || index >= self.rules.len() {
            return;
        }
        self.rules.swap(index - 1, index);
    }

    /// Swaps the rule with its successor. The last index (or out of range) is a no-op.
    pub fn move_down(&mut self, index: usize) {
        if index >= self.rules.len().saturating_sub(1) {
            return;
        }
        self.rules.swap(index, index + 1);
    }

    pub fn set_match(&mut self, index: usize, value: &str) -> Result<(), MarkcleanError> {
        self.check_index(index)?;
        self.rules[index].match_tag = value.to_string();
        Ok(())
    }

    pub fn set_replacement(&mut self, index: usize, value: &str) -> Result<(), MarkcleanError> {
        self.check_index(index)?;
        self.rules[index].replace_tag = value.to_string();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), MarkcleanError> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(MarkcleanError::RuleIndexOutOfRange { index, len: self.rules.len() })
        }
    }
}

impl From<Vec<CleanupRule>> for RuleSet {
    fn from(rules: Vec<CleanupRule>) -> Self {
        Self { rules }
    }
}

impl FromIterator<CleanupRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = CleanupRule>>(iter: I) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CleanupRule;
    type IntoIter = std::slice::Iter<'a, CleanupRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// The part of a profile the sanitizer consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupConfig {
    pub attribute_allow_list: BTreeSet<String>,
    pub class_allow_list: BTreeSet<String>,
    pub rules: RuleSet,
}

/// Splits one line of user input into allow-list entries.
///
/// Entries are separated by commas or spaces; characters that can never be part
/// of an attribute, class or profile name are stripped; empty entries are dropped.
pub fn parse_list_input(input: &str) -> Vec<String> {
    LIST_SEPARATORS
        .split(input)
        .map(|value| INVALID_LIST_CHARS.replace_all(value, "").into_owned())
        .filter(|value| !value.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &RuleSet) -> Vec<String> {
        set.iter().map(|r| r.to_string()).collect()
    }

    fn sample() -> RuleSet {
        vec![
            CleanupRule::new("a", "b"),
            CleanupRule::new("c", "d"),
            CleanupRule::new("e", "f"),
        ]
        .into()
    }

    #[test]
    fn move_up_at_zero_is_noop() {
        let mut set = sample();
        set.move_up(0);
        assert_eq!(set, sample());
    }

    #[test]
    fn move_down_at_last_is_noop() {
        let mut set = sample();
        set.move_down(2);
        set.move_down(17);
        set.move_down(usize::MAX);
        set.move_up(usize::MAX);
        assert_eq!(set, sample());

        let mut empty = RuleSet::new();
        empty.move_down(0);
        empty.move_down(usize::MAX);
        assert!(empty.is_empty());
    }

    #[test]
    fn adjacent_swaps() {
        let mut set = sample();
        set.move_up(2);
        assert_eq!(names(&set), vec!["a -> b", "e -> f", "c -> d"]);
        set.move_down(0);
        assert_eq!(names(&set), vec!["e -> f", "a -> b", "c -> d"]);
    }

    #[test]
    fn remove_keeps_order() {
        let mut set = sample();
        let removed = set.remove_at(1).unwrap();
        assert_eq!(removed, CleanupRule::new("c", "d"));
        assert_eq!(names(&set), vec!["a -> b", "e -> f"]);
    }

    #[test]
    fn out_of_range_mutations_fail() {
        let mut set = sample();
        assert!(matches!(
            set.remove_at(3),
            Err(MarkcleanError::RuleIndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(set.set_match(5, "x").is_err());
        assert!(set.set_replacement(5, "x").is_err());
        assert_eq!(set, sample());
    }

    #[test]
    fn in_place_updates() {
        let mut set = sample();
        set.set_match(0, "div").unwrap();
        set.set_replacement(0, "p").unwrap();
        assert_eq!(set.get(0), Some(&CleanupRule::new("div", "p")));
    }

    #[test]
    fn rules_serialize_as_ordered_array() {
        let set: RuleSet = vec![CleanupRule::new("div", "p")].into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"match":"div","replace":"p"}]"#);
    }

    #[test]
    fn list_input_is_split_and_cleaned() {
        assert_eq!(parse_list_input("id, href  data-x"), vec!["id", "href", "data-x"]);
        assert_eq!(parse_list_input("cl@ss#1"), vec!["clss1"]);
        assert!(parse_list_input(" , ;").is_empty());
    }
}
