//! compiler.rs - Normalizes a profile's cleanup configuration for the engine.
//!
//! Compilation lower-cases allow-list entries and tag names, drops rules that can
//! never match, and rejects replacement names that are not valid tag names or that
//! would turn an element with children into a void element, so the cleanup passes
//! only ever see well-formed input.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;

use crate::config::{CleanupConfig, CleanupRule};
use crate::dom::is_void_element;
use crate::errors::MarkcleanError;

lazy_static! {
    static ref TAG_NAME: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:-[A-Za-z0-9]+)*$").expect("valid regex pattern");
}

/// A rename rule ready for application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    /// Position of the rule in the profile's rule list.
    pub index: usize,
    pub match_name: String,
    pub replace_name: String,
}

impl CompiledRule {
    pub fn label(&self) -> String {
        format!("{} -> {}", self.match_name, self.replace_name)
    }
}

/// Allow-lists and rules in the form the cleanup passes consume.
#[derive(Debug, Clone, Default)]
pub struct CompiledCleanup {
    pub attributes: HashSet<String>,
    pub classes: HashSet<String>,
    pub rules: Vec<CompiledRule>,
}

impl CompiledCleanup {
    pub fn keeps_attribute(&self, name: &str) -> bool {
        self.attributes.contains(&name.to_ascii_lowercase())
    }

    pub fn keeps_class(&self, token: &str) -> bool {
        self.classes.contains(token)
    }
}

pub fn is_valid_tag_name(name: &str) -> bool {
    TAG_NAME.is_match(name)
}

/// Compiles a list of `CleanupRule`s, keeping their order.
pub fn compile_rules(rules: &[CleanupRule]) -> Result<Vec<CompiledRule>, MarkcleanError> {
    debug!("Starting compilation of {} rules.", rules.len());
    let mut compiled = Vec::with_capacity(rules.len());
    let mut errors = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let match_name = rule.match_tag.trim();
        let replace_name = rule.replace_tag.trim();

        if match_name.is_empty() {
            debug!("Skipping rule #{} because its match tag is empty.", index);
            continue;
        }
        if replace_name.is_empty() {
            warn!("Skipping rule #{} ('{}'): replacement tag is empty.", index, match_name);
            continue;
        }
        if !is_valid_tag_name(replace_name) {
            errors.push(MarkcleanError::InvalidTagName { index, name: replace_name.to_string() });
            continue;
        }
        if is_void_element(replace_name) && !is_void_element(match_name) {
            errors.push(MarkcleanError::VoidReplacement {
                index,
                match_name: match_name.to_string(),
                name: replace_name.to_string(),
            });
            continue;
        }

        log::debug!(
            target: "markclean_core::sanitizer",
            "Rule #{} '{} -> {}' compiled successfully.",
            index, match_name, replace_name
        );
        compiled.push(CompiledRule {
            index,
            match_name: match_name.to_ascii_lowercase(),
            replace_name: replace_name.to_ascii_lowercase(),
        });
    }

    match errors.len() {
        0 => {
            debug!("Finished compiling rules. Total compiled: {}.", compiled.len());
            Ok(compiled)
        }
        1 => Err(errors.remove(0)),
        n => {
            let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
            Err(MarkcleanError::Fatal(format!("Failed to compile {} rule(s):\n{}", n, message)))
        }
    }
}

/// Compiles a full cleanup configuration.
pub fn compile_cleanup(config: &CleanupConfig) -> Result<CompiledCleanup, MarkcleanError> {
    Ok(CompiledCleanup {
        attributes: config
            .attribute_allow_list
            .iter()
            .map(|a| a.trim().to_ascii_lowercase())
            .filter(|a| !a.is_empty())
            .collect(),
        classes: config
            .class_allow_list
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        rules: compile_rules(config.rules.as_slice())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_match_rules_are_dropped() {
        let rules = vec![CleanupRule::new("", "x"), CleanupRule::new("DIV", "P")];
        let compiled = compile_rules(&rules).unwrap();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].index, 1);
        assert_eq!(compiled[0].label(), "div -> p");
    }

    #[test]
    fn empty_replacement_is_skipped() {
        let compiled = compile_rules(&[CleanupRule::new("div", "  ")]).unwrap();
        assert!(compiled.is_empty());
    }

    #[test]
    fn invalid_replacement_is_rejected() {
        let err = compile_rules(&[CleanupRule::new("div", "my tag")]).unwrap_err();
        assert!(matches!(err, MarkcleanError::InvalidTagName { index: 0, .. }));
    }

    #[test]
    fn void_replacement_is_rejected() {
        let err = compile_rules(&[CleanupRule::new("div", "p"), CleanupRule::new("p", "BR")]).unwrap_err();
        assert!(matches!(err, MarkcleanError::VoidReplacement { index: 1, .. }));
        assert!(err.to_string().contains("void element"));
    }

    #[test]
    fn void_to_void_rename_is_allowed() {
        let compiled = compile_rules(&[CleanupRule::new("br", "hr")]).unwrap();
        assert_eq!(compiled[0].label(), "br -> hr");
    }

    #[test]
    fn tag_name_validation() {
        assert!(is_valid_tag_name("section"));
        assert!(is_valid_tag_name("h1"));
        assert!(is_valid_tag_name("my-widget"));
        assert!(!is_valid_tag_name("1h"));
        assert!(!is_valid_tag_name("a b"));
        assert!(!is_valid_tag_name("<p>"));
    }

    #[test]
    fn allow_lists_are_normalized() {
        let mut config = CleanupConfig::default();
        config.attribute_allow_list.insert("ID".to_string());
        config.class_allow_list.insert("Keep".to_string());
        let compiled = compile_cleanup(&config).unwrap();
        assert!(compiled.keeps_attribute("id"));
        assert!(compiled.keeps_attribute("Id"));
        assert!(compiled.keeps_class("Keep"));
        assert!(!compiled.keeps_class("keep"));
    }
}
