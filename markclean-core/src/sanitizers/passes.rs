//! The four cleanup passes, in the order the engine runs them.
//!
//! Each pass walks the arena in document order and mutates it in place; later
//! passes see the output of earlier ones.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::dom::{Document, NodeData, NodeId};
use crate::sanitizers::compiler::CompiledCleanup;
use crate::summary::CleanupSummary;

lazy_static! {
    /// Whitespace following a line break inside text content.
    static ref LINE_INDENT: Regex = Regex::new(r"\n[ \t\r\n\x0C]+").expect("valid regex pattern");
    /// Whitespace at the very start of a text node that begins a line.
    static ref LEADING_INDENT: Regex = Regex::new(r"^[ \t\r\n\x0C]+").expect("valid regex pattern");
}

/// Pass 1: drops every attribute not in the allow-list. `class` is left for pass 2.
pub fn filter_attributes(doc: &mut Document, compiled: &CompiledCleanup, summary: &mut CleanupSummary) {
    for id in doc.elements() {
        summary.elements_visited += 1;
        if let Some(el) = doc.element_mut(id) {
            let before = el.attrs.len();
            el.attrs
                .retain(|a| a.name.eq_ignore_ascii_case("class") || compiled.keeps_attribute(&a.name));
            summary.attributes_removed += before - el.attrs.len();
        }
    }
}

/// Pass 2: intersects each element's class tokens with the allow-list.
pub fn filter_classes(doc: &mut Document, compiled: &CompiledCleanup, summary: &mut CleanupSummary) {
    for id in doc.elements() {
        let Some(el) = doc.element_mut(id) else { continue };
        if el.attr("class").is_none() {
            continue;
        }

        let (total, kept) = {
            let tokens = el.class_tokens();
            let kept: Vec<String> = tokens
                .iter()
                .filter(|t| compiled.keeps_class(t))
                .map(|t| t.to_string())
                .collect();
            (tokens.len(), kept)
        };
        summary.class_tokens_removed += total - kept.len();

        if kept.is_empty() {
            el.remove_attr("class");
            summary.class_attributes_removed += 1;
        } else {
            el.set_attr("class", &kept.join(" "));
        }
    }
}

/// Pass 3: applies rename rules one after another against the current tree.
pub fn apply_rename_rules(doc: &mut Document, compiled: &CompiledCleanup, summary: &mut CleanupSummary) {
    for rule in &compiled.rules {
        let mut occurrences = 0;
        for id in doc.elements() {
            let matches = doc.element(id).map_or(false, |el| el.is_named(&rule.match_name));
            if matches && doc.rename_element(id, &rule.replace_name) {
                occurrences += 1;
            }
        }
        debug!("Rule #{} '{}' renamed {} element(s).", rule.index, rule.label(), occurrences);
        summary.record_rule(rule, occurrences);
    }
}

/// Pass 4: strips whitespace that starts a line of text content.
///
/// A text node begins a line when the serialized output before it is empty or ends
/// with a line break; any markup in between means it does not.
pub fn collapse_line_indentation(doc: &mut Document, summary: &mut CleanupSummary) {
    let mut at_line_start = true;
    let root = doc.root();
    collapse_children(doc, root, &mut at_line_start, summary);
}

enum Step {
    Descend,
    Markup,
    Text,
}

fn collapse_children(doc: &mut Document, parent: NodeId, at_line_start: &mut bool, summary: &mut CleanupSummary) {
    let children = doc.children(parent).to_vec();
    for child in children {
        let step = match doc.data(child) {
            NodeData::Element(_) | NodeData::Fragment => Step::Descend,
            NodeData::Comment(_) => Step::Markup,
            NodeData::Text(_) => Step::Text,
        };

        match step {
            Step::Descend => {
                *at_line_start = false;
                collapse_children(doc, child, at_line_start, summary);
                // the end tag
                *at_line_start = false;
            }
            Step::Markup => *at_line_start = false,
            Step::Text => {
                let Some(text) = doc.text_mut(child) else { continue };
                let mut removed = LINE_INDENT.find_iter(text.as_str()).count();
                let mut collapsed = LINE_INDENT.replace_all(text.as_str(), "\n").into_owned();
                if *at_line_start && LEADING_INDENT.is_match(&collapsed) {
                    collapsed = LEADING_INDENT.replace(&collapsed, "").into_owned();
                    removed += 1;
                }
                if !collapsed.is_empty() {
                    *at_line_start = collapsed.ends_with('\n');
                }
                summary.indentation_runs_removed += removed;
                *text = collapsed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanupConfig;
    use crate::sanitizers::compiler::compile_cleanup;

    fn compiled(attrs: &[&str], classes: &[&str]) -> CompiledCleanup {
        let mut config = CleanupConfig::default();
        config.attribute_allow_list = attrs.iter().map(|s| s.to_string()).collect();
        config.class_allow_list = classes.iter().map(|s| s.to_string()).collect();
        compile_cleanup(&config).unwrap()
    }

    #[test]
    fn attribute_filter_spares_class() {
        let mut doc = Document::parse_fragment(r#"<a href="x" target="_blank" class="c">l</a>"#);
        let mut summary = CleanupSummary::default();
        filter_attributes(&mut doc, &compiled(&["href"], &[]), &mut summary);
        assert_eq!(doc.inner_html(doc.root()), r#"<a href="x" class="c">l</a>"#);
        assert_eq!(summary.attributes_removed, 1);
    }

    #[test]
    fn class_filter_keeps_relative_order() {
        let mut doc = Document::parse_fragment(r#"<p class="c b a z">t</p>"#);
        let mut summary = CleanupSummary::default();
        filter_classes(&mut doc, &compiled(&[], &["a", "c"]), &mut summary);
        assert_eq!(doc.inner_html(doc.root()), r#"<p class="c a">t</p>"#);
        assert_eq!(summary.class_tokens_removed, 2);
    }

    #[test]
    fn class_filter_removes_empty_attribute() {
        let mut doc = Document::parse_fragment(r#"<p class="x" id="i">t</p><p class="">u</p>"#);
        let mut summary = CleanupSummary::default();
        filter_classes(&mut doc, &compiled(&[], &["keep"]), &mut summary);
        assert_eq!(doc.inner_html(doc.root()), r#"<p id="i">t</p><p>u</p>"#);
        assert_eq!(summary.class_attributes_removed, 2);
    }

    #[test]
    fn indentation_at_line_starts_is_removed() {
        let mut doc = Document::parse_fragment("<pre>line one\n    line two\n\n\n  line three</pre>");
        let mut summary = CleanupSummary::default();
        collapse_line_indentation(&mut doc, &mut summary);
        assert_eq!(doc.inner_html(doc.root()), "<pre>line one\nline two\nline three</pre>");
        assert_eq!(summary.indentation_runs_removed, 2);
    }

    #[test]
    fn spaces_after_inline_markup_are_kept() {
        let mut doc = Document::parse_fragment("<p><b>x</b> world</p>");
        let mut summary = CleanupSummary::default();
        collapse_line_indentation(&mut doc, &mut summary);
        assert_eq!(doc.inner_html(doc.root()), "<p><b>x</b> world</p>");
    }

    #[test]
    fn leading_whitespace_of_document_is_removed() {
        let mut doc = Document::parse_fragment("\n   <p>a</p>\n  <p>b</p>\n");
        let mut summary = CleanupSummary::default();
        collapse_line_indentation(&mut doc, &mut summary);
        assert_eq!(doc.inner_html(doc.root()), "<p>a</p>\n<p>b</p>\n");
    }

    #[test]
    fn empty_elements_are_not_pruned() {
        let mut doc = Document::parse_fragment("<div>   </div><span class=\"x\"></span>");
        let mut summary = CleanupSummary::default();
        let c = compiled(&[], &[]);
        filter_attributes(&mut doc, &c, &mut summary);
        filter_classes(&mut doc, &c, &mut summary);
        collapse_line_indentation(&mut doc, &mut summary);
        assert_eq!(doc.inner_html(doc.root()), "<div>   </div><span></span>");
    }
}
