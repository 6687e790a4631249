// markclean-core/src/export/links.rs
//! Rewrites links between notes so they point at the exported HTML files.
//!
//! An internal link is an `a` element carrying the `internal-link` class or a
//! `data-wikilink="true"` marker. Its target (`data-href`, else `href`) names a note,
//! optionally followed by `#heading`. The rewritten `href` is `Note.html#heading`,
//! or just `#heading` for a link inside the same note.

use log::debug;

use crate::dom::Document;

pub const INTERNAL_LINK_CLASS: &str = "internal-link";

/// Rewrites every internal link in `doc`. Returns the number of links touched.
pub fn resolve_internal_links(doc: &mut Document) -> usize {
    let mut resolved = 0;
    for id in doc.elements() {
        let Some(el) = doc.element_mut(id) else { continue };
        if !el.is_named("a") {
            continue;
        }
        let internal = el.class_tokens().contains(&INTERNAL_LINK_CLASS) || el.attr("data-wikilink") == Some("true");
        if !internal {
            continue;
        }
        let Some(target) = el.attr("data-href").or_else(|| el.attr("href")).map(str::to_string) else {
            continue;
        };
        let href = export_href(&target);
        debug!("Internal link '{}' -> '{}'.", target, href);
        el.set_attr("href", &href);
        resolved += 1;
    }
    resolved
}

fn export_href(target: &str) -> String {
    let (note, fragment) = match target.split_once('#') {
        Some((note, fragment)) => (note.trim(), Some(fragment.trim())),
        None => (target.trim(), None),
    };
    let note = note.strip_suffix(".md").unwrap_or(note);
    let fragment = fragment.filter(|f| !f.is_empty()).map(|f| format!("#{}", f.replace(' ', "-")));
    match (note.is_empty(), fragment) {
        (true, Some(fragment)) => fragment,
        (true, None) => "#".to_string(),
        (false, Some(fragment)) => format!("{}.html{}", note, fragment),
        (false, None) => format!("{}.html", note),
    }
}
