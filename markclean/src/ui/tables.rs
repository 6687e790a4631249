// markclean/src/ui/tables.rs
//! Table rendering for profiles, rules and cleanup summaries.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};

use markclean_core::{CleanupSummary, Profile, ProfileStore, RuleSet};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn join_or_dash<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let joined = items.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() { "-".to_string() } else { joined }
}

pub fn profiles_table(store: &ProfileStore) -> Table {
    let mut table = new_table(vec!["", "Profile", "Attributes", "Classes", "Rules", "Targets"]);
    for (name, profile) in store.iter() {
        let mut targets = Vec::new();
        if profile.targets.clipboard {
            targets.push("clipboard");
        }
        if profile.targets.file {
            targets.push("file");
        }
        if profile.targets.dirty {
            targets.push("dirty");
        }
        table.add_row(vec![
            Cell::new(if profile.is_active { "*" } else { "" }),
            Cell::new(name),
            Cell::new(profile.cleanup.attribute_allow_list.len()),
            Cell::new(profile.cleanup.class_allow_list.len()),
            Cell::new(profile.cleanup.rules.len()),
            Cell::new(if targets.is_empty() { "-".to_string() } else { targets.join(", ") }),
        ]);
    }
    table
}

pub fn profile_detail_table(name: &str, profile: &Profile) -> Table {
    let mut table = new_table(vec!["Setting", "Value"]);
    let t = &profile.targets;
    let rows: Vec<(&str, String)> = vec![
        ("name", name.to_string()),
        ("active", yes_no(profile.is_active).to_string()),
        ("attributes", join_or_dash(profile.cleanup.attribute_allow_list.iter())),
        ("classes", join_or_dash(profile.cleanup.class_allow_list.iter())),
        ("rules", profile.cleanup.rules.len().to_string()),
        ("clipboard", yes_no(t.clipboard).to_string()),
        ("file", yes_no(t.file).to_string()),
        ("file path", if t.file_path.is_empty() { "-".to_string() } else { t.file_path.clone() }),
        ("dirty", yes_no(t.dirty).to_string()),
        ("remote", yes_no(t.remote).to_string()),
        ("resolve links", yes_no(t.resolve_internal_links).to_string()),
    ];
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value]);
    }
    table
}

pub fn rules_table(rules: &RuleSet) -> Table {
    let mut table = new_table(vec!["#", "Match", "Replace"]);
    for (index, rule) in rules.iter().enumerate() {
        let note = |s: &str| if s.trim().is_empty() { "(empty)".to_string() } else { s.to_string() };
        table.add_row(vec![index.to_string(), note(&rule.match_tag), note(&rule.replace_tag)]);
    }
    table
}

pub fn summary_table(summary: &CleanupSummary) -> Table {
    let mut table = new_table(vec!["Change", "Count"]);
    table.add_row(vec!["attributes removed".to_string(), summary.attributes_removed.to_string()]);
    table.add_row(vec!["class tokens removed".to_string(), summary.class_tokens_removed.to_string()]);
    table.add_row(vec!["class attributes removed".to_string(), summary.class_attributes_removed.to_string()]);
    table.add_row(vec!["indentation runs removed".to_string(), summary.indentation_runs_removed.to_string()]);
    for item in &summary.renames {
        table.add_row(vec![format!("rule #{} {}", item.index, item.rule), item.occurrences.to_string()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_listing_marks_active() {
        let store = ProfileStore::with_default();
        let rendered = profiles_table(&store).to_string();
        assert!(rendered.contains("default"));
        assert!(rendered.contains('*'));
        assert!(rendered.contains("clipboard"));
    }

    #[test]
    fn empty_rule_cells_are_labelled() {
        let rendered = rules_table(&Profile::new_empty().cleanup.rules).to_string();
        assert!(rendered.contains("(empty)"));
    }
}
