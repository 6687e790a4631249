// markclean/src/commands/allow_list.rs
//! `markclean attributes` and `markclean classes`: edit a profile's allow-lists.

use anyhow::Result;
use std::collections::BTreeSet;

use markclean_core::{parse_list_input, CleanupConfig};

use super::{target_name, Session};
use crate::cli::{AllowListAction, AllowListCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowListKind {
    Attributes,
    Classes,
}

impl AllowListKind {
    fn label(self) -> &'static str {
        match self {
            Self::Attributes => "attribute",
            Self::Classes => "class",
        }
    }

    fn list(self, config: &CleanupConfig) -> &BTreeSet<String> {
        match self {
            Self::Attributes => &config.attribute_allow_list,
            Self::Classes => &config.class_allow_list,
        }
    }

    fn list_mut(self, config: &mut CleanupConfig) -> &mut BTreeSet<String> {
        match self {
            Self::Attributes => &mut config.attribute_allow_list,
            Self::Classes => &mut config.class_allow_list,
        }
    }

    /// Attribute names are case-insensitive; class tokens are not.
    fn normalize(self, entry: String) -> String {
        match self {
            Self::Attributes => entry.to_ascii_lowercase(),
            Self::Classes => entry,
        }
    }
}

pub fn run_allow_list(kind: AllowListKind, cmd: &AllowListCommand, session: &Session) -> Result<()> {
    let entries = |raw: &[String]| -> Vec<String> {
        raw.iter().flat_map(|r| parse_list_input(r)).map(|e| kind.normalize(e)).collect()
    };

    match &cmd.action {
        AllowListAction::List => {
            let mut store = session.load()?;
            let (_, profile) = store.resolve(cmd.profile.as_deref())?;
            for entry in kind.list(&profile.cleanup) {
                println!("{}", entry);
            }
        }
        AllowListAction::Add { entries: raw } => {
            let entries = entries(raw);
            let (name, added) = session.edit(|store| {
                let name = target_name(store, cmd.profile.as_deref())?;
                let list = kind.list_mut(&mut store.get_mut(&name)?.cleanup);
                let added = entries.iter().filter(|e| list.insert((*e).clone())).count();
                Ok((name, added))
            })?;
            session.success(format!("Added {} {} name(s) to '{}'", added, kind.label(), name));
        }
        AllowListAction::Remove { entries: raw } => {
            let entries = entries(raw);
            let (name, removed) = session.edit(|store| {
                let name = target_name(store, cmd.profile.as_deref())?;
                let list = kind.list_mut(&mut store.get_mut(&name)?.cleanup);
                let removed = entries.iter().filter(|e| list.remove(e.as_str())).count();
                Ok((name, removed))
            })?;
            if removed < entries.len() {
                session.warn(format!("{} entr(ies) were not in the {} allow-list", entries.len() - removed, kind.label()));
            }
            session.success(format!("Removed {} {} name(s) from '{}'", removed, kind.label(), name));
        }
    }
    Ok(())
}
