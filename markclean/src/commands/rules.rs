// markclean/src/commands/rules.rs
//! `markclean rules`: edit the ordered tag-rename rules of a profile.

use anyhow::Result;

use markclean_core::{CleanupRule, MarkcleanError};

use super::{target_name, Session};
use crate::cli::{RulesAction, RulesCommand};
use crate::ui::tables;

pub fn run_rules(cmd: &RulesCommand, session: &Session) -> Result<()> {
    if let RulesAction::List = cmd.action {
        let mut store = session.load()?;
        let (name, profile) = store.resolve(cmd.profile.as_deref())?;
        println!("Rules of '{}':", name);
        println!("{}", tables::rules_table(&profile.cleanup.rules));
        return Ok(());
    }

    let (name, message) = session.edit(|store| {
        let name = target_name(store, cmd.profile.as_deref())?;
        let rules = &mut store.get_mut(&name)?.cleanup.rules;
        let len = rules.len();
        let in_range = |index: usize| {
            if index < len { Ok(index) } else { Err(MarkcleanError::RuleIndexOutOfRange { index, len }) }
        };
        let message = match &cmd.action {
            RulesAction::List => unreachable!("handled above"),
            RulesAction::Add { match_tag, replace_tag } => {
                let rule = CleanupRule::new(match_tag.trim(), replace_tag.trim());
                let message = format!("Added rule #{} {}", len, rule);
                rules.append(rule);
                message
            }
            RulesAction::Remove { index } => {
                let removed = rules.remove_at(*index)?;
                format!("Removed rule #{} {}", index, removed)
            }
            RulesAction::Up { index } => {
                rules.move_up(in_range(*index)?);
                format!("Moved rule #{} up", index)
            }
            RulesAction::Down { index } => {
                rules.move_down(in_range(*index)?);
                format!("Moved rule #{} down", index)
            }
            RulesAction::SetMatch { index, value } if value.trim().is_empty() => {
                let removed = rules.remove_at(*index)?;
                format!("Removed rule #{} {}", index, removed)
            }
            RulesAction::SetMatch { index, value } => {
                rules.set_match(*index, value.trim())?;
                format!("Rule #{} now matches <{}>", index, value.trim())
            }
            RulesAction::SetReplace { index, value } => {
                rules.set_replacement(*index, value.trim())?;
                format!("Rule #{} now renames to <{}>", index, value.trim())
            }
        };
        Ok((name, message))
    })?;
    session.success(format!("{} in '{}'", message, name));
    Ok(())
}
