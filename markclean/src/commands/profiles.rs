// markclean/src/commands/profiles.rs
//! `markclean profiles`: list, create, delete, rename, activate, import and export
//! profiles, and change their export targets.

use anyhow::{Context, Result};
use log::debug;
use std::fs;

use markclean_core::{load_profile_file, parse_list_input, profile_to_yaml};

use super::{target_name, Session};
use crate::cli::{ProfilesCommand, SetTargetsCommand};
use crate::ui::tables;

pub fn run_profiles(cmd: &ProfilesCommand, session: &Session) -> Result<()> {
    match cmd {
        ProfilesCommand::List => {
            let mut store = session.load()?;
            if store.active_name().is_none() {
                store.resolve_active();
                session.save(&store)?;
            }
            println!("{}", tables::profiles_table(&store));
        }
        ProfilesCommand::Show { name } => {
            let mut store = session.load()?;
            let (name, profile) = store.resolve(name.as_deref())?;
            println!("{}", tables::profile_detail_table(&name, profile));
            println!("{}", tables::rules_table(&profile.cleanup.rules));
        }
        ProfilesCommand::Add { names } => {
            let names: Vec<String> = names.iter().flat_map(|n| parse_list_input(n)).collect();
            session.edit(|store| {
                for name in &names {
                    store.create(name, None)?;
                }
                Ok(())
            })?;
            session.success(format!("Created {}", names.join(", ")));
        }
        ProfilesCommand::Remove { name } => {
            session.edit(|store| {
                store.delete(name)?;
                // keep one profile active
                store.resolve_active();
                Ok(())
            })?;
            session.success(format!("Removed profile '{}'", name));
        }
        ProfilesCommand::Activate { name } => {
            session.edit(|store| Ok(store.activate(name)?))?;
            session.success(format!("Profile '{}' is now active", name));
        }
        ProfilesCommand::Rename { old, new } => {
            session.edit(|store| Ok(store.rename(old, new)?))?;
            session.success(format!("Renamed '{}' to '{}'", old, new));
        }
        ProfilesCommand::Import { file, name } => {
            let exchange = load_profile_file(file)?;
            let name = name.clone().unwrap_or(exchange.profile_name);
            if let Some(description) = &exchange.description {
                debug!("Importing '{}': {}", name, description);
            }
            session.edit(|store| Ok(store.create(&name, Some(exchange.profile))?))?;
            session.success(format!("Imported profile '{}' from {}", name, file.display()));
        }
        ProfilesCommand::Export { name, output } => {
            let store = session.load()?;
            let yaml = profile_to_yaml(name, store.get(name)?)?;
            match output {
                Some(path) => {
                    fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
                    session.success(format!("Exported profile '{}' to {}", name, path.display()));
                }
                None => print!("{}", yaml),
            }
        }
        ProfilesCommand::ResetAttributes { name } => {
            let name = session.edit(|store| {
                let name = target_name(store, name.as_deref())?;
                store.reset_attributes(&name)?;
                Ok(name)
            })?;
            session.success(format!("Restored the default attribute allow-list on '{}'", name));
        }
        ProfilesCommand::ClearClasses { name } => {
            let name = session.edit(|store| {
                let name = target_name(store, name.as_deref())?;
                store.clear_classes(&name)?;
                Ok(name)
            })?;
            session.success(format!("Cleared the class allow-list on '{}'", name));
        }
        ProfilesCommand::Set(set) => {
            let name = session.edit(|store| apply_targets(store, set))?;
            session.success(format!("Updated export targets of '{}'", name));
        }
    }
    Ok(())
}

fn apply_targets(store: &mut markclean_core::ProfileStore, set: &SetTargetsCommand) -> Result<String> {
    let name = target_name(store, set.name.as_deref())?;
    let targets = &mut store.get_mut(&name)?.targets;
    let flags = [
        (set.clipboard, &mut targets.clipboard),
        (set.file, &mut targets.file),
        (set.dirty, &mut targets.dirty),
        (set.remote, &mut targets.remote),
        (set.resolve_links, &mut targets.resolve_internal_links),
    ];
    for (value, slot) in flags {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(path) = &set.file_path {
        targets.file_path = path.trim().to_string();
    }
    Ok(name)
}
