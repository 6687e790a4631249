// markclean/src/cli.rs
//! This file defines the command-line interface (CLI) for the markclean application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "markclean",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export Markdown notes as clean HTML",
    long_about = "markclean renders a Markdown note, strips the markup down to the attributes, classes and tags allowed by the active profile, and copies the result to the clipboard or writes it to a file.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging for the markclean crates
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// Settings file holding the profiles.
    #[arg(long = "settings", value_name = "FILE", global = true, env = "MARKCLEAN_SETTINGS_FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Renders a Markdown note and exports the cleaned HTML.
    Export(ExportCommand),

    /// Cleans an HTML fragment and prints the result.
    Clean(CleanCommand),

    /// Manages cleanup profiles.
    #[command(subcommand)]
    Profiles(ProfilesCommand),

    /// Edits the tag-rename rules of a profile.
    Rules(RulesCommand),

    /// Edits the attribute allow-list of a profile.
    Attributes(AllowListCommand),

    /// Edits the class allow-list of a profile.
    Classes(AllowListCommand),
}

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Markdown file to export (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Profile to use instead of the active one.
    #[arg(long, short = 'p', value_name = "NAME")]
    pub profile: Option<String>,

    /// Copy the result to the clipboard, overriding the profile.
    #[arg(long, conflicts_with = "no_clipboard")]
    pub clipboard: bool,

    /// Do not copy the result to the clipboard, overriding the profile.
    #[arg(long = "no-clipboard")]
    pub no_clipboard: bool,

    /// Write the result to this logical path inside the vault.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<String>,

    /// Root directory logical output paths are resolved against.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub vault: PathBuf,

    /// Export the rendered markup without cleanup.
    #[arg(long)]
    pub dirty: bool,

    /// Rewrite links between notes to point at exported HTML files.
    #[arg(long = "resolve-links")]
    pub resolve_links: bool,

    /// Print the exported HTML to stdout.
    #[arg(long)]
    pub print: bool,

    /// Quiet period after the last render pass, in milliseconds.
    #[arg(long = "delay-ms", value_name = "MS")]
    pub delay_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CleanCommand {
    /// HTML file to clean (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    #[arg(long, short = 'p', value_name = "NAME")]
    pub profile: Option<String>,

    /// Print the input unchanged.
    #[arg(long)]
    pub dirty: bool,

    /// Show a unified diff of the changes instead of the result.
    #[arg(long, short = 'D')]
    pub diff: bool,

    /// Print a summary of what was removed or renamed to stderr.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// Lists all profiles.
    List,
    /// Shows one profile in full.
    Show { name: Option<String> },
    /// Creates empty profiles.
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Deletes a profile.
    Remove { name: String },
    /// Makes a profile the active one.
    Activate { name: String },
    Rename { old: String, new: String },
    /// Imports a profile from a YAML file.
    Import {
        file: PathBuf,
        /// Store the profile under this name instead of the one in the file.
        #[arg(long)]
        name: Option<String>,
    },
    /// Exports a profile as YAML.
    Export {
        name: String,
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Restores the built-in attribute allow-list.
    ResetAttributes { name: Option<String> },
    /// Empties the class allow-list.
    ClearClasses { name: Option<String> },
    /// Changes the export targets of a profile.
    Set(SetTargetsCommand),
}

#[derive(Args, Debug)]
pub struct SetTargetsCommand {
    pub name: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub clipboard: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub file: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub dirty: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub remote: Option<bool>,
    #[arg(long = "resolve-links", value_name = "BOOL")]
    pub resolve_links: Option<bool>,
    #[arg(long = "file-path", value_name = "PATH")]
    pub file_path: Option<String>,
}

#[derive(Args, Debug)]
pub struct RulesCommand {
    /// Profile to edit instead of the active one.
    #[arg(long, short = 'p', value_name = "NAME", global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    List,
    /// Appends a rule.
    Add {
        #[arg(value_name = "MATCH")]
        match_tag: String,
        #[arg(value_name = "REPLACE")]
        replace_tag: String,
    },
    Remove { index: usize },
    /// Moves a rule one position earlier.
    Up { index: usize },
    /// Moves a rule one position later.
    Down { index: usize },
    /// Changes the tag a rule matches. An empty value deletes the rule.
    SetMatch {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Changes the tag a rule renames to.
    SetReplace {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Args, Debug)]
pub struct AllowListCommand {
    #[arg(long, short = 'p', value_name = "NAME", global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub action: AllowListAction,
}

#[derive(Subcommand, Debug)]
pub enum AllowListAction {
    List,
    /// Adds entries; commas and spaces separate them.
    Add {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    Remove {
        #[arg(required = true)]
        entries: Vec<String>,
    },
}
