// markclean/src/main.rs
//! markclean entry point.
//!
//! Loads `.env`, parses the command line, sets up logging and runs the command.

use anyhow::Result;
use clap::Parser;
use log::debug;

use markclean::cli::Cli;
use markclean::logger;
use markclean::ui::output_format::{stderr_msg, MessageKind};
use markclean::utils::settings_store::JsonFileBackend;
use markclean::{run_command, Session};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    logger::init_logger(logger::level_from_flags(args.quiet, args.debug, args.disable_debug));
    debug!("Parsed command: {:?}", args.command);

    let backend = JsonFileBackend::resolve(args.settings.as_deref())?;
    let session = Session::new(backend, args.quiet);

    if let Err(e) = run_command(&args.command, &session).await {
        stderr_msg(MessageKind::Error, format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
