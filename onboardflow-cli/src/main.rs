mod cli;
mod commands;
mod logging;

use clap::Parser;
use color_eyre::eyre::{Report, Result};
use tracing::debug;

use onboardflow::{OnboardConfig, OnboardingSession};

use crate::cli::{Cli, Command};
use crate::commands::SubmitRequest;
use crate::logging::LogTarget;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let target = match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Command::Run { .. }) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    logging::init(target, cli.verbose)?;

    let config = load_config(&cli)?;
    debug!(draft_dir = %config.draft_dir.display(), api_url = %config.api_url, "configuration ready");

    match cli.command {
        Command::Flows => print!("{}", commands::flows()),
        Command::Show(args) => {
            let session = commands::open_session(&config, &args)?;
            print!("{}", commands::summary(&session));
        }
        Command::Set {
            flow,
            section,
            assignments,
        } => {
            let mut session = commands::open_session(&config, &flow)?;
            commands::set_fields(&mut session, &section, &assignments)?;
            persist(&mut session)?;
        }
        Command::Unset {
            flow,
            section,
            fields,
        } => {
            let mut session = commands::open_session(&config, &flow)?;
            commands::unset_fields(&mut session, &section, &fields)?;
            persist(&mut session)?;
        }
        Command::Next(args) => {
            let mut session = commands::open_session(&config, &args)?;
            let message = commands::next(&mut session)?;
            persist(&mut session)?;
            println!("{message}");
        }
        Command::Back(args) => {
            let mut session = commands::open_session(&config, &args)?;
            let message = commands::back(&mut session);
            persist(&mut session)?;
            println!("{message}");
        }
        Command::Goto { flow, section } => {
            let mut session = commands::open_session(&config, &flow)?;
            let message = commands::goto(&mut session, &section)?;
            persist(&mut session)?;
            println!("{message}");
        }
        Command::Save(args) => {
            let mut session = commands::open_session(&config, &args)?;
            let id = session.save_draft()?;
            println!("draft saved as {id}");
        }
        Command::Payload { flow, format } => {
            let session = commands::open_session(&config, &flow)?;
            println!("{}", commands::payload_text(&session, format)?);
        }
        Command::Submit {
            flow,
            dry_run,
            outputs,
            keep_draft,
        } => {
            let mut session = commands::open_session(&config, &flow)?;
            let request = SubmitRequest {
                dry_run,
                outputs: &outputs,
                keep_draft,
            };
            let message = commands::submit(&config, &mut session, request)?;
            // A dry run may be writing the payload to stdout.
            if dry_run {
                eprintln!("{message}");
            } else {
                println!("{message}");
            }
        }
        Command::Discard(args) => {
            let mut session = commands::open_session(&config, &args)?;
            if session.clear_draft()? {
                println!("draft discarded");
            } else {
                println!("no draft to discard");
            }
        }
        Command::Run {
            flow,
            fresh,
            dry_run,
        } => {
            // The wizard resumes the active draft itself unless --fresh.
            let session = commands::open_session_with(&config, &flow, false)?;
            let resume = !fresh && flow.draft.is_none();
            println!("{}", commands::run(&config, session, resume, dry_run)?);
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<OnboardConfig> {
    let mut config = OnboardConfig::load(cli.config.as_deref()).map_err(Report::msg)?;
    if let Some(dir) = &cli.draft_dir {
        config.draft_dir = dir.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    Ok(config)
}

fn persist(session: &mut OnboardingSession) -> Result<()> {
    let id = session.save_draft()?;
    debug!(id = %id, "draft stored");
    Ok(())
}
