use std::fmt::Write as FmtWrite;

use color_eyre::eyre::{Report, Result, bail, eyre};
use tracing::{info, warn};

use onboardflow::{
    DocumentFormat, DraftStore, FileStorage, HttpSubmitter, NavOutcome, OnboardConfig,
    OnboardingSession, OutputDestination, OutputOptions, OutputSubmitter, SubmissionError,
    Submitter, TuiOutcome, UiOptions, WizardUI, io::render_payload, resolve_flow,
};

use crate::cli::FlowArgs;

/// Opens the flow with its draft loaded: the one named by `--draft`, else
/// the flow's active draft if any.
pub fn open_session(config: &OnboardConfig, args: &FlowArgs) -> Result<OnboardingSession> {
    open_session_with(config, args, true)
}

pub fn open_session_with(
    config: &OnboardConfig,
    args: &FlowArgs,
    resume_active: bool,
) -> Result<OnboardingSession> {
    let flow = resolve_flow(&args.flow).map_err(Report::msg)?;
    let drafts = DraftStore::new(flow.id.clone(), FileStorage::new(&config.draft_dir))
        .with_quota(config.quota_bytes);
    let mut session = OnboardingSession::with_drafts(flow, drafts).map_err(Report::msg)?;
    match args.draft.as_deref() {
        Some(id) => {
            if !session.load_draft(id)? {
                bail!("no draft '{id}' for flow '{}'", session.flow().id);
            }
        }
        None if resume_active => match session.resume_active() {
            Ok(_) => {}
            Err(err) if err.is_unreadable() => {
                warn!(
                    flow = %session.flow().id,
                    error = %err,
                    "ignoring unreadable draft; `onboardflow discard` removes it"
                );
            }
            Err(err) => return Err(err.into()),
        },
        None => {}
    }
    Ok(session)
}

pub fn flows() -> String {
    let mut out = String::new();
    for builtin in onboardflow::BuiltinFlow::ALL {
        match builtin.load() {
            Ok(flow) => {
                let _ = writeln!(
                    out,
                    "{:<16} {} ({} steps)",
                    builtin.id(),
                    flow.title,
                    flow.sections.len()
                );
            }
            Err(err) => {
                let _ = writeln!(out, "{:<16} unavailable: {err:#}", builtin.id());
            }
        }
    }
    out
}

/// Progress overview plus the fields of the active section.
pub fn summary(session: &OnboardingSession) -> String {
    let flow = session.flow();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", flow.title, flow.id);
    match session.draft_id() {
        Some(id) => {
            let _ = writeln!(out, "draft: {id}");
        }
        None => {
            let _ = writeln!(out, "draft: none");
        }
    }
    if session.state().is_submitted() {
        let _ = writeln!(out, "status: submitted");
    }
    let _ = writeln!(out);

    for status in session.section_status() {
        let title = flow
            .section(&status.id)
            .map(|section| section.title.as_str())
            .unwrap_or(status.id.as_str());
        let marker = if status.active {
            ">"
        } else if !status.reachable {
            " "
        } else if status.valid {
            "+"
        } else {
            "-"
        };
        let state = match (status.reachable, status.valid) {
            (false, _) => "locked",
            (true, true) => "complete",
            (true, false) => "incomplete",
        };
        let _ = writeln!(
            out,
            "{marker} {}. {title} [{}] {state}",
            status.index + 1,
            status.id
        );
    }

    let active = session.active_section();
    let Some(section) = flow.section(active) else {
        return out;
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "{} [{}]", section.title, section.id);
    let rows = onboardflow::form::section_rows(section, session.section_data(active));
    for row in &rows {
        let required = if row.schema.required { " *" } else { "" };
        let _ = writeln!(
            out,
            "  {:<28} {}",
            format!("{}{required}", row.dotted_path()),
            if row.buffer.is_empty() { "-" } else { row.buffer.as_str() }
        );
    }
    if let Err(err) = session.validate_current() {
        let _ = writeln!(out);
        for issue in &err.issues {
            let _ = writeln!(out, "  ! {}", issue.message());
        }
    }
    out
}

/// Applies `FIELD=VALUE` pairs; dotted names reach nested fields.
pub fn set_fields(
    session: &mut OnboardingSession,
    section: &str,
    assignments: &[String],
) -> Result<()> {
    ensure_section(session, section)?;
    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| eyre!("expected FIELD=VALUE, got '{assignment}'"))?;
        let path: Vec<&str> = field.trim().split('.').collect();
        session.set_input(section, &path, raw)?;
    }
    Ok(())
}

pub fn unset_fields(
    session: &mut OnboardingSession,
    section: &str,
    fields: &[String],
) -> Result<()> {
    ensure_section(session, section)?;
    for field in fields {
        let path: Vec<&str> = field.trim().split('.').collect();
        session.clear_field(section, &path);
    }
    Ok(())
}

pub fn next(session: &mut OnboardingSession) -> Result<String> {
    match session.next()? {
        NavOutcome::Moved { to, .. } => Ok(format!(
            "moved to step {}: {}",
            to + 1,
            section_title(session, session.active_section())
        )),
        NavOutcome::ReadyToSubmit => Ok(format!(
            "all steps complete; run `onboardflow submit {}` to finish",
            session.flow().id
        )),
        NavOutcome::Unchanged => Ok("nothing to do".to_string()),
    }
}

pub fn back(session: &mut OnboardingSession) -> String {
    match session.back() {
        NavOutcome::Moved { to, .. } => format!(
            "moved to step {}: {}",
            to + 1,
            section_title(session, session.active_section())
        ),
        _ => "already at the first step".to_string(),
    }
}

pub fn goto(session: &mut OnboardingSession, section: &str) -> Result<String> {
    ensure_section(session, section)?;
    match session.jump_to(section) {
        NavOutcome::Moved { .. } => Ok(format!("moved to {}", section_title(session, section))),
        _ if session.active_section() == section => Ok(format!(
            "already on {}",
            section_title(session, section)
        )),
        _ => bail!(
            "'{section}' is locked; complete the earlier steps with `onboardflow next` first"
        ),
    }
}

pub fn payload_text(session: &OnboardingSession, format: DocumentFormat) -> Result<String> {
    let text = render_payload(&session.payload(), format, true).map_err(Report::msg)?;
    Ok(text.trim_end().to_string())
}

pub struct SubmitRequest<'a> {
    pub dry_run: bool,
    pub outputs: &'a [String],
    pub keep_draft: bool,
}

pub fn submit(
    config: &OnboardConfig,
    session: &mut OnboardingSession,
    request: SubmitRequest<'_>,
) -> Result<String> {
    let submitter = build_submitter(config, request.dry_run, request.outputs)?;
    let receipt = match session.submit(submitter.as_ref()) {
        Ok(receipt) => receipt,
        Err(SubmissionError::Invalid(err)) => {
            let title = section_title(session, &err.section);
            bail!("{title}: {}", err.reason());
        }
        Err(err) => return Err(err.into()),
    };
    if !request.keep_draft {
        session.clear_draft()?;
    }
    info!(flow = %session.flow().id, status = receipt.status, "submission finished");
    Ok(match (request.dry_run, receipt.body) {
        (true, _) => "dry run complete".to_string(),
        (false, Some(body)) => format!("submitted ({}): {body}", receipt.status),
        (false, None) => format!("submitted ({})", receipt.status),
    })
}

pub fn run(
    config: &OnboardConfig,
    session: OnboardingSession,
    resume: bool,
    dry_run: bool,
) -> Result<String> {
    let options = UiOptions::default().with_resume_draft(resume);
    let mut ui = WizardUI::new(session).with_options(options);
    if !dry_run {
        ui = ui.with_submitter(build_submitter(config, false, &[])?);
    }
    let outcome = ui.run().map_err(Report::msg)?;
    Ok(match outcome {
        TuiOutcome::Submitted { payload, .. } if dry_run => {
            render_payload(&payload, DocumentFormat::Json, true).map_err(Report::msg)?
        }
        TuiOutcome::Submitted { receipt, .. } => format!("submitted ({})", receipt.status),
        TuiOutcome::Saved { draft_id } => format!("draft saved as {draft_id}"),
        TuiOutcome::Abandoned => "closed without saving".to_string(),
    })
}

fn build_submitter(
    config: &OnboardConfig,
    dry_run: bool,
    outputs: &[String],
) -> Result<Box<dyn Submitter>> {
    if dry_run {
        let mut destinations = Vec::new();
        for raw in outputs {
            if raw.trim().is_empty() {
                bail!("output destination cannot be empty");
            }
            destinations.push(match raw.as_str() {
                "-" => OutputDestination::Stdout,
                path => OutputDestination::file(path),
            });
        }
        if destinations.is_empty() {
            destinations.push(OutputDestination::Stdout);
        }
        let format = destinations
            .iter()
            .find_map(|destination| match destination {
                OutputDestination::File(path) => DocumentFormat::from_path(path),
                OutputDestination::Stdout => None,
            })
            .unwrap_or_default();
        let options = OutputOptions::new(format).with_destinations(destinations);
        return Ok(Box::new(OutputSubmitter::new(options)));
    }
    let submitter = HttpSubmitter::new(config.api_url.clone(), config.timeout())?
        .with_token(config.api_token.clone());
    Ok(Box::new(submitter))
}

fn ensure_section(session: &OnboardingSession, section: &str) -> Result<()> {
    if session.flow().section(section).is_some() {
        return Ok(());
    }
    let known: Vec<&str> = session.flow().section_ids().collect();
    bail!(
        "flow '{}' has no section '{section}'; sections: {}",
        session.flow().id,
        known.join(", ")
    )
}

fn section_title(session: &OnboardingSession, section: &str) -> String {
    session
        .flow()
        .section(section)
        .map(|schema| schema.title.clone())
        .unwrap_or_else(|| section.to_string())
}
