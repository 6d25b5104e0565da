use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{Frame, layout::Rect};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    form::{FieldRow, section_rows},
    presentation::{self, SidebarEntry, UiContext},
    session::OnboardingSession,
    submission::{SubmissionError, SubmitReceipt, Submitter},
    validation::{ValidationError, ValidationIssue},
    wizard::NavOutcome,
};

use super::{
    input::{KeyCommand, classify},
    options::UiOptions,
    status::StatusLine,
    terminal::TerminalGuard,
};

const HELP_TEXT: &str = "Tab/↑↓ field • ←/→ option • Space toggle • Ctrl+N next • Ctrl+B back • \
                         Alt+1..9 step • Ctrl+S save • Ctrl+D discard • Ctrl+Q quit";

/// How the terminal wizard ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TuiOutcome {
    Submitted {
        receipt: SubmitReceipt,
        payload: Value,
    },
    /// The user quit after saving; the draft can be resumed later.
    Saved { draft_id: String },
    Abandoned,
}

pub(crate) struct App<'s> {
    session: OnboardingSession,
    submitter: &'s dyn Submitter,
    options: UiOptions,
    status: StatusLine,
    rows: Vec<FieldRow>,
    selected: usize,
    scroll: usize,
    issue_count: usize,
    exit_armed: bool,
    discard_armed: bool,
    submit_pending: bool,
    should_quit: bool,
    outcome: Option<TuiOutcome>,
}

impl<'s> App<'s> {
    pub fn new(session: OnboardingSession, submitter: &'s dyn Submitter, options: UiOptions) -> Self {
        let mut app = Self {
            session,
            submitter,
            options,
            status: StatusLine::new(),
            rows: Vec::new(),
            selected: 0,
            scroll: 0,
            issue_count: 0,
            exit_armed: false,
            discard_armed: false,
            submit_pending: false,
            should_quit: false,
            outcome: None,
        };
        app.reload_rows();
        app
    }

    /// Loads the flow's active draft, if asked to and one exists.
    pub fn resume(&mut self) {
        if !self.options.resume_draft {
            return;
        }
        match self.session.resume_active() {
            Ok(true) => {
                self.reload_rows();
                let id = self.session.draft_id().unwrap_or_default().to_string();
                self.status.draft_resumed(&id);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, "could not resume draft");
                self.status.set_raw(format!("Could not load draft: {err}"));
            }
        }
    }

    pub fn run(mut self) -> Result<TuiOutcome> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if self.submit_pending {
                self.submit_now();
                drain_pending_input()?;
                continue;
            }
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(width, height) => {
                    terminal.resize(Rect::new(0, 0, width, height))?;
                }
                _ => {}
            }
        }
        Ok(self.finish())
    }

    pub(crate) fn draw(&mut self, frame: &mut Frame<'_>) {
        let flow = self.session.flow();
        let active = self.session.active_section();
        let section = flow.section(active);
        let sidebar: Vec<SidebarEntry> = self
            .session
            .section_status()
            .into_iter()
            .map(|status| SidebarEntry {
                title: flow
                    .section(&status.id)
                    .map(|section| section.title.clone())
                    .unwrap_or_else(|| status.id.clone()),
                status,
            })
            .collect();
        let ctx = UiContext {
            flow_title: &flow.title,
            flow_description: flow.description.as_deref(),
            section_title: section.map(|s| s.title.as_str()).unwrap_or(active),
            section_description: section.and_then(|s| s.description.as_deref()),
            sections: &sidebar,
            rows: &self.rows,
            selected: self.selected,
            status_message: self.status.message(),
            dirty: self.session.state().is_dirty(),
            issue_count: self.issue_count,
            help: self.options.show_help.then_some(HELP_TEXT),
            draft_id: self.session.draft_id(),
            busy: self.submit_pending,
        };
        presentation::draw(frame, &ctx, &mut self.scroll);
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press || self.submit_pending {
            return;
        }
        let command = classify(&key);
        if !matches!(command, KeyCommand::Quit) {
            self.exit_armed = false;
        }
        if !matches!(command, KeyCommand::Discard) {
            self.discard_armed = false;
        }
        match command {
            KeyCommand::Next => self.on_next(),
            KeyCommand::Back => {
                if let NavOutcome::Moved { .. } = self.session.back() {
                    self.entered_section();
                }
            }
            KeyCommand::JumpTo(index) => match self.session.jump_to_index(index) {
                NavOutcome::Moved { .. } => self.entered_section(),
                _ if index >= self.session.state().section_count() => {}
                _ if index != self.session.state().active_index() => self.status.locked_section(),
                _ => {}
            },
            KeyCommand::Save => self.on_save(),
            KeyCommand::Discard => self.on_discard(),
            KeyCommand::Quit => self.on_exit(),
            KeyCommand::NextField => self.move_selection(1),
            KeyCommand::PrevField => self.move_selection(-1),
            KeyCommand::ResetStatus => self.status.ready(),
            KeyCommand::Edit(event) => self.handle_field_input(&event),
            KeyCommand::None => {}
        }
    }

    fn handle_field_input(&mut self, event: &KeyEvent) {
        if self.session.state().is_submitted() {
            return;
        }
        let Some(row) = self.rows.get_mut(self.selected) else {
            return;
        };
        if !row.handle_key(event) {
            return;
        }
        let section = self.session.active_section().to_string();
        let path: Vec<String> = row.schema.path.clone();
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        match row.value() {
            Ok(Some(value)) => {
                row.error = None;
                self.session.set_field_at(&section, &path, value);
            }
            Ok(None) => {
                row.error = None;
                self.session.clear_field(&section, &path);
            }
            Err(err) => {
                row.error = Some(err.message);
                return;
            }
        }
        let label = row.label.clone();
        self.status.editing(&label);
        if self.options.auto_validate {
            self.refresh_issues();
        }
    }

    fn on_next(&mut self) {
        if self.rows.iter().any(|row| row.error.is_some()) {
            self.status
                .set_raw("Fix the highlighted fields before continuing");
            return;
        }
        match self.session.next() {
            Ok(NavOutcome::Moved { .. }) => self.entered_section(),
            Ok(NavOutcome::ReadyToSubmit) => {
                self.status.submitting();
                self.submit_pending = true;
            }
            Ok(NavOutcome::Unchanged) => {}
            Err(err) => {
                self.status.set_raw(err.reason());
                self.apply_issues(&err);
            }
        }
    }

    pub(crate) fn submit_now(&mut self) {
        self.submit_pending = false;
        let payload = self.session.payload();
        match self.session.submit(self.submitter) {
            Ok(receipt) => {
                if let Err(err) = self.session.clear_draft() {
                    warn!(error = %err, "submitted but the draft could not be removed");
                }
                self.reload_rows();
                self.status.submitted();
                self.outcome = Some(TuiOutcome::Submitted { receipt, payload });
            }
            Err(SubmissionError::Invalid(err)) => {
                let _ = self.session.jump_to(&err.section);
                self.reload_rows();
                self.status.set_raw(err.reason());
                self.apply_issues(&err);
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                self.status
                    .set_raw(format!("{err}. Your draft is kept; press Ctrl+N to retry."));
            }
        }
    }

    fn on_save(&mut self) {
        match self.session.save_draft() {
            Ok(id) => {
                self.status.draft_saved(&id);
                self.outcome = Some(TuiOutcome::Saved { draft_id: id });
            }
            Err(err) => self.status.set_raw(format!("Could not save draft: {err}")),
        }
    }

    fn on_discard(&mut self) {
        if !self.discard_armed {
            self.discard_armed = true;
            self.status.pending_discard();
            return;
        }
        self.discard_armed = false;
        match self.session.clear_draft() {
            Ok(_) => {
                if matches!(self.outcome, Some(TuiOutcome::Saved { .. })) {
                    self.outcome = None;
                }
                self.reload_rows();
                self.status.discarded();
            }
            Err(err) => self.status.set_raw(format!("Could not discard draft: {err}")),
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.session.state().is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
    }

    fn finish(self) -> TuiOutcome {
        self.outcome.unwrap_or(TuiOutcome::Abandoned)
    }

    fn move_selection(&mut self, delta: i64) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as i64;
        self.selected = (self.selected as i64 + delta).rem_euclid(len) as usize;
        let label = self.rows[self.selected].label.clone();
        self.status.editing(&label);
    }

    fn entered_section(&mut self) {
        self.reload_rows();
        let title = self
            .session
            .flow()
            .section(self.session.active_section())
            .map(|section| section.title.clone())
            .unwrap_or_default();
        self.status.entered_section(&title);
        debug!(section = self.session.active_section(), "section opened");
    }

    fn reload_rows(&mut self) {
        let active = self.session.active_section();
        self.rows = self
            .session
            .flow()
            .section(active)
            .map(|section| section_rows(section, self.session.section_data(active)))
            .unwrap_or_default();
        self.selected = 0;
        self.scroll = 0;
        self.issue_count = 0;
    }

    fn refresh_issues(&mut self) {
        match self.session.validate_current() {
            Ok(()) => {
                self.issue_count = 0;
                for row in &mut self.rows {
                    if row.error.as_deref().is_some_and(is_validation_note) {
                        row.error = None;
                    }
                }
            }
            Err(err) => self.issue_count = err.issues.len(),
        }
    }

    /// Pins validation messages onto the rows they concern.
    fn apply_issues(&mut self, err: &ValidationError) {
        self.issue_count = err.issues.len();
        for issue in &err.issues {
            match issue {
                ValidationIssue::MissingFields(labels) => {
                    for row in &mut self.rows {
                        if labels.contains(&row.label) {
                            row.error = Some(MISSING_NOTE.to_string());
                        }
                    }
                }
                ValidationIssue::InvalidValue { pointer, message } => {
                    if let Some(row) = self
                        .rows
                        .iter_mut()
                        .filter(|row| points_into(pointer, &row.schema.pointer))
                        .max_by_key(|row| row.schema.pointer.len())
                    {
                        row.error = Some(message.clone());
                    }
                }
                ValidationIssue::Rule { .. } => {}
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &OnboardingSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[FieldRow] {
        &self.rows
    }

    #[cfg(test)]
    pub(crate) fn status_message(&self) -> &str {
        self.status.message()
    }

    #[cfg(test)]
    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub(crate) fn is_submit_pending(&self) -> bool {
        self.submit_pending
    }

    #[cfg(test)]
    pub(crate) fn into_outcome(self) -> TuiOutcome {
        self.finish()
    }
}

const MISSING_NOTE: &str = "required";

fn is_validation_note(message: &str) -> bool {
    message == MISSING_NOTE
}

/// Keys pressed while a submission was in flight are dropped.
fn drain_pending_input() -> Result<()> {
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }
    Ok(())
}

/// `pointer` is `field` itself or lies below it, e.g. an array item.
fn points_into(pointer: &str, field: &str) -> bool {
    match pointer.strip_prefix(field) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
