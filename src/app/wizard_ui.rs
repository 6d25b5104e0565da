use anyhow::Result;

use crate::{
    io::OutputOptions,
    session::OnboardingSession,
    submission::{OutputSubmitter, Submitter},
};

use super::{
    options::UiOptions,
    runtime::{App, TuiOutcome},
};

/// Terminal front end for one [`OnboardingSession`].
pub struct WizardUI {
    session: OnboardingSession,
    options: UiOptions,
    submitter: Box<dyn Submitter>,
}

impl WizardUI {
    /// Until a submitter is set, submitting only hands the payload back in
    /// [`TuiOutcome::Submitted`]; stdout belongs to the terminal UI.
    pub fn new(session: OnboardingSession) -> Self {
        let silent = OutputOptions::default().with_destinations(Vec::new());
        Self {
            session,
            options: UiOptions::default(),
            submitter: Box::new(OutputSubmitter::new(silent)),
        }
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_submitter(mut self, submitter: Box<dyn Submitter>) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn run(self) -> Result<TuiOutcome> {
        let WizardUI {
            session,
            options,
            submitter,
        } = self;

        let mut app = App::new(session, submitter.as_ref(), options);
        app.resume();
        app.run()
    }
}

impl std::fmt::Debug for WizardUI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardUI")
            .field("flow", &self.session.flow().id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
