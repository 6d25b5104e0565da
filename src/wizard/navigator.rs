use tracing::debug;

use crate::{
    form::FormState,
    validation::{ValidationError, ValidatorSet},
};

use super::actions::WizardCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { from: usize, to: usize },
    /// `next()` passed on the last section; the caller should submit.
    ReadyToSubmit,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStatus {
    pub id: String,
    pub index: usize,
    pub active: bool,
    pub reachable: bool,
    pub valid: bool,
}

/// Moves the cursor of a `FormState`, gating forward moves on the section
/// validators and sidebar jumps on the furthest step reached.
pub struct Navigator<'a> {
    state: &'a mut FormState,
    validators: &'a ValidatorSet,
}

impl<'a> Navigator<'a> {
    pub fn new(state: &'a mut FormState, validators: &'a ValidatorSet) -> Self {
        Self { state, validators }
    }

    pub fn dispatch(&mut self, command: WizardCommand) -> Result<NavOutcome, ValidationError> {
        match command {
            WizardCommand::Next => self.next(),
            WizardCommand::Back => Ok(self.back()),
            WizardCommand::JumpTo(section) => Ok(self.jump_to(&section)),
        }
    }

    pub fn next(&mut self) -> Result<NavOutcome, ValidationError> {
        if self.state.is_submitted() || self.state.section_count() == 0 {
            return Ok(NavOutcome::Unchanged);
        }
        self.validate_current().inspect_err(|err| {
            debug!(
                section = self.state.active_section(),
                reason = %err.reason(),
                "forward navigation blocked"
            );
        })?;

        let from = self.state.active_index();
        if from + 1 >= self.state.section_count() {
            debug!(section = self.state.active_section(), "last section valid");
            return Ok(NavOutcome::ReadyToSubmit);
        }
        let to = from + 1;
        self.move_to(to);
        if to > self.state.furthest_step() {
            self.state.set_furthest_step(to);
        }
        debug!(from, to, furthest = self.state.furthest_step(), "advanced");
        Ok(NavOutcome::Moved { from, to })
    }

    pub fn back(&mut self) -> NavOutcome {
        let from = self.state.active_index();
        if self.state.is_submitted() || from == 0 {
            return NavOutcome::Unchanged;
        }
        let to = from - 1;
        self.move_to(to);
        debug!(from, to, "moved back");
        NavOutcome::Moved { from, to }
    }

    /// Sidebar navigation: only sections up to the furthest step are
    /// reachable; anything else leaves the state untouched.
    pub fn jump_to(&mut self, section: &str) -> NavOutcome {
        match self.state.index_of(section) {
            Some(index) => self.jump_to_index(index),
            None => NavOutcome::Unchanged,
        }
    }

    pub fn jump_to_index(&mut self, index: usize) -> NavOutcome {
        let from = self.state.active_index();
        if self.state.is_submitted() || index == from {
            return NavOutcome::Unchanged;
        }
        if !self.state.is_reachable(index) {
            debug!(index, furthest = self.state.furthest_step(), "jump refused");
            return NavOutcome::Unchanged;
        }
        self.move_to(index);
        debug!(from, to = index, "jumped");
        NavOutcome::Moved { from, to: index }
    }

    pub fn validate_current(&self) -> Result<(), ValidationError> {
        let section = self.state.active_section();
        self.validators
            .validate(section, self.state.section_data(section))
    }

    pub fn validate_all(&self) -> Result<(), ValidationError> {
        validate_all(self.state, self.validators)
    }

    pub fn section_status(&self) -> Vec<SectionStatus> {
        section_status(self.state, self.validators)
    }

    fn move_to(&mut self, index: usize) {
        let Some(id) = self.state.section_ids().get(index).cloned() else {
            return;
        };
        self.state.set_active_section(&id);
    }
}

/// Checks every section in wizard order and returns the first failure.
pub fn validate_all(state: &FormState, validators: &ValidatorSet) -> Result<(), ValidationError> {
    for section in state.section_ids() {
        validators.validate(section, state.section_data(section))?;
    }
    Ok(())
}

/// Sidebar view of the wizard: reachability and validity per section.
pub fn section_status(state: &FormState, validators: &ValidatorSet) -> Vec<SectionStatus> {
    state
        .section_ids()
        .iter()
        .enumerate()
        .map(|(index, id)| SectionStatus {
            id: id.clone(),
            index,
            active: index == state.active_index(),
            reachable: state.is_reachable(index),
            valid: validators.validate(id, state.section_data(id)).is_ok(),
        })
        .collect()
}
