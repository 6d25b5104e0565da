use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    domain::FlowSchema,
    draft::{Draft, DraftError, DraftStorage, DraftStore},
    form::{FieldCoercionError, FormState, coerce_input},
    submission::{SubmissionError, SubmitReceipt, Submitter, build_payload},
    validation::{SectionValidator, ValidationError, ValidatorSet},
    wizard::{self, NavOutcome, Navigator, SectionStatus},
};

/// One user's pass through one onboarding flow.
///
/// Owns the section store, the validators derived from the flow document and
/// the draft store, so front ends never reach for global state.
#[derive(Debug)]
pub struct OnboardingSession {
    flow: FlowSchema,
    validators: ValidatorSet,
    state: FormState,
    drafts: DraftStore,
    draft_id: Option<String>,
}

impl OnboardingSession {
    pub fn new(flow: FlowSchema, storage: impl DraftStorage + 'static) -> Result<Self> {
        let drafts = DraftStore::new(flow.id.clone(), storage);
        Self::with_drafts(flow, drafts)
    }

    pub fn with_drafts(flow: FlowSchema, drafts: DraftStore) -> Result<Self> {
        let validators = ValidatorSet::from_flow(&flow)?;
        let state = FormState::from_flow(&flow);
        Ok(Self {
            flow,
            validators,
            state,
            drafts,
            draft_id: None,
        })
    }

    /// Replaces the derived validator of one section, e.g. for checks that
    /// cannot be expressed in the flow document.
    pub fn override_validator(
        &mut self,
        section: impl Into<String>,
        validator: impl SectionValidator + 'static,
    ) {
        self.validators.insert(section, validator);
    }

    pub fn flow(&self) -> &FlowSchema {
        &self.flow
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn draft_id(&self) -> Option<&str> {
        self.draft_id.as_deref()
    }

    pub fn active_section(&self) -> &str {
        self.state.active_section()
    }

    pub fn set_field(&mut self, section: &str, field: &str, value: Value) {
        self.state.set_field(section, field, value);
    }

    pub fn set_field_at(&mut self, section: &str, path: &[&str], value: Value) {
        self.state.set_field_at(section, path, value);
    }

    pub fn clear_field(&mut self, section: &str, path: &[&str]) -> Option<Value> {
        self.state.clear_field(section, path)
    }

    /// Coerces text input to the declared kind of the field at `path` and
    /// stores it. Blank text clears the field.
    pub fn set_input(
        &mut self,
        section: &str,
        path: &[&str],
        raw: &str,
    ) -> Result<(), FieldCoercionError> {
        let field = self
            .flow
            .section(section)
            .and_then(|schema| schema.field_at(path))
            .ok_or_else(|| {
                FieldCoercionError::new(
                    &format!("/{section}/{}", path.join("/")),
                    "unknown field",
                )
            })?;
        match coerce_input(raw, field)? {
            Some(value) => self.state.set_field_at(section, path, value),
            None => {
                self.state.clear_field(section, path);
            }
        }
        Ok(())
    }

    pub fn section_data(&self, section: &str) -> Option<&Map<String, Value>> {
        self.state.section_data(section)
    }

    pub fn next(&mut self) -> Result<NavOutcome, ValidationError> {
        Navigator::new(&mut self.state, &self.validators).next()
    }

    pub fn back(&mut self) -> NavOutcome {
        Navigator::new(&mut self.state, &self.validators).back()
    }

    pub fn jump_to(&mut self, section: &str) -> NavOutcome {
        Navigator::new(&mut self.state, &self.validators).jump_to(section)
    }

    pub fn jump_to_index(&mut self, index: usize) -> NavOutcome {
        Navigator::new(&mut self.state, &self.validators).jump_to_index(index)
    }

    pub fn validate_current(&self) -> Result<(), ValidationError> {
        let section = self.state.active_section();
        self.validators
            .validate(section, self.state.section_data(section))
    }

    pub fn validate_all(&self) -> Result<(), ValidationError> {
        wizard::validate_all(&self.state, &self.validators)
    }

    pub fn section_status(&self) -> Vec<SectionStatus> {
        wizard::section_status(&self.state, &self.validators)
    }

    /// Persists the current values and cursor, reusing the session's draft
    /// id once one exists.
    pub fn save_draft(&mut self) -> Result<String, DraftError> {
        let draft = self.drafts.save(self.draft_id.as_deref(), &self.state)?;
        self.state.mark_saved();
        self.draft_id = Some(draft.id.clone());
        Ok(draft.id)
    }

    /// Returns `false` when no such draft exists; the wizard then holds the
    /// flow's defaults.
    pub fn load_draft(&mut self, id: &str) -> Result<bool, DraftError> {
        match self.drafts.load(id)? {
            Some(draft) => {
                self.apply(&draft);
                Ok(true)
            }
            None => {
                self.state.reset();
                self.draft_id = None;
                Ok(false)
            }
        }
    }

    pub fn active_draft(&self) -> Result<Option<Draft>, DraftError> {
        self.drafts.active()
    }

    /// "Continue where you left off": loads the flow's active draft if any.
    pub fn resume_active(&mut self) -> Result<bool, DraftError> {
        match self.drafts.active()? {
            Some(draft) => {
                self.apply(&draft);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forgets the persisted draft and starts over from the flow's defaults.
    /// Without a loaded draft the flow's active one is removed, undecoded, so
    /// an unreadable draft can still be discarded. Reports whether anything
    /// was stored. A submitted session stays submitted.
    pub fn clear_draft(&mut self) -> Result<bool, DraftError> {
        let id = match self.draft_id.take() {
            Some(id) => Some(id),
            None => self.drafts.active_id()?,
        };
        let removed = match &id {
            Some(id) => self.drafts.remove(id)?,
            None => false,
        };
        let submitted = self.state.is_submitted();
        self.state.reset();
        if submitted {
            self.state.mark_submitted();
        }
        debug!(flow = %self.flow.id, removed, "draft cleared");
        Ok(removed)
    }

    pub fn payload(&self) -> Value {
        build_payload(&self.flow, self.state.values())
    }

    /// Validates every section, then hands the payload to `submitter`. The
    /// state is marked submitted only on success; the draft is left for the
    /// caller to clear.
    pub fn submit(&mut self, submitter: &dyn Submitter) -> Result<SubmitReceipt, SubmissionError> {
        if self.state.is_submitted() {
            return Err(SubmissionError::AlreadySubmitted);
        }
        self.validate_all()?;
        let payload = self.payload();
        let endpoint = self.flow.endpoint.as_deref().unwrap_or("/");
        let receipt = submitter.submit(endpoint, &payload)?;
        self.state.mark_submitted();
        info!(flow = %self.flow.id, status = receipt.status, "onboarding submitted");
        Ok(receipt)
    }

    fn apply(&mut self, draft: &Draft) {
        draft.apply_to(&mut self.state);
        self.draft_id = Some(draft.id.clone());
        debug!(
            flow = %self.flow.id,
            id = %draft.id,
            section = self.state.active_section(),
            "draft loaded"
        );
    }
}
