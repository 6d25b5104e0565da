#![deny(rust_2018_idioms)]

//! Multi-step onboarding wizards driven by flow documents: section-gated
//! validation, resumable drafts and API payload mapping, with a terminal
//! front end on top.

pub mod app;
pub mod config;
pub mod domain;
pub mod draft;
pub mod flows;
pub mod form;
pub mod io;
mod presentation;
mod schema;
pub mod session;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use app::{TuiOutcome, UiOptions, WizardUI};
pub use config::OnboardConfig;
pub use domain::{FlowSchema, parse_flow_schema};
pub use draft::{Draft, DraftError, DraftStorage, DraftStore, FileStorage, MemoryStorage};
pub use flows::{BuiltinFlow, resolve_flow};
pub use form::{FieldCoercionError, FormState};
pub use io::{DocumentFormat, OutputDestination, OutputOptions};
pub use session::OnboardingSession;
pub use submission::{HttpSubmitter, OutputSubmitter, SubmissionError, SubmitReceipt, Submitter};
pub use validation::{SectionValidator, ValidationError, ValidationIssue};
pub use wizard::{NavOutcome, SectionStatus};

pub mod prelude {
    pub use super::{
        BuiltinFlow, NavOutcome, OnboardConfig, OnboardingSession, Submitter, UiOptions,
        ValidationError, WizardUI,
    };
}
