pub(crate) mod input;
mod options;
mod runtime;
mod status;
mod terminal;
mod wizard_ui;

pub use options::UiOptions;
pub use runtime::TuiOutcome;
pub use wizard_ui::WizardUI;

#[cfg(test)]
pub(crate) use runtime::App;
