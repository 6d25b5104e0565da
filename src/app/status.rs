#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Ready. Ctrl+N continues, Ctrl+S saves a draft.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    pub fn ready(&mut self) {
        self.message = READY_STATUS.to_string();
    }

    pub fn editing(&mut self, label: &str) {
        self.message = format!("Editing {label}");
    }

    pub fn entered_section(&mut self, title: &str) {
        self.message = format!("{title}: fill in the fields, then press Ctrl+N");
    }

    pub fn locked_section(&mut self) {
        self.message = "Finish the current section before jumping ahead".to_string();
    }

    pub fn draft_saved(&mut self, id: &str) {
        self.message = format!("Draft saved as {id}");
    }

    pub fn draft_resumed(&mut self, id: &str) {
        self.message = format!("Continuing draft {id}. Ctrl+D twice starts over.");
    }

    pub fn pending_discard(&mut self) {
        self.message = "Press Ctrl+D again to discard the draft and start over.".to_string();
    }

    pub fn discarded(&mut self) {
        self.message = "Draft discarded".to_string();
    }

    pub fn submitting(&mut self) {
        self.message = "Submitting…".to_string();
    }

    pub fn submitted(&mut self) {
        self.message = "Submitted. Press Ctrl+Q to exit.".to_string();
    }

    pub fn pending_exit(&mut self) {
        self.message = "Unsaved changes. Press Ctrl+Q again to quit without saving.".to_string();
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
