use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::form::{FormState, SectionValues};

use super::{error::DraftError, storage::DraftStorage};

/// Roughly what browsers grant a single origin in local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// A persisted, possibly incomplete snapshot of one flow's field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub flow: String,
    pub saved_at: DateTime<Utc>,
    pub sections: SectionValues,
    #[serde(default)]
    pub active_section: Option<String>,
    #[serde(default)]
    pub furthest_step: usize,
}

impl Draft {
    pub fn capture(id: impl Into<String>, flow: impl Into<String>, state: &FormState) -> Self {
        Self {
            id: id.into(),
            flow: flow.into(),
            saved_at: Utc::now(),
            sections: state.values().clone(),
            active_section: Some(state.active_section().to_string())
                .filter(|section| !section.is_empty()),
            furthest_step: state.furthest_step(),
        }
    }

    /// Loads the snapshot into `state`. The cursor is restored too, clamped
    /// so the active section never sits beyond the furthest step.
    pub fn apply_to(&self, state: &mut FormState) {
        state.reset();
        state.replace_values(self.sections.clone());
        state.set_furthest_step(self.furthest_step);
        let furthest = state.furthest_step();
        let target = self
            .active_section
            .as_deref()
            .and_then(|section| state.index_of(section))
            .map(|index| index.min(furthest))
            .and_then(|index| state.section_ids().get(index).cloned());
        if let Some(section) = target {
            state.set_active_section(&section);
        }
    }
}

pub fn generate_draft_id(flow: &str) -> String {
    format!("{flow}-{}", Utc::now().timestamp_millis())
}

/// Drafts of one flow over a `DraftStorage`. At most one draft per flow is
/// "active"; last write wins.
#[derive(Debug)]
pub struct DraftStore {
    storage: Box<dyn DraftStorage>,
    flow: String,
    quota: usize,
}

impl DraftStore {
    pub fn new(flow: impl Into<String>, storage: impl DraftStorage + 'static) -> Self {
        Self::from_boxed(flow, Box::new(storage))
    }

    pub fn from_boxed(flow: impl Into<String>, storage: Box<dyn DraftStorage>) -> Self {
        Self {
            storage,
            flow: flow.into(),
            quota: DEFAULT_QUOTA_BYTES,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn flow(&self) -> &str {
        &self.flow
    }

    /// Writes `state` under `id` (or a fresh id) and marks it as the flow's
    /// active draft. No validation happens here.
    pub fn save(&mut self, id: Option<&str>, state: &FormState) -> Result<Draft, DraftError> {
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| generate_draft_id(&self.flow));
        let draft = Draft::capture(id, self.flow.clone(), state);
        let encoded = serde_json::to_string(&draft).map_err(DraftError::Encode)?;
        let key = draft_key(&draft.id);
        if encoded.len() > self.quota {
            return Err(DraftError::QuotaExceeded {
                key,
                size: encoded.len(),
                quota: self.quota,
            });
        }
        self.write(&key, &encoded)?;
        self.write(&active_key(&self.flow), &draft.id)?;
        debug!(flow = %self.flow, id = %draft.id, bytes = encoded.len(), "draft saved");
        Ok(draft)
    }

    /// A missing draft, or one saved by another flow, is `Ok(None)`.
    pub fn load(&self, id: &str) -> Result<Option<Draft>, DraftError> {
        let key = draft_key(id);
        let Some(raw) = self.read(&key)? else {
            debug!(flow = %self.flow, id, "no draft stored");
            return Ok(None);
        };
        let draft: Draft =
            serde_json::from_str(&raw).map_err(|source| DraftError::Decode { key, source })?;
        if draft.flow != self.flow {
            warn!(expected = %self.flow, found = %draft.flow, id, "draft belongs to another flow");
            return Ok(None);
        }
        Ok(Some(draft))
    }

    pub fn active_id(&self) -> Result<Option<String>, DraftError> {
        Ok(self
            .read(&active_key(&self.flow))?
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    /// The draft to offer as "continue where you left off", if any.
    pub fn active(&self) -> Result<Option<Draft>, DraftError> {
        match self.active_id()? {
            Some(id) => self.load(&id),
            None => Ok(None),
        }
    }

    /// Deletes the entry and, when it is the active one, the active pointer.
    /// The entry is never decoded. Reports whether an entry or pointer
    /// existed.
    pub fn remove(&mut self, id: &str) -> Result<bool, DraftError> {
        let key = draft_key(id);
        let existed = self.read(&key)?.is_some();
        self.storage
            .remove(&key)
            .map_err(|source| DraftError::Storage { key, source })?;
        let was_active = self.active_id()?.as_deref() == Some(id);
        if was_active {
            let pointer = active_key(&self.flow);
            self.storage
                .remove(&pointer)
                .map_err(|source| DraftError::Storage {
                    key: pointer,
                    source,
                })?;
        }
        debug!(flow = %self.flow, id, "draft removed");
        Ok(existed || was_active)
    }

    fn read(&self, key: &str) -> Result<Option<String>, DraftError> {
        self.storage.get(key).map_err(|source| DraftError::Storage {
            key: key.to_string(),
            source,
        })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        self.storage
            .set(key, value)
            .map_err(|source| DraftError::Storage {
                key: key.to_string(),
                source,
            })
    }
}

fn draft_key(id: &str) -> String {
    format!("draft:{id}")
}

fn active_key(flow: &str) -> String {
    format!("draft-active:{flow}")
}
