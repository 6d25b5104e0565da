mod error;
mod storage;
mod store;

pub use error::DraftError;
pub use storage::{DraftStorage, FileStorage, MemoryStorage};
pub use store::{DEFAULT_QUOTA_BYTES, Draft, DraftStore, generate_draft_id};
