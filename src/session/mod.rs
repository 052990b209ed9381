//! Session module
//!
//! Holds the per-session state slots (`extracted_text`, `keyword`) and the
//! in-memory store that keeps them between interactions.

mod store;
mod types;

pub use store::SessionStore;
pub use types::{Phase, Session, SessionSnapshot};
