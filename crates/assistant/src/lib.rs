//! Assistant backend client - chat and document-upload inference.
//!
//! This crate is the single source of truth for the collaborator contract:
//! send a message or a document, get back prose plus an optional structured
//! field update. The engine only ever sees completed responses.
//!
//! No retries. No state. A failed call leaves nothing to clean up.

mod client;

pub use client::{Assistant, AssistantError, HttpAssistant};
