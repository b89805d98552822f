//! Entity models and DTOs.

pub mod document;
pub mod document_action_log;
pub mod document_version;
