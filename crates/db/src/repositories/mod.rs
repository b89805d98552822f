//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async read methods that
//! accept `&PgPool` and an explicit [`atrium_core::tenant::Tenant`] naming
//! the schema to query. All mutations go through the workflow module so the
//! state machine stays the single authority over `status`/`current_version`.

pub mod action_log_repo;
pub mod document_repo;
pub mod document_version_repo;

pub use action_log_repo::ActionLogRepo;
pub use document_repo::DocumentRepo;
pub use document_version_repo::DocumentVersionRepo;
