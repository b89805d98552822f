//! Domain logic for the document lifecycle service.
//!
//! This crate is free of I/O: it defines the status/action vocabulary and
//! the transition table that governs a document's approval workflow, input
//! normalization, the tenant identifier type, and the shared error taxonomy.

pub mod document;
pub mod error;
pub mod tenant;
pub mod types;
