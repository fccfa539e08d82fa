//! Domain records for users, projects and tasks.
//!
//! # Responsibility
//! - Define persisted entity shapes and their validated insert inputs.
//! - Model partial updates as explicit optional-field patch structs.
//!
//! # Invariants
//! - Identifiers are assigned by storage, increase monotonically and are
//!   never reused after deletion.

pub mod project;
pub mod task;
pub mod user;
