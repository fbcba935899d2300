//! Backends module - filesystem and external tool integrations
//!
//! Provides:
//! - corpus: SQL file discovery with the ignore crate
//! - vcs: git branch/commit/push through an injectable runner
//! - doctor: Dependency checking

pub mod corpus;
pub mod doctor;
pub mod vcs;
