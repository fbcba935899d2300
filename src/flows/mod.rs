//! Flows module - operations combining the workbook, the corpus and the sweep
//!
//! Provides:
//! - analyse: list workbook sheets, scan the corpus for every target set
//! - rename: apply rename sheets, optionally inside a git branch/commit/push

pub mod analyse;
pub mod rename;
