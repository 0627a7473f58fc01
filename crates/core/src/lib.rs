//! Verdict Core
//!
//! Foundational error types for the Verdict verification triage workspace.
//! This crate has zero dependencies on application-level code (CLI, runner,
//! OS probes) and nothing else in the workspace depends on more than it.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};
