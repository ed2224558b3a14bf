//! # Entry Point Generator
//!
//! Renders the ANGLE entry point layer for GLES, EGL and OpenCL from
//! normalized registry models: exported entry points, validation and
//! context prototypes, frame capture and replay sources, the global entry
//! point enumeration and the Windows export lists.
//!
//! ## Run Invariants
//!
//! 1. **Policies First**: every command of every API is classified against
//!    the declared policy rules before a single artifact is rendered. A
//!    conflicting or unsatisfiable rule aborts the run with no output.
//!
//! 2. **One Definition per Canonical Name**: an extension command whose
//!    suffix-stripped name an earlier extension already defined is replaced
//!    by an "already defined" marker and left out of every export list.
//!
//! 3. **Tag Totality**: each capture tag a capture method references is
//!    registered, and the frame capture utilities enumerate exactly the
//!    registered tags.
//!
//! 4. **Deterministic Output**: the same inputs render byte-identical files,
//!    each starting with the generated-file marker.

pub mod capture;
pub mod capture_utils;
pub mod config;
pub mod entry_points;
pub mod error;
pub mod exports;
pub mod model;
pub mod names;
pub mod output;
pub mod param_types;
pub mod pipeline;
pub mod policy;
pub mod registry;
pub mod replay;
pub mod signature;
pub mod templates;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
mod output_tests;
#[cfg(test)]
mod pipeline_tests;

pub use config::GeneratorConfig;
pub use error::{GeneratorError, Result};
pub use output::OutputSet;
pub use pipeline::generate;
