//! Common utilities and types shared across skillgate crates.

pub mod error;

pub use error::{Error, Result};

/// File name whose presence marks a skill bundle as implemented.
pub const DESCRIPTOR_FILE: &str = "SKILL.md";

/// File name marking a skill bundle as planned when no descriptor exists.
pub const DRAFT_FILE: &str = "init.md";
