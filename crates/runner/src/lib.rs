//! Skillgate runner: discovery, batch execution and aggregation.
//!
//! Batch runs process bundles in canonical identifier order. The optional
//! worker pool and the interactive worker both produce the same report,
//! re-sorted before it is built.

pub mod batch;
pub mod discovery;
pub mod overview;
pub mod worker;

pub use batch::{aggregate, execute, inspect, run_batch, run_observed, run_parallel, BatchOptions, Outcome};
pub use discovery::{classify, discover, Candidate, Classification, DiscoveryMode};
pub use overview::{pending_overview, phase_overview, PhaseOverview, PhaseSkill, SkillStatus};
pub use worker::{spawn_validation, CancelToken, WorkerMessage};
