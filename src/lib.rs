//! Purpose: Single-handle access to newline-delimited JSON files.
//! Exports: `file` (accessor), `report` (failure events), `error` (error modeling).
//! Role: Thin synchronous wrapper over OS file primitives plus per-line decode.
//! Invariants: Failures cross the crate boundary as booleans/options, never as errors.
//! Invariants: Unexpected read failures go to an injected `Reporter`, not a hidden global.
pub mod error;
pub mod file;
pub mod report;

pub use error::{Error, ErrorKind};
pub use file::{LineJsonFile, Mode, Record};
pub use report::{FailureEvent, Reporter, TracingReporter, failure_event_json};
