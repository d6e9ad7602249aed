//! Streaming signal-processing core for the BCI motion-control platform.
//!
//! A live sequence of timestamped samples is pushed through ordered
//! pipelines of stateful filter and detector stages into bounded,
//! evicting windows read by the decision and visualization layers.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod stream;
pub mod telemetry;

pub use prelude::{Sample, Stage, StageError, StageResult, Tap};
