//! Pipeline orchestration
//!
//! This module sequences a run:
//! - Cross-reference build
//! - The four table loads
//! - Aggregate population and duplicate removal
//! - Final-count verification

pub mod coordinator;
pub mod summary;

pub use coordinator::PipelineCoordinator;
pub use summary::{PipelineStage, PipelineSummary, StageFailure, XrefStats};
