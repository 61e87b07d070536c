//! Progress module for tracking multi-step operations
//!
//! Every façade call allocates one [`ProgressLog`] and appends one
//! [`StepRecord`] per sub-fetch. The [`ProgressTree`] blends step progress
//! into a single weighted percentage, notifies registered observers, and
//! keeps the history of every operation for later inspection.

mod record;
mod tree;

pub use record::{ProgressLog, StepRecord};
pub use tree::{Observer, ObserverId, OperationHandle, ProgressTree, StepHandle};
