//! Workflow tracking and orchestration

pub mod orchestrator;
pub mod record;
pub mod registry;

pub use orchestrator::{MockFeedbackItem, Orchestrator, WorkflowRequest};
pub use record::{AnalysisResult, StepEntry, StepType, WorkflowRecord};
pub use registry::{spawn_sweeper, WorkflowHandle, WorkflowRegistry};
