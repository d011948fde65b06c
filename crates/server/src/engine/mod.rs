//! Automation engines.
//!
//! - [`evaluator`]: the condition evaluator shared by every engine
//! - [`workflow`]: on-demand multi-step workflow execution
//! - [`rules`]: reactive rules triggered by document changes
//! - [`points`]: condition-gated point scoring

pub mod evaluator;
pub mod points;
pub mod rules;
pub mod workflow;

pub use evaluator::{evaluate, evaluate_conditions, Condition, LogicOp, Operator};
pub use points::{AppliedRule, PointsEngine, PointsOutcome, PointsRule};
pub use rules::{RuleDefinition, RuleEngine};
pub use workflow::{
    ExecutionResult, RunStatus, StepKind, StepSpec, StepStatus, WorkflowDefinition,
    WorkflowEngine, WorkflowStatus,
};
