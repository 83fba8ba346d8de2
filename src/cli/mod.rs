//! Command-line workflow, separated from argument parsing

pub mod orchestration;

pub use orchestration::{
    apply_update, load_releases, load_risk_summary, plan_update, render_body, run_update, UpdatePlan,
    UpdateWorkflowArgs, WorkflowResult,
};
