pub mod builtins;
pub mod diag;
pub mod expr;
pub mod planner;
pub mod project;
pub mod template;

pub use builtins::value::Value;
pub use builtins::{evaluate_builtin, evaluate_builtin_json};
pub use diag::{Diagnostic, HostError, Severity};
pub use planner::plan::{create_execution_plan, Plan};
pub use project::discovery::discover_project_files;
pub use project::loader::{load_project, parse_template};
pub use project::types::{ProjectFiles, ProjectInfo, TemplateSummary};
pub use template::jinja::{
    has_jinja_blocks, preprocess_jinja, strip_jinja_blocks, validate_jinja, JinjaContext,
};
