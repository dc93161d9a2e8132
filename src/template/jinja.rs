//! Template-text preprocessing: a Jinja sublanguage rendered over the raw
//! text before YAML parsing. Expressions (`{{ … }}`) look up caller-supplied
//! context keys; blocks (`{% for %}`, `{% if %}`) expand structurally.

use std::collections::HashMap;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use crate::diag::HostError;

/// The caller-supplied render context: a flat string→string map. Dotted
/// keys (`config.env`) become nested lookups in the template namespace.
pub type JinjaContext = HashMap<String, String>;

/// True iff the text contains any `{% … %}` block tag.
pub fn has_jinja_blocks(text: &str) -> bool {
    text.contains("{%")
}

/// True iff the text contains any templating at all (blocks or `{{ … }}`
/// expressions). Decides whether a file needs preprocessing.
pub fn has_jinja_syntax(text: &str) -> bool {
    text.contains("{%") || text.contains("{{")
}

/// Remove every line carrying a block tag, keeping expression lines. Used
/// by analysis passes that cannot render. Idempotent.
pub fn strip_jinja_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.contains("{%") {
            continue;
        }
        out.push_str(line);
    }
    out
}

/// Syntax-check the template without rendering: block tags must balance.
pub fn validate_jinja(text: &str, filename: &str) -> Result<(), HostError> {
    let env = environment();
    env.template_from_str(text)
        .map(|_| ())
        .map_err(|err| HostError::UnbalancedBlocks {
            file: filename.to_string(),
            message: err.to_string(),
        })
}

/// Fully render the template against the context. Unknown keys fail with
/// `UnknownTemplateKey`; malformed block structure with `UnbalancedBlocks`.
pub fn preprocess_jinja(
    text: &str,
    filename: &str,
    ctx: &JinjaContext,
) -> Result<String, HostError> {
    let env = environment();
    env.render_str(text, build_context(ctx))
        .map_err(|err| match err.kind() {
            ErrorKind::UndefinedError => HostError::UnknownTemplateKey {
                file: filename.to_string(),
                message: err.to_string(),
            },
            _ => HostError::UnbalancedBlocks {
                file: filename.to_string(),
                message: err.to_string(),
            },
        })
}

fn environment<'a>() -> Environment<'a> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

/// Expand the flat context into the template namespace: dotted keys split
/// into nested objects, and the conventional `pulumi_project` /
/// `pulumi_stack` aliases mirror `project_name` / `stack_name`.
fn build_context(ctx: &JinjaContext) -> serde_json::Value {
    let mut root = serde_json::Map::new();
    for (key, value) in ctx {
        insert_dotted(&mut root, key, value);
    }
    if let Some(project) = ctx.get("project_name") {
        root.entry("pulumi_project".to_string())
            .or_insert_with(|| serde_json::Value::String(project.clone()));
    }
    if let Some(stack) = ctx.get("stack_name") {
        root.entry("pulumi_stack".to_string())
            .or_insert_with(|| serde_json::Value::String(stack.clone()));
    }
    serde_json::Value::Object(root)
}

fn insert_dotted(root: &mut serde_json::Map<String, serde_json::Value>, key: &str, value: &str) {
    let mut segments = key.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(
                segment.to_string(),
                serde_json::Value::String(value.to_string()),
            );
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            *entry = serde_json::Value::Object(serde_json::Map::new());
        }
        current = entry.as_object_mut().unwrap();
    }
}
