//! Project loading: discovery → preprocessing → parse → merge, producing
//! the merged [`Project`] the planner consumes.

use std::path::Path;

use anyhow::{Context, Result};

use super::discovery::discover_project_files;
use super::merger::merge_document;
use super::types::{Project, ProjectInfo, TemplateSummary};
use crate::template::jinja::{
    has_jinja_blocks, has_jinja_syntax, preprocess_jinja, strip_jinja_blocks, JinjaContext,
};
use crate::template::parser::parse_document;

/// Analyze a single template text without touching the filesystem. Block
/// tags are stripped (analysis cannot render); expression lines survive.
pub fn parse_template(text: &str) -> TemplateSummary {
    let mut project = Project::default();
    let text = if has_jinja_blocks(text) {
        strip_jinja_blocks(text)
    } else {
        text.to_string()
    };
    if let Some(doc) = parse_document(&text, "", &mut project.diagnostics) {
        merge_document(&mut project, &doc, "", true);
    }
    project.summary()
}

/// Load and merge a project directory. Returns the merged project plus the
/// number of files read.
pub fn load_project_full(dir: &Path, ctx: Option<&JinjaContext>) -> Result<(Project, usize)> {
    let files = discover_project_files(dir)?;
    let mut project = Project::default();

    let mut paths = Vec::with_capacity(files.file_count);
    paths.push(files.main_file.clone());
    paths.extend(files.additional_files.iter().cloned());

    for (index, path) in paths.iter().enumerate() {
        let is_main = index == 0;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template file: {}", path))?;

        // Preprocessing runs iff a context was supplied and the text
        // contains any templating; its failure is fatal at this boundary.
        let text = match ctx {
            Some(ctx) if has_jinja_syntax(&text) => preprocess_jinja(&text, path, ctx)
                .with_context(|| format!("failed to preprocess template: {}", path))?,
            _ => text,
        };

        if let Some(doc) = parse_document(&text, path, &mut project.diagnostics) {
            merge_document(&mut project, &doc, path, is_main);
        }
    }

    tracing::info!(
        files = files.file_count,
        resources = project.resources.len(),
        variables = project.variables.len(),
        outputs = project.outputs.len(),
        diagnostics = project.diagnostics.len(),
        "loaded project"
    );

    Ok((project, files.file_count))
}

/// Load a project directory and summarize it for external callers.
pub fn load_project(dir: &Path, ctx: Option<&JinjaContext>) -> Result<ProjectInfo> {
    let (project, file_count) = load_project_full(dir, ctx)?;
    Ok(project.info(file_count))
}
