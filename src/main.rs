use std::path::PathBuf;

/// Reset SIGPIPE to default behavior so piping (e.g. `yamlhost graph | dot`)
/// exits cleanly instead of panicking on broken pipe.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod builtins;
mod diag;
mod expr;
mod planner;
mod project;
mod template;

use planner::graph::{build_symbol_graph, to_dot};
use planner::plan::create_execution_plan;
use project::discovery::discover_project_files;
use project::loader::{load_project, load_project_full, parse_template};
use template::jinja::JinjaContext;

/// yamlhost - language host for declarative YAML infrastructure templates
#[derive(Parser)]
#[command(name = "yamlhost", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single template file and print its summary
    Parse {
        /// Path to a template file
        file: PathBuf,
    },

    /// Discover the files making up a project directory
    Discover {
        /// Path to the project directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Load a project directory and print its merged summary
    Load {
        /// Path to the project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Template context entries, key=value (repeatable)
        #[arg(short = 'x', long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },

    /// Load a project directory and print its execution plan
    Plan {
        /// Path to the project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Template context entries, key=value (repeatable)
        #[arg(short = 'x', long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },

    /// Print the symbol dependency graph in DOT format
    Graph {
        /// Path to the project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Template context entries, key=value (repeatable)
        #[arg(short = 'x', long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },

    /// Render a template file's preprocessing pass and print the result
    Render {
        /// Path to a template file
        file: PathBuf,

        /// Template context entries, key=value (repeatable)
        #[arg(short = 'x', long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },

    /// Evaluate a builtin function against a JSON argument
    Eval {
        /// Builtin name (e.g. toBase64)
        name: String,

        /// JSON-encoded argument
        arg: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid context entry '{}', expected key=value", s))
}

fn context_map(entries: Vec<(String, String)>) -> Option<JinjaContext> {
    if entries.is_empty() {
        None
    } else {
        Some(entries.into_iter().collect())
    }
}

fn main() {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(err) = run(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Parse { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read template file: {}", file.display()))?;
            let summary = parse_template(&text);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Discover { dir } => {
            let files = discover_project_files(&dir)?;
            println!("{}", serde_json::to_string_pretty(&files)?);
        }
        Commands::Load { dir, context } => {
            let ctx = context_map(context);
            let info = load_project(&dir, ctx.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Plan { dir, context } => {
            let ctx = context_map(context);
            let plan = create_execution_plan(&dir, ctx.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&plan.to_json())?);
        }
        Commands::Graph { dir, context } => {
            let ctx = context_map(context);
            let (project, _) = load_project_full(&dir, ctx.as_ref())?;
            let mut diags = Vec::new();
            let info = build_symbol_graph(&project, &mut diags);
            println!("{}", to_dot(&info));
        }
        Commands::Render { file, context } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read template file: {}", file.display()))?;
            let ctx = context_map(context).unwrap_or_default();
            let name = file.display().to_string();
            let rendered = template::jinja::preprocess_jinja(&text, &name, &ctx)?;
            print!("{}", rendered);
        }
        Commands::Eval { name, arg } => {
            let arg: serde_json::Value = serde_json::from_str(&arg)
                .with_context(|| format!("argument is not valid JSON: {}", arg))?;
            let result = builtins::evaluate_builtin_json(&name, &arg)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
