use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::check::{CheckResult, check_project};
use crate::cli::args::CheckArgs;
use crate::project::{CheckOptions, Project};

/// Result of checking one project file.
#[derive(Debug)]
pub struct CheckRun {
    /// Display name used in diagnostics.
    pub file: String,
    pub options: CheckOptions,
    pub result: CheckResult,
}

pub fn load_project(path: &Path) -> Result<Project> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project: {}", path.display()))?;
    parse_project(&source).with_context(|| format!("failed to parse project: {}", path.display()))
}

pub fn parse_project(source: &str) -> Result<Project> {
    let project: Project = serde_json::from_str(source)?;
    debug!(
        classes = project.classes.len(),
        functions = project.functions.len(),
        sites = project.sites.len(),
        "project parsed"
    );
    Ok(project)
}

/// Project options with command-line overrides applied.
pub fn resolve_options(project: &CheckOptions, args: &CheckArgs) -> CheckOptions {
    let mut options = project.clone();
    if args.no_parallel {
        options.parallel = false;
    }
    if let Some(max) = args.max_diagnostics {
        options.max_diagnostics = (max > 0).then_some(max);
    }
    if args.pretty.is_some() {
        options.pretty = args.pretty;
    }
    options
}

pub fn run_check(args: &CheckArgs) -> Result<CheckRun> {
    let project = load_project(&args.file)?;
    let options = resolve_options(&project.options, args);
    let file = args.file.display().to_string();

    let result = check_project(&project, &file, &options);
    info!(
        file = %file,
        errors = result.error_count(),
        sites = result.sites_checked,
        "check finished"
    );
    Ok(CheckRun {
        file,
        options,
        result,
    })
}
