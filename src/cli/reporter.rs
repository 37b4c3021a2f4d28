use colored::Colorize;
use serde::Serialize;
use templar_common::diagnostics::{Diagnostic, DiagnosticCategory};

use crate::check::CheckResult;

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// `project.json:120 - error TPL1005: Type int ...`
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        if diagnostic.file.is_empty() {
            output.push_str("<unknown>");
        } else {
            output.push_str(&format!("{}:{}", diagnostic.file, diagnostic.start));
        }

        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);
        output
    }

    /// Closing line of a text report.
    pub fn summary(&self, result: &CheckResult) -> String {
        let errors = result.error_count();
        let mut line = match errors {
            0 => format!("No errors in {} sites.", result.sites_checked),
            1 => format!("Found 1 error in {} sites.", result.sites_checked),
            n => format!("Found {} errors in {} sites.", n, result.sites_checked),
        };
        if result.suppressed > 0 {
            line.push_str(&format!(" {} not shown.", result.suppressed));
        }

        if !self.color {
            return line;
        }
        if errors == 0 {
            line.green().to_string()
        } else {
            line.bold().to_string()
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Message => "message",
        };

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("TPL{}", code);
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    result: &'a CheckResult,
    error_count: usize,
}

/// Machine-readable report of one checking run.
pub fn render_json(file: &str, result: &CheckResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        file,
        result,
        error_count: result.error_count(),
    })
}
