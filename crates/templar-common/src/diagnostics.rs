//! Diagnostic types and stable codes for the checker.

use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

/// A checking diagnostic attached to one site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Stable diagnostic codes, one per error kind.
pub mod diagnostic_codes {
    pub const ARGUMENT_COUNT_MISMATCH: u32 = 1001;
    pub const TYPE_MISMATCH: u32 = 1002;
    pub const UNDERCONSTRAINED_TEMPLATE: u32 = 1003;
    pub const INCONSISTENT_TEMPLATE: u32 = 1004;
    pub const BOUND_VIOLATION: u32 = 1005;
    pub const VARIANCE_VIOLATION: u32 = 1006;
    pub const UNKNOWN_TEMPLATE: u32 = 2001;
    pub const DUPLICATE_TEMPLATE: u32 = 2002;
    pub const UNKNOWN_CLASS: u32 = 2003;
    pub const TYPE_ARGUMENT_COUNT: u32 = 2004;
    pub const UNKNOWN_DECLARATION: u32 = 2005;
    pub const UNKNOWN_METHOD: u32 = 2006;
    pub const EMPTY_UNION: u32 = 2007;
    pub const INVALID_INHERITANCE: u32 = 2008;
}

/// Replace `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
