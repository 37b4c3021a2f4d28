//! Project file model.
//!
//! A project is a JSON document listing already-parsed declarations and the
//! sites to check against them:
//!
//! ```json
//! {
//!   "options": { "parallel": true, "maxDiagnostics": 50 },
//!   "classes": [
//!     { "name": "Collection", "templates": [{ "name": "T" }],
//!       "methods": [{ "name": "get", "return": "T" }] },
//!     { "name": "IntList", "extends": [{ "of": "Collection", "args": ["int"] }] }
//!   ],
//!   "functions": [
//!     { "name": "first", "templates": [{ "name": "T" }],
//!       "params": [{ "name": "items", "type": { "of": "array", "args": ["T"] } }],
//!       "return": { "union": ["T", "null"] } }
//!   ],
//!   "sites": [
//!     { "kind": "call", "function": "first", "args": [{ "of": "array", "args": ["int"] }] }
//!   ]
//! }
//! ```
//!
//! Type expressions are structured: a bare string names a template visible
//! in the enclosing scope or else a class, `{"of", "args"}` applies a generic
//! and `{"union"}` lists union members.

use serde::{Deserialize, Serialize};
use templar_common::limits::DEFAULT_MAX_DIAGNOSTICS;

fn default_true() -> bool {
    true
}

fn default_max_diagnostics() -> Option<usize> {
    Some(DEFAULT_MAX_DIAGNOSTICS)
}

/// Checking options, read from the project's `options` block and
/// overridable from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOptions {
    /// Check independent sites on the rayon thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Stop reporting after this many diagnostics; `null` reports all.
    #[serde(default = "default_max_diagnostics")]
    pub max_diagnostics: Option<usize>,
    /// Colored text output; unset means "when stdout is a terminal".
    #[serde(default)]
    pub pretty: Option<bool>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_diagnostics: default_max_diagnostics(),
            pretty: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub options: CheckOptions,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    /// `"int"`, `"T"`, `"?DateTime"`
    Name(String),
    /// `{"of": "Collection", "args": ["int"]}`
    Generic {
        of: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
    },
    /// `{"union": ["int", "null"]}`
    Union { union: Vec<TypeExpr> },
}

impl TypeExpr {
    pub fn name(name: &str) -> Self {
        TypeExpr::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateDecl {
    pub name: String,
    #[serde(default, rename = "of")]
    pub bound: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub templates: Vec<TemplateDecl>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Declared return type; `mixed` when omitted.
    #[serde(default, rename = "return")]
    pub return_type: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    /// Plain parent classes, interfaces and traits.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub templates: Vec<TemplateDecl>,
    /// Generic ancestors with their arguments (`@extends`, `@implements`,
    /// `@use`). Each base is also a parent.
    #[serde(default)]
    pub extends: Vec<TypeExpr>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub methods: Vec<FunctionDecl>,
}

/// Source location of a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Span {
    pub start: u32,
    #[serde(default)]
    pub length: u32,
}

/// A site to check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Site {
    /// `function(args)`, optionally inside a generic function or method
    /// (`"inside": "wrap"` or `"inside": "Collection::map"`) whose templates
    /// the argument types may refer to.
    Call {
        function: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
        #[serde(default)]
        expected: Option<TypeExpr>,
        #[serde(default)]
        inside: Option<String>,
        #[serde(default)]
        span: Option<Span>,
    },
    /// `receiver->method(args)`
    MethodCall {
        receiver: TypeExpr,
        method: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
        #[serde(default)]
        expected: Option<TypeExpr>,
        #[serde(default)]
        inside: Option<String>,
        #[serde(default)]
        span: Option<Span>,
    },
    /// `$target = $source`
    Assign {
        source: TypeExpr,
        target: TypeExpr,
        #[serde(default)]
        inside: Option<String>,
        #[serde(default)]
        span: Option<Span>,
    },
}

impl Site {
    pub fn span(&self) -> Span {
        match self {
            Site::Call { span, .. } | Site::MethodCall { span, .. } | Site::Assign { span, .. } => {
                span.unwrap_or_default()
            }
        }
    }

    pub fn inside(&self) -> Option<&str> {
        match self {
            Site::Call { inside, .. }
            | Site::MethodCall { inside, .. }
            | Site::Assign { inside, .. } => inside.as_deref(),
        }
    }
}

#[cfg(test)]
#[path = "tests/project_tests.rs"]
mod tests;
