//! Site checking for a lowered project.
//!
//! Sites are independent: each one is checked against the read-only solver
//! state, optionally on the rayon thread pool. Diagnostics are ordered by
//! site afterwards, so output does not depend on scheduling.

use crate::lower::{LowerError, Lowered, Lowerer, Session, lower_project};
use crate::project::{CheckOptions, Project, Site, Span, TypeExpr};
use rayon::prelude::*;
use serde::Serialize;
use templar_common::diagnostics::Diagnostic;
use templar_solver::{CallEvaluator, DeclId};
use tracing::{Level, debug, span};

/// Diagnostics of one checking run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub sites_checked: usize,
    /// Diagnostics dropped by the `max_diagnostics` cap.
    pub suppressed: usize,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count() + self.suppressed
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Lower `project` and check all of its sites.
pub fn check_project(project: &Project, file: &str, options: &CheckOptions) -> CheckResult {
    let _span = span!(
        Level::DEBUG,
        "check_project",
        file,
        sites = project.sites.len()
    )
    .entered();

    let session = Session::new();
    let lowered = lower_project(&session, project);
    let checker = SiteChecker::new(&session, &lowered, file);
    let fmt = session.formatter();

    let outcomes: Vec<Option<Diagnostic>> = if options.parallel {
        project
            .sites
            .par_iter()
            .map(|site| checker.check_site(site))
            .collect()
    } else {
        project
            .sites
            .iter()
            .map(|site| checker.check_site(site))
            .collect()
    };

    // Declaration errors come first, then site diagnostics in site order.
    let mut ordered: Vec<(Option<usize>, Diagnostic)> = lowered
        .errors
        .iter()
        .map(|err| (None, err.error.to_diagnostic(&fmt, file, Span::default())))
        .collect();
    ordered.extend(
        outcomes
            .into_iter()
            .enumerate()
            .filter_map(|(index, diagnostic)| Some((Some(index), diagnostic?))),
    );
    ordered.sort_by_key(|(index, _)| *index);

    let mut diagnostics: Vec<Diagnostic> = ordered.into_iter().map(|(_, d)| d).collect();
    let mut suppressed = 0;
    if let Some(max) = options.max_diagnostics
        && diagnostics.len() > max
    {
        suppressed = diagnostics.len() - max;
        diagnostics.truncate(max);
    }

    debug!(
        diagnostics = diagnostics.len(),
        suppressed, "project checked"
    );
    CheckResult {
        diagnostics,
        sites_checked: project.sites.len(),
        suppressed,
    }
}

struct SiteChecker<'a> {
    session: &'a Session,
    lowered: &'a Lowered,
    lowerer: Lowerer<'a>,
    evaluator: CallEvaluator<'a>,
    file: &'a str,
}

impl<'a> SiteChecker<'a> {
    fn new(session: &'a Session, lowered: &'a Lowered, file: &'a str) -> Self {
        Self {
            session,
            lowered,
            lowerer: Lowerer::new(session),
            evaluator: CallEvaluator::new(session.ctx()),
            file,
        }
    }

    /// Check one site. Calls made inside a generic declaration see its
    /// templates as symbolic arguments; those bindings are checked against
    /// the enclosing template's bound, which every call of the enclosing
    /// declaration must satisfy in turn.
    fn check_site(&self, site: &Site) -> Option<Diagnostic> {
        let span = site.span();
        let result = site
            .inside()
            .map(|name| self.lowerer.resolve_scope(name))
            .transpose()
            .and_then(|scope| self.evaluate(site, scope));
        let err = result.err()?;
        debug!(start = span.start, ?err, "site rejected");
        Some(err.to_diagnostic(&self.session.formatter(), self.file, span))
    }

    fn evaluate(&self, site: &Site, scope: Option<DeclId>) -> Result<(), LowerError> {
        let lower = |expr: &TypeExpr| self.lowerer.lower_checked(expr, scope);
        match site {
            Site::Call {
                function,
                args,
                expected,
                ..
            } => {
                let id = self.lowerer.resolve_scope(function)?;
                // Already reported once as a declaration error.
                if !self.lowered.is_valid(id) {
                    return Ok(());
                }
                let args = args.iter().map(lower).collect::<Result<Vec<_>, _>>()?;
                let expected = expected.as_ref().map(lower).transpose()?;
                self.evaluator.check_call(id, &args, expected)?;
                Ok(())
            }
            Site::MethodCall {
                receiver,
                method,
                args,
                expected,
                ..
            } => {
                let receiver = lower(receiver)?;
                let method = self.session.interner.intern_string(method);
                if let Ok((method_id, _)) = self.evaluator.resolve_method(receiver, method)
                    && !self.lowered.is_valid(method_id)
                {
                    return Ok(());
                }
                let args = args.iter().map(lower).collect::<Result<Vec<_>, _>>()?;
                let expected = expected.as_ref().map(lower).transpose()?;
                self.evaluator
                    .check_method_call(receiver, method, &args, expected)?;
                Ok(())
            }
            Site::Assign { source, target, .. } => {
                let source = lower(source)?;
                let target = lower(target)?;
                self.evaluator.check_assignment(source, target)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/check_tests.rs"]
mod tests;
