// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compiler diagnostics.
//!
//! A unified diagnostic type the CLI consumes. Each stage's error type is
//! converted through the `ToDiagnostic` trait, so the stage crates stay
//! free of presentation concerns.

pub mod convert;
pub mod formatter;

use minicc_ast::Loc;

pub use formatter::DiagnosticFormatter;

/// A diagnostic with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: Loc,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(loc: Loc, message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Error, loc, message: message.into() }
    }

    pub fn warning(loc: Loc, message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Warning, loc, message: message.into() }
    }
}

/// Implemented by every stage error type.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}
