//! Error sink: errors and warnings keyed by source location.
//!
//! Every problem is recorded with a severity and processing continues with a fallback
//! value. Only errors block output; warnings never do.

use crate::ast::SourceLocation;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// Identifies which check produced the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A declaration, enum or namespace is named after a reserved word.
    ReservedWordUsed,
    /// A type was declared again with a different category.
    CategoryConflict,
    /// Base class, field type or enum not found.
    UnresolvedReference,
    /// More than one candidate for a short name.
    AmbiguousReference,
    /// Pointer fields, owned fields in non-owning containers, abstract fields without
    /// customization, editable fields without a string conversion, ...
    InvalidFieldUsage,
    /// A node that is not accepted at its position in the tree.
    UnexpectedElement,
    /// The same property given twice on one element.
    DuplicateProperty,
    /// Naming options that would make accessors and members collide.
    NamingCollision,
    /// An invariant of the compiler itself was violated.
    InternalError,
}

impl DiagnosticKind {
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticKind::ReservedWordUsed => "reserved-word",
            DiagnosticKind::CategoryConflict => "category-conflict",
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
            DiagnosticKind::AmbiguousReference => "ambiguous-reference",
            DiagnosticKind::InvalidFieldUsage => "invalid-field-usage",
            DiagnosticKind::UnexpectedElement => "unexpected-element",
            DiagnosticKind::DuplicateProperty => "duplicate-property",
            DiagnosticKind::NamingCollision => "naming-collision",
            DiagnosticKind::InternalError => "internal-error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single finding with location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {severity}: {message} [{kind}]")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
}

/// Accumulates diagnostics in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        location: &SourceLocation,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Error, location, message.into());
    }

    pub fn warning(
        &mut self,
        kind: DiagnosticKind,
        location: &SourceLocation,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Warning, location, message.into());
    }

    fn push(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        location: &SourceLocation,
        message: String,
    ) {
        match severity {
            Severity::Error => {
                tracing::error!(location = %location, kind = %kind, "{message}")
            }
            Severity::Warning => {
                tracing::warn!(location = %location, kind = %kind, "{message}")
            }
        }
        self.items.push(Diagnostic {
            kind,
            severity,
            location: location.clone(),
            message,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Number of diagnostics of the given kind, regardless of severity.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
