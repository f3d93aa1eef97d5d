//! State shared by every step of one compilation.

use crate::ast::SourceLocation;
use crate::catalog::{canonicalize, EnumCatalog, TypeCatalog};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::options::{GeneratorOptions, RuntimeNames};
use crate::primitives;

/// Catalogs, diagnostics and the current namespace of one compiler run.
///
/// A fresh session is created per input file. Catalogs only grow during a run.
#[derive(Debug, Clone)]
pub struct CompilationSession {
    pub types: TypeCatalog,
    pub enums: EnumCatalog,
    pub diagnostics: Diagnostics,
    pub options: GeneratorOptions,
    pub runtime: RuntimeNames,
    namespace: String,
}

impl CompilationSession {
    pub fn new(options: GeneratorOptions) -> Self {
        let runtime = options.runtime();
        Self {
            types: TypeCatalog::with_builtins(&runtime),
            enums: EnumCatalog::new(),
            diagnostics: Diagnostics::new(),
            options,
            runtime,
            namespace: String::new(),
        }
    }

    /// Current namespace (`a::b`), empty at file scope.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Switch to `namespace`, checking each segment against the reserved words.
    pub fn enter_namespace(&mut self, namespace: &str, location: &SourceLocation) {
        let namespace = namespace.trim_start_matches("::");
        if namespace.is_empty() {
            self.diagnostics.error(
                DiagnosticKind::UnexpectedElement,
                location,
                "namespace name is empty",
            );
        }
        for segment in namespace.split("::").filter(|s| primitives::is_reserved(s)) {
            self.diagnostics.error(
                DiagnosticKind::ReservedWordUsed,
                location,
                format!("namespace name '{}' is a reserved word", segment),
            );
        }
        self.namespace = namespace.to_string();
    }

    pub fn leave_namespace(&mut self) {
        self.namespace.clear();
    }

    /// Segments of the current namespace, outermost first.
    pub fn namespace_segments(&self) -> Vec<&str> {
        if self.namespace.is_empty() {
            Vec::new()
        } else {
            self.namespace.split("::").collect()
        }
    }

    /// Qualified name of a declaration made in the current namespace.
    pub fn qualify(&self, name: &str) -> String {
        canonicalize(&self.namespace, name)
    }

    /// Report `name` if it is reserved. Returns true when it was.
    pub fn check_reserved(&mut self, name: &str, what: &str, location: &SourceLocation) -> bool {
        if primitives::is_reserved(name) {
            self.diagnostics.error(
                DiagnosticKind::ReservedWordUsed,
                location,
                format!("{} name '{}' is a reserved word", what, name),
            );
            true
        } else {
            false
        }
    }
}

impl Default for CompilationSession {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_namespace_handling() {
        let mut session = CompilationSession::default();
        assert_eq!(session.qualify("Job"), "Job");
        session.enter_namespace("sched::jobs", &SourceLocation::new("a.msg", 1));
        assert_eq!(session.namespace_segments(), vec!["sched", "jobs"]);
        assert_eq!(session.qualify("Job"), "sched::jobs::Job");
        assert!(session.diagnostics.is_empty());
        session.leave_namespace();
        assert_eq!(session.namespace(), "");
    }

    #[test]
    fn test_reserved_namespace_segment() {
        let mut session = CompilationSession::default();
        session.enter_namespace("net::class", &SourceLocation::new("a.msg", 2));
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::ReservedWordUsed), 1);
    }

    #[test]
    fn test_session_starts_with_runtime_types() {
        let session = CompilationSession::new(GeneratorOptions {
            runtime_namespace: "sim".to_string(),
            ..Default::default()
        });
        assert_eq!(session.types.classify("sim::cMessage"), Some(Category::OwnedObject));
        assert!(session.enums.is_empty());
    }
}
