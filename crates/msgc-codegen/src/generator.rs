//! Compiler driver: runs every top-level node of one file through extraction,
//! classification and emission.

use crate::ast::{AstNode, MsgFile, Tag};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::emitter::{Emission, Emitter, header_guard};
use crate::error::CompileError;
use crate::extractor::{extract_class, extract_enum, extract_forward};
use crate::options::GeneratorOptions;
use crate::prepare::{declare_forward, prepare_class};
use crate::printer::{DeclarationPrinter, SourcePrinter};
use crate::session::CompilationSession;

/// Interface and definition file names for an input file: `foo.msg` gives
/// `foo_m.h` and `foo_m.cc`.
pub fn output_names(filename: &str) -> (String, String) {
    let file = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = file.strip_suffix(".msg").unwrap_or(file);
    (format!("{}_m.h", stem), format!("{}_m.cc", stem))
}

/// Result of compiling one file.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub filename: String,
    pub diagnostics: Diagnostics,
    /// Generated artifacts; `None` when an error was recorded.
    pub emission: Option<Emission>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.emission.is_some()
    }

    pub fn into_result(self) -> Result<Emission, CompileError> {
        match self.emission {
            Some(emission) => Ok(emission),
            None => Err(CompileError {
                file: self.filename,
                diagnostics: self.diagnostics,
            }),
        }
    }
}

/// Compiles message definition files into data types, pack/unpack bridges and
/// reflection descriptors.
///
/// ```
/// use msgc_codegen::{AstNode, CodeGenerator, MsgFile, Tag};
///
/// let file = MsgFile::new(
///     "point.msg",
///     vec![
///         AstNode::declaration(Tag::Struct, "Point")
///             .with_child(AstNode::field("x", "double"))
///             .with_child(AstNode::field("y", "double")),
///     ],
/// );
/// let emission = CodeGenerator::new()
///     .generate_descriptors(false)
///     .generate(&file)
///     .into_result()
///     .unwrap();
/// assert_eq!(emission.header_name, "point_m.h");
/// assert!(emission.header.contains("struct Point\n{\n    Point();\n    double x;\n    double y;\n};"));
/// ```
#[derive(Debug)]
pub struct CodeGenerator {
    options: GeneratorOptions,

    /// Custom banner replacing the default one.
    header: Option<String>,

    printer: Box<dyn DeclarationPrinter>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            options: GeneratorOptions::default(),
            header: None,
            printer: Box::new(SourcePrinter),
        }
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom banner for both generated files.
    pub fn set_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.header = Some(header.into());
        self
    }

    /// Replace all options at once.
    pub fn with_options(&mut self, options: GeneratorOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Symbol placed between `class`/`struct` and the type name. A symbol ending in
    /// `_API` also gets the shared-library import/export boilerplate.
    pub fn export_macro(&mut self, symbol: impl Into<String>) -> &mut Self {
        self.options.export_macro = Some(symbol.into());
        self
    }

    pub fn generate_data_types(&mut self, enabled: bool) -> &mut Self {
        self.options.generate_data_types = enabled;
        self
    }

    pub fn generate_descriptors(&mut self, enabled: bool) -> &mut Self {
        self.options.generate_descriptors = enabled;
        self
    }

    pub fn generate_descriptor_setters(&mut self, enabled: bool) -> &mut Self {
        self.options.generate_descriptor_setters = enabled;
        self
    }

    /// Namespace of the runtime object model (`omnetpp` by default).
    pub fn runtime_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.options.runtime_namespace = namespace.into();
        self
    }

    /// Use another renderer for the declaration text shown in documentation blocks.
    pub fn set_printer(&mut self, printer: Box<dyn DeclarationPrinter>) -> &mut Self {
        self.printer = printer;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn banner(&self) -> String {
        match &self.header {
            Some(header) => {
                let mut output = String::new();
                for line in header.lines() {
                    output.push_str("// ");
                    output.push_str(line);
                    output.push('\n');
                }
                output.push('\n');
                output
            }
            None => "//\n// Generated file, do not edit! Created by msgc.\n//\n\n".to_string(),
        }
    }

    /// Compile one file with a fresh session.
    pub fn generate(&self, file: &MsgFile) -> Compilation {
        let (header_name, source_name) = output_names(&file.filename);
        let mut session = CompilationSession::new(self.options.clone());
        let mut emitter = Emitter::new(&self.options, self.printer.as_ref());

        let first_namespace = file.first_namespace().map(|n| n.name().trim_start_matches("::"));
        let guard = header_guard(&header_name, first_namespace);
        emitter.preamble(&self.banner(), &header_name, &guard, first_namespace.is_some());

        for node in &file.nodes {
            Self::process(node, &mut session, &mut emitter);
        }
        if !session.namespace().is_empty() {
            emitter.end_namespace(&session.namespace_segments());
            session.leave_namespace();
        }
        let (header, source) = emitter.finish(&guard);

        let diagnostics = session.diagnostics;
        tracing::info!(
            file = %file.filename,
            types = session.types.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "compiled message file"
        );

        let emission = if diagnostics.has_errors() {
            None
        } else {
            Some(Emission {
                header_name,
                source_name,
                header,
                source,
            })
        };
        Compilation {
            filename: file.filename.clone(),
            diagnostics,
            emission,
        }
    }

    fn process(node: &AstNode, session: &mut CompilationSession, emitter: &mut Emitter<'_>) {
        match &node.tag {
            Tag::Namespace => {
                if !session.namespace().is_empty() {
                    emitter.end_namespace(&session.namespace_segments());
                    session.leave_namespace();
                }
                session.enter_namespace(node.name(), &node.location);
                emitter.begin_namespace(&session.namespace_segments());
            }
            Tag::VerbatimBlock => emitter.verbatim(node.attr("body")),
            Tag::StructDecl | Tag::ClassDecl | Tag::MessageDecl | Tag::PacketDecl => {
                if let Some(decl) = extract_forward(node, session) {
                    declare_forward(&decl, session);
                }
            }
            Tag::EnumDecl => {
                if !session.check_reserved(node.name(), "enum", &node.location) {
                    let qname = session.qualify(node.name());
                    session.enums.declare(&qname);
                }
            }
            Tag::Enum => {
                let record = extract_enum(node, session);
                session.enums.register(&record.qname, record.item_pairs());
                tracing::debug!(name = %record.qname, items = record.items.len(), "enum");
                emitter.emit_enum(&record, node);
            }
            Tag::Struct | Tag::Class | Tag::Message | Tag::Packet => {
                let Some(record) = extract_class(node, session) else {
                    return;
                };
                let class = prepare_class(&record, session);
                tracing::debug!(
                    name = %class.qname,
                    category = %class.category,
                    fields = class.fields.len(),
                    "declaration"
                );
                if class.generate_class {
                    if class.is_struct() {
                        emitter.emit_struct(&class);
                    } else {
                        emitter.emit_class(&class);
                    }
                }
                if class.generate_descriptor {
                    emitter.emit_descriptor(&class);
                }
            }
            // file-level properties and comments carry nothing to emit
            Tag::Property | Tag::Comment => {}
            Tag::Field | Tag::PropertyKey | Tag::Other(_) => session.diagnostics.error(
                DiagnosticKind::UnexpectedElement,
                &node.location,
                format!("unaccepted element '{}' at file level", node.tag),
            ),
        }
    }
}
