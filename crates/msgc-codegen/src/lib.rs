//! # msgc-codegen
//!
//! Message definition compiler. Takes the parsed tree of a message definition file
//! (structs, classes, messages, packets, enums) and generates, for a simulation
//! runtime's object model:
//!
//! - data-holder types with accessors and ownership bookkeeping,
//! - pack/unpack bridges for transporting instances between processes,
//! - reflection descriptors for generic inspection tooling.
//!
//! ## Usage
//!
//! ### 1. Load or build the input tree
//!
//! Trees usually come from a front-end as JSON:
//!
//! ```rust,ignore
//! let file = msgc_codegen::MsgFile::load("defs/job.json")?;
//! ```
//!
//! or are built in code with the [`AstNode`] helpers.
//!
//! ### 2. Compile and write the artifacts
//!
//! ```rust,ignore
//! use msgc_codegen::CodeGenerator;
//!
//! let mut generator = CodeGenerator::new();
//! generator.export_macro("SIM_API");
//!
//! let compilation = generator.generate(&file);
//! for diagnostic in compilation.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! compilation.into_result()?.write_to_dir("generated")?;
//! ```
//!
//! Every problem in the input is reported as a [`Diagnostic`] and compilation goes on
//! with a fallback, so one run reports as much as it can. Any error discards both
//! artifacts; warnings never do.

mod ast;
mod catalog;
mod diagnostics;
mod emitter;
mod error;
mod extractor;
mod generator;
mod options;
mod prepare;
mod primitives;
mod printer;
mod properties;
mod session;
mod types;

pub use ast::{AstNode, MsgFile, SourceLocation, Tag, load_dir};
pub use catalog::{EnumCatalog, Lookup, Origin, Registration, TypeCatalog};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use emitter::{Emission, header_guard};
pub use error::{CompileError, LoadError};
pub use extractor::{ClassRecord, EnumRecord, FieldRecord, ForwardDecl, Keyword};
pub use generator::{CodeGenerator, Compilation, output_names};
pub use options::{GeneratorOptions, RuntimeNames};
pub use prepare::{PreparedClass, PreparedField};
pub use primitives::PrimitiveType;
pub use printer::{DeclarationPrinter, SourcePrinter};
pub use properties::{Properties, Property};
pub use session::CompilationSession;
pub use types::{ArrayShape, Category, FieldKind};
