//! Example crate demonstrating msgc-codegen usage.
//!
//! The `fixtures/` directory holds message definition trees in their JSON form, as a
//! front-end would hand them over. [`compile_dir`] compiles every one of them and
//! writes the generated interface/definition pairs next to each other.

use msgc_codegen::{CodeGenerator, Diagnostic, LoadError, load_dir};
use std::io;
use std::path::Path;

/// Outcome of compiling a directory of definition trees.
#[derive(Debug, Default)]
pub struct Report {
    /// Files whose artifacts were written, with the header file name.
    pub written: Vec<(String, String)>,
    /// Files whose output was discarded because of errors.
    pub failed: Vec<String>,
    /// Every diagnostic, in file order.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileDirError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot write output: {0}")]
    Write(#[from] io::Error),
}

/// Compile every `*.json` tree below `input` and write the artifacts into `output`.
pub fn compile_dir(
    generator: &CodeGenerator,
    input: &Path,
    output: &Path,
) -> Result<Report, CompileDirError> {
    let files = load_dir(input)?;
    let mut report = Report::default();

    for file in &files {
        let compilation = generator.generate(file);
        report.diagnostics.extend(compilation.diagnostics.iter().cloned());
        match compilation.emission {
            Some(emission) => {
                emission.write_to_dir(output)?;
                tracing::info!(file = %file.filename, header = %emission.header_name, "written");
                report.written.push((file.filename.clone(), emission.header_name));
            }
            None => {
                tracing::warn!(file = %file.filename, "output discarded");
                report.failed.push(file.filename.clone());
            }
        }
    }
    Ok(report)
}
