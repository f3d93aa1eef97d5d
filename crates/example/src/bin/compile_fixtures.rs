//! Compiles message definition trees into interface/definition pairs.
//!
//! Usage: `compile-fixtures [INPUT_DIR] [OUTPUT_DIR] [OPTIONS_JSON]`
//!
//! Defaults to `fixtures` and `generated`. The optional options file holds
//! `GeneratorOptions` in camelCase JSON. Set `RUST_LOG=debug` to follow every
//! declaration through the compiler.

use msgc_codegen::{CodeGenerator, GeneratorOptions};
use msgc_example::compile_dir;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = env::args().skip(1);
    let input = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("fixtures"));
    let output = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("generated"));

    let mut generator = CodeGenerator::new();
    if let Some(path) = args.next() {
        let options = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<GeneratorOptions>(&json).map_err(|e| e.to_string()));
        match options {
            Ok(options) => {
                generator.with_options(options);
            }
            Err(e) => {
                tracing::error!(path = %path, "cannot read options: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    println!("Compiling {} -> {}", input.display(), output.display());
    match compile_dir(&generator, &input, &output) {
        Ok(report) => {
            for diagnostic in &report.diagnostics {
                eprintln!("{diagnostic}");
            }
            for (file, header) in &report.written {
                println!("  {file} -> {header}");
            }
            if report.failed.is_empty() {
                println!("Done!");
                ExitCode::SUCCESS
            } else {
                println!("{} file(s) failed", report.failed.len());
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
