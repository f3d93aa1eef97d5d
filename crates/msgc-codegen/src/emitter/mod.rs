//! Code emission into the interface (header) and definition (source) artifacts.
//!
//! Both artifacts are accumulated in memory by an [`Emitter`] and only leave it as one
//! [`Emission`] value, so a failed compilation discards them together.

mod boilerplate;
mod class;
mod descriptor;
mod enums;
mod structs;

use crate::ast::{AstNode, SourceLocation};
use crate::options::{GeneratorOptions, RuntimeNames};
use crate::printer::DeclarationPrinter;
use std::fs;
use std::io;
use std::path::Path;

/// The two generated artifacts of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub header_name: String,
    pub source_name: String,
    pub header: String,
    pub source: String,
}

impl Emission {
    /// Write both artifacts into `dir` under their file names.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> io::Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(dir.join(&self.header_name), &self.header)?;
        fs::write(dir.join(&self.source_name), &self.source)
    }
}

/// Header guard for `header_name`, prefixed by the file's first namespace if it has one.
pub fn header_guard(header_name: &str, first_namespace: Option<&str>) -> String {
    let file = header_name.rsplit(['/', '\\']).next().unwrap_or(header_name);
    let raw = match first_namespace {
        Some(ns) => format!("{}_{}", ns, file),
        None => file.to_string(),
    };
    let sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("__{}", sanitized)
}

/// Copy a verbatim block without its leading and trailing line breaks.
fn trim_line_breaks(body: &str) -> &str {
    body.trim_matches(|c| c == '\r' || c == '\n')
}

/// Quote `s` as a target-language string literal.
pub(crate) fn quote(s: &str) -> String {
    let mut output = String::with_capacity(s.len() + 2);
    output.push('"');
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c => output.push(c),
        }
    }
    output.push('"');
    output
}

/// Accumulates both artifacts for one input file.
#[derive(Debug)]
pub(crate) struct Emitter<'p> {
    header: String,
    source: String,
    runtime: RuntimeNames,
    /// Export macro followed by a space, or empty.
    export: String,
    export_macro: String,
    printer: &'p dyn DeclarationPrinter,
}

impl<'p> Emitter<'p> {
    pub(crate) fn new(options: &GeneratorOptions, printer: &'p dyn DeclarationPrinter) -> Self {
        Self {
            header: String::new(),
            source: String::new(),
            runtime: options.runtime(),
            export: options.export_prefix(),
            export_macro: options.export_macro.clone().unwrap_or_default(),
            printer,
        }
    }

    /// Banner, guard, includes and fixed templates.
    ///
    /// Without any namespace in the file the stream templates go to file scope here;
    /// otherwise every namespace opening emits its own copy.
    pub(crate) fn preamble(&mut self, banner: &str, header_name: &str, guard: &str, has_namespace: bool) {
        let runtime_header = match self.runtime.namespace() {
            "" => "omnetpp",
            ns => ns,
        };

        self.header.push_str(banner);
        self.header.push_str(&format!("#ifndef {}\n", guard));
        self.header.push_str(&format!("#define {}\n\n", guard));
        self.header.push_str(&format!("#include <{}.h>\n\n", runtime_header));

        if let Some(base) = self.export_macro.strip_suffix("_API").filter(|b| !b.is_empty()) {
            let base = base.to_string();
            let api = &self.export_macro;
            let mut block = String::new();
            block.push_str("// dll export symbol\n");
            block.push_str(&format!("#ifndef {}\n", api));
            block.push_str(&format!("#  if defined({}_EXPORT)\n", base));
            block.push_str(&format!("#    define {}  OPP_DLLEXPORT\n", api));
            block.push_str(&format!("#  elif defined({}_IMPORT)\n", base));
            block.push_str(&format!("#    define {}  OPP_DLLIMPORT\n", api));
            block.push_str("#  else\n");
            block.push_str(&format!("#    define {}\n", api));
            block.push_str("#  endif\n");
            block.push_str("#endif\n\n");
            self.header.push_str(&block);
        }

        self.source.push_str(banner);
        self.source.push_str("// Disable warnings about unused variables, empty switch stmts, etc:\n");
        self.source.push_str("#ifdef _MSC_VER\n");
        self.source.push_str("#  pragma warning(disable:4101)\n");
        self.source.push_str("#  pragma warning(disable:4065)\n");
        self.source.push_str("#endif\n\n");
        self.source.push_str("#include <iostream>\n");
        self.source.push_str("#include <sstream>\n");
        self.source.push_str(&format!("#include \"{}\"\n\n", header_name));
        self.source.push_str(&boilerplate::pack_templates(&self.runtime));

        if !has_namespace {
            self.header.push_str("\n\n");
            self.source.push('\n');
            self.source.push_str(&boilerplate::stream_templates());
        }
    }

    /// Open `segments` in both artifacts, outermost first.
    pub(crate) fn begin_namespace(&mut self, segments: &[&str]) {
        self.header.push('\n');
        for segment in segments {
            self.header.push_str(&format!("namespace {} {{\n", segment));
            self.source.push_str(&format!("namespace {} {{\n", segment));
        }
        self.header.push('\n');
        self.source.push('\n');
        self.source.push_str(&boilerplate::stream_templates());
    }

    /// Close `segments` in both artifacts, innermost first.
    pub(crate) fn end_namespace(&mut self, segments: &[&str]) {
        for segment in segments.iter().rev() {
            self.header.push_str(&format!("}} // namespace {}\n", segment));
            self.source.push_str(&format!("}} // namespace {}\n", segment));
        }
        self.header.push('\n');
        self.source.push('\n');
    }

    /// Copy a target-language block into the interface artifact.
    pub(crate) fn verbatim(&mut self, body: &str) {
        self.header.push_str("// cplusplus {{\n");
        self.header.push_str(trim_line_breaks(body));
        self.header.push_str("\n// }}\n\n");
    }

    /// Close the header guard and hand out both artifacts.
    pub(crate) fn finish(mut self, guard: &str) -> (String, String) {
        self.header.push_str(&format!("#endif // ifndef {}\n\n", guard));
        (self.header, self.source)
    }

    /// `/**` opener naming where a generated type came from, followed by its source text.
    fn doc_opening(&self, what: &str, node: &AstNode, location: &SourceLocation) -> String {
        let mut output = String::from("/**\n");
        output.push_str(&format!(" * {} generated from <tt>{}</tt> by msgc.\n", what, location));
        output.push_str(&self.pre_comment(node));
        output
    }

    /// The declaration's source text inside a `<pre>` block.
    fn pre_comment(&self, node: &AstNode) -> String {
        let text = self.printer.print(node).replace("*/", "  ");
        let mut output = String::from(" * <pre>\n");
        for line in text.trim().lines() {
            output.push_str(&format!(" * {}\n", line));
        }
        output.push_str(" * </pre>\n");
        output
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::SourcePrinter;

    #[test]
    fn test_header_guard() {
        assert_eq!(header_guard("job_m.h", None), "__JOB_M_H");
        assert_eq!(header_guard("out/job_m.h", Some("sched::jobs")), "__SCHED__JOBS_JOB_M_H");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_preamble_with_export_macro() {
        let options = GeneratorOptions {
            export_macro: Some("INET_API".to_string()),
            ..Default::default()
        };
        let mut emitter = Emitter::new(&options, &SourcePrinter);
        emitter.preamble("// banner\n\n", "a_m.h", "__A_M_H", false);
        let (header, source) = emitter.finish("__A_M_H");

        assert!(header.starts_with("// banner\n\n#ifndef __A_M_H\n#define __A_M_H\n\n#include <omnetpp.h>\n"));
        assert!(header.contains("#  if defined(INET_EXPORT)\n#    define INET_API  OPP_DLLEXPORT\n"));
        assert!(header.contains("#  elif defined(INET_IMPORT)\n"));
        assert!(header.ends_with("#endif // ifndef __A_M_H\n\n"));
        assert!(source.contains("#  pragma warning(disable:4065)\n"));
        assert!(source.contains("#include \"a_m.h\"\n"));
        assert!(source.contains("namespace omnetpp {"));
        // no namespace in the file: stream templates at file scope
        assert!(source.contains("inline std::ostream& operator<<(std::ostream& out,const T&) {return out;}"));
    }

    #[test]
    fn test_export_macro_without_api_suffix_has_no_boilerplate() {
        let options = GeneratorOptions {
            export_macro: Some("EXPORTED".to_string()),
            ..Default::default()
        };
        let mut emitter = Emitter::new(&options, &SourcePrinter);
        emitter.preamble("", "a_m.h", "__A_M_H", true);
        let (header, source) = emitter.finish("__A_M_H");
        assert!(!header.contains("dll export symbol"));
        assert!(!source.contains("operator<<"));
    }

    #[test]
    fn test_namespaces_and_verbatim() {
        let options = GeneratorOptions::default();
        let mut emitter = Emitter::new(&options, &SourcePrinter);
        emitter.begin_namespace(&["a", "b"]);
        emitter.verbatim("\r\n#include \"x.h\"\n\n");
        emitter.end_namespace(&["a", "b"]);
        let (header, source) = emitter.finish("G");

        assert!(header.contains("namespace a {\nnamespace b {\n"));
        assert!(header.contains("// cplusplus {{\n#include \"x.h\"\n// }}\n"));
        assert!(header.contains("} // namespace b\n} // namespace a\n"));
        assert!(source.contains("namespace a {\nnamespace b {\n"));
        assert!(source.contains("} // namespace b\n} // namespace a\n"));
        assert!(source.contains("// forward\n"));
    }

    #[test]
    fn test_pre_comment_neutralizes_comment_end() {
        let options = GeneratorOptions::default();
        let emitter = Emitter::new(&options, &SourcePrinter);
        let node = AstNode::declaration(crate::ast::Tag::Struct, "S")
            .with_child(AstNode::comment("/* trailing */"));
        let text = emitter.pre_comment(&node);
        assert!(text.starts_with(" * <pre>\n * struct S\n"));
        assert!(!text.contains("*/"));
        assert!(text.ends_with(" * </pre>\n"));
    }
}
