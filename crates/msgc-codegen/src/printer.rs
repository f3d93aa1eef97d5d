//! Renders declarations back into definition-language text for documentation blocks.

use crate::ast::{AstNode, Tag};
use std::fmt::Debug;

/// Turns a declaration node into the source text shown in generated documentation.
///
/// Front-ends that keep the original text can plug in a printer that returns it
/// verbatim; [`SourcePrinter`] reconstructs it from the tree.
pub trait DeclarationPrinter: Debug {
    fn print(&self, node: &AstNode) -> String;
}

/// Default printer: rebuilds the declaration from its tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourcePrinter;

impl SourcePrinter {
    fn print_property(node: &AstNode) -> String {
        let mut output = format!("@{}", node.name());
        let mut keys: Vec<String> = Vec::new();
        for key in node.children.iter().filter(|c| c.tag == Tag::PropertyKey) {
            let value = key.attr("value");
            match key.name() {
                "" if value.is_empty() => {}
                "" => keys.push(value.to_string()),
                name => keys.push(format!("{}={}", name, value)),
            }
        }
        if !keys.is_empty() {
            output.push_str(&format!("({})", keys.join(",")));
        }
        output
    }

    fn print_field(node: &AstNode) -> String {
        let mut output = String::new();
        if node.flag("is-abstract") {
            output.push_str("abstract ");
        }
        let data_type = node.attr("data-type");
        if !data_type.is_empty() {
            output.push_str(data_type);
            output.push(' ');
        }
        output.push_str(node.name());
        if node.flag("is-vector") {
            output.push_str(&format!("[{}]", node.attr("vector-size")));
        }
        let default = node.attr("default-value");
        if !default.is_empty() {
            output.push_str(&format!(" = {}", default));
        }
        for prop in node.children.iter().filter(|c| c.tag == Tag::Property) {
            output.push(' ');
            output.push_str(&Self::print_property(prop));
        }
        output.push(';');
        output
    }
}

impl DeclarationPrinter for SourcePrinter {
    fn print(&self, node: &AstNode) -> String {
        let mut output = format!("{} {}", node.tag, node.name());
        let base = node.attr("extends-name");
        if !base.is_empty() {
            output.push_str(&format!(" extends {}", base));
        }
        output.push_str("\n{\n");

        for child in &node.children {
            let line = match child.tag {
                Tag::Property => format!("{};", Self::print_property(child)),
                Tag::Field if node.tag == Tag::Enum => {
                    format!("{} = {};", child.name(), child.attr("value"))
                }
                Tag::Field => Self::print_field(child),
                Tag::Comment => child.attr("text").trim().to_string(),
                _ => continue,
            };
            output.push_str(&format!("    {}\n", line));
        }
        output.push('}');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_message() {
        let node = AstNode::declaration(Tag::Message, "Job")
            .extends("Task")
            .with_property("customize", &["true"])
            .with_child(AstNode::field("priority", "int").with_default("3"))
            .with_child(AstNode::field("hops", "short").as_array(Some("4")))
            .with_child(AstNode::field("cost", "double").as_abstract())
            .with_child(AstNode::field("payload", "string").with_property("nopack", &[]));

        let text = SourcePrinter.print(&node);
        assert!(text.starts_with("message Job extends Task\n{\n"));
        assert!(text.contains("    @customize(true);\n"));
        assert!(text.contains("    int priority = 3;\n"));
        assert!(text.contains("    short hops[4];\n"));
        assert!(text.contains("    abstract double cost;\n"));
        assert!(text.contains("    string payload @nopack;\n"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_print_enum_and_named_keys() {
        let node = AstNode::declaration(Tag::Enum, "Color")
            .with_child(AstNode::enum_item("RED", "0"))
            .with_child(AstNode::comment("// the rest"))
            .with_child(AstNode::enum_item("GREEN", "1"));
        let text = SourcePrinter.print(&node);
        assert_eq!(text, "enum Color\n{\n    RED = 0;\n    // the rest\n    GREEN = 1;\n}");

        let prop = AstNode::property("unit", &["s"]).with_child(
            AstNode::new(Tag::PropertyKey)
                .with_attr("name", "scale")
                .with_attr("value", "1000"),
        );
        assert_eq!(SourcePrinter::print_property(&prop), "@unit(s,scale=1000)");
    }
}
