//! Generator configuration.

use serde::Deserialize;

/// Options recognised by the emitter.
///
/// Deserializes from camelCase JSON; missing keys take their defaults:
///
/// ```
/// use msgc_codegen::GeneratorOptions;
///
/// let opts: GeneratorOptions =
///     serde_json::from_str(r#"{ "exportMacro": "INET_API", "generateDescriptors": false }"#)
///         .unwrap();
/// assert_eq!(opts.export_macro.as_deref(), Some("INET_API"));
/// assert!(!opts.generate_descriptors);
/// assert!(opts.generate_data_types);
/// assert_eq!(opts.runtime_namespace, "omnetpp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Visibility symbol placed between `class`/`struct` and the type name.
    pub export_macro: Option<String>,
    pub generate_data_types: bool,
    pub generate_descriptors: bool,
    pub generate_descriptor_setters: bool,
    /// Namespace of the runtime object model referenced by generated code.
    pub runtime_namespace: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            export_macro: None,
            generate_data_types: true,
            generate_descriptors: true,
            generate_descriptor_setters: true,
            runtime_namespace: "omnetpp".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// The export macro followed by a space, or nothing.
    pub(crate) fn export_prefix(&self) -> String {
        match self.export_macro.as_deref() {
            Some(m) if !m.is_empty() => format!("{} ", m),
            _ => String::new(),
        }
    }

    pub fn runtime(&self) -> RuntimeNames {
        RuntimeNames::new(&self.runtime_namespace)
    }
}

/// Qualified names of the runtime types generated code refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeNames {
    namespace: String,
}

impl RuntimeNames {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.trim_matches(':').to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `name` qualified with the runtime namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.namespace, name)
        }
    }

    pub fn root_object(&self) -> String {
        self.qualify("cObject")
    }

    pub fn named_object(&self) -> String {
        self.qualify("cNamedObject")
    }

    pub fn owned_object(&self) -> String {
        self.qualify("cOwnedObject")
    }

    pub fn message(&self) -> String {
        self.qualify("cMessage")
    }

    pub fn packet(&self) -> String {
        self.qualify("cPacket")
    }

    pub fn comm_buffer(&self) -> String {
        self.qualify("cCommBuffer")
    }

    pub fn class_descriptor(&self) -> String {
        self.qualify("cClassDescriptor")
    }

    pub fn runtime_error(&self) -> String {
        self.qualify("cRuntimeError")
    }
}
