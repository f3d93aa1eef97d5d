//! Classification and field preparation.
//!
//! Resolves every reference of an extracted record through the session catalogs,
//! decides the declaration's category, registers it, and derives every per-field
//! attribute the emitter needs. Problems are recorded and replaced with a fallback
//! so that later declarations are still checked.

use crate::ast::{AstNode, SourceLocation};
use crate::catalog::{Lookup, Origin, Registration};
use crate::diagnostics::DiagnosticKind;
use crate::extractor::{ClassRecord, FieldRecord, ForwardDecl, Keyword};
use crate::primitives;
use crate::properties::Properties;
use crate::session::CompilationSession;
use crate::types::{ArrayShape, Category, FieldKind};

/// A field with every emission attribute derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedField {
    pub name: String,
    /// Type as written (no pointer marker).
    pub declared_type: String,
    pub kind: FieldKind,
    /// Resolved qualified type for compound fields.
    pub type_qname: Option<String>,
    /// Category of a compound field's type.
    pub type_category: Option<Category>,
    pub shape: ArrayShape,
    pub is_abstract: bool,
    pub is_pointer: bool,

    pub storage_type: String,
    pub arg_type: String,
    pub return_type: String,
    /// `.c_str()` for strings.
    pub c_str: &'static str,
    pub default_value: String,

    pub var: String,
    pub size_var: String,
    pub size_type: String,
    pub getter: String,
    pub setter: String,
    pub size_getter: String,
    pub size_setter: String,

    pub to_string: String,
    pub from_string: String,
    pub enum_qname: Option<String>,

    /// Settable through the descriptor.
    pub editable: bool,
    pub no_pack: bool,
    pub opaque: bool,
    /// Elements are taken into and dropped from ownership by the container.
    pub owned: bool,
    pub properties: Properties,
    pub location: SourceLocation,
}

impl PreparedField {
    pub fn is_compound(&self) -> bool {
        self.kind == FieldKind::Compound
    }

    /// Category of the field's type if it is part of the object model.
    pub fn object_category(&self) -> Option<Category> {
        self.type_category.filter(|c| c.is_object())
    }
}

/// A declaration ready for emission.
#[derive(Debug, Clone)]
pub struct PreparedClass<'a> {
    pub node: &'a AstNode,
    pub keyword: Keyword,
    pub name: String,
    pub qname: String,
    pub category: Category,
    /// Resolved base type, if one was named and found.
    pub base_qname: Option<String>,
    /// Base used in generated code.
    pub base_class: Option<String>,
    /// Generated type name (`Name_Base` when customized).
    pub class_name: String,
    /// Name of the type users see.
    pub real_name: String,
    pub qualified_real_name: String,
    pub descriptor_name: String,
    pub customize: bool,
    pub generate_class: bool,
    pub generate_descriptor: bool,
    pub descriptor_setters: bool,
    pub omit_get_verb: bool,
    pub field_suffix: String,
    pub implements: Vec<String>,
    pub properties: Properties,
    pub fields: Vec<PreparedField>,
    pub base_overrides: Vec<PreparedField>,
    pub location: SourceLocation,
}

impl PreparedClass<'_> {
    pub fn is_struct(&self) -> bool {
        self.category == Category::Struct
    }
}

/// Upper-case the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve a type reference, reporting unresolved (error) and ambiguous (warning)
/// references. Returns the chosen qualified name.
fn resolve_type(
    session: &mut CompilationSession,
    name: &str,
    what: &str,
    location: &SourceLocation,
) -> Option<String> {
    let lookup = session.types.resolve(name, session.namespace());
    match &lookup {
        Lookup::Unresolved => session.diagnostics.error(
            DiagnosticKind::UnresolvedReference,
            location,
            format!("unknown {} '{}'", what, name),
        ),
        Lookup::Ambiguous(_) => session.diagnostics.warning(
            DiagnosticKind::AmbiguousReference,
            location,
            format!(
                "ambiguous {} '{}'; possibilities: '{}'",
                what,
                name,
                lookup.candidates()
            ),
        ),
        Lookup::Resolved(_) => {}
    }
    lookup.first().map(str::to_string)
}

/// Register a forward declaration in the type catalog.
pub fn declare_forward(decl: &ForwardDecl, session: &mut CompilationSession) {
    if session.check_reserved(&decl.name, "type", &decl.location) {
        return;
    }
    let qname = session.qualify(&decl.name);

    let category = match decl.keyword {
        Keyword::Struct => Category::Struct,
        Keyword::Message | Keyword::Packet => Category::OwnedObject,
        Keyword::Class if !decl.is_object => {
            if !decl.base.is_empty() {
                session.diagnostics.error(
                    DiagnosticKind::CategoryConflict,
                    &decl.location,
                    format!(
                        "'{}': a non-object class cannot extend another class",
                        decl.name
                    ),
                );
            }
            Category::Foreign
        }
        Keyword::Class => match decl.base.as_str() {
            "" => Category::PlainObject,
            "void" => Category::Foreign,
            base => match resolve_type(session, base, "ancestor class", &decl.location) {
                Some(base_qname) => session
                    .types
                    .classify(&base_qname)
                    .unwrap_or(Category::PlainObject),
                None => Category::PlainObject,
            },
        },
    };

    if let Registration::Conflict { existing } =
        session.types.register(&qname, category, Origin::Declared)
    {
        session.diagnostics.error(
            DiagnosticKind::CategoryConflict,
            &decl.location,
            format!(
                "different declarations for '{}' are inconsistent ({} vs {})",
                qname, existing, category
            ),
        );
    }
}

/// Classify, register and prepare a definition.
///
/// A `struct` must extend another struct. Any other base (object, foreign) is reported as
/// `CategoryConflict` and the declaration stays a `Struct`; older message compilers let a
/// struct extend a foreign type silently.
pub fn prepare_class<'a>(record: &ClassRecord<'a>, session: &mut CompilationSession) -> PreparedClass<'a> {
    let qname = session.qualify(&record.name);
    let runtime = session.runtime.clone();

    let base_qname = match record.base.as_str() {
        "" | "void" => None,
        base => resolve_type(session, base, "base class", &record.location),
    };

    let category = if session.types.origin(&qname) == Some(Origin::Builtin) {
        session.types.classify(&qname).unwrap_or(Category::PlainObject)
    } else {
        match (record.base.as_str(), &base_qname) {
            ("", _) => match record.keyword {
                Keyword::Message | Keyword::Packet => Category::OwnedObject,
                Keyword::Struct => Category::Struct,
                Keyword::Class => {
                    // A class announced as non-object stays foreign.
                    if session.types.classify(&qname) == Some(Category::Foreign) {
                        Category::Foreign
                    } else {
                        Category::PlainObject
                    }
                }
            },
            ("void", _) => Category::Foreign,
            (_, Some(base)) => session.types.classify(base).unwrap_or(Category::PlainObject),
            (_, None) => Category::PlainObject,
        }
    };

    let category = if record.keyword == Keyword::Struct && category != Category::Struct {
        session.diagnostics.error(
            DiagnosticKind::CategoryConflict,
            &record.location,
            format!(
                "struct '{}' cannot extend '{}', which is a {}",
                record.name, record.base, category
            ),
        );
        Category::Struct
    } else {
        category
    };

    match session.types.register(&qname, category, Origin::Defined) {
        Registration::Conflict { existing } => session.diagnostics.error(
            DiagnosticKind::CategoryConflict,
            &record.location,
            format!(
                "definition of '{}' inconsistent with earlier declaration(s) ({} vs {})",
                record.name, existing, category
            ),
        ),
        Registration::Upgraded { from } => {
            tracing::debug!(name = %qname, %from, to = %category, "forward declaration upgraded")
        }
        Registration::Added | Registration::Unchanged => {}
    }
    tracing::debug!(name = %qname, %category, "classified declaration");

    let base_class = match (record.base.as_str(), &base_qname) {
        ("", _) => {
            if qname == runtime.root_object() {
                None
            } else {
                match (record.keyword, category) {
                    (Keyword::Message, _) => Some(runtime.message()),
                    (Keyword::Packet, _) => Some(runtime.packet()),
                    (Keyword::Class, c) if c.is_object() => Some(runtime.root_object()),
                    _ => None,
                }
            }
        }
        ("void", _) => None,
        (_, Some(base)) => Some(base.clone()),
        (_, None) if category == Category::Struct => None,
        (_, None) => Some(runtime.root_object()),
    };

    let props = &record.properties;
    let options = &session.options;
    let customize = props.bool_property("customize", false);
    let generate_class = options.generate_data_types && !props.bool_property("existingClass", false);
    let generate_descriptor = options.generate_descriptors && props.bool_property("descriptor", true);
    let descriptor_setters =
        options.generate_descriptor_setters && props.string_property("descriptor", "") != "readonly";

    let (class_name, real_name) = if customize {
        (format!("{}_Base", record.name), record.name.clone())
    } else {
        (record.name.clone(), record.name.clone())
    };
    let descriptor_name = format!("{}Descriptor", real_name);
    let qualified_real_name = session.qualify(&real_name);

    let omit_get_verb = props.bool_property("omitGetVerb", false);
    let mut field_suffix = props.string_property("fieldNameSuffix", "");
    if omit_get_verb && field_suffix.is_empty() {
        session.diagnostics.warning(
            DiagnosticKind::NamingCollision,
            &record.location,
            "@omitGetVerb(true) and (implicit) @fieldNameSuffix(\"\") collide: \
             adding '_var' suffix to data members to prevent name conflict between them and getter methods",
        );
        field_suffix = "_var".to_string();
    }

    let mut prepared = PreparedClass {
        node: record.node,
        keyword: record.keyword,
        name: record.name.clone(),
        qname,
        category,
        base_qname,
        base_class,
        class_name,
        real_name,
        qualified_real_name,
        descriptor_name,
        customize,
        generate_class,
        generate_descriptor,
        descriptor_setters,
        omit_get_verb,
        field_suffix,
        implements: props.list_property("implements"),
        properties: record.properties.clone(),
        fields: Vec::new(),
        base_overrides: Vec::new(),
        location: record.location.clone(),
    };

    prepared.fields = record
        .fields
        .iter()
        .map(|f| prepare_field(&prepared, f, session))
        .collect();
    prepared.base_overrides = record
        .base_overrides
        .iter()
        .map(|f| prepare_override(&prepared, f))
        .collect();
    prepared
}

fn member_name(class: &PreparedClass<'_>, field: &str) -> String {
    if class.is_struct() {
        field.to_string()
    } else {
        format!("{}{}", field, class.field_suffix)
    }
}

/// Inherited placeholder: only the setter, member and new default are needed.
fn prepare_override(class: &PreparedClass<'_>, field: &FieldRecord) -> PreparedField {
    PreparedField {
        name: field.name.clone(),
        declared_type: String::new(),
        kind: FieldKind::Basic,
        type_qname: None,
        type_category: None,
        shape: ArrayShape::Scalar,
        is_abstract: false,
        is_pointer: false,
        storage_type: String::new(),
        arg_type: String::new(),
        return_type: String::new(),
        c_str: "",
        default_value: field.default_value.clone(),
        var: member_name(class, &field.name),
        size_var: String::new(),
        size_type: String::new(),
        getter: String::new(),
        setter: format!("set{}", capitalize(&field.name)),
        size_getter: String::new(),
        size_setter: String::new(),
        to_string: String::new(),
        from_string: String::new(),
        enum_qname: None,
        editable: false,
        no_pack: false,
        opaque: false,
        owned: false,
        properties: field.properties.clone(),
        location: field.location.clone(),
    }
}

fn prepare_field(
    class: &PreparedClass<'_>,
    field: &FieldRecord,
    session: &mut CompilationSession,
) -> PreparedField {
    let mut props = field.properties.clone();
    let location = &field.location;
    let shape = ArrayShape::from_attrs(field.is_array, &field.array_size);

    // type
    let primitive = primitives::lookup(&field.data_type);
    let (kind, type_qname, type_category) = match primitive {
        Some(_) => (FieldKind::Basic, None, None),
        None => {
            let what = format!("type for field '{}' in '{}'", field.name, class.name);
            let qname = resolve_type(session, &field.data_type, &what, location)
                .unwrap_or_else(|| session.runtime.root_object());
            let category = session.types.classify(&qname).unwrap_or(Category::PlainObject);
            (FieldKind::Compound, Some(qname), Some(category))
        }
    };
    let owned = type_category == Some(Category::OwnedObject);

    // validation
    if field.is_pointer {
        session.diagnostics.error(
            DiagnosticKind::InvalidFieldUsage,
            location,
            format!("pointer field '{}' is not supported in '{}'", field.name, class.name),
        );
    }
    if field.is_abstract {
        if class.is_struct() {
            session.diagnostics.error(
                DiagnosticKind::InternalError,
                location,
                format!("abstract field '{}' in struct '{}'", field.name, class.name),
            );
        } else if !class.customize {
            session.diagnostics.error(
                DiagnosticKind::InvalidFieldUsage,
                location,
                format!(
                    "abstract fields need '@customize(true)' property in '{}'",
                    class.name
                ),
            );
        }
    }
    // only matters when the container type is emitted
    if class.generate_class && owned && !class.category.can_own() {
        session.diagnostics.error(
            DiagnosticKind::InvalidFieldUsage,
            location,
            format!(
                "cannot use owned-object field '{} {}' in struct or non-owned-object class '{}'",
                field.data_type, field.name, class.name
            ),
        );
    }
    if shape.is_array() && !field.default_value.is_empty() {
        session.diagnostics.error(
            DiagnosticKind::InvalidFieldUsage,
            location,
            format!("array field '{}' cannot have a default value", field.name),
        );
    }
    if class.is_struct() && shape == ArrayShape::Dynamic {
        session.diagnostics.error(
            DiagnosticKind::InvalidFieldUsage,
            location,
            format!(
                "dynamic array '{}' is not supported in struct '{}'",
                field.name, class.name
            ),
        );
    }

    // conversions: explicit property, then enum, then primitive table
    let mut to_string = props.string_property("tostring", "");
    let mut from_string = props.string_property("fromstring", "");

    let enum_qname = match session.enums.resolve(&props.string_property("enum", ""), session.namespace()) {
        None => None,
        Some(lookup) => {
            let enum_name = props.string_property("enum", "");
            match &lookup {
                Lookup::Unresolved => session.diagnostics.error(
                    DiagnosticKind::UnresolvedReference,
                    location,
                    format!(
                        "undeclared enum '{}' in field '{}' in '{}'",
                        enum_name, field.name, class.name
                    ),
                ),
                Lookup::Ambiguous(_) => session.diagnostics.warning(
                    DiagnosticKind::AmbiguousReference,
                    location,
                    format!(
                        "ambiguous enum '{}' in field '{}' in '{}'; possibilities: '{}'",
                        enum_name,
                        field.name,
                        class.name,
                        lookup.candidates()
                    ),
                ),
                Lookup::Resolved(_) => {}
            }
            let qname = lookup.first().map(str::to_string);
            let resolved = qname.clone().unwrap_or_default();
            props.set("enum", resolved.as_str());
            if qname.is_some() {
                if to_string.is_empty() {
                    to_string = format!("enum2string($, \"{}\")", resolved);
                }
                if from_string.is_empty() {
                    from_string = format!("({})string2enum($, \"{}\")", resolved, resolved);
                }
            }
            qname
        }
    };

    // storage and accessor types
    let mut default_value = field.default_value.clone();
    let (storage_type, arg_type, return_type, c_str) = match primitive {
        Some(p) => {
            if default_value.is_empty() {
                default_value = p.empty_value.to_string();
            }
            if to_string.is_empty() {
                to_string = p.to_string.to_string();
            }
            if from_string.is_empty() {
                from_string = p.from_string.to_string();
            }
            let storage = p.storage_type(session.runtime.namespace());
            if p.is_string() {
                (storage, "const char *".to_string(), "const char *".to_string(), ".c_str()")
            } else {
                (storage.clone(), storage.clone(), storage, "")
            }
        }
        None => (
            field.data_type.clone(),
            format!("const {}&", field.data_type),
            format!("{}&", field.data_type),
            "",
        ),
    };

    // naming
    let (getter, setter, size_getter, size_setter) = if class.is_struct() {
        Default::default()
    } else {
        let cap = capitalize(&field.name);
        let (getter, size_getter) = if class.omit_get_verb {
            (field.name.clone(), format!("{}ArraySize", field.name))
        } else {
            (format!("get{}", cap), format!("get{}ArraySize", cap))
        };
        let pick = |prop: &str, fallback: String| {
            let value = props.string_property(prop, "");
            if value.is_empty() { fallback } else { value }
        };
        (
            pick("getter", getter),
            pick("setter", format!("set{}", cap)),
            pick("sizeGetter", size_getter),
            pick("sizeSetter", format!("set{}ArraySize", cap)),
        )
    };
    let size_type = {
        let value = props.string_property("sizetype", "");
        if value.is_empty() { "unsigned int".to_string() } else { value }
    };

    // descriptor editability
    let explicitly_editable = props.bool_property("editable", false);
    let edit_not_disabled = props.bool_property("editable", true);
    let editable = explicitly_editable
        || (class.descriptor_setters && kind == FieldKind::Basic && edit_not_disabled);
    if class.generate_descriptor && editable && from_string.is_empty() {
        session.diagnostics.error(
            DiagnosticKind::InvalidFieldUsage,
            location,
            format!(
                "field '{}' is editable, but its fromstring conversion is unspecified",
                field.name
            ),
        );
    }

    tracing::debug!(
        class = %class.qname,
        field = %field.name,
        kind = ?kind,
        shape = ?shape,
        "prepared field"
    );

    PreparedField {
        name: field.name.clone(),
        declared_type: field.data_type.clone(),
        kind,
        type_qname,
        type_category,
        shape,
        is_abstract: field.is_abstract,
        is_pointer: field.is_pointer,
        storage_type,
        arg_type,
        return_type,
        c_str,
        default_value,
        var: member_name(class, &field.name),
        size_var: format!("{}_arraysize", field.name),
        size_type,
        getter,
        setter,
        size_getter,
        size_setter,
        to_string,
        from_string,
        enum_qname,
        editable,
        no_pack: props.bool_property("nopack", false),
        opaque: props.bool_property("opaque", false),
        owned,
        properties: props,
        location: field.location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Tag;
    use crate::extractor::{extract_class, extract_forward};
    use proptest::prelude::*;

    fn prepare<'a>(node: &'a AstNode, session: &mut CompilationSession) -> PreparedClass<'a> {
        let record = extract_class(node, session).unwrap();
        prepare_class(&record, session)
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("priority"), "Priority");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_struct_with_primitive_fields() {
        let node = AstNode::declaration(Tag::Struct, "Point")
            .with_child(AstNode::field("x", "double"))
            .with_child(AstNode::field("y", "double").with_default("1.5"));
        let mut session = CompilationSession::default();
        let class = prepare(&node, &mut session);

        assert_eq!(class.category, Category::Struct);
        assert_eq!(class.base_class, None);
        assert_eq!(session.types.classify("Point"), Some(Category::Struct));
        let x = &class.fields[0];
        assert_eq!(x.kind, FieldKind::Basic);
        assert_eq!(x.var, "x");
        assert_eq!(x.default_value, "0");
        assert_eq!(x.to_string, "double2string");
        assert_eq!(x.from_string, "string2double");
        assert!(x.getter.is_empty());
        assert_eq!(class.fields[1].default_value, "1.5");
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_message_defaults_and_accessors() {
        let node = AstNode::declaration(Tag::Message, "Job")
            .with_child(AstNode::field("name", "string"))
            .with_child(AstNode::field("hops", "int").as_array(None))
            .with_child(
                AstNode::field("load", "double")
                    .with_property("getter", &["currentLoad"])
                    .with_property("sizetype", &["size_t"]),
            );
        let mut session = CompilationSession::default();
        session.enter_namespace("sched", &SourceLocation::default());
        let class = prepare(&node, &mut session);

        assert_eq!(class.qname, "sched::Job");
        assert_eq!(class.category, Category::OwnedObject);
        assert_eq!(class.base_class.as_deref(), Some("omnetpp::cMessage"));
        assert_eq!(class.descriptor_name, "JobDescriptor");
        assert_eq!(class.qualified_real_name, "sched::Job");

        let name = &class.fields[0];
        assert_eq!(name.storage_type, "omnetpp::opp_string");
        assert_eq!(name.arg_type, "const char *");
        assert_eq!(name.c_str, ".c_str()");
        assert_eq!(name.getter, "getName");
        assert_eq!(name.setter, "setName");

        let hops = &class.fields[1];
        assert_eq!(hops.shape, ArrayShape::Dynamic);
        assert_eq!(hops.size_var, "hops_arraysize");
        assert_eq!(hops.size_getter, "getHopsArraySize");
        assert_eq!(hops.size_setter, "setHopsArraySize");
        assert_eq!(hops.size_type, "unsigned int");

        let load = &class.fields[2];
        assert_eq!(load.getter, "currentLoad");
        assert_eq!(load.size_type, "size_t");
        assert!(load.editable);
    }

    #[test]
    fn test_customized_class_names() {
        let node = AstNode::declaration(Tag::Packet, "Frame")
            .with_property("customize", &["true"])
            .with_property("implements", &["IChecksummed, IPrintable"]);
        let mut session = CompilationSession::default();
        let class = prepare(&node, &mut session);
        assert_eq!(class.class_name, "Frame_Base");
        assert_eq!(class.real_name, "Frame");
        assert_eq!(class.descriptor_name, "FrameDescriptor");
        assert_eq!(class.base_class.as_deref(), Some("omnetpp::cPacket"));
        assert_eq!(class.implements, vec!["IChecksummed", "IPrintable"]);
    }

    #[test]
    fn test_category_inherited_from_base() {
        let mut session = CompilationSession::default();
        let named = AstNode::declaration(Tag::Class, "Tagged").extends("omnetpp::cNamedObject");
        assert_eq!(prepare(&named, &mut session).category, Category::NamedObject);

        let child = AstNode::declaration(Tag::Class, "Label").extends("Tagged");
        let class = prepare(&child, &mut session);
        assert_eq!(class.category, Category::NamedObject);
        assert_eq!(class.base_class.as_deref(), Some("Tagged"));

        let foreign = AstNode::declaration(Tag::Class, "Blob").extends("void");
        let class = prepare(&foreign, &mut session);
        assert_eq!(class.category, Category::Foreign);
        assert_eq!(class.base_class, None);
        assert!(session.diagnostics.is_empty());
    }

    #[test]
    fn test_unresolved_base_falls_back() {
        let node = AstNode::declaration(Tag::Message, "Job").extends("Job2");
        let mut session = CompilationSession::default();
        let class = prepare(&node, &mut session);
        assert_eq!(class.category, Category::PlainObject);
        assert_eq!(class.base_class.as_deref(), Some("omnetpp::cObject"));
        assert_eq!(session.diagnostics.error_count(), 1);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::UnresolvedReference), 1);
    }

    #[test]
    fn test_struct_extending_object_is_conflict() {
        let node = AstNode::declaration(Tag::Struct, "Bad").extends("omnetpp::cObject");
        let mut session = CompilationSession::default();
        let class = prepare(&node, &mut session);
        assert_eq!(class.category, Category::Struct);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::CategoryConflict), 1);
    }

    #[test]
    fn test_forward_declarations() {
        let mut session = CompilationSession::default();
        let opaque = AstNode::declaration(Tag::ClassDecl, "Opaque").with_attr("is-cobject", "false");
        declare_forward(&extract_forward(&opaque, &mut session).unwrap(), &mut session);
        assert_eq!(session.types.classify("Opaque"), Some(Category::Foreign));

        // a base-less definition of a foreign declaration stays foreign
        let def = AstNode::declaration(Tag::Class, "Opaque");
        assert_eq!(prepare(&def, &mut session).category, Category::Foreign);

        let widget = AstNode::declaration(Tag::ClassDecl, "Widget");
        declare_forward(&extract_forward(&widget, &mut session).unwrap(), &mut session);
        let def = AstNode::declaration(Tag::Class, "Widget").extends("omnetpp::cOwnedObject");
        assert_eq!(prepare(&def, &mut session).category, Category::OwnedObject);
        assert_eq!(session.types.classify("Widget"), Some(Category::OwnedObject));

        let bad = AstNode::declaration(Tag::ClassDecl, "Mixed")
            .with_attr("is-cobject", "false")
            .extends("Widget");
        declare_forward(&extract_forward(&bad, &mut session).unwrap(), &mut session);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::CategoryConflict), 1);
    }

    #[test]
    fn test_redeclaration_with_other_category() {
        let mut session = CompilationSession::default();
        let decl = AstNode::declaration(Tag::StructDecl, "Pos");
        declare_forward(&extract_forward(&decl, &mut session).unwrap(), &mut session);
        let decl = AstNode::declaration(Tag::MessageDecl, "Pos");
        declare_forward(&extract_forward(&decl, &mut session).unwrap(), &mut session);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::CategoryConflict), 1);
        assert_eq!(session.types.classify("Pos"), Some(Category::Struct));
    }

    #[test]
    fn test_owned_field_in_non_owning_container() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Class, "Holder")
            .with_child(AstNode::field("msg", "omnetpp::cMessage"));
        let class = prepare(&node, &mut session);
        assert!(class.fields[0].owned);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InvalidFieldUsage), 1);

        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "Envelope")
            .with_child(AstNode::field("inner", "cMessage").as_array(Some("2")));
        let class = prepare(&node, &mut session);
        assert!(class.fields[0].owned);
        assert_eq!(class.fields[0].type_qname.as_deref(), Some("omnetpp::cMessage"));
        assert!(!session.diagnostics.has_errors());
    }

    #[test]
    fn test_owned_field_checked_only_for_generated_classes() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Class, "Named")
            .extends("omnetpp::cNamedObject")
            .with_child(AstNode::field("msg", "omnetpp::cMessage"));
        prepare(&node, &mut session);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InvalidFieldUsage), 1);

        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Class, "Existing")
            .with_property("existingClass", &["true"])
            .with_child(AstNode::field("msg", "omnetpp::cMessage"));
        let class = prepare(&node, &mut session);
        assert!(!class.generate_class);
        assert!(class.fields[0].owned);
        assert!(!session.diagnostics.has_errors());
    }

    #[test]
    fn test_struct_extending_foreign_is_conflict() {
        let mut session = CompilationSession::default();
        let opaque = AstNode::declaration(Tag::ClassDecl, "Opaque").with_attr("is-cobject", "false");
        declare_forward(&extract_forward(&opaque, &mut session).unwrap(), &mut session);

        let node = AstNode::declaration(Tag::Struct, "Wrapped")
            .extends("Opaque")
            .with_child(AstNode::field("n", "int"));
        let class = prepare(&node, &mut session);
        assert_eq!(class.category, Category::Struct);
        assert_eq!(class.base_class.as_deref(), Some("Opaque"));
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::CategoryConflict), 1);
    }

    #[test]
    fn test_struct_naming_ignores_accessor_policy() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Struct, "Sample")
            .with_property("omitGetVerb", &["true"])
            .with_property("customize", &["true"])
            .with_child(AstNode::field("value", "double"));
        let class = prepare(&node, &mut session);
        assert_eq!(class.class_name, "Sample_Base");
        assert_eq!(class.real_name, "Sample");
        assert_eq!(class.fields[0].var, "value");
        assert_eq!(class.fields[0].getter, "");
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::NamingCollision), 1);
        assert!(!session.diagnostics.has_errors());
    }

    #[test]
    fn test_abstract_field_requires_customize() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "Job")
            .with_child(AstNode::field("cost", "double").as_abstract());
        let class = prepare(&node, &mut session);
        assert!(class.fields[0].is_abstract);
        assert_eq!(session.diagnostics.error_count(), 1);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InvalidFieldUsage), 1);

        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "Job")
            .with_property("customize", &["true"])
            .with_child(AstNode::field("cost", "double").as_abstract());
        prepare(&node, &mut session);
        assert!(!session.diagnostics.has_errors());

        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Struct, "S")
            .with_child(AstNode::field("cost", "double").as_abstract());
        prepare(&node, &mut session);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InternalError), 1);
    }

    #[test]
    fn test_invalid_field_shapes() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Struct, "S")
            .with_child(AstNode::field("p", "int *"))
            .with_child(AstNode::field("a", "int").as_array(Some("3")).with_default("1"))
            .with_child(AstNode::field("d", "int").as_array(None));
        let class = prepare(&node, &mut session);
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InvalidFieldUsage), 3);
        assert_eq!(class.fields[1].shape, ArrayShape::Fixed("3".to_string()));
        assert_eq!(class.fields[2].shape, ArrayShape::Dynamic);
    }

    #[test]
    fn test_enum_binding() {
        let mut session = CompilationSession::default();
        session.enter_namespace("gfx", &SourceLocation::default());
        session.enums.register("gfx::Color", vec![("RED".into(), "0".into())]);
        let node = AstNode::declaration(Tag::Message, "Paint")
            .with_child(AstNode::field("color", "int").with_property("enum", &["Color"]))
            .with_child(AstNode::field("shade", "int").with_property("enum", &["Shade"]));
        let class = prepare(&node, &mut session);

        let color = &class.fields[0];
        assert_eq!(color.enum_qname.as_deref(), Some("gfx::Color"));
        assert_eq!(color.to_string, "enum2string($, \"gfx::Color\")");
        assert_eq!(color.from_string, "(gfx::Color)string2enum($, \"gfx::Color\")");
        assert_eq!(color.properties.string_property("enum", ""), "gfx::Color");

        let shade = &class.fields[1];
        assert_eq!(shade.enum_qname, None);
        assert_eq!(shade.to_string, "long2string");
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::UnresolvedReference), 1);
    }

    #[test]
    fn test_explicit_conversions_win() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Class, "C").with_child(
            AstNode::field("t", "double")
                .with_property("tostring", &[".str()"])
                .with_property("fromstring", &["parse($)"]),
        );
        let class = prepare(&node, &mut session);
        assert_eq!(class.fields[0].to_string, ".str()");
        assert_eq!(class.fields[0].from_string, "parse($)");
    }

    #[test]
    fn test_omit_get_verb_collision_falls_back() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Class, "C")
            .with_property("omitGetVerb", &["true"])
            .with_child(AstNode::field("size", "int").as_array(None));
        let class = prepare(&node, &mut session);
        assert_eq!(class.field_suffix, "_var");
        assert_eq!(class.fields[0].var, "size_var");
        assert_eq!(class.fields[0].getter, "size");
        assert_eq!(class.fields[0].size_getter, "sizeArraySize");
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::NamingCollision), 1);
        assert!(!session.diagnostics.has_errors());
    }

    #[test]
    fn test_editability() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "M")
            .with_child(AstNode::field("a", "int"))
            .with_child(AstNode::field("b", "int").with_property("editable", &["false"]))
            .with_child(AstNode::field("c", "omnetpp::cObject"))
            .with_child(AstNode::field("d", "omnetpp::cObject").with_property("editable", &[]));
        let class = prepare(&node, &mut session);
        let editable: Vec<bool> = class.fields.iter().map(|f| f.editable).collect();
        assert_eq!(editable, vec![true, false, false, true]);
        // `d` is editable but has no fromstring conversion
        assert_eq!(session.diagnostics.count_of(DiagnosticKind::InvalidFieldUsage), 1);

        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "R")
            .with_property("descriptor", &["readonly"])
            .with_child(AstNode::field("a", "int"));
        let class = prepare(&node, &mut session);
        assert!(class.generate_descriptor);
        assert!(!class.descriptor_setters);
        assert!(!class.fields[0].editable);
    }

    #[test]
    fn test_ambiguous_field_type_is_warning() {
        let mut session = CompilationSession::default();
        session.types.register("a::Foo", Category::Struct, Origin::Defined);
        session.types.register("b::Foo", Category::Struct, Origin::Defined);
        session.enter_namespace("c", &SourceLocation::default());
        let node = AstNode::declaration(Tag::Message, "M").with_child(AstNode::field("f", "Foo"));
        let class = prepare(&node, &mut session);
        assert_eq!(class.fields[0].type_qname.as_deref(), Some("a::Foo"));
        assert_eq!(session.diagnostics.warning_count(), 1);
        assert!(!session.diagnostics.has_errors());
    }

    #[test]
    fn test_base_overrides() {
        let mut session = CompilationSession::default();
        let node = AstNode::declaration(Tag::Message, "Job")
            .with_property("fieldNameSuffix", &["_m"])
            .with_child(AstNode::field("priority", "").with_default("7"));
        let class = prepare(&node, &mut session);
        assert!(class.fields.is_empty());
        assert_eq!(class.base_overrides[0].setter, "setPriority");
        assert_eq!(class.base_overrides[0].var, "priority_m");
        assert_eq!(class.base_overrides[0].default_value, "7");
    }

    fn field_node(name: &str, ty: &str, array: Option<Option<String>>, default: Option<String>) -> AstNode {
        let mut node = AstNode::field(name, ty);
        if let Some(size) = array {
            node = node.as_array(size.as_deref());
        }
        if let Some(value) = default {
            node = node.with_default(&value);
        }
        node
    }

    proptest! {
        #[test]
        fn prop_preparation_is_idempotent(
            fields in prop::collection::vec(
                (
                    "[a-z][a-z0-9]{0,6}",
                    prop::sample::select(vec!["int", "double", "string", "bool", "uint8", "omnetpp::cObject"]),
                    prop::option::of(prop::option::of("[1-9]")),
                    prop::option::of("[0-9]{1,3}"),
                ),
                0..6,
            ),
            keyword in prop::sample::select(vec![Tag::Message, Tag::Class, Tag::Packet]),
        ) {
            let node = AstNode::declaration(keyword, "Subject").with_children(
                fields.iter().map(|(n, t, a, d)| field_node(n, t, a.clone(), d.clone())),
            );
            let mut first = CompilationSession::default();
            let mut second = CompilationSession::default();
            let a = prepare(&node, &mut first);
            let b = prepare(&node, &mut second);
            prop_assert_eq!(&a.fields, &b.fields);
            prop_assert_eq!(a.category, b.category);
            prop_assert_eq!(first.diagnostics.len(), second.diagnostics.len());
        }

        #[test]
        fn prop_category_follows_base(
            base in prop::sample::select(vec![
                ("omnetpp::cObject", Category::PlainObject),
                ("omnetpp::cNamedObject", Category::NamedObject),
                ("omnetpp::cOwnedObject", Category::OwnedObject),
                ("omnetpp::cPacket", Category::OwnedObject),
            ]),
            name in "[A-Z][a-z]{1,6}",
        ) {
            let mut session = CompilationSession::default();
            let node = AstNode::declaration(Tag::Class, &name).extends(base.0);
            let class = prepare(&node, &mut session);
            prop_assert_eq!(class.category, base.1);
            prop_assert_eq!(session.types.classify(&name), Some(base.1));
        }
    }
}
