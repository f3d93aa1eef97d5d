//! Reflection descriptors.
//!
//! A descriptor lets tooling enumerate a type's fields, read them as strings, set
//! editable ones from strings and reach nested compound values. Field indices are
//! local to the declaration; indices below the base descriptor's field count are
//! delegated to it.

use super::{Emitter, quote};
use crate::prepare::{PreparedClass, PreparedField};
use crate::types::{ArrayShape, Category};

/// `{prefix}value{suffix}` pieces of a to-string conversion.
///
/// `$` marks where the value goes; a leading `.` is a member call on the value;
/// anything else is a function applied to it.
fn split_to_string(conversion: &str) -> (String, String) {
    if let Some((before, after)) = conversion.split_once('$') {
        (before.to_string(), after.to_string())
    } else if conversion.starts_with('.') {
        (String::new(), conversion.to_string())
    } else {
        (format!("{}(", conversion), ")".to_string())
    }
}

/// The from-string conversion applied to the variable `value`.
fn apply_from_string(conversion: &str) -> String {
    match conversion.split_once('$') {
        Some((before, after)) => format!("{}value{}", before, after),
        None => format!("{}(value)", conversion),
    }
}

fn type_flags(field: &PreparedField) -> String {
    let mut flags: Vec<&str> = Vec::new();
    if field.shape.is_array() {
        flags.push("FD_ISARRAY");
    }
    if field.is_compound() {
        flags.push("FD_ISCOMPOUND");
    }
    if field.is_pointer {
        flags.push("FD_ISPOINTER");
    }
    match field.type_category {
        Some(Category::PlainObject | Category::NamedObject) => flags.push("FD_ISCOBJECT"),
        Some(Category::OwnedObject) => flags.push("FD_ISCOBJECT | FD_ISCOWNEDOBJECT"),
        _ => {}
    }
    if field.editable {
        flags.push("FD_ISEDITABLE");
    }
    if flags.is_empty() {
        "0".to_string()
    } else {
        flags.join(" | ")
    }
}

impl Emitter<'_> {
    pub(crate) fn emit_descriptor(&mut self, class: &PreparedClass<'_>) {
        let descriptor = &class.descriptor_name;
        let base_descriptor = self.runtime.class_descriptor();
        let object = self.runtime.root_object();
        let count = class.fields.len();
        let mut out = String::new();

        out.push_str(&format!("class {} : public {}\n", descriptor, base_descriptor));
        out.push_str("{\n");
        out.push_str("  private:\n");
        out.push_str("    mutable const char **propertynames;\n");
        out.push_str("  public:\n");
        out.push_str(&format!("    {}();\n", descriptor));
        out.push_str(&format!("    virtual ~{}();\n", descriptor));
        out.push('\n');
        out.push_str(&format!("    virtual bool doesSupport({} *obj) const override;\n", object));
        out.push_str("    virtual const char **getPropertyNames() const override;\n");
        out.push_str("    virtual const char *getProperty(const char *propertyname) const override;\n");
        out.push_str("    virtual int getFieldCount() const override;\n");
        out.push_str("    virtual const char *getFieldName(int field) const override;\n");
        out.push_str("    virtual int findField(const char *fieldName) const override;\n");
        out.push_str("    virtual unsigned int getFieldTypeFlags(int field) const override;\n");
        out.push_str("    virtual const char *getFieldTypeString(int field) const override;\n");
        out.push_str("    virtual const char **getFieldPropertyNames(int field) const override;\n");
        out.push_str("    virtual const char *getFieldProperty(int field, const char *propertyname) const override;\n");
        out.push_str("    virtual int getFieldArraySize(void *object, int field) const override;\n");
        out.push('\n');
        out.push_str("    virtual std::string getFieldValueAsString(void *object, int field, int i) const override;\n");
        out.push_str("    virtual bool setFieldValueAsString(void *object, int field, int i, const char *value) const override;\n");
        out.push('\n');
        out.push_str("    virtual const char *getFieldStructName(int field) const override;\n");
        out.push_str("    virtual void *getFieldStructValuePointer(void *object, int field, int i) const override;\n");
        out.push_str("};\n\n");

        out.push_str(&format!("Register_ClassDescriptor({});\n\n", descriptor));

        out.push_str(&format!(
            "{}::{}() : {}({}, {})\n",
            descriptor,
            descriptor,
            base_descriptor,
            quote(&class.qualified_real_name),
            quote(class.base_class.as_deref().unwrap_or(""))
        ));
        out.push_str("{\n");
        out.push_str("    propertynames = nullptr;\n");
        out.push_str("}\n\n");
        out.push_str(&format!("{}::~{}()\n", descriptor, descriptor));
        out.push_str("{\n");
        out.push_str("    delete[] propertynames;\n");
        out.push_str("}\n\n");

        out.push_str(&format!("bool {}::doesSupport({} *obj) const\n", descriptor, object));
        out.push_str("{\n");
        out.push_str(&format!("    return dynamic_cast<{} *>(obj)!=nullptr;\n", class.class_name));
        out.push_str("}\n\n");

        out.push_str(&self.class_properties(class));

        out.push_str(&format!("int {}::getFieldCount() const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.base_lookup());
        out.push_str(&format!(
            "    return basedesc ? {}+basedesc->getFieldCount() : {};\n",
            count, count
        ));
        out.push_str("}\n\n");

        // getFieldTypeFlags
        out.push_str(&format!("unsigned int {}::getFieldTypeFlags(int field) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldTypeFlags(field)"));
        if count == 0 {
            out.push_str("    return 0;\n");
        } else {
            out.push_str("    static unsigned int fieldTypeFlags[] = {\n");
            for field in &class.fields {
                out.push_str(&format!("        {},\n", type_flags(field)));
            }
            out.push_str("    };\n");
            out.push_str(&format!(
                "    return (field>=0 && field<{}) ? fieldTypeFlags[field] : 0;\n",
                count
            ));
        }
        out.push_str("}\n\n");

        // getFieldName
        out.push_str(&format!("const char *{}::getFieldName(int field) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldName(field)"));
        out.push_str(&Self::string_table("fieldNames", class.fields.iter().map(|f| f.name.as_str())));
        out.push_str("}\n\n");

        // findField
        out.push_str(&format!("int {}::findField(const char *fieldName) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.base_lookup());
        if count > 0 {
            out.push_str("    int base = basedesc ? basedesc->getFieldCount() : 0;\n");
            for (i, field) in class.fields.iter().enumerate() {
                let first = field.name.chars().next().unwrap_or_default();
                out.push_str(&format!(
                    "    if (fieldName[0]=='{}' && strcmp(fieldName, \"{}\")==0) return base+{};\n",
                    first, field.name, i
                ));
            }
        }
        out.push_str("    return basedesc ? basedesc->findField(fieldName) : -1;\n");
        out.push_str("}\n\n");

        // getFieldTypeString: the type as declared, not the resolved name
        out.push_str(&format!("const char *{}::getFieldTypeString(int field) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldTypeString(field)"));
        out.push_str(&Self::string_table(
            "fieldTypeStrings",
            class.fields.iter().map(|f| f.declared_type.as_str()),
        ));
        out.push_str("}\n\n");

        out.push_str(&self.field_properties(class));

        // getFieldArraySize
        out.push_str(&format!("int {}::getFieldArraySize(void *object, int field) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldArraySize(object, field)"));
        out.push_str(&Self::object_cast(class));
        out.push_str("    switch (field) {\n");
        for (i, field) in class.fields.iter().enumerate() {
            match &field.shape {
                ArrayShape::Fixed(size) => out.push_str(&format!("        case {}: return {};\n", i, size)),
                ArrayShape::Dynamic if class.is_struct() => {
                    out.push_str(&format!("        case {}: return pp->{};\n", i, field.size_var))
                }
                ArrayShape::Dynamic => {
                    out.push_str(&format!("        case {}: return pp->{}();\n", i, field.size_getter))
                }
                ArrayShape::Scalar => {}
            }
        }
        out.push_str("        default: return 0;\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");

        out.push_str(&self.value_as_string(class));
        out.push_str(&self.set_value_as_string(class));
        out.push_str(&self.struct_access(class));

        tracing::debug!(descriptor = %descriptor, fields = count, "emitted descriptor");
        self.source.push_str(&out);
    }

    fn base_lookup(&self) -> String {
        format!(
            "    {} *basedesc = getBaseClassDescriptor();\n",
            self.runtime.class_descriptor()
        )
    }

    /// Forward base-class field indices to the base descriptor and rebase the rest.
    fn delegate(&self, call: &str) -> String {
        let mut out = self.base_lookup();
        out.push_str("    if (basedesc) {\n");
        out.push_str("        if (field < basedesc->getFieldCount())\n");
        out.push_str(&format!("            return basedesc->{};\n", call));
        out.push_str("        field -= basedesc->getFieldCount();\n");
        out.push_str("    }\n");
        out
    }

    fn object_cast(class: &PreparedClass<'_>) -> String {
        format!(
            "    {} *pp = ({} *)object; (void)pp;\n",
            class.class_name, class.class_name
        )
    }

    fn string_table<'s>(table: &str, entries: impl ExactSizeIterator<Item = &'s str>) -> String {
        let count = entries.len();
        if count == 0 {
            return "    return nullptr;\n".to_string();
        }
        let mut out = format!("    static const char *{}[] = {{\n", table);
        for entry in entries {
            out.push_str(&format!("        {},\n", quote(entry)));
        }
        out.push_str("    };\n");
        out.push_str(&format!(
            "    return (field>=0 && field<{}) ? {}[field] : nullptr;\n",
            count, table
        ));
        out
    }

    fn class_properties(&self, class: &PreparedClass<'_>) -> String {
        let descriptor = &class.descriptor_name;
        let mut out = String::new();

        out.push_str(&format!("const char **{}::getPropertyNames() const\n", descriptor));
        out.push_str("{\n");
        out.push_str("    if (!propertynames) {\n");
        out.push_str("        static const char *names[] = { ");
        for name in class.properties.names() {
            out.push_str(&format!("{}, ", quote(name)));
        }
        out.push_str(" nullptr };\n");
        out.push_str(&format!(
            "        {} *basedesc = getBaseClassDescriptor();\n",
            self.runtime.class_descriptor()
        ));
        out.push_str("        const char **basenames = basedesc ? basedesc->getPropertyNames() : nullptr;\n");
        out.push_str("        propertynames = mergeLists(basenames, names);\n");
        out.push_str("    }\n");
        out.push_str("    return propertynames;\n");
        out.push_str("}\n\n");

        out.push_str(&format!(
            "const char *{}::getProperty(const char *propertyname) const\n",
            descriptor
        ));
        out.push_str("{\n");
        for (name, value) in class.properties.iter() {
            out.push_str(&format!(
                "    if (!strcmp(propertyname,{})) return {};\n",
                quote(name),
                quote(&value)
            ));
        }
        out.push_str(&self.base_lookup());
        out.push_str("    return basedesc ? basedesc->getProperty(propertyname) : nullptr;\n");
        out.push_str("}\n\n");
        out
    }

    fn field_properties(&self, class: &PreparedClass<'_>) -> String {
        let descriptor = &class.descriptor_name;
        let mut out = String::new();

        out.push_str(&format!(
            "const char **{}::getFieldPropertyNames(int field) const\n",
            descriptor
        ));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldPropertyNames(field)"));
        out.push_str("    switch (field) {\n");
        for (i, field) in class.fields.iter().enumerate().filter(|(_, f)| !f.properties.is_empty()) {
            out.push_str(&format!("        case {}: {{\n", i));
            out.push_str("            static const char *names[] = { ");
            for name in field.properties.names() {
                out.push_str(&format!("{}, ", quote(name)));
            }
            out.push_str(" nullptr };\n");
            out.push_str("            return names;\n");
            out.push_str("        }\n");
        }
        out.push_str("        default: return nullptr;\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");

        out.push_str(&format!(
            "const char *{}::getFieldProperty(int field, const char *propertyname) const\n",
            descriptor
        ));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldProperty(field, propertyname)"));
        out.push_str("    switch (field) {\n");
        for (i, field) in class.fields.iter().enumerate().filter(|(_, f)| !f.properties.is_empty()) {
            out.push_str(&format!("        case {}:\n", i));
            for (name, value) in field.properties.iter() {
                out.push_str(&format!(
                    "            if (!strcmp(propertyname,{})) return {};\n",
                    quote(name),
                    quote(&value)
                ));
            }
            out.push_str("            return nullptr;\n");
        }
        out.push_str("        default: return nullptr;\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");
        out
    }

    /// Expression reading element `i` (arrays) or the value itself.
    fn read_expr(class: &PreparedClass<'_>, field: &PreparedField) -> String {
        match (class.is_struct(), field.shape.is_array()) {
            (true, true) => format!("pp->{}[i]", field.var),
            (true, false) => format!("pp->{}", field.var),
            (false, true) => format!("pp->{}(i)", field.getter),
            (false, false) => format!("pp->{}()", field.getter),
        }
    }

    /// Bounds guard for struct arrays, which have no checked accessors.
    fn struct_bound(field: &PreparedField, fail: &str) -> String {
        let limit = match &field.shape {
            ArrayShape::Fixed(size) => size.clone(),
            _ => format!("pp->{}", field.size_var),
        };
        format!("if (i>={}) return {};\n                ", limit, fail)
    }

    fn value_as_string(&self, class: &PreparedClass<'_>) -> String {
        let descriptor = &class.descriptor_name;
        let mut out = String::new();
        out.push_str(&format!(
            "std::string {}::getFieldValueAsString(void *object, int field, int i) const\n",
            descriptor
        ));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldValueAsString(object,field,i)"));
        out.push_str(&Self::object_cast(class));
        out.push_str("    switch (field) {\n");
        for (i, field) in class.fields.iter().enumerate() {
            let value = Self::read_expr(class, field);
            if field.to_string.is_empty() {
                // compound without a conversion: stream it
                out.push_str(&format!(
                    "        case {}: {{std::stringstream out; out << {}; return out.str();}}\n",
                    i, value
                ));
                continue;
            }
            let (prefix, suffix) = split_to_string(&field.to_string);
            let guard = if class.is_struct() && field.shape.is_array() {
                Self::struct_bound(field, "\"\"")
            } else {
                String::new()
            };
            out.push_str(&format!(
                "        case {}: {}return {}{}{};\n",
                i, guard, prefix, value, suffix
            ));
        }
        out.push_str("        default: return \"\";\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");
        out
    }

    fn set_value_as_string(&self, class: &PreparedClass<'_>) -> String {
        let descriptor = &class.descriptor_name;
        let mut out = String::new();
        out.push_str(&format!(
            "bool {}::setFieldValueAsString(void *object, int field, int i, const char *value) const\n",
            descriptor
        ));
        out.push_str("{\n");
        out.push_str(&self.delegate("setFieldValueAsString(object,field,i,value)"));
        out.push_str(&Self::object_cast(class));
        out.push_str("    switch (field) {\n");
        // editable fields without a conversion were reported during preparation
        for (i, field) in class
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.editable && !f.from_string.is_empty())
        {
            let converted = apply_from_string(&field.from_string);
            let statement = match (class.is_struct(), field.shape.is_array()) {
                (true, true) => format!(
                    "{}pp->{}[i] = {}; return true;",
                    Self::struct_bound(field, "false"),
                    field.var,
                    converted
                ),
                (true, false) => format!("pp->{} = {}; return true;", field.var, converted),
                (false, true) => format!("pp->{}(i,{}); return true;", field.setter, converted),
                (false, false) => format!("pp->{}({}); return true;", field.setter, converted),
            };
            out.push_str(&format!("        case {}: {}\n", i, statement));
        }
        out.push_str("        default: return false;\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");
        out
    }

    fn struct_access(&self, class: &PreparedClass<'_>) -> String {
        let descriptor = &class.descriptor_name;
        let nested: Vec<(usize, &PreparedField)> = class
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_compound() && !f.opaque)
            .collect();
        let mut out = String::new();

        out.push_str(&format!("const char *{}::getFieldStructName(int field) const\n", descriptor));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldStructName(field)"));
        if class.fields.is_empty() {
            out.push_str("    return nullptr;\n");
        } else {
            out.push_str("    switch (field) {\n");
            for (i, field) in &nested {
                out.push_str(&format!(
                    "        case {}: return {}(typeid({}));\n",
                    i,
                    self.runtime.qualify("opp_typename"),
                    field.declared_type
                ));
            }
            out.push_str("        default: return nullptr;\n");
            out.push_str("    };\n");
        }
        out.push_str("}\n\n");

        out.push_str(&format!(
            "void *{}::getFieldStructValuePointer(void *object, int field, int i) const\n",
            descriptor
        ));
        out.push_str("{\n");
        out.push_str(&self.delegate("getFieldStructValuePointer(object, field, i)"));
        out.push_str(&Self::object_cast(class));
        out.push_str("    switch (field) {\n");
        for (i, field) in &nested {
            let cast = if field.object_category().is_some() {
                format!("(void *)static_cast<{} *>", self.runtime.root_object())
            } else {
                "(void *)".to_string()
            };
            let value = Self::read_expr(class, field);
            let target = if field.is_pointer { value } else { format!("&{}", value) };
            out.push_str(&format!("        case {}: return {}({}); break;\n", i, cast, target));
        }
        out.push_str("        default: return nullptr;\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::render;
    use super::*;
    use crate::ast::{AstNode, Tag};
    use crate::primitives::PRIMITIVE_TYPES;
    use crate::session::CompilationSession;
    use proptest::prelude::*;

    /// Feeds the printed form of `operand` through the parser, as a getter/setter pair would.
    fn reparse(to_string: &str, from_string: &str, operand: &str) -> String {
        let (before, after) = split_to_string(to_string);
        let printed = format!("{}{}{}", before, operand, after);
        match from_string.split_once('$') {
            Some((before, after)) => format!("{}{}{}", before, printed, after),
            None => apply_from_string(from_string).replace("(value)", &format!("({})", printed)),
        }
    }

    #[test]
    fn test_conversion_splitting() {
        assert_eq!(split_to_string("long2string"), ("long2string(".to_string(), ")".to_string()));
        assert_eq!(split_to_string(".str()"), (String::new(), ".str()".to_string()));
        assert_eq!(
            split_to_string("enum2string($, \"Color\")"),
            ("enum2string(".to_string(), ", \"Color\")".to_string())
        );
        assert_eq!(apply_from_string("string2long"), "string2long(value)");
        assert_eq!(apply_from_string("$"), "value");
        assert_eq!(apply_from_string("(Color)string2enum($, \"Color\")"), "(Color)string2enum(value, \"Color\")");
    }

    #[test]
    fn test_message_descriptor() {
        let node = AstNode::declaration(Tag::Message, "Job")
            .with_property("customize", &["true"])
            .with_child(AstNode::field("priority", "int").with_property("unit", &["s"]))
            .with_child(AstNode::field("route", "int").as_array(None))
            .with_child(AstNode::field("owner", "string").with_property("editable", &["false"]))
            .with_child(AstNode::field("payload", "omnetpp::cPacket"));
        let mut session = CompilationSession::default();
        session.enter_namespace("sched", &Default::default());
        let (_, source) = render(&node, &mut session);

        assert!(source.contains("class JobDescriptor : public omnetpp::cClassDescriptor\n"));
        assert!(source.contains("Register_ClassDescriptor(JobDescriptor);\n"));
        assert!(source.contains("JobDescriptor::JobDescriptor() : omnetpp::cClassDescriptor(\"sched::Job\", \"omnetpp::cMessage\")\n"));
        assert!(source.contains("    return dynamic_cast<Job_Base *>(obj)!=nullptr;\n"));
        assert!(source.contains("        static const char *names[] = { \"customize\",  nullptr };\n"));
        assert!(source.contains("    if (!strcmp(propertyname,\"customize\")) return \"true\";\n"));
        assert!(source.contains("    return basedesc ? 4+basedesc->getFieldCount() : 4;\n"));
        assert!(source.contains(
            "        FD_ISEDITABLE,\n        FD_ISARRAY | FD_ISEDITABLE,\n        0,\n        FD_ISCOMPOUND | FD_ISCOBJECT | FD_ISCOWNEDOBJECT,\n"
        ));
        assert!(source.contains("    if (fieldName[0]=='r' && strcmp(fieldName, \"route\")==0) return base+1;\n"));
        assert!(source.contains("        \"omnetpp::cPacket\",\n"));
        assert!(source.contains("            if (!strcmp(propertyname,\"unit\")) return \"s\";\n"));
        assert!(source.contains("        case 1: return pp->getRouteArraySize();\n"));
        assert!(source.contains("        case 0: return long2string(pp->getPriority());\n"));
        assert!(source.contains("        case 2: return oppstring2string(pp->getOwner());\n"));
        assert!(source.contains("        case 3: {std::stringstream out; out << pp->getPayload(); return out.str();}\n"));
        assert!(source.contains("        case 0: pp->setPriority(string2long(value)); return true;\n"));
        assert!(source.contains("        case 1: pp->setRoute(i,string2long(value)); return true;\n"));
        assert!(!source.contains("pp->setOwner("));
        assert!(source.contains("        case 3: return omnetpp::opp_typename(typeid(omnetpp::cPacket));\n"));
        assert!(source.contains("        case 3: return (void *)static_cast<omnetpp::cObject *>(&pp->getPayload()); break;\n"));
    }

    #[test]
    fn test_struct_descriptor_reads_members() {
        let node = AstNode::declaration(Tag::Struct, "Point")
            .with_child(AstNode::field("x", "double"))
            .with_child(AstNode::field("tags", "int").as_array(Some("4")));
        let mut session = CompilationSession::default();
        let (_, source) = render(&node, &mut session);

        assert!(source.contains("PointDescriptor::PointDescriptor() : omnetpp::cClassDescriptor(\"Point\", \"\")\n"));
        assert!(source.contains("        case 0: return double2string(pp->x);\n"));
        assert!(source.contains("        case 1: if (i>=4) return \"\";\n                return long2string(pp->tags[i]);\n"));
        assert!(source.contains("        case 0: pp->x = string2double(value); return true;\n"));
        assert!(source.contains("        case 1: if (i>=4) return false;\n                pp->tags[i] = string2long(value); return true;\n"));
        assert!(source.contains("        case 1: return 4;\n"));
    }

    #[test]
    fn test_empty_descriptor() {
        let node = AstNode::declaration(Tag::Class, "Empty").with_property("descriptor", &["readonly"]);
        let mut session = CompilationSession::default();
        let (_, source) = render(&node, &mut session);
        assert!(source.contains("    return basedesc ? 0+basedesc->getFieldCount() : 0;\n"));
        assert!(source.contains("        field -= basedesc->getFieldCount();\n    }\n    return 0;\n}\n"));
        assert!(source.contains("        field -= basedesc->getFieldCount();\n    }\n    return nullptr;\n}\n"));
        assert!(!source.contains("int base = "));
    }

    #[test]
    fn test_descriptor_suppressed() {
        let node = AstNode::declaration(Tag::Message, "Quiet").with_property("descriptor", &["false"]);
        let mut session = CompilationSession::default();
        let (header, source) = render(&node, &mut session);
        assert!(header.contains("class Quiet : public ::omnetpp::cMessage"));
        assert!(!source.contains("QuietDescriptor"));
    }

    #[test]
    fn test_opaque_and_enum_fields() {
        let mut session = CompilationSession::default();
        session.enums.register("Color", vec![("RED".into(), "0".into())]);
        let inner = AstNode::declaration(Tag::Struct, "Inner");
        render(&inner, &mut session);

        let node = AstNode::declaration(Tag::Class, "Holder")
            .with_child(AstNode::field("color", "int").with_property("enum", &["Color"]))
            .with_child(AstNode::field("blob", "Inner").with_property("opaque", &["true"]));
        let (_, source) = render(&node, &mut session);
        assert!(source.contains("        case 0: return enum2string(pp->getColor(), \"Color\");\n"));
        assert!(source.contains("        case 0: pp->setColor((Color)string2enum(value, \"Color\")); return true;\n"));
        assert!(!source.contains("typeid(Inner)"));
        assert!(source.contains("    switch (field) {\n        default: return nullptr;\n    };\n"));
    }

    proptest! {
        #[test]
        fn prop_primitive_conversions_reparse_printed_value(operand in "[a-z][a-z0-9_]{0,8}") {
            for p in PRIMITIVE_TYPES {
                let reparsed = reparse(p.to_string, p.from_string, &operand);
                if p.is_string() {
                    // strings parse as themselves
                    prop_assert_eq!(reparsed, format!("oppstring2string({})", operand));
                } else {
                    prop_assert_eq!(
                        &reparsed,
                        &format!("{}({}({}))", p.from_string, p.to_string, operand),
                        "{}", p.name
                    );
                    let parsed_as = p.from_string.trim_start_matches("string2");
                    let printed_from = p.to_string.trim_end_matches("2string");
                    prop_assert_eq!(parsed_as, printed_from, "{}", p.name);
                }
            }
        }
    }
}
