use super::Emitter;
use crate::prepare::PreparedClass;
use crate::types::ArrayShape;

impl Emitter<'_> {
    /// Plain struct with public members and free pack/unpack helpers.
    pub(crate) fn emit_struct(&mut self, class: &PreparedClass<'_>) {
        let name = &class.class_name;
        let real_name = &class.real_name;
        let buffer = self.runtime.comm_buffer();

        let mut header = self.doc_opening("Struct", class.node, &class.location);
        header.push_str(" */\n");
        header.push_str(&format!("struct {}{}", self.export, name));
        if let Some(base) = &class.base_class {
            header.push_str(&format!(" : public ::{}", base));
        }
        header.push_str("\n{\n");
        header.push_str(&format!("    {}();\n", name));
        for field in &class.fields {
            match field.shape.fixed_size() {
                Some(size) => header.push_str(&format!("    {} {}[{}];\n", field.storage_type, field.var, size)),
                None => header.push_str(&format!("    {} {};\n", field.storage_type, field.var)),
            }
        }
        header.push_str("};\n\n");
        header.push_str("// helpers for local use\n");
        header.push_str(&format!(
            "void {}__doPacking({} *b, const {}& a);\n",
            self.export, buffer, name
        ));
        header.push_str(&format!(
            "void {}__doUnpacking({} *b, {}& a);\n\n",
            self.export, buffer, name
        ));
        header.push_str(&format!(
            "inline void doPacking({} *b, const {}& obj) {{ __doPacking(b, obj); }}\n",
            buffer, real_name
        ));
        header.push_str(&format!(
            "inline void doUnpacking({} *b, {}& obj) {{ __doUnpacking(b, obj); }}\n\n",
            buffer, real_name
        ));
        self.header.push_str(&header);

        let mut source = String::new();
        source.push_str(&format!("{}::{}()\n", name, name));
        source.push_str("{\n");
        for field in class.base_overrides.iter().filter(|f| !f.default_value.is_empty()) {
            source.push_str(&format!("    this->{} = {};\n", field.var, field.default_value));
        }
        if !class.base_overrides.is_empty() && !class.fields.is_empty() {
            source.push('\n');
        }
        for field in class.fields.iter().filter(|f| !f.is_compound() && !f.default_value.is_empty()) {
            match &field.shape {
                ArrayShape::Fixed(size) => {
                    source.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                    source.push_str(&format!("        this->{}[i] = {};\n", field.var, field.default_value));
                }
                _ => source.push_str(&format!("    this->{} = {};\n", field.var, field.default_value)),
            }
        }
        source.push_str("}\n\n");

        for unpack in [false, true] {
            let (function, free, array) = if unpack {
                ("__doUnpacking", "doUnpacking", "doArrayUnpacking")
            } else {
                ("__doPacking", "doPacking", "doArrayPacking")
            };
            let constness = if unpack { "" } else { "const " };
            source.push_str(&format!(
                "void {}({} *b, {}{}& a)\n",
                function, buffer, constness, name
            ));
            source.push_str("{\n");
            if let Some(base) = &class.base_class {
                source.push_str(&format!("    {}(b,(::{}&)a);\n", free, base));
            }
            for field in class.fields.iter().filter(|f| !f.no_pack) {
                match field.shape.fixed_size() {
                    Some(size) => source.push_str(&format!("    {}(b,a.{},{});\n", array, field.var, size)),
                    None => source.push_str(&format!("    {}(b,a.{});\n", free, field.var)),
                }
            }
            source.push_str("}\n\n");
        }
        self.source.push_str(&source);
    }
}
