//! Data-holder classes: declaration, lifecycle, pack/unpack bridge and accessors.

use super::Emitter;
use crate::prepare::{PreparedClass, PreparedField};
use crate::types::ArrayShape;

impl Emitter<'_> {
    pub(crate) fn emit_class(&mut self, class: &PreparedClass<'_>) {
        let declaration = self.class_declaration(class);
        self.header.push_str(&declaration);

        if !class.customize {
            if class.category.is_object() {
                self.source.push_str(&format!("Register_Class({});\n\n", class.class_name));
            }
            let buffer = self.runtime.comm_buffer();
            self.header.push_str(&format!(
                "inline void doPacking({} *b, const {}& obj) {{obj.parsimPack(b);}}\n",
                buffer, class.real_name
            ));
            self.header.push_str(&format!(
                "inline void doUnpacking({} *b, {}& obj) {{obj.parsimUnpack(b);}}\n\n",
                buffer, class.real_name
            ));
        }

        let lifecycle = self.class_lifecycle(class);
        self.source.push_str(&lifecycle);
        let bridge = self.class_bridge(class);
        self.source.push_str(&bridge);
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            let accessors = self.accessor_definitions(class, field);
            self.source.push_str(&accessors);
        }
    }

    /// Constructor parameters as declared, as defined, and as forwarded to the base.
    /// Named objects take a name, messages and packets also a kind.
    fn constructor_params(class: &PreparedClass<'_>) -> (&'static str, &'static str, &'static str) {
        if !class.category.is_named() {
            ("()", "()", "()")
        } else if class.keyword.has_kind() {
            ("(const char *name=nullptr, int kind=0)", "(const char *name, int kind)", "(name,kind)")
        } else {
            ("(const char *name=nullptr)", "(const char *name)", "(name)")
        }
    }

    fn customization_note(&self, class: &PreparedClass<'_>) -> String {
        let (generated, real) = (&class.class_name, &class.real_name);
        let mut output = String::new();
        output.push_str(" *\n");
        output.push_str(&format!(
            " * {} is only useful if it gets subclassed, and {} is derived from it.\n",
            generated, real
        ));
        output.push_str(&format!(" * The minimum code to be written for {} is the following:\n", real));
        output.push_str(" *\n");
        output.push_str(" * <pre>\n");
        output.push_str(&format!(" * class {}{} : public {}\n", self.export, real, generated));
        output.push_str(" * {\n");
        output.push_str(" *   private:\n");
        output.push_str(&format!(" *     void copy(const {}& other) {{ ... }}\n\n", real));
        output.push_str(" *   public:\n");
        let (params, _, forward) = Self::constructor_params(class);
        output.push_str(&format!(" *     {}{} : {}{} {{}}\n", real, params, generated, forward));
        output.push_str(&format!(
            " *     {}(const {}& other) : {}(other) {{copy(other);}}\n",
            real, real, generated
        ));
        output.push_str(&format!(
            " *     {}& operator=(const {}& other) {{if (this==&other) return *this; {}::operator=(other); copy(other); return *this;}}\n",
            real, real, generated
        ));
        if class.category.is_object() {
            output.push_str(&format!(
                " *     virtual {} *dup() const {{return new {}(*this);}}\n",
                real, real
            ));
        }
        output.push_str(&format!(
            " *     // ADD CODE HERE to redefine and implement pure virtual functions from {}\n",
            generated
        ));
        output.push_str(" * };\n");
        output.push_str(" * </pre>\n");
        if class.category.is_object() {
            output.push_str(" *\n");
            output.push_str(" * The following should go into a .cc (.cpp) file:\n");
            output.push_str(" *\n");
            output.push_str(" * <pre>\n");
            output.push_str(&format!(" * Register_Class({});\n", real));
            output.push_str(" * </pre>\n");
        }
        output
    }

    fn class_declaration(&self, class: &PreparedClass<'_>) -> String {
        let name = &class.class_name;
        let mut output = self.doc_opening("Class", class.node, &class.location);
        if class.customize {
            output.push_str(&self.customization_note(class));
        }
        output.push_str(" */\n");

        output.push_str(&format!("class {}{}", self.export, name));
        let mut bases: Vec<String> = Vec::new();
        if let Some(base) = &class.base_class {
            bases.push(format!("public ::{}", base));
        }
        bases.extend(class.implements.iter().map(|i| format!("public {}", i)));
        if !bases.is_empty() {
            output.push_str(&format!(" : {}", bases.join(", ")));
        }
        output.push_str("\n{\n");

        output.push_str("  protected:\n");
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            match &field.shape {
                ArrayShape::Fixed(size) => {
                    output.push_str(&format!("    {} {}[{}];\n", field.storage_type, field.var, size))
                }
                ArrayShape::Dynamic => {
                    output.push_str(&format!("    {} *{}; // array ptr\n", field.storage_type, field.var));
                    output.push_str(&format!("    {} {};\n", field.size_type, field.size_var));
                }
                ArrayShape::Scalar => {
                    output.push_str(&format!("    {} {};\n", field.storage_type, field.var))
                }
            }
        }
        output.push('\n');
        output.push_str("  private:\n");
        output.push_str(&format!("    void copy(const {}& other);\n\n", name));
        output.push_str("  protected:\n");
        output.push_str("    // protected and unimplemented operator==(), to prevent accidental usage\n");
        output.push_str(&format!("    bool operator==(const {}&);\n", name));
        if class.customize {
            output.push_str("    // make constructors protected to avoid instantiation\n");
        } else {
            output.push_str("\n  public:\n");
        }
        output.push_str(&format!("    {}{};\n", name, Self::constructor_params(class).0));
        output.push_str(&format!("    {}(const {}& other);\n", name, name));
        if class.customize {
            output.push_str("    // make assignment operator protected to force the user override it\n");
            output.push_str(&format!("    {}& operator=(const {}& other);\n", name, name));
            output.push_str("\n  public:\n");
        }
        output.push_str(&format!("    virtual ~{}();\n", name));
        if !class.customize {
            output.push_str(&format!("    {}& operator=(const {}& other);\n", name, name));
        }
        if class.customize {
            output.push_str(&format!(
                "    virtual {} *dup() const {{throw {}(\"You forgot to manually add a dup() function to class {}\");}}\n",
                name,
                self.runtime.runtime_error(),
                class.real_name
            ));
        } else {
            output.push_str(&format!(
                "    virtual {} *dup() const {{return new {}(*this);}}\n",
                name, name
            ));
        }
        let buffer = self.runtime.comm_buffer();
        output.push_str(&format!("    virtual void parsimPack({} *b) const;\n", buffer));
        output.push_str(&format!("    virtual void parsimUnpack({} *b);\n", buffer));
        output.push('\n');
        output.push_str("    // field getter/setter methods\n");
        for field in &class.fields {
            output.push_str(&Self::accessor_declarations(class, field));
        }
        output.push_str("};\n\n");
        output
    }

    fn accessor_declarations(class: &PreparedClass<'_>, field: &PreparedField) -> String {
        let pure = if field.is_abstract { " = 0" } else { "" };
        let constness = if field.is_compound() { "" } else { " const" };
        let size_type = &field.size_type;
        let index = if field.shape.is_array() {
            format!("{} k", size_type)
        } else {
            String::new()
        };
        let index_arg = if field.shape.is_array() { "k" } else { "" };
        let setter_params = if field.shape.is_array() {
            format!("{} k, {} {}", size_type, field.arg_type, field.name)
        } else {
            format!("{} {}", field.arg_type, field.name)
        };

        let mut output = String::new();
        if field.shape == ArrayShape::Dynamic {
            output.push_str(&format!(
                "    virtual void {}({} size){};\n",
                field.size_setter, size_type, pure
            ));
        }
        if field.shape.is_array() {
            output.push_str(&format!(
                "    virtual {} {}() const{};\n",
                size_type, field.size_getter, pure
            ));
        }
        output.push_str(&format!(
            "    virtual {} {}({}){}{};\n",
            field.return_type, field.getter, index, constness, pure
        ));
        if field.is_compound() {
            output.push_str(&format!(
                "    virtual const {} {}({}) const {{return const_cast<{}*>(this)->{}({});}}\n",
                field.return_type, field.getter, index, class.class_name, field.getter, index_arg
            ));
        }
        output.push_str(&format!(
            "    virtual void {}({}){};\n",
            field.setter, setter_params, pure
        ));
        output
    }

    fn class_lifecycle(&self, class: &PreparedClass<'_>) -> String {
        let name = &class.class_name;
        let base = class.base_class.as_deref();
        let mut output = String::new();

        // constructor
        let (_, params, forward) = Self::constructor_params(class);
        match base {
            Some(base) => output.push_str(&format!("{}::{}{} : ::{}{}\n", name, name, params, base, forward)),
            None => output.push_str(&format!("{}::{}{}\n", name, name, params)),
        }
        output.push_str("{\n");
        for field in class.base_overrides.iter().filter(|f| !f.default_value.is_empty()) {
            output.push_str(&format!("    this->{}({});\n", field.setter, field.default_value));
        }
        if !class.base_overrides.is_empty() && !class.fields.is_empty() {
            output.push('\n');
        }
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            match &field.shape {
                ArrayShape::Fixed(size) => {
                    if !field.is_compound() && !field.default_value.is_empty() {
                        output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                        output.push_str(&format!("        this->{}[i] = {};\n", field.var, field.default_value));
                    }
                    if field.owned {
                        output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                        output.push_str(&format!("        take(&(this->{}[i]));\n", field.var));
                    }
                }
                ArrayShape::Dynamic => {
                    output.push_str(&format!("    {} = 0;\n", field.size_var));
                    output.push_str(&format!("    this->{} = 0;\n", field.var));
                }
                ArrayShape::Scalar => {
                    if !field.default_value.is_empty() {
                        output.push_str(&format!("    this->{} = {};\n", field.var, field.default_value));
                    }
                    if field.owned {
                        output.push_str(&format!("    take(&(this->{}));\n", field.var));
                    }
                }
            }
        }
        output.push_str("}\n\n");

        // copy constructor
        output.push_str(&format!("{}::{}(const {}& other)", name, name, name));
        if let Some(base) = base {
            output.push_str(&format!(" : ::{}(other)", base));
        }
        output.push_str("\n{\n");
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            match &field.shape {
                ArrayShape::Fixed(size) if field.owned => {
                    output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                    output.push_str(&format!("        take(&(this->{}[i]));\n", field.var));
                }
                ArrayShape::Dynamic => {
                    output.push_str(&format!("    {} = 0;\n", field.size_var));
                    output.push_str(&format!("    this->{} = 0;\n", field.var));
                }
                ArrayShape::Scalar if field.owned => {
                    output.push_str(&format!("    take(&(this->{}));\n", field.var));
                }
                _ => {}
            }
        }
        output.push_str("    copy(other);\n");
        output.push_str("}\n\n");

        // destructor
        output.push_str(&format!("{}::~{}()\n", name, name));
        output.push_str("{\n");
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            if field.owned {
                match &field.shape {
                    ArrayShape::Scalar => output.push_str(&format!("    drop(&(this->{}));\n", field.var)),
                    ArrayShape::Fixed(size) => {
                        output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                        output.push_str(&format!("        drop(&(this->{}[i]));\n", field.var));
                    }
                    ArrayShape::Dynamic => {
                        output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, field.size_var));
                        output.push_str(&format!("        drop(&(this->{}[i]));\n", field.var));
                    }
                }
            }
            if field.shape == ArrayShape::Dynamic {
                output.push_str(&format!("    delete [] this->{};\n", field.var));
            }
        }
        output.push_str("}\n\n");

        // assignment
        output.push_str(&format!("{}& {}::operator=(const {}& other)\n", name, name, name));
        output.push_str("{\n");
        output.push_str("    if (this==&other) return *this;\n");
        if let Some(base) = base {
            output.push_str(&format!("    ::{}::operator=(other);\n", base));
        }
        output.push_str("    copy(other);\n");
        output.push_str("    return *this;\n");
        output.push_str("}\n\n");

        // copy
        output.push_str(&format!("void {}::copy(const {}& other)\n", name, name));
        output.push_str("{\n");
        for field in class.fields.iter().filter(|f| !f.is_abstract) {
            let named = field.type_category.is_some_and(|c| c.is_named());
            let var = &field.var;
            match &field.shape {
                ArrayShape::Fixed(size) => {
                    output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                    output.push_str(&format!("        this->{}[i] = other.{}[i];\n", var, var));
                    if field.owned {
                        output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size));
                        output.push_str(&format!("        this->{}[i].setName(other.{}[i].getName());\n", var, var));
                    }
                }
                ArrayShape::Dynamic => {
                    let size_var = &field.size_var;
                    output.push_str(&format!("    delete [] this->{};\n", var));
                    output.push_str(&format!(
                        "    this->{} = (other.{}==0) ? nullptr : new {}[other.{}];\n",
                        var, size_var, field.storage_type, size_var
                    ));
                    output.push_str(&format!("    {} = other.{};\n", size_var, size_var));
                    output.push_str(&format!("    for ({} i=0; i<{}; i++)\n", field.size_type, size_var));
                    if field.owned {
                        output.push_str("    {\n");
                        output.push_str(&format!("        take(&(this->{}[i]));\n", var));
                        output.push_str(&format!("        this->{}[i] = other.{}[i];\n", var, var));
                        output.push_str(&format!("        this->{}[i].setName(other.{}[i].getName());\n", var, var));
                        output.push_str("    }\n");
                    } else {
                        output.push_str(&format!("        this->{}[i] = other.{}[i];\n", var, var));
                    }
                }
                ArrayShape::Scalar => {
                    output.push_str(&format!("    this->{} = other.{};\n", var, var));
                    if named {
                        output.push_str(&format!("    this->{}.setName(other.{}.getName());\n", var, var));
                    }
                }
            }
        }
        output.push_str("}\n\n");
        output
    }

    /// `parsimPack`/`parsimUnpack`. Object bases chain through their own members
    /// unless the base is the runtime root; other bases go through `doPacking`.
    fn class_bridge(&self, class: &PreparedClass<'_>) -> String {
        let name = &class.class_name;
        let buffer = self.runtime.comm_buffer();
        let root = self.runtime.root_object();
        let mut output = String::new();

        for unpack in [false, true] {
            if unpack {
                output.push_str(&format!("void {}::parsimUnpack({} *b)\n", name, buffer));
            } else {
                output.push_str(&format!("void {}::parsimPack({} *b) const\n", name, buffer));
            }
            output.push_str("{\n");
            if let Some(base) = &class.base_class {
                let (member, free) = if unpack {
                    ("parsimUnpack", "doUnpacking")
                } else {
                    ("parsimPack", "doPacking")
                };
                if class.category.is_object() {
                    if *base != root {
                        output.push_str(&format!("    ::{}::{}(b);\n", base, member));
                    }
                } else {
                    output.push_str(&format!("    {}(b,(::{}&)*this);\n", free, base));
                }
            }
            for field in class.fields.iter().filter(|f| !f.no_pack) {
                output.push_str(&Self::field_bridge(field, unpack));
            }
            output.push_str("}\n\n");
        }
        output
    }

    fn field_bridge(field: &PreparedField, unpack: bool) -> String {
        let var = &field.var;
        if field.is_abstract {
            let verb = if unpack { "unpacking" } else { "packing" };
            return format!(
                "    // field {} is abstract -- please do {} in customized class\n",
                field.name, verb
            );
        }
        match (&field.shape, unpack) {
            (ArrayShape::Fixed(size), false) => format!("    doArrayPacking(b,this->{},{});\n", var, size),
            (ArrayShape::Fixed(size), true) => format!("    doArrayUnpacking(b,this->{},{});\n", var, size),
            (ArrayShape::Dynamic, false) => format!(
                "    b->pack({});\n    doArrayPacking(b,this->{},{});\n",
                field.size_var, var, field.size_var
            ),
            (ArrayShape::Dynamic, true) => {
                let size_var = &field.size_var;
                let mut output = String::new();
                output.push_str(&format!("    delete [] this->{};\n", var));
                output.push_str(&format!("    b->unpack({});\n", size_var));
                output.push_str(&format!("    if ({}==0) {{\n", size_var));
                output.push_str(&format!("        this->{} = 0;\n", var));
                output.push_str("    } else {\n");
                output.push_str(&format!("        this->{} = new {}[{}];\n", var, field.storage_type, size_var));
                output.push_str(&format!("        doArrayUnpacking(b,this->{},{});\n", var, size_var));
                output.push_str("    }\n");
                output
            }
            (ArrayShape::Scalar, false) => format!("    doPacking(b,this->{});\n", var),
            (ArrayShape::Scalar, true) => format!("    doUnpacking(b,this->{});\n", var),
        }
    }

    fn accessor_definitions(&self, class: &PreparedClass<'_>, field: &PreparedField) -> String {
        let name = &class.class_name;
        let var = &field.var;
        let size_type = &field.size_type;
        let constness = if field.is_compound() { "" } else { " const" };
        let error = self.runtime.runtime_error();
        let mut output = String::new();

        match &field.shape {
            ArrayShape::Fixed(size) => {
                let check = format!(
                    "    if (k>={}) throw {}(\"Array of size {} indexed by %lu\", (unsigned long)k);\n",
                    size, error, size
                );
                output.push_str(&format!("{} {}::{}() const\n", size_type, name, field.size_getter));
                output.push_str("{\n");
                output.push_str(&format!("    return {};\n", size));
                output.push_str("}\n\n");
                output.push_str(&format!(
                    "{} {}::{}({} k){}\n",
                    field.return_type, name, field.getter, size_type, constness
                ));
                output.push_str("{\n");
                output.push_str(&check);
                output.push_str(&format!("    return this->{}[k]{};\n", var, field.c_str));
                output.push_str("}\n\n");
                output.push_str(&format!(
                    "void {}::{}({} k, {} {})\n",
                    name, field.setter, size_type, field.arg_type, field.name
                ));
                output.push_str("{\n");
                output.push_str(&check);
                output.push_str(&format!("    this->{}[k] = {};\n", var, field.name));
                output.push_str("}\n\n");
            }
            ArrayShape::Dynamic => {
                let size_var = &field.size_var;
                let check = format!(
                    "    if (k>={}) throw {}(\"Array of size %d indexed by %d\", {}, k);\n",
                    size_var, error, size_var
                );
                output.push_str(&format!("void {}::{}({} size)\n", name, field.size_setter, size_type));
                output.push_str("{\n");
                output.push_str(&format!(
                    "    {} *{}2 = (size==0) ? nullptr : new {}[size];\n",
                    field.storage_type, var, field.storage_type
                ));
                output.push_str(&format!(
                    "    {} sz = {} < size ? {} : size;\n",
                    size_type, size_var, size_var
                ));
                output.push_str(&format!("    for ({} i=0; i<sz; i++)\n", size_type));
                output.push_str(&format!("        {}2[i] = this->{}[i];\n", var, var));
                if !field.is_compound() {
                    output.push_str(&format!("    for ({} i=sz; i<size; i++)\n", size_type));
                    output.push_str(&format!("        {}2[i] = 0;\n", var));
                }
                if field.owned {
                    output.push_str(&format!("    for ({} i=sz; i<size; i++)\n", size_type));
                    output.push_str(&format!("        take(&({}2[i]));\n", var));
                }
                output.push_str(&format!("    {} = size;\n", size_var));
                output.push_str(&format!("    delete [] this->{};\n", var));
                output.push_str(&format!("    this->{} = {}2;\n", var, var));
                output.push_str("}\n\n");
                output.push_str(&format!("{} {}::{}() const\n", size_type, name, field.size_getter));
                output.push_str("{\n");
                output.push_str(&format!("    return {};\n", size_var));
                output.push_str("}\n\n");
                output.push_str(&format!(
                    "{} {}::{}({} k){}\n",
                    field.return_type, name, field.getter, size_type, constness
                ));
                output.push_str("{\n");
                output.push_str(&check);
                output.push_str(&format!("    return this->{}[k]{};\n", var, field.c_str));
                output.push_str("}\n\n");
                output.push_str(&format!(
                    "void {}::{}({} k, {} {})\n",
                    name, field.setter, size_type, field.arg_type, field.name
                ));
                output.push_str("{\n");
                output.push_str(&check);
                output.push_str(&format!("    this->{}[k] = {};\n", var, field.name));
                output.push_str("}\n\n");
            }
            ArrayShape::Scalar => {
                output.push_str(&format!(
                    "{} {}::{}(){}\n",
                    field.return_type, name, field.getter, constness
                ));
                output.push_str("{\n");
                output.push_str(&format!("    return this->{}{};\n", var, field.c_str));
                output.push_str("}\n\n");
                output.push_str(&format!(
                    "void {}::{}({} {})\n",
                    name, field.setter, field.arg_type, field.name
                ));
                output.push_str("{\n");
                output.push_str(&format!("    this->{} = {};\n", var, field.name));
                output.push_str("}\n\n");
            }
        }
        output
    }
}
