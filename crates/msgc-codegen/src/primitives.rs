//! Built-in scalar types and reserved words.

/// A built-in scalar type of the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveType {
    /// Name as written in definitions.
    pub name: &'static str,
    /// Target-language storage type. Qualified with the runtime namespace when
    /// `in_runtime` is set.
    pub storage: &'static str,
    /// String-to-value conversion (function name or `$` template).
    pub from_string: &'static str,
    /// Value-to-string conversion (function name or `$` template).
    pub to_string: &'static str,
    /// Value used when a field of this type has no default.
    pub empty_value: &'static str,
    pub in_runtime: bool,
}

impl PrimitiveType {
    const fn new(
        name: &'static str,
        storage: &'static str,
        from_string: &'static str,
        to_string: &'static str,
        empty_value: &'static str,
    ) -> Self {
        Self {
            name,
            storage,
            from_string,
            to_string,
            empty_value,
            in_runtime: false,
        }
    }

    const fn runtime(mut self) -> Self {
        self.in_runtime = true;
        self
    }

    /// Storage type as emitted, e.g. `omnetpp::opp_string` for `string`.
    pub fn storage_type(&self, runtime_namespace: &str) -> String {
        if self.in_runtime && !runtime_namespace.is_empty() {
            format!("{}::{}", runtime_namespace, self.storage)
        } else {
            self.storage.to_string()
        }
    }

    /// Strings are passed and returned as `const char *`.
    pub fn is_string(&self) -> bool {
        self.name == "string"
    }
}

#[rustfmt::skip]
pub const PRIMITIVE_TYPES: &[PrimitiveType] = &[
    //                 name               storage            from_string        to_string           empty
    PrimitiveType::new("bool",            "bool",            "string2bool",     "bool2string",      "false"),
    PrimitiveType::new("float",           "float",           "string2double",   "double2string",    "0"),
    PrimitiveType::new("double",          "double",          "string2double",   "double2string",    "0"),
    PrimitiveType::new("simtime_t",       "simtime_t",       "string2double",   "double2string",    "0"),
    PrimitiveType::new("string",          "opp_string",      "$",               "oppstring2string", "").runtime(),
    PrimitiveType::new("char",            "char",            "string2long",     "long2string",      "0"),
    PrimitiveType::new("short",           "short",           "string2long",     "long2string",      "0"),
    PrimitiveType::new("int",             "int",             "string2long",     "long2string",      "0"),
    PrimitiveType::new("long",            "long",            "string2long",     "long2string",      "0"),
    PrimitiveType::new("int8",            "int8_t",          "string2long",     "long2string",      "0"),
    PrimitiveType::new("int8_t",          "int8_t",          "string2long",     "long2string",      "0"),
    PrimitiveType::new("int16",           "int16_t",         "string2long",     "long2string",      "0"),
    PrimitiveType::new("int16_t",         "int16_t",         "string2long",     "long2string",      "0"),
    PrimitiveType::new("int32",           "int32_t",         "string2long",     "long2string",      "0"),
    PrimitiveType::new("int32_t",         "int32_t",         "string2long",     "long2string",      "0"),
    PrimitiveType::new("unsigned char",   "unsigned char",   "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("unsigned short",  "unsigned short",  "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("unsigned int",    "unsigned int",    "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("unsigned long",   "unsigned long",   "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint8",           "uint8_t",         "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint8_t",         "uint8_t",         "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint16",          "uint16_t",        "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint16_t",        "uint16_t",        "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint32",          "uint32_t",        "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("uint32_t",        "uint32_t",        "string2ulong",    "ulong2string",     "0"),
    PrimitiveType::new("int64",           "int64_t",         "string2int64",    "int642string",     "0"),
    PrimitiveType::new("int64_t",         "int64_t",         "string2int64",    "int642string",     "0"),
    PrimitiveType::new("uint64",          "uint64_t",        "string2uint64",   "uint642string",    "0"),
    PrimitiveType::new("uint64_t",        "uint64_t",        "string2uint64",   "uint642string",    "0"),
];

/// Keywords of the definition language and of the target language that cannot name
/// a declaration, enum or namespace.
pub const RESERVED_WORDS: &[&str] = &[
    "namespace", "cplusplus", "struct", "message", "packet", "class", "noncobject", "enum",
    "extends", "abstract", "readonly", "properties", "fields", "unsigned", "true", "false",
    "for", "while", "if", "else", "do", "typedef", "public", "private", "protected", "auto",
    "register", "sizeof", "void", "new", "delete", "explicit", "static", "extern", "return",
    "try", "catch",
];

/// Look up a primitive type by its definition-language name.
pub fn lookup(name: &str) -> Option<&'static PrimitiveType> {
    PRIMITIVE_TYPES.iter().find(|p| p.name == name)
}

/// Keywords and primitive type names are both reserved.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word) || lookup(word).is_some()
}
