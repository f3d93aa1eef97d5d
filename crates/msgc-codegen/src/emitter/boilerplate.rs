//! Fixed template code placed in every definition artifact.

use crate::options::RuntimeNames;

/// Pack/unpack rules for standard containers and plain arrays, plus the throwing
/// default that keeps the compiler from silently picking a base-class overload.
///
/// The rules live in the runtime namespace so argument-dependent lookup finds them
/// through the comm buffer argument.
pub(crate) fn pack_templates(runtime: &RuntimeNames) -> String {
    let buffer = runtime.comm_buffer();
    let error = runtime.runtime_error();
    let typename = runtime.qualify("opp_typename");

    let mut output = String::new();
    if !runtime.namespace().is_empty() {
        output.push_str(&format!("namespace {} {{\n\n", runtime.namespace()));
    }
    output.push_str("// Template pack/unpack rules. They are declared *after* all type-specific pack functions.\n\n");

    output.push_str("// Packing/unpacking an std::vector\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str(&format!("void doPacking({} *buffer, const std::vector<T,A>& v)\n", buffer));
    output.push_str("{\n");
    output.push_str("    int n = v.size();\n");
    output.push_str("    doPacking(buffer, n);\n");
    output.push_str("    for (int i = 0; i < n; i++)\n");
    output.push_str("        doPacking(buffer, v[i]);\n");
    output.push_str("}\n\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str(&format!("void doUnpacking({} *buffer, std::vector<T,A>& v)\n", buffer));
    output.push_str("{\n");
    output.push_str("    int n;\n");
    output.push_str("    doUnpacking(buffer, n);\n");
    output.push_str("    v.resize(n);\n");
    output.push_str("    for (int i = 0; i < n; i++)\n");
    output.push_str("        doUnpacking(buffer, v[i]);\n");
    output.push_str("}\n\n");

    output.push_str("// Packing/unpacking an std::list\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str(&format!("void doPacking({} *buffer, const std::list<T,A>& l)\n", buffer));
    output.push_str("{\n");
    output.push_str("    doPacking(buffer, (int)l.size());\n");
    output.push_str("    for (typename std::list<T,A>::const_iterator it = l.begin(); it != l.end(); it++)\n");
    output.push_str("        doPacking(buffer, (T&)*it);\n");
    output.push_str("}\n\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str(&format!("void doUnpacking({} *buffer, std::list<T,A>& l)\n", buffer));
    output.push_str("{\n");
    output.push_str("    int n;\n");
    output.push_str("    doUnpacking(buffer, n);\n");
    output.push_str("    for (int i=0; i<n; i++) {\n");
    output.push_str("        l.push_back(T());\n");
    output.push_str("        doUnpacking(buffer, l.back());\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");

    output.push_str("// Packing/unpacking an std::set\n");
    output.push_str("template<typename T, typename Tr, typename A>\n");
    output.push_str(&format!("void doPacking({} *buffer, const std::set<T,Tr,A>& s)\n", buffer));
    output.push_str("{\n");
    output.push_str("    doPacking(buffer, (int)s.size());\n");
    output.push_str("    for (typename std::set<T,Tr,A>::const_iterator it = s.begin(); it != s.end(); it++)\n");
    output.push_str("        doPacking(buffer, *it);\n");
    output.push_str("}\n\n");
    output.push_str("template<typename T, typename Tr, typename A>\n");
    output.push_str(&format!("void doUnpacking({} *buffer, std::set<T,Tr,A>& s)\n", buffer));
    output.push_str("{\n");
    output.push_str("    int n;\n");
    output.push_str("    doUnpacking(buffer, n);\n");
    output.push_str("    for (int i=0; i<n; i++) {\n");
    output.push_str("        T x;\n");
    output.push_str("        doUnpacking(buffer, x);\n");
    output.push_str("        s.insert(x);\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");

    output.push_str("// Packing/unpacking an std::map\n");
    output.push_str("template<typename K, typename V, typename Tr, typename A>\n");
    output.push_str(&format!("void doPacking({} *buffer, const std::map<K,V,Tr,A>& m)\n", buffer));
    output.push_str("{\n");
    output.push_str("    doPacking(buffer, (int)m.size());\n");
    output.push_str("    for (typename std::map<K,V,Tr,A>::const_iterator it = m.begin(); it != m.end(); it++) {\n");
    output.push_str("        doPacking(buffer, it->first);\n");
    output.push_str("        doPacking(buffer, it->second);\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");
    output.push_str("template<typename K, typename V, typename Tr, typename A>\n");
    output.push_str(&format!("void doUnpacking({} *buffer, std::map<K,V,Tr,A>& m)\n", buffer));
    output.push_str("{\n");
    output.push_str("    int n;\n");
    output.push_str("    doUnpacking(buffer, n);\n");
    output.push_str("    for (int i=0; i<n; i++) {\n");
    output.push_str("        K k; V v;\n");
    output.push_str("        doUnpacking(buffer, k);\n");
    output.push_str("        doUnpacking(buffer, v);\n");
    output.push_str("        m[k] = v;\n");
    output.push_str("    }\n");
    output.push_str("}\n\n");

    output.push_str("// Default pack/unpack function for arrays\n");
    output.push_str("template<typename T>\n");
    output.push_str(&format!("void doArrayPacking({} *b, const T *t, int n)\n", buffer));
    output.push_str("{\n");
    output.push_str("    for (int i = 0; i < n; i++)\n");
    output.push_str("        doPacking(b, t[i]);\n");
    output.push_str("}\n\n");
    output.push_str("template<typename T>\n");
    output.push_str(&format!("void doArrayUnpacking({} *b, T *t, int n)\n", buffer));
    output.push_str("{\n");
    output.push_str("    for (int i = 0; i < n; i++)\n");
    output.push_str("        doUnpacking(b, t[i]);\n");
    output.push_str("}\n\n");

    output.push_str("// Default rule to prevent compiler from choosing base class' doPacking() function\n");
    output.push_str("template<typename T>\n");
    output.push_str(&format!("void doPacking({} *, const T& t)\n", buffer));
    output.push_str("{\n");
    output.push_str(&format!(
        "    throw {}(\"Parsim error: no doPacking() function for type %s\", {}(typeid(t)));\n",
        error, typename
    ));
    output.push_str("}\n\n");
    output.push_str("template<typename T>\n");
    output.push_str(&format!("void doUnpacking({} *, T& t)\n", buffer));
    output.push_str("{\n");
    output.push_str(&format!(
        "    throw {}(\"Parsim error: no doUnpacking() function for type %s\", {}(typeid(t)));\n",
        error, typename
    ));
    output.push_str("}\n\n");

    if !runtime.namespace().is_empty() {
        output.push_str(&format!("}} // namespace {}\n", runtime.namespace()));
    }
    output.push('\n');
    output
}

/// Stream insertion rules used by descriptors to display compound values.
///
/// Emitted once per namespace so the fallback is found by unqualified lookup.
pub(crate) fn stream_templates() -> String {
    let mut output = String::new();
    output.push_str("// forward\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str("std::ostream& operator<<(std::ostream& out, const std::vector<T,A>& vec);\n\n");

    output.push_str("// Template rule which fires if a struct or class doesn't have operator<<\n");
    output.push_str("template<typename T>\n");
    output.push_str("inline std::ostream& operator<<(std::ostream& out,const T&) {return out;}\n\n");

    output.push_str("// operator<< for std::vector<T>\n");
    output.push_str("template<typename T, typename A>\n");
    output.push_str("inline std::ostream& operator<<(std::ostream& out, const std::vector<T,A>& vec)\n");
    output.push_str("{\n");
    output.push_str("    out.put('{');\n");
    output.push_str("    for(typename std::vector<T,A>::const_iterator it = vec.begin(); it != vec.end(); ++it)\n");
    output.push_str("    {\n");
    output.push_str("        if (it != vec.begin()) {\n");
    output.push_str("            out.put(','); out.put(' ');\n");
    output.push_str("        }\n");
    output.push_str("        out << *it;\n");
    output.push_str("    }\n");
    output.push_str("    out.put('}');\n");
    output.push_str("    \n");
    output.push_str("    char buf[32];\n");
    output.push_str("    sprintf(buf, \" (size=%u)\", (unsigned int)vec.size());\n");
    output.push_str("    out.write(buf, strlen(buf));\n");
    output.push_str("    return out;\n");
    output.push_str("}\n\n");
    output
}
