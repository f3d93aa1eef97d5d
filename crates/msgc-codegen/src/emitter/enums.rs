use super::{Emitter, quote};
use crate::ast::AstNode;
use crate::extractor::EnumRecord;

impl Emitter<'_> {
    /// Enum type in the header, startup registration of its items in the source.
    pub(crate) fn emit_enum(&mut self, record: &EnumRecord, node: &AstNode) {
        let mut header = self.doc_opening("Enum", node, &record.location);
        header.push_str(" */\n");
        header.push_str(&format!("enum {} {{\n", record.name));
        let items: Vec<String> = record
            .items
            .iter()
            .map(|item| format!("    {} = {}", item.name, item.value))
            .collect();
        if !items.is_empty() {
            header.push_str(&items.join(",\n"));
            header.push('\n');
        }
        header.push_str("};\n\n");
        self.header.push_str(&header);

        let cenum = self.runtime.qualify("cEnum");
        let qname = quote(&record.qname);
        self.source.push_str("EXECUTE_ON_STARTUP(\n");
        self.source.push_str(&format!("    {} *e = {}::find({});\n", cenum, cenum, qname));
        self.source.push_str(&format!(
            "    if (!e) {}.getInstance()->add(e = new {}({}));\n",
            self.runtime.qualify("enums"),
            cenum,
            qname
        ));
        for item in &record.items {
            self.source.push_str(&format!("    e->insert({}, {});\n", item.name, quote(&item.name)));
        }
        self.source.push_str(");\n\n");
    }
}
