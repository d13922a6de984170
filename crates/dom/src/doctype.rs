//! Document type declarations and their markup form.

/// A `<!DOCTYPE>` node's identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
    /// Internal subset, without the surrounding brackets. Always empty for HTML parsed documents.
    pub internal_subset: String,
}

impl Doctype {
    #[inline]
    #[must_use]
    pub fn html() -> Self {
        Self {
            name: "html".to_owned(),
            ..Self::default()
        }
    }
}

/// Serialize a doctype into markup that round-trips through the HTML parser.
///
/// Returns an empty string when there is no doctype, so the result can always be
/// prefixed to the rest of a document.
#[must_use]
pub fn serialize_doctype(doctype: Option<&Doctype>) -> String {
    let Some(doctype) = doctype else {
        return String::new();
    };
    let mut out = String::from("<!DOCTYPE");
    if !doctype.name.is_empty() {
        out.push(' ');
        out.push_str(&doctype.name);
    }
    if !doctype.public_id.is_empty() {
        out.push_str(" PUBLIC \"");
        out.push_str(&doctype.public_id);
        out.push('"');
        if !doctype.system_id.is_empty() {
            out.push_str(" \"");
            out.push_str(&doctype.system_id);
            out.push('"');
        }
    } else if !doctype.system_id.is_empty() {
        out.push_str(" SYSTEM \"");
        out.push_str(&doctype.system_id);
        out.push('"');
    }
    if !doctype.internal_subset.is_empty() {
        out.push_str(" [");
        out.push_str(&doctype.internal_subset);
        out.push(']');
    }
    out.push('>');
    out
}
