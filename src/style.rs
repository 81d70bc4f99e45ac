//! Per-scheme style tables. Parsing never consults these; the serializer
//! looks classes up per node type, so a scheme change can never alter
//! document structure.

use crate::types::ColorScheme;

/// CSS classes applied by [`crate::document::Document::to_html`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleMap {
    pub root: &'static str,
    pub paragraph: &'static str,
    pub heading: &'static str,
    pub blockquote: &'static str,
    pub list: &'static str,
    pub list_item: &'static str,
    pub table: &'static str,
    pub table_cell: &'static str,
    pub link: &'static str,
    pub image: &'static str,
    pub code_span: &'static str,
}

const USER_STYLES: StyleMap = StyleMap {
    root: "msg msg-user",
    paragraph: "msg-user-p",
    heading: "msg-user-h",
    blockquote: "msg-user-quote",
    list: "msg-user-list",
    list_item: "msg-user-item",
    table: "msg-user-table",
    table_cell: "msg-user-cell",
    link: "msg-user-link",
    image: "msg-user-img",
    code_span: "msg-user-code",
};

const ASSISTANT_STYLES: StyleMap = StyleMap {
    root: "msg msg-assistant",
    paragraph: "msg-assistant-p",
    heading: "msg-assistant-h",
    blockquote: "msg-assistant-quote",
    list: "msg-assistant-list",
    list_item: "msg-assistant-item",
    table: "msg-assistant-table",
    table_cell: "msg-assistant-cell",
    link: "msg-assistant-link",
    image: "msg-assistant-img",
    code_span: "msg-assistant-code",
};

impl StyleMap {
    pub fn for_scheme(scheme: ColorScheme) -> &'static StyleMap {
        match scheme {
            ColorScheme::User => &USER_STYLES,
            ColorScheme::Assistant => &ASSISTANT_STYLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemes_map_to_distinct_tables() {
        let user = StyleMap::for_scheme(ColorScheme::User);
        let assistant = StyleMap::for_scheme(ColorScheme::Assistant);
        assert_ne!(user.root, assistant.root);
        assert_ne!(user.paragraph, assistant.paragraph);
    }
}
