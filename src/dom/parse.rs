use kuchiki::parse_html;
use kuchiki::traits::*;

use super::{Document, DocumentError, Layout, NodeId};

const LAYOUT_TOP_ATTR: &str = "data-layout-top";
const LAYOUT_HEIGHT_ATTR: &str = "data-layout-height";

pub(super) fn parse_document(html: &str) -> Result<Document, DocumentError> {
    let mut doc = Document::adopt(parse_html().one(html))?;
    for node in doc.descendants(Document::ROOT) {
        if let Some(layout) = markup_layout(&doc, node) {
            doc.layouts.insert(node, layout);
        }
    }
    Ok(doc)
}

fn markup_layout(doc: &Document, node: NodeId) -> Option<Layout> {
    let read = |name: &str| {
        doc.attribute(node, name)
            .map(|value| value.trim().parse::<f64>().unwrap_or(0.0))
    };
    let top = read(LAYOUT_TOP_ATTR);
    let height = read(LAYOUT_HEIGHT_ATTR);
    if top.is_none() && height.is_none() {
        return None;
    }
    Some(Layout {
        top: top.unwrap_or(0.0),
        height: height.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_elements_text_and_layout() {
        let doc = Document::from_html(
            r#"<!DOCTYPE html><title>t</title><section id="hero" data-layout-top="120" data-layout-height="480">Hi <b>there</b></section><!-- note -->"#,
        )
        .unwrap();
        let hero = doc.get_element_by_id("hero").unwrap();
        assert_eq!(doc.tag_name(hero), Some("section"));
        assert_eq!(doc.text_content(hero), "Hi there");
        assert_eq!(doc.layout(hero).top, 120.0);
        assert_eq!(doc.layout(hero).height, 480.0);
        assert_eq!(doc.parent(hero), Some(doc.body()));
    }

    #[test]
    fn fragments_gain_a_body() {
        let doc = Document::from_html("<p>loose</p>").unwrap();
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert_eq!(doc.text_content(doc.body()), "loose");
    }
}
