//! CSS selectors, compiled and matched by kuchiki.

use kuchiki::Selectors;
use thiserror::Error;

use super::{Document, NodeId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid selector {0:?}")]
pub struct SelectorError(pub String);

/// A compiled, comma-separated selector group.
#[derive(Debug)]
pub struct SelectorList(Selectors);

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        if selector.trim().is_empty() {
            return Err(SelectorError(selector.to_string()));
        }
        Selectors::compile(selector)
            .map(Self)
            .map_err(|()| SelectorError(selector.to_string()))
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        doc.element_ref(node)
            .is_some_and(|element| self.0.matches(&element))
    }

    pub(super) fn compiled(&self) -> &Selectors {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_html(
            r##"<html><body>
            <header class="l-header"><a class="nav-link active" href="#top">Top</a></header>
            <section id="about"><div class="accordion"><button class="accordion-button" data-bs-target="#one"></button>
            <div id="one" class="accordion-collapse show"></div></div></section>
            <form id="ContactForm"><button type="submit">Send</button></form>
            </body></html>"##,
        )
        .unwrap()
    }

    fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
        doc.query_selector_all(Document::ROOT, selector).unwrap()
    }

    #[test]
    fn matches_groups_and_compounds() {
        let doc = doc();
        assert_eq!(select(&doc, ".l-header, header").len(), 1);
        assert_eq!(select(&doc, "section[id], div[id]").len(), 2);
        assert_eq!(select(&doc, "a[href^=\"#\"]").len(), 1);
        assert_eq!(select(&doc, "form[id*=\"Contact\"]").len(), 1);
        assert_eq!(select(&doc, "form[id*='contact']").len(), 0);
        assert_eq!(select(&doc, "[type=\"submit\"]").len(), 1);
        assert_eq!(select(&doc, ".nav-link.active").len(), 1);
        assert_eq!(select(&doc, "[class~=active]").len(), 1);
    }

    #[test]
    fn matches_combinators_and_pseudo_classes() {
        let doc = doc();
        assert_eq!(select(&doc, "section .accordion-button").len(), 1);
        assert_eq!(select(&doc, ".accordion > .accordion-collapse").len(), 1);
        assert_eq!(select(&doc, "section > .accordion-collapse").len(), 0);
        assert_eq!(select(&doc, "#one").len(), 1);
        assert_eq!(select(&doc, ".accordion > :first-child").len(), 1);
        assert_eq!(select(&doc, "div:not(.accordion)").len(), 1);
        assert!(select(&doc, "a:hover").is_empty());
    }

    #[test]
    fn scope_is_excluded_from_its_own_query() {
        let doc = doc();
        let about = doc.get_element_by_id("about").unwrap();
        let list = SelectorList::parse("section, div").unwrap();
        assert_eq!(doc.select_all(about, &list).len(), 2);
        assert!(list.matches(&doc, about));
        assert_eq!(doc.closest(about, &list), Some(about));
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert_eq!(
            SelectorList::parse("  ").unwrap_err(),
            SelectorError("  ".to_string())
        );
        assert!(SelectorList::parse("div >").is_err());
        assert!(SelectorList::parse("#").is_err());
        assert!(SelectorList::parse("a::nope").is_err());
    }
}
