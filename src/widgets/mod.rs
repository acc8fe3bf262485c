//! One controller per page feature. Each exposes a `discover` constructor
//! that returns `None` when its markup is absent from the page.

pub mod accordion;
pub mod active_menu;
pub mod counter;
pub mod form;
pub mod header_menu;
pub mod language;
pub mod menu;
pub mod modal;
pub mod scroll_spy;
pub mod scroll_top;
pub mod smooth_scroll;
pub mod validation;

use crate::dom::{Document, NodeId, SelectorError, SelectorList};

pub const NAV_LINK_SELECTOR: &str = ".nav-link, .c-nav__link";
pub const HEADER_SELECTOR: &str = ".l-header, header";

pub(crate) fn select_all(doc: &Document, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
    doc.query_selector_all(Document::ROOT, selector)
}

pub(crate) fn select_first(doc: &Document, selector: &str) -> Result<Option<NodeId>, SelectorError> {
    doc.query_selector(Document::ROOT, selector)
}

pub(crate) fn find_header(doc: &Document) -> Result<Option<NodeId>, SelectorError> {
    select_first(doc, HEADER_SELECTOR)
}

/// The first element of `nodes` that is `target` or one of its ancestors.
pub(crate) fn hit(doc: &Document, nodes: &[NodeId], target: NodeId) -> Option<NodeId> {
    nodes.iter().copied().find(|node| doc.contains(*node, target))
}

pub(crate) fn compile(selector: &str) -> Result<SelectorList, SelectorError> {
    SelectorList::parse(selector)
}
