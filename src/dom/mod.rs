//! In-process document model.
//!
//! The tree itself is a kuchiki [`NodeRef`] graph. Every node the page can
//! see is registered under a [`NodeId`]; the registry keeps a strong handle,
//! so removed nodes are detached but never freed and an id stays valid for
//! the life of the document. Every mutation that actually changes the tree is
//! recorded as a [`DomPatch`]; no-op mutations record nothing.

mod parse;
pub mod selector;
mod serialize;

use std::collections::HashMap;
use std::rc::Rc;

use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchiki::iter::NodeIterator;
use kuchiki::{Attribute, ElementData, ExpandedName, Node, NodeDataRef, NodeRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use selector::{SelectorError, SelectorList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document has no <body> element")]
    MissingBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomPatch {
    AddClass { node: NodeId, class: String },
    RemoveClass { node: NodeId, class: String },
    Attribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    TextContent { node: NodeId, value: String },
    AppendChild { parent: NodeId, child: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
    Value { node: NodeId, value: String },
    Checked { node: NodeId, checked: bool },
}

/// Host-supplied geometry, in document pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Layout {
    pub top: f64,
    pub height: f64,
}

/// Live form-control state that has diverged from the markup defaults.
#[derive(Debug, Clone, Default)]
struct ControlState {
    value: Option<String>,
    checked: Option<bool>,
}

fn html_element(tag: &str) -> NodeRef {
    let name = QualName::new(None, ns!(html), LocalName::from(tag.to_ascii_lowercase()));
    NodeRef::new_element(name, Vec::<(ExpandedName, Attribute)>::new())
}

fn key(node: &NodeRef) -> *const Node {
    Rc::as_ptr(&node.0)
}

pub struct Document {
    nodes: Vec<NodeRef>,
    index: HashMap<*const Node, NodeId>,
    controls: HashMap<NodeId, ControlState>,
    layouts: HashMap<NodeId, Layout>,
    body: NodeId,
    patches: Vec<DomPatch>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("body", &self.body)
            .field("patches", &self.patches.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const ROOT: NodeId = NodeId(0);

    /// An empty `<!DOCTYPE html><html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let tree = NodeRef::new_document();
        let html = html_element("html");
        let body = html_element("body");
        html.append(html_element("head"));
        html.append(body.clone());
        tree.append(NodeRef::new_doctype("html", "", ""));
        tree.append(html);

        let mut doc = Self::empty();
        for node in tree.inclusive_descendants() {
            doc.register(node);
        }
        doc.body = doc.id_of(&body).unwrap_or(Self::ROOT);
        doc
    }

    pub fn from_html(html: &str) -> Result<Self, DocumentError> {
        parse::parse_document(html)
    }

    fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            controls: HashMap::new(),
            layouts: HashMap::new(),
            body: Self::ROOT,
            patches: Vec::new(),
        }
    }

    /// Registers every node of a parsed tree; the tree's root becomes
    /// [`Document::ROOT`].
    fn adopt(tree: NodeRef) -> Result<Self, DocumentError> {
        let mut doc = Self::empty();
        for node in tree.inclusive_descendants() {
            doc.register(node);
        }
        doc.body = doc
            .descendants(Self::ROOT)
            .into_iter()
            .find(|id| doc.tag_name(*id) == Some("body"))
            .ok_or(DocumentError::MissingBody)?;
        Ok(doc)
    }

    fn register(&mut self, node: NodeRef) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(key(&node), id);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> Option<&NodeRef> {
        self.nodes.get(id.0)
    }

    fn id_of(&self, node: &NodeRef) -> Option<NodeId> {
        self.index.get(&key(node)).copied()
    }

    fn ids<I: Iterator<Item = NodeRef>>(&self, nodes: I) -> Vec<NodeId> {
        nodes.filter_map(|node| self.id_of(&node)).collect()
    }

    fn element_ref(&self, id: NodeId) -> Option<NodeDataRef<ElementData>> {
        self.node(id)?.clone().into_element_ref()
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.register(html_element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.register(NodeRef::new_text(text))
    }

    pub fn exists(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.as_element().is_some())
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let (Some(parent_node), Some(child_node)) = (self.node(parent), self.node(child)) else {
            return;
        };
        if self.contains(child, parent) {
            return;
        }
        parent_node.append(child_node.clone());
        self.patches.push(DomPatch::AppendChild { parent, child });
    }

    /// Removes `node` from its parent. Removing a detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(handle) = self.node(node) {
            handle.detach();
        }
        self.patches.push(DomPatch::RemoveChild { parent, child: node });
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent()?;
        self.id_of(&parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        match self.node(node) {
            Some(handle) => self.ids(handle.children()),
            None => Vec::new(),
        }
    }

    /// Element children only.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// True when `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let (Some(ancestor), Some(node)) = (self.node(ancestor), self.node(node)) else {
            return false;
        };
        node.inclusive_ancestors().any(|n| n == *ancestor)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(Self::ROOT, node)
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        match self.node(node) {
            Some(handle) => self.ids(handle.inclusive_ancestors()),
            None => Vec::new(),
        }
    }

    /// Descendants of `scope` (excluding `scope`) in document order.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        match self.node(scope) {
            Some(handle) => self.ids(handle.descendants()),
            None => Vec::new(),
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.node(node)?.as_element().map(|e| &*e.name.local)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.node(node)?.as_element()?;
        let attributes = element.attributes.borrow();
        attributes.get(name).map(str::to_string)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.node(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.attributes.borrow().contains(name))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_ref(node) else {
            return;
        };
        {
            let mut attributes = element.attributes.borrow_mut();
            if attributes.get(name) == Some(value) {
                return;
            }
            attributes.insert(name, value.to_string());
        }
        self.patches.push(DomPatch::Attribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(element) = self.element_ref(node) else {
            return;
        };
        let removed = element.attributes.borrow_mut().remove(name).is_some();
        if removed {
            self.patches.push(DomPatch::RemoveAttribute {
                node,
                name: name.to_string(),
            });
        }
    }

    /// Attribute names and values, in name order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let Some(element) = self.node(node).and_then(|n| n.as_element()) else {
            return Vec::new();
        };
        let attributes = element.attributes.borrow();
        attributes
            .map
            .iter()
            .map(|(name, attribute)| (name.local.to_string(), attribute.value.clone()))
            .collect()
    }

    pub fn id(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|value| value.split_ascii_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        let Some(element) = self.node(node).and_then(|n| n.as_element()) else {
            return false;
        };
        let attributes = element.attributes.borrow();
        attributes
            .get("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let mut classes = self.classes(node);
        classes.push(class.to_string());
        self.write_class_attribute(node, &classes);
        self.patches.push(DomPatch::AddClass {
            node,
            class: class.to_string(),
        });
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let mut classes = self.classes(node);
        classes.retain(|c| c != class);
        self.write_class_attribute(node, &classes);
        self.patches.push(DomPatch::RemoveClass {
            node,
            class: class.to_string(),
        });
    }

    /// Returns the new membership state.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    fn write_class_attribute(&mut self, node: NodeId, classes: &[String]) {
        if let Some(element) = self.element_ref(node) {
            element
                .attributes
                .borrow_mut()
                .insert("class", classes.join(" "));
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.node(node)
            .map(|handle| handle.text_contents())
            .unwrap_or_default()
    }

    /// Replaces all children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, value: &str) {
        let Some(handle) = self.node(node).filter(|n| n.as_element().is_some()).cloned() else {
            return;
        };
        let children: Vec<NodeRef> = handle.children().collect();
        let unchanged = match children.as_slice() {
            [] => value.is_empty(),
            [only] => only.as_text().is_some_and(|text| *text.borrow() == value),
            _ => false,
        };
        if unchanged {
            return;
        }
        for child in children {
            child.detach();
        }
        if !value.is_empty() {
            let text = NodeRef::new_text(value);
            handle.append(text.clone());
            self.register(text);
        }
        self.patches.push(DomPatch::TextContent {
            node,
            value: value.to_string(),
        });
    }

    /// Detaches every child of `node` and returns them in order.
    pub fn take_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let children = self.children(node);
        for child in &children {
            self.remove(*child);
        }
        children
    }

    /// Current value of a form control. Falls back to the `value` attribute,
    /// or to the text content for a `<textarea>`.
    pub fn value(&self, node: NodeId) -> String {
        if !self.is_element(node) {
            return String::new();
        }
        match self.controls.get(&node).and_then(|c| c.value.clone()) {
            Some(value) => value,
            None => self.default_value(node),
        }
    }

    fn default_value(&self, node: NodeId) -> String {
        match self.tag_name(node) {
            Some("textarea") => self.text_content(node),
            Some("select") => self.default_select_value(node),
            _ => match self.attribute(node, "value") {
                Some(value) => value,
                None if matches!(self.input_type(node).as_str(), "checkbox" | "radio") => {
                    "on".to_string()
                }
                None => String::new(),
            },
        }
    }

    fn default_select_value(&self, node: NodeId) -> String {
        let options: Vec<NodeId> = self
            .descendants(node)
            .into_iter()
            .filter(|id| self.tag_name(*id) == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .find(|id| self.has_attribute(**id, "selected"))
            .or_else(|| options.first());
        match chosen {
            Some(option) => self
                .attribute(*option, "value")
                .unwrap_or_else(|| self.text_content(*option)),
            None => String::new(),
        }
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if !self.is_element(node) || self.value(node) == value {
            return;
        }
        self.controls.entry(node).or_default().value = Some(value.to_string());
        self.patches.push(DomPatch::Value {
            node,
            value: value.to_string(),
        });
    }

    pub fn checked(&self, node: NodeId) -> bool {
        if !self.is_element(node) {
            return false;
        }
        self.controls
            .get(&node)
            .and_then(|c| c.checked)
            .unwrap_or_else(|| self.has_attribute(node, "checked"))
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if !self.is_element(node) || self.checked(node) == checked {
            return;
        }
        self.controls.entry(node).or_default().checked = Some(checked);
        self.patches.push(DomPatch::Checked { node, checked });
    }

    /// Restores the control's value and checkedness to their markup defaults.
    pub fn reset_control(&mut self, node: NodeId) {
        if !self.is_element(node) {
            return;
        }
        let default_value = self.default_value(node);
        let default_checked = self.has_attribute(node, "checked");
        let value_changed = self.value(node) != default_value;
        let checked_changed = self.checked(node) != default_checked;
        self.controls.remove(&node);
        if value_changed {
            self.patches.push(DomPatch::Value {
                node,
                value: default_value,
            });
        }
        if checked_changed {
            self.patches.push(DomPatch::Checked {
                node,
                checked: default_checked,
            });
        }
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.has_attribute(node, "disabled")
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if disabled {
            self.set_attribute(node, "disabled", "");
        } else {
            self.remove_attribute(node, "disabled");
        }
    }

    /// The `type` of an input, lowercased; `text` when absent.
    pub fn input_type(&self, node: NodeId) -> String {
        match self.tag_name(node) {
            Some("input") => self
                .attribute(node, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string()),
            Some(tag) => tag.to_string(),
            None => String::new(),
        }
    }

    pub fn layout(&self, node: NodeId) -> Layout {
        self.layouts.get(&node).copied().unwrap_or_default()
    }

    pub fn set_layout(&mut self, node: NodeId, top: f64, height: f64) {
        if self.is_element(node) {
            self.layouts.insert(node, Layout { top, height });
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|node| self.id(*node).as_deref() == Some(id))
    }

    pub fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_all(scope, &list))
    }

    pub fn query_selector(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select_first(scope, &list))
    }

    pub fn select_all(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        let Some(scope) = self.node(scope) else {
            return Vec::new();
        };
        list.compiled()
            .filter(scope.descendants().elements())
            .filter_map(|element| self.id_of(element.as_node()))
            .collect()
    }

    pub fn select_first(&self, scope: NodeId, list: &SelectorList) -> Option<NodeId> {
        let scope = self.node(scope)?;
        list.compiled()
            .filter(scope.descendants().elements())
            .find_map(|element| self.id_of(element.as_node()))
    }

    /// Nearest inclusive ancestor matching `list`.
    pub fn closest(&self, node: NodeId, list: &SelectorList) -> Option<NodeId> {
        self.ancestors_inclusive(node)
            .into_iter()
            .find(|id| list.matches(self, *id))
    }

    pub fn patches(&self) -> &[DomPatch] {
        &self.patches
    }

    pub fn drain_patches(&mut self) -> Vec<DomPatch> {
        std::mem::take(&mut self.patches)
    }

    pub fn to_html(&self) -> String {
        self.outer_html(Self::ROOT)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        self.node(node).map(serialize::to_html).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_html(
            r##"<!DOCTYPE html><html><body>
            <nav class="c-nav"><a class="c-nav__link" href="#about">About</a></nav>
            <form id="contact"><input name="email" type="email" value="a@b.nl">
            <textarea name="message">Hello</textarea>
            <input type="checkbox" required></form>
            </body></html>"##,
        )
        .unwrap()
    }

    #[test]
    fn class_mutations_are_idempotent() {
        let mut doc = sample();
        let nav = doc.query_selector(Document::ROOT, ".c-nav").unwrap().unwrap();
        doc.drain_patches();

        doc.add_class(nav, "is-open");
        doc.add_class(nav, "is-open");
        assert_eq!(doc.patches().len(), 1);
        assert!(doc.has_class(nav, "c-nav"));

        doc.remove_class(nav, "is-open");
        doc.remove_class(nav, "is-open");
        assert_eq!(doc.patches().len(), 2);
        assert_eq!(doc.attribute(nav, "class").as_deref(), Some("c-nav"));
    }

    #[test]
    fn form_values_fall_back_to_markup_defaults() {
        let mut doc = sample();
        let email = doc.query_selector(Document::ROOT, "[name=email]").unwrap().unwrap();
        let message = doc.query_selector(Document::ROOT, "textarea").unwrap().unwrap();
        let terms = doc
            .query_selector(Document::ROOT, "input[type=\"checkbox\"]")
            .unwrap()
            .unwrap();

        assert_eq!(doc.value(email), "a@b.nl");
        assert_eq!(doc.value(message), "Hello");
        assert!(!doc.checked(terms));

        doc.set_value(email, "x@y.com");
        doc.set_checked(terms, true);
        assert_eq!(doc.value(email), "x@y.com");
        assert!(doc.checked(terms));

        doc.reset_control(email);
        doc.reset_control(terms);
        assert_eq!(doc.value(email), "a@b.nl");
        assert!(!doc.checked(terms));
    }

    #[test]
    fn removal_detaches_but_keeps_handle() {
        let mut doc = sample();
        let link = doc.query_selector(Document::ROOT, "a").unwrap().unwrap();
        doc.remove(link);
        assert!(!doc.is_connected(link));
        assert_eq!(doc.text_content(link), "About");
        assert!(doc.query_selector(Document::ROOT, "a").unwrap().is_none());

        let before = doc.patches().len();
        doc.remove(link);
        assert_eq!(doc.patches().len(), before);
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::new();
        let span = doc.create_element("span");
        doc.append_child(doc.body(), span);
        doc.set_text_content(span, "12");
        doc.set_text_content(span, "12");
        assert_eq!(doc.text_content(span), "12");
        assert_eq!(doc.children(span).len(), 1);
        let text_patches = doc
            .patches()
            .iter()
            .filter(|p| matches!(p, DomPatch::TextContent { .. }))
            .count();
        assert_eq!(text_patches, 1);
    }

    #[test]
    fn created_nodes_are_queryable_once_attached() {
        let mut doc = Document::new();
        let alert = doc.create_element("DIV");
        doc.add_class(alert, "alert");
        assert_eq!(doc.tag_name(alert), Some("div"));
        assert!(doc.query_selector(Document::ROOT, ".alert").unwrap().is_none());

        doc.append_child(doc.body(), alert);
        assert_eq!(doc.query_selector(Document::ROOT, "body > div.alert").unwrap(), Some(alert));
        assert_eq!(doc.parent(alert), Some(doc.body()));
    }
}
