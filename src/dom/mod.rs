//! Minimal in-memory document model.
//!
//! Only what the theme switcher touches: an element tree with class lists,
//! attributes on the root element, and synchronous custom events broadcast
//! on the document.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct Element {
    classes: BTreeSet<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A named event with a JSON `detail` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    pub name: String,
    pub detail: Value,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}

type Listener = Box<dyn FnMut(&CustomEvent)>;

pub struct Document {
    elements: Vec<Element>,
    root_attributes: BTreeMap<String, String>,
    listeners: Vec<(String, Listener)>,
    body: ElementId,
}

impl Document {
    /// Creates a root element with a single body child.
    pub fn new() -> Self {
        let mut doc = Self {
            elements: vec![Element {
                classes: BTreeSet::new(),
                parent: None,
                children: Vec::new(),
            }],
            root_attributes: BTreeMap::new(),
            listeners: Vec::new(),
            body: ElementId(0),
        };
        doc.body = doc.append_element(doc.root(), &[]);
        doc
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn append_element(&mut self, parent: ElementId, classes: &[&str]) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.elements[parent.0].children.push(id);
        id
    }

    /// First element in document order carrying `class`.
    pub fn query_selector(&self, class: &str) -> Option<ElementId> {
        self.find_in_subtree(self.root(), class, true)
    }

    /// First strict descendant of `scope` carrying `class`.
    pub fn query_selector_within(&self, scope: ElementId, class: &str) -> Option<ElementId> {
        self.find_in_subtree(scope, class, false)
    }

    fn find_in_subtree(
        &self,
        start: ElementId,
        class: &str,
        include_start: bool,
    ) -> Option<ElementId> {
        if include_start && self.has_class(start, class) {
            return Some(start);
        }
        // Pre-order walk; push children reversed so the leftmost is visited first.
        let mut stack: Vec<ElementId> =
            self.elements[start.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.has_class(id, class) {
                return Some(id);
            }
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        None
    }

    /// Whether `el` is `ancestor` itself or lies below it.
    pub fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut cur = Some(el);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.elements[id.0].parent;
        }
        false
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.elements[el.0].classes.contains(class)
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        self.elements[el.0].classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        self.elements[el.0].classes.remove(class);
    }

    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root_attributes.get(name).map(String::as_str)
    }

    pub fn set_root_attribute(&mut self, name: &str, value: &str) {
        self.root_attributes.insert(name.to_string(), value.to_string());
    }

    pub fn add_event_listener<F>(&mut self, name: &str, listener: F)
    where
        F: FnMut(&CustomEvent) + 'static,
    {
        self.listeners.push((name.to_string(), Box::new(listener)));
    }

    /// Invokes every listener registered for the event's name, in
    /// registration order. Returns how many ran; zero is not an error.
    pub fn dispatch_event(&mut self, event: &CustomEvent) -> usize {
        let mut invoked = 0;
        for (name, listener) in self.listeners.iter_mut() {
            if *name == event.name {
                listener(event);
                invoked += 1;
            }
        }
        invoked
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.elements)
            .field("root_attributes", &self.root_attributes)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_new_document_has_body() {
        let doc = Document::new();
        assert_ne!(doc.root(), doc.body());
        assert!(doc.contains(doc.root(), doc.body()));
    }

    #[test]
    fn test_query_selector_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append_element(body, &[]);
        let first = doc.append_element(nav, &["btn"]);
        let _second = doc.append_element(body, &["btn"]);

        assert_eq!(doc.query_selector("btn"), Some(first));
        assert_eq!(doc.query_selector("missing"), None);
    }

    #[test]
    fn test_query_selector_within_excludes_scope_and_outsiders() {
        let mut doc = Document::new();
        let body = doc.body();
        let outside = doc.append_element(body, &["fa-sun"]);
        let toggle = doc.append_element(body, &["theme-toggle", "fa-sun"]);
        let inside = doc.append_element(toggle, &["fa-sun"]);

        assert_eq!(doc.query_selector("fa-sun"), Some(outside));
        assert_eq!(doc.query_selector_within(toggle, "fa-sun"), Some(inside));
        assert_eq!(doc.query_selector_within(inside, "fa-sun"), None);
    }

    #[test]
    fn test_contains() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.append_element(body, &[]);
        let b = doc.append_element(a, &[]);
        let c = doc.append_element(body, &[]);

        assert!(doc.contains(a, b));
        assert!(doc.contains(b, b));
        assert!(!doc.contains(b, a));
        assert!(!doc.contains(a, c));
    }

    #[test]
    fn test_class_list() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.body(), &["fa-moon"]);

        doc.add_class(el, "active");
        doc.add_class(el, "active");
        assert!(doc.has_class(el, "active"));
        doc.remove_class(el, "active");
        assert!(!doc.has_class(el, "active"));
        // Removing an absent class is a no-op.
        doc.remove_class(el, "active");
        assert!(doc.has_class(el, "fa-moon"));
    }

    #[test]
    fn test_root_attributes() {
        let mut doc = Document::new();
        assert_eq!(doc.root_attribute("data-theme"), None);
        doc.set_root_attribute("data-theme", "dark");
        assert_eq!(doc.root_attribute("data-theme"), Some("dark"));
        doc.set_root_attribute("data-theme", "light");
        assert_eq!(doc.root_attribute("data-theme"), Some("light"));
    }

    #[test]
    fn test_dispatch_event_by_name_in_order() {
        let mut doc = Document::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        doc.add_event_listener("ping", move |e| s.borrow_mut().push(format!("a:{}", e.detail)));
        let s = seen.clone();
        doc.add_event_listener("other", move |_| s.borrow_mut().push("other".to_string()));
        let s = seen.clone();
        doc.add_event_listener("ping", move |e| s.borrow_mut().push(format!("b:{}", e.detail)));

        let n = doc.dispatch_event(&CustomEvent::new("ping", json!(1)));
        assert_eq!(n, 2);
        assert_eq!(*seen.borrow(), vec!["a:1".to_string(), "b:1".to_string()]);
    }

    #[test]
    fn test_dispatch_without_listeners() {
        let mut doc = Document::new();
        assert_eq!(doc.dispatch_event(&CustomEvent::new("nobody", json!({}))), 0);
    }
}
