//! An in-memory tree of host nodes that records every mutation applied to it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;
use waterfiber_core::{Event, HostAdapter, Listener, NODE_VALUE, PropValue, TEXT, event_name};

use crate::{error::HeadlessError, snapshot::HostSnapshot};

/// Handle to a node of a [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(usize);

impl HostId {
    /// Returns the raw index backing this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One host mutation, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// A node was created.
    Create {
        /// The new node.
        node: HostId,
        /// Its kind.
        kind: String,
    },
    /// A plain attribute was set.
    Set {
        /// Target node.
        node: HostId,
        /// Attribute name.
        name: String,
        /// Stringified value.
        value: String,
    },
    /// A plain attribute was cleared.
    Clear {
        /// Target node.
        node: HostId,
        /// Attribute name.
        name: String,
    },
    /// A listener was bound.
    Bind {
        /// Target node.
        node: HostId,
        /// Lower-cased event name.
        event: String,
    },
    /// A listener was unbound.
    Unbind {
        /// Target node.
        node: HostId,
        /// Lower-cased event name.
        event: String,
    },
    /// A child was appended.
    Attach {
        /// Parent node.
        parent: HostId,
        /// Appended child.
        child: HostId,
    },
    /// A child was inserted before an existing one.
    InsertBefore {
        /// Parent node.
        parent: HostId,
        /// Inserted child.
        child: HostId,
        /// Existing child it now precedes.
        anchor: HostId,
    },
    /// A child subtree was removed.
    Detach {
        /// Parent node.
        parent: HostId,
        /// Removed child.
        child: HostId,
    },
}

#[derive(Debug)]
struct HostNode {
    kind: String,
    attributes: BTreeMap<String, String>,
    listeners: BTreeMap<String, Listener>,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

impl HostNode {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            attributes: BTreeMap::new(),
            listeners: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// In-memory host surface.
///
/// Detached nodes are kept around (they are never reused), so handles stay valid for
/// inspection after removal.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    nodes: Vec<HostNode>,
    log: Vec<Mutation>,
}

impl HeadlessSurface {
    /// Creates an empty surface.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Creates a container node to render into. Not recorded in the mutation log.
    pub fn create_container(&mut self, kind: &str) -> HostId {
        self.push(HostNode::new(kind))
    }

    /// Every mutation applied so far.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Drains the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    /// Kind of a node (`TEXT` for text nodes).
    #[must_use]
    pub fn kind(&self, node: HostId) -> Option<&str> {
        self.nodes.get(node.0).map(|entry| entry.kind.as_str())
    }

    /// Children of a node in order.
    #[must_use]
    pub fn children(&self, node: HostId) -> &[HostId] {
        self.nodes
            .get(node.0)
            .map_or(&[], |entry| entry.children.as_slice())
    }

    /// Parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: HostId) -> Option<HostId> {
        self.nodes.get(node.0).and_then(|entry| entry.parent)
    }

    /// Plain attributes of a node.
    #[must_use]
    pub fn attributes(&self, node: HostId) -> Option<&BTreeMap<String, String>> {
        self.nodes.get(node.0).map(|entry| &entry.attributes)
    }

    /// Names of the events a node listens to.
    #[must_use]
    pub fn events(&self, node: HostId) -> Vec<&str> {
        self.nodes.get(node.0).map_or_else(Vec::new, |entry| {
            entry.listeners.keys().map(String::as_str).collect()
        })
    }

    /// Concatenated text of every text node below `node`.
    #[must_use]
    pub fn text_content(&self, node: HostId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Attached descendants of `node` (excluding itself) with the given kind, in document order.
    #[must_use]
    pub fn find_all(&self, node: HostId, kind: &str) -> Vec<HostId> {
        let mut found = Vec::new();
        let mut stack: Vec<HostId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.kind(id) == Some(kind) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    /// Invokes the listener bound to `event.name` on `node`. Returns `false` if none is bound.
    pub fn dispatch(&self, node: HostId, event: &Event) -> bool {
        let listener = self
            .nodes
            .get(node.0)
            .and_then(|entry| entry.listeners.get(&event.name))
            .cloned();
        match listener {
            Some(listener) => {
                trace!(node = node.0, event = %event.name, "dispatching event");
                listener.call(event);
                true
            }
            None => false,
        }
    }

    /// Serializable copy of the subtree rooted at `node`.
    #[must_use]
    pub fn snapshot(&self, node: HostId) -> HostSnapshot {
        let Some(entry) = self.nodes.get(node.0) else {
            return HostSnapshot::default();
        };
        HostSnapshot {
            kind: entry.kind.clone(),
            attributes: entry.attributes.clone(),
            events: entry.listeners.keys().cloned().collect(),
            children: entry
                .children
                .iter()
                .map(|child| self.snapshot(*child))
                .collect(),
        }
    }

    /// Renders the children of `node` as HTML-like markup.
    ///
    /// Text and attribute values are escaped (`&`, `<`, `>`, `"`). Listeners are not rendered.
    #[must_use]
    pub fn to_html(&self, node: HostId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: HostId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.0) else {
            return;
        };
        if entry.kind == TEXT {
            if let Some(value) = entry.attributes.get(NODE_VALUE) {
                escape_into(value, out);
            }
            return;
        }
        out.push('<');
        out.push_str(&entry.kind);
        for (name, value) in &entry.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        out.push('>');
        for child in &entry.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&entry.kind);
        out.push('>');
    }

    fn collect_text(&self, node: HostId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.0) else {
            return;
        };
        if entry.kind == TEXT {
            if let Some(value) = entry.attributes.get(NODE_VALUE) {
                out.push_str(value);
            }
        }
        for child in &entry.children {
            self.collect_text(*child, out);
        }
    }

    fn push(&mut self, node: HostNode) -> HostId {
        self.nodes.push(node);
        HostId(self.nodes.len() - 1)
    }

    fn node_mut(&mut self, id: HostId) -> Result<&mut HostNode, HeadlessError> {
        self.nodes.get_mut(id.0).ok_or(HeadlessError::UnknownNode(id))
    }

    fn check_attachable(&self, parent: HostId, child: HostId) -> Result<(), HeadlessError> {
        let parent_node = self.nodes.get(parent.0).ok_or(HeadlessError::UnknownNode(parent))?;
        if parent_node.kind == TEXT {
            return Err(HeadlessError::TextParent(parent));
        }
        let child_node = self.nodes.get(child.0).ok_or(HeadlessError::UnknownNode(child))?;
        if child_node.parent.is_some() {
            return Err(HeadlessError::AlreadyAttached(child));
        }
        Ok(())
    }
}

impl HostAdapter for HeadlessSurface {
    type Handle = HostId;
    type Error = HeadlessError;

    fn create_node(&mut self, kind: &str) -> Result<HostId, HeadlessError> {
        let id = self.push(HostNode::new(kind));
        self.log.push(Mutation::Create {
            node: id,
            kind: kind.to_owned(),
        });
        Ok(id)
    }

    fn set_attribute(
        &mut self,
        node: &HostId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HeadlessError> {
        let entry = self.node_mut(*node)?;
        let mutation = match (event_name(name), value) {
            (Some(event), PropValue::Listener(listener)) => {
                entry.listeners.insert(event.clone(), listener.clone());
                Mutation::Bind { node: *node, event }
            }
            _ => {
                let value = value.to_string();
                entry.attributes.insert(name.to_owned(), value.clone());
                Mutation::Set {
                    node: *node,
                    name: name.to_owned(),
                    value,
                }
            }
        };
        self.log.push(mutation);
        Ok(())
    }

    fn clear_attribute(
        &mut self,
        node: &HostId,
        name: &str,
        previous: &PropValue,
    ) -> Result<(), HeadlessError> {
        let entry = self.node_mut(*node)?;
        let mutation = match (event_name(name), previous) {
            (Some(event), PropValue::Listener(_)) => {
                entry.listeners.remove(&event);
                Mutation::Unbind { node: *node, event }
            }
            _ => {
                entry.attributes.remove(name);
                Mutation::Clear {
                    node: *node,
                    name: name.to_owned(),
                }
            }
        };
        self.log.push(mutation);
        Ok(())
    }

    fn attach_child(&mut self, parent: &HostId, child: &HostId) -> Result<(), HeadlessError> {
        self.check_attachable(*parent, *child)?;
        self.node_mut(*parent)?.children.push(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.log.push(Mutation::Attach {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &HostId,
        child: &HostId,
        anchor: &HostId,
    ) -> Result<(), HeadlessError> {
        self.check_attachable(*parent, *child)?;
        let siblings = &mut self.node_mut(*parent)?.children;
        let position = siblings
            .iter()
            .position(|id| id == anchor)
            .ok_or(HeadlessError::NotAChild {
                parent: *parent,
                child: *anchor,
            })?;
        siblings.insert(position, *child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.log.push(Mutation::InsertBefore {
            parent: *parent,
            child: *child,
            anchor: *anchor,
        });
        Ok(())
    }

    fn detach_child(&mut self, parent: &HostId, child: &HostId) -> Result<(), HeadlessError> {
        let siblings = &mut self.node_mut(*parent)?.children;
        let position = siblings
            .iter()
            .position(|id| id == child)
            .ok_or(HeadlessError::NotAChild {
                parent: *parent,
                child: *child,
            })?;
        siblings.remove(position);
        self.node_mut(*child)?.parent = None;
        self.log.push(Mutation::Detach {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach_keep_order() {
        let mut surface = HeadlessSurface::new();
        let root = surface.create_container("root");
        let a = surface.create_node("a").unwrap();
        let b = surface.create_node("b").unwrap();
        let c = surface.create_node("c").unwrap();

        surface.attach_child(&root, &a).unwrap();
        surface.attach_child(&root, &c).unwrap();
        surface.insert_before(&root, &b, &c).unwrap();
        assert_eq!(surface.children(root), [a, b, c]);

        surface.detach_child(&root, &b).unwrap();
        assert_eq!(surface.children(root), [a, c]);
        assert_eq!(surface.parent(b), None);
    }

    #[test]
    fn rejects_invalid_structure() {
        let mut surface = HeadlessSurface::new();
        let root = surface.create_container("root");
        let text = surface.create_node(TEXT).unwrap();
        let other = surface.create_node("span").unwrap();

        surface.attach_child(&root, &text).unwrap();
        assert_eq!(
            surface.attach_child(&root, &text),
            Err(HeadlessError::AlreadyAttached(text))
        );
        assert_eq!(
            surface.attach_child(&text, &other),
            Err(HeadlessError::TextParent(text))
        );
        assert_eq!(
            surface.detach_child(&root, &other),
            Err(HeadlessError::NotAChild {
                parent: root,
                child: other
            })
        );
    }

    #[test]
    fn event_attributes_bind_listeners() {
        use std::{cell::Cell, rc::Rc};

        let mut surface = HeadlessSurface::new();
        let button = surface.create_node("button").unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let listener = PropValue::Listener(Listener::new(move |_| counter.set(counter.get() + 1)));

        surface.set_attribute(&button, "onClick", &listener).unwrap();
        assert!(surface.attributes(button).unwrap().is_empty());
        assert_eq!(surface.events(button), ["click"]);
        assert!(surface.dispatch(button, &Event::new("click")));
        assert_eq!(clicks.get(), 1);

        surface.clear_attribute(&button, "onClick", &listener).unwrap();
        assert!(!surface.dispatch(button, &Event::new("click")));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn html_renders_text_values() {
        let mut surface = HeadlessSurface::new();
        let root = surface.create_container("root");
        let link = surface.create_node("a").unwrap();
        let label = surface.create_node(TEXT).unwrap();
        surface
            .set_attribute(&link, "href", &PropValue::from("https://example.com"))
            .unwrap();
        surface
            .set_attribute(&label, NODE_VALUE, &PropValue::from("Official Website"))
            .unwrap();
        surface.attach_child(&link, &label).unwrap();
        surface.attach_child(&root, &link).unwrap();

        assert_eq!(
            surface.to_html(root),
            "<a href=\"https://example.com\">Official Website</a>"
        );
        assert_eq!(surface.text_content(root), "Official Website");
    }

    #[test]
    fn html_escapes_values() {
        let mut surface = HeadlessSurface::new();
        let root = surface.create_container("root");
        let quote = surface.create_node("q").unwrap();
        let label = surface.create_node(TEXT).unwrap();
        surface
            .set_attribute(&quote, "title", &PropValue::from("say \"hi\" & <go>"))
            .unwrap();
        surface
            .set_attribute(&label, NODE_VALUE, &PropValue::from("a < b && c > d"))
            .unwrap();
        surface.attach_child(&quote, &label).unwrap();
        surface.attach_child(&root, &quote).unwrap();

        assert_eq!(
            surface.to_html(root),
            "<q title=\"say &quot;hi&quot; &amp; &lt;go&gt;\">a &lt; b &amp;&amp; c &gt; d</q>"
        );
        assert_eq!(surface.text_content(root), "a < b && c > d");
    }
}
