//! Arena-based DOM for the resolved resource document.
//!
//! All nodes live in a contiguous vector; parent/child/sibling links are
//! indices into it. Nodes are never deallocated mid-lifetime — detaching only
//! unlinks them — so [`NodeId`]s handed out to callers (heading caches,
//! resolved ranges) stay valid for the lifetime of the document.
//!
//! On top of the read-only tree this adds the mutation surface the locator
//! engine needs: text splitting, wrapper insertion/unwrapping, normalization,
//! and inline-style access.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast lookup.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
    },
    /// Character data. CDATA sections are folded into text by the parser, so
    /// a single variant covers both kinds the resolver cares about.
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// The live resource document.
pub struct Document {
    nodes: Vec<Node>,
    document: NodeId,
    /// First-registered node per id attribute. Duplicate ids (the active
    /// location marker deliberately reuses one id across several spans) are
    /// found via selector queries, not this map.
    id_map: HashMap<String, NodeId>,
}

impl Document {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            id_map: HashMap::new(),
        };
        doc.document = doc.alloc(Node::new(NodeData::Document));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            if attr.name.local.as_ref() == "id" {
                id = Some(attr.value.clone());
            } else if attr.name.local.as_ref() == "class" {
                classes = attr
                    .value
                    .split_whitespace()
                    .map(|s| s.to_string())
                    .collect();
            }
        }

        let node_id = self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));

        if let Some(id_str) = id {
            self.id_map.entry(id_str).or_insert(node_id);
        }

        node_id
    }

    /// Create an HTML-namespaced element from a tag name and attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        let attrs = attrs
            .iter()
            .map(|(k, v)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*k)),
                value: (*v).to_string(),
            })
            .collect();
        self.create_element(name, attrs)
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(NodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node after a sibling.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let next = self
            .get(sibling)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
            self.append(parent, new_node);
        }
    }

    /// Unlink a node from its parent and siblings. The node stays allocated;
    /// its own children are untouched.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Replace `old` with `new` at the same tree position. `old` is detached.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Replace a node with its own children, preserving document order.
    /// Returns the former parent.
    pub fn unwrap_children(&mut self, target: NodeId) -> NodeId {
        let parent = self.get(target).map(|n| n.parent).unwrap_or(NodeId::NONE);
        let children: Vec<_> = self.children(target).collect();
        for child in children {
            self.detach(child);
            self.insert_before(target, child);
        }
        self.detach(target);
        parent
    }

    /// Merge adjacent text siblings and drop empty text nodes throughout the
    /// subtree, like DOM `Node.normalize()`.
    pub fn normalize(&mut self, root: NodeId) {
        let children: Vec<_> = self.children(root).collect();
        let mut prev_text: Option<NodeId> = None;
        for child in children {
            match self.get(child).map(|n| &n.data) {
                Some(NodeData::Text(t)) => {
                    if t.is_empty() {
                        self.detach(child);
                        continue;
                    }
                    if let Some(prev) = prev_text {
                        let suffix = match self.get(child).map(|n| &n.data) {
                            Some(NodeData::Text(t)) => t.clone(),
                            _ => String::new(),
                        };
                        if let Some(NodeData::Text(existing)) =
                            self.get_mut(prev).map(|n| &mut n.data)
                        {
                            existing.push_str(&suffix);
                        }
                        self.detach(child);
                    } else {
                        prev_text = Some(child);
                    }
                }
                Some(NodeData::Element { .. }) => {
                    prev_text = None;
                    self.normalize(child);
                }
                _ => {
                    prev_text = None;
                }
            }
        }
    }

    /// Append text to an existing text node, or create new if last child
    /// isn't text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Split a text node at a character offset; the suffix becomes a new text
    /// node inserted right after. Returns the suffix node.
    ///
    /// Returns `None` if the node is not text or the offset is not strictly
    /// inside it.
    pub fn split_text(&mut self, target: NodeId, char_offset: u32) -> Option<NodeId> {
        let byte_offset = {
            let text = match self.get(target).map(|n| &n.data) {
                Some(NodeData::Text(t)) => t,
                _ => return None,
            };
            if char_offset == 0 {
                return None;
            }
            let (byte_offset, _) = text.char_indices().nth(char_offset as usize)?;
            byte_offset
        };

        let suffix = match self.get_mut(target).map(|n| &mut n.data) {
            Some(NodeData::Text(t)) => t.split_off(byte_offset),
            _ => return None,
        };
        let suffix_node = self.create_text(suffix);
        self.insert_after(target, suffix_node);
        Some(suffix_node)
    }

    /// Get node by id attribute (first registered wins).
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            doc: self,
            current: first,
        }
    }

    /// Iterate over element children of a node (DOM `Element.children`).
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&c| self.is_element(c))
    }

    /// Find the first node matching a predicate, in document order.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| {
            if let NodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        self.find_by_tag("body")
    }

    /// The `<html>` element (first element child of the document).
    pub fn root_element(&self) -> Option<NodeId> {
        self.element_children(self.document).next()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .doc
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Element accessors.
impl Document {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Does the element have the given tag name?
    pub fn tag_is(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    pub fn attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Set or replace an attribute, keeping the pre-extracted id/class state
    /// and the id map in sync.
    pub fn set_attr(&mut self, target: NodeId, attr_name: &str, value: &str) {
        let mut old_id = None;
        if let Some(node) = self.get_mut(target)
            && let NodeData::Element {
                attrs, id, classes, ..
            } = &mut node.data
        {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                Some(attr) => attr.value = value.to_string(),
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: value.to_string(),
                }),
            }
            if attr_name == "id" {
                old_id = id.clone();
                *id = Some(value.to_string());
            } else if attr_name == "class" {
                *classes = value.split_whitespace().map(|s| s.to_string()).collect();
            }
        }
        if attr_name == "id" {
            if let Some(old) = old_id
                && self.id_map.get(&old) == Some(&target)
            {
                self.id_map.remove(&old);
            }
            self.id_map.entry(value.to_string()).or_insert(target);
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, target: NodeId, attr_name: &str) {
        let mut old_id = None;
        if let Some(node) = self.get_mut(target)
            && let NodeData::Element {
                attrs, id, classes, ..
            } = &mut node.data
        {
            attrs.retain(|a| a.name.local.as_ref() != attr_name);
            if attr_name == "id" {
                old_id = id.take();
            } else if attr_name == "class" {
                classes.clear();
            }
        }
        if let Some(old) = old_id
            && self.id_map.get(&old) == Some(&target)
        {
            self.id_map.remove(&old);
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Is this node character data (text or CDATA)?
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Raw character data of a text node.
    pub fn text_data(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Character count of a text node.
    pub fn text_len(&self, id: NodeId) -> u32 {
        self.text_data(id)
            .map(|t| t.chars().count() as u32)
            .unwrap_or(0)
    }

    /// Concatenated descendant text (DOM `textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) => out.push_str(t),
            Some(_) => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Descendant text nodes in pre-order, including `id` itself when it is
    /// a text node.
    pub fn descendant_text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_text_nodes(id, &mut out);
        out
    }

    fn collect_text_nodes(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.is_text(id) {
            out.push(id);
            return;
        }
        for child in self.children(id) {
            self.collect_text_nodes(child, out);
        }
    }
}

/// Sequential (pre-order) traversal, matching the original page script's
/// node-walking helpers.
impl Document {
    /// Next node following the end of the given node, skipping its children.
    pub fn next_node_not_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.next_sibling.is_some() {
            return Some(node.next_sibling);
        }
        if node.parent.is_some() {
            return self.next_node_not_child(node.parent);
        }
        None
    }

    /// Next node following the start of the given node, including children.
    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.first_child.is_some() {
            return Some(node.first_child);
        }
        if node.next_sibling.is_some() {
            return Some(node.next_sibling);
        }
        if node.parent.is_some() {
            return self.next_node_not_child(node.parent);
        }
        None
    }

    /// Previous node before the opening of the given node, skipping children.
    pub fn prev_node_not_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.prev_sibling.is_some() {
            return Some(node.prev_sibling);
        }
        if node.parent.is_some() {
            return self.prev_node_not_child(node.parent);
        }
        None
    }

    /// Previous node in reverse traversal order, descending into children.
    pub fn prev_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.last_child.is_some() {
            return Some(node.last_child);
        }
        if node.prev_sibling.is_some() {
            return Some(node.prev_sibling);
        }
        if node.parent.is_some() {
            return self.prev_node_not_child(node.parent);
        }
        None
    }

    /// Parent if it is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        if self.is_element(parent) {
            Some(parent)
        } else {
            None
        }
    }

    /// Nearest ancestor (excluding `id` itself) carrying a non-empty id
    /// attribute.
    pub fn nearest_ancestor_with_id(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent_element(id);
        while let Some(node) = current {
            if self.element_id(node).is_some_and(|i| !i.is_empty()) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    /// Nearest ancestor-or-self with the given tag (DOM `closest` for plain
    /// tag names).
    pub fn closest_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = if self.is_element(id) {
            Some(id)
        } else {
            self.parent_element(id)
        };
        while let Some(node) = current {
            if self.tag_is(node, tag) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    /// Is `a` an ancestor of `b` (strictly)?
    pub fn contains(&self, a: NodeId, b: NodeId) -> bool {
        let mut current = self.get(b).map(|n| n.parent).unwrap_or(NodeId::NONE);
        while current.is_some() {
            if current == a {
                return true;
            }
            current = self.get(current).map(|n| n.parent).unwrap_or(NodeId::NONE);
        }
        false
    }

    /// Child-index path from the document root; lexicographic comparison of
    /// paths is document order, and a path prefix means containment.
    fn node_path(&self, id: NodeId) -> Option<Vec<u32>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.document {
            let parent = self.get(current)?.parent;
            if parent.is_none() {
                // Detached subtree.
                return None;
            }
            let index = self.children(parent).position(|c| c == current)? as u32;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// True when `a == b`, `a` precedes `b` in document order, or `a`
    /// contains `b`. This is the condition the TOC synthesizer checks via
    /// `compareDocumentPosition` in a browser.
    pub fn precedes_or_contains(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        match (self.node_path(a), self.node_path(b)) {
            (Some(pa), Some(pb)) => pa <= pb,
            _ => false,
        }
    }
}

/// Inline-style access. Computed style is out of reach without a full cascade;
/// the engine reads and writes the `style` attribute directly, which is where
/// the rendering layer records forced visibility and where authored
/// `display:none`/`opacity:0` markers live in practice.
impl Document {
    /// Read a declaration out of the `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        for decl in style.split(';') {
            let mut parts = decl.splitn(2, ':');
            let name = parts.next()?.trim();
            if name.eq_ignore_ascii_case(property) {
                return Some(parts.next().unwrap_or("").trim().to_string());
            }
        }
        None
    }

    /// Write a declaration into the `style` attribute, replacing any existing
    /// declaration for the same property.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let existing = self.attr(id, "style").unwrap_or("");
        let mut decls: Vec<String> = existing
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .filter(|d| {
                d.splitn(2, ':')
                    .next()
                    .map(str::trim)
                    .is_none_or(|name| !name.eq_ignore_ascii_case(property))
            })
            .map(str::to_string)
            .collect();
        decls.push(format!("{}: {}", property, value));
        let style = decls.join("; ");
        self.set_attr(id, "style", &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    #[test]
    fn test_create_elements() {
        let mut doc = Document::new();

        let div = doc.create_html_element("div", &[("id", "main")]);
        doc.append(doc.document(), div);

        assert_eq!(doc.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(doc.element_id(div), Some("main"));
        assert_eq!(doc.get_by_id("main"), Some(div));
    }

    #[test]
    fn test_append_children() {
        let mut doc = Document::new();

        let parent = doc.create_element(make_qname("div"), vec![]);
        let child1 = doc.create_element(make_qname("p"), vec![]);
        let child2 = doc.create_element(make_qname("p"), vec![]);

        doc.append(doc.document(), parent);
        doc.append(parent, child1);
        doc.append(parent, child2);

        let children: Vec<_> = doc.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_split_text() {
        let mut doc = Document::new();
        let p = doc.create_element(make_qname("p"), vec![]);
        doc.append(doc.document(), p);
        let text = doc.create_text("Hello world".to_string());
        doc.append(p, text);

        let suffix = doc.split_text(text, 6).unwrap();
        assert_eq!(doc.text_data(text), Some("Hello "));
        assert_eq!(doc.text_data(suffix), Some("world"));

        let children: Vec<_> = doc.children(p).collect();
        assert_eq!(children, vec![text, suffix]);
    }

    #[test]
    fn test_split_text_multibyte() {
        let mut doc = Document::new();
        let text = doc.create_text("héllo".to_string());
        doc.append(doc.document(), text);

        let suffix = doc.split_text(text, 2).unwrap();
        assert_eq!(doc.text_data(text), Some("hé"));
        assert_eq!(doc.text_data(suffix), Some("llo"));
    }

    #[test]
    fn test_split_text_at_zero_refused() {
        let mut doc = Document::new();
        let text = doc.create_text("abc".to_string());
        doc.append(doc.document(), text);
        assert!(doc.split_text(text, 0).is_none());
        assert!(doc.split_text(text, 3).is_none());
    }

    #[test]
    fn test_unwrap_children() {
        let mut doc = Document::new();
        let p = doc.create_element(make_qname("p"), vec![]);
        let span = doc.create_element(make_qname("span"), vec![]);
        let t1 = doc.create_text("a".to_string());
        let t2 = doc.create_text("b".to_string());
        doc.append(doc.document(), p);
        doc.append(p, span);
        doc.append(span, t1);
        doc.append(span, t2);

        let parent = doc.unwrap_children(span);
        assert_eq!(parent, p);
        let children: Vec<_> = doc.children(p).collect();
        assert_eq!(children, vec![t1, t2]);
    }

    #[test]
    fn test_normalize_merges_text() {
        let mut doc = Document::new();
        let p = doc.create_element(make_qname("p"), vec![]);
        let t1 = doc.create_text("Hello ".to_string());
        let t2 = doc.create_text("world".to_string());
        let t3 = doc.create_text(String::new());
        doc.append(doc.document(), p);
        doc.append(p, t1);
        doc.append(p, t2);
        doc.append(p, t3);

        doc.normalize(p);
        let children: Vec<_> = doc.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.text_data(children[0]), Some("Hello world"));
    }

    #[test]
    fn test_next_node_walk() {
        let mut doc = Document::new();
        let div = doc.create_element(make_qname("div"), vec![]);
        let p = doc.create_element(make_qname("p"), vec![]);
        let t = doc.create_text("x".to_string());
        let after = doc.create_element(make_qname("span"), vec![]);
        doc.append(doc.document(), div);
        doc.append(div, p);
        doc.append(p, t);
        doc.append(div, after);

        assert_eq!(doc.next_node(div), Some(p));
        assert_eq!(doc.next_node(p), Some(t));
        assert_eq!(doc.next_node(t), Some(after));
        assert_eq!(doc.next_node_not_child(p), Some(after));
        assert_eq!(doc.next_node(after), None);
    }

    #[test]
    fn test_precedes_or_contains() {
        let mut doc = Document::new();
        let div = doc.create_element(make_qname("div"), vec![]);
        let h1 = doc.create_element(make_qname("h1"), vec![]);
        let p = doc.create_element(make_qname("p"), vec![]);
        doc.append(doc.document(), div);
        doc.append(div, h1);
        doc.append(div, p);

        assert!(doc.precedes_or_contains(h1, p));
        assert!(doc.precedes_or_contains(div, p));
        assert!(doc.precedes_or_contains(p, p));
        assert!(!doc.precedes_or_contains(p, h1));
    }

    #[test]
    fn test_style_property_roundtrip() {
        let mut doc = Document::new();
        let div = doc.create_html_element("div", &[("style", "display: none; opacity: 0")]);
        doc.append(doc.document(), div);

        assert_eq!(doc.style_property(div, "display").as_deref(), Some("none"));
        assert_eq!(doc.style_property(div, "opacity").as_deref(), Some("0"));

        doc.set_style_property(div, "display", "block");
        assert_eq!(doc.style_property(div, "display").as_deref(), Some("block"));
        assert_eq!(doc.style_property(div, "opacity").as_deref(), Some("0"));
    }

    #[test]
    fn test_set_attr_updates_id_map() {
        let mut doc = Document::new();
        let div = doc.create_html_element("div", &[("id", "a")]);
        doc.append(doc.document(), div);

        doc.set_attr(div, "id", "b");
        assert_eq!(doc.get_by_id("b"), Some(div));
        assert_eq!(doc.get_by_id("a"), None);

        doc.remove_attr(div, "id");
        assert_eq!(doc.get_by_id("b"), None);
        assert_eq!(doc.element_id(div), None);
    }
}
