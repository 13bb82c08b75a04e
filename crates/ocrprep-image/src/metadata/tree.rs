// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata trees — named nodes with ordered attributes and children.

use serde_json::{Map, Value};

/// Lookup capability resolution extraction needs from a metadata tree.
///
/// Kept separate from [`MetadataTree`] so trees produced by other decoders
/// can be queried without conversion.
pub trait MetadataQuery {
    /// First node named `tag`, searching descendants of the root in document
    /// order. The root itself never matches.
    fn find_first(&self, tag: &str) -> Option<NodeHandle>;

    /// Value of the `index`-th attribute of `node`, in insertion order.
    fn attribute_value(&self, node: NodeHandle, index: usize) -> Option<&str>;
}

/// Opaque reference to a node of a [`MetadataTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeHandle>,
}

impl Node {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Arena-backed, read-mostly tree of metadata nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTree {
    nodes: Vec<Node>,
}

impl MetadataTree {
    // -- Construction ---------------------------------------------------------

    /// Create a tree holding only a root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_name)],
        }
    }

    /// Append a child named `name` under `parent` and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this tree.
    pub fn add_child(&mut self, parent: NodeHandle, name: impl Into<String>) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(Node::new(name));
        self.nodes[parent.0].children.push(handle);
        handle
    }

    /// Set an attribute on `node`, replacing the value of an existing
    /// attribute with the same name and keeping its position.
    ///
    /// # Panics
    ///
    /// Panics if `node` was not issued by this tree.
    pub fn set_attribute(
        &mut self,
        node: NodeHandle,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = name.into();
        let value = value.into();
        let attributes = &mut self.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => attributes.push((name, value)),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    pub fn node_name(&self, node: NodeHandle) -> Option<&str> {
        self.nodes.get(node.0).map(|n| n.name.as_str())
    }

    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Attributes of `node` as `(name, value)` pairs, in insertion order.
    pub fn attributes(&self, node: NodeHandle) -> &[(String, String)] {
        self.nodes
            .get(node.0)
            .map(|n| n.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the tree as nested JSON, for diagnostics.
    pub fn to_json(&self) -> Value {
        self.node_to_json(self.root())
    }

    fn node_to_json(&self, node: NodeHandle) -> Value {
        let attributes: Map<String, Value> = self
            .attributes(node)
            .iter()
            .map(|(n, v)| (n.clone(), Value::String(v.clone())))
            .collect();
        let children: Vec<Value> = self
            .children(node)
            .iter()
            .map(|&child| self.node_to_json(child))
            .collect();
        serde_json::json!({
            "name": self.node_name(node).unwrap_or_default(),
            "attributes": attributes,
            "children": children,
        })
    }
}

impl MetadataQuery for MetadataTree {
    fn find_first(&self, tag: &str) -> Option<NodeHandle> {
        let mut stack: Vec<NodeHandle> = self.children(self.root()).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.node_name(node) == Some(tag) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    fn attribute_value(&self, node: NodeHandle, index: usize) -> Option<&str> {
        self.attributes(node).get(index).map(|(_, v)| v.as_str())
    }
}
