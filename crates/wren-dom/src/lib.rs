//! Element tree consumed by the Wren style engine.
//!
//! This crate provides an arena-based tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), reduced to what style
//! resolution needs: navigation, attributes, text, shadow roots and a
//! mutation generation counter.
//!
//! # Design
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! Nothing is ever freed: removing a node clears its parent link and the
//! node stays addressable, disconnected, until the tree is dropped.

mod generation;

use std::collections::{HashMap, HashSet};

pub use generation::MutationGeneration;

/// Lowercased attribute name to value.
pub type AttributesMap = HashMap<String, String>;

/// Index of a node in its [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node.
    pub const ROOT: Self = Self(0);
}

/// One slot of the arena together with its links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,
    /// `None` for the document, for shadow roots and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in tree order.
    pub children: Vec<NodeId>,
    /// Next sibling in the parent's child list.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling in the parent's child list.
    pub prev_sibling: Option<NodeId>,
    /// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
    ///
    /// Hosted shadow root. It is not one of the host's children.
    pub shadow_root: Option<NodeId>,
}

impl Node {
    const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            shadow_root: None,
        }
    }
}

/// The node kinds style resolution cares about.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// Only ever at [`NodeId::ROOT`].
    Document,
    /// An element with its data.
    Element(ElementData),
    /// Character data of a text node.
    Text(String),
    /// Comment data. Never rendered.
    Comment(String),
    /// A shadow root. It always has a host.
    ShadowRoot(ShadowRootData),
}

/// Tag name and attributes of an element. Namespaces are not modelled.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name as given to [`DomTree::create_element`].
    pub tag_name: String,
    /// Attributes keyed by lowercased name.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
        }
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Class names from the `class` attribute, split on ASCII whitespace.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .get("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Payload of a shadow root node.
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    /// Element the shadow root is attached to.
    pub host: NodeId,
    /// `open` or `closed`. Style resolution treats both alike.
    pub mode: ShadowRootMode,
}

/// [§ 4.8](https://dom.spec.whatwg.org/#shadowroot-mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    /// `mode: "open"`
    Open,
    /// `mode: "closed"`
    Closed,
}

/// A document plus every node ever created for it.
///
/// All mutating methods bump the shared [`MutationGeneration`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    generation: MutationGeneration,
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            generation: MutationGeneration::new(),
        }
    }

    /// The node at `id`, if allocated.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of allocated nodes, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true; the document node always exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The current mutation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// A handle to this document's mutation counter.
    #[must_use]
    pub fn generation_handle(&self) -> MutationGeneration {
        self.generation.clone()
    }

    /// Record a mutation made outside the tree (e.g. a stylesheet edit).
    pub fn bump_generation(&self) -> u64 {
        self.generation.bump()
    }

    fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// Allocate a detached element with no attributes.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    /// Insert `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Inserts `child` into `parent` before `reference` (or at the end when
    /// `reference` is `None` or not a child of `parent`). A child that already
    /// has a parent is removed from it first.
    ///
    /// Does nothing where the DOM would throw a `HierarchyRequestError`:
    /// `child` is a shadow-including inclusive ancestor of `parent`, or is
    /// the document or a shadow root.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent.0 >= self.nodes.len()
            || child.0 >= self.nodes.len()
            || matches!(
                self.nodes[child.0].node_type,
                NodeType::Document | NodeType::ShadowRoot(_)
            )
            || self.is_shadow_including_inclusive_ancestor(child, parent)
        {
            return;
        }
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.detach(old_parent, child);
        }

        let position = reference
            .and_then(|r| self.nodes[parent.0].children.iter().position(|&c| c == r))
            .unwrap_or(self.nodes[parent.0].children.len());

        let prev = position
            .checked_sub(1)
            .map(|i| self.nodes[parent.0].children[i]);
        let next = self.nodes[parent.0].children.get(position).copied();

        self.nodes[parent.0].children.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev;
        self.nodes[child.0].next_sibling = next;
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = Some(child);
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = Some(child);
        }
        let _ = self.generation.bump();
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Removes `child` from `parent`. Does nothing if `child` is not a child
    /// of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) != Some(parent) {
            return;
        }
        self.detach(parent, child);
        let _ = self.generation.bump();
    }

    fn is_shadow_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id).or_else(|| self.host(id));
        }
        false
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// Attribute names are lowercased. Does nothing for non-elements.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let Some(NodeType::Element(data)) = self.nodes.get_mut(element.0).map(|n| &mut n.node_type)
        {
            let _ = data
                .attrs
                .insert(name.to_ascii_lowercase(), value.to_string());
            let _ = self.generation.bump();
        }
    }

    /// [§ 4.9 removeAttribute](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) {
        if let Some(NodeType::Element(data)) = self.nodes.get_mut(element.0).map(|n| &mut n.node_type)
            && data.attrs.remove(&name.to_ascii_lowercase()).is_some()
        {
            let _ = self.generation.bump();
        }
    }

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    #[must_use]
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.as_element(element)
            .and_then(|e| e.attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Replace the data of a text or comment node.
    pub fn set_text(&mut self, node: NodeId, data: &str) {
        match self.nodes.get_mut(node.0).map(|n| &mut n.node_type) {
            Some(NodeType::Text(text) | NodeType::Comment(text)) => {
                data.clone_into(text);
                let _ = self.generation.bump();
            }
            _ => {}
        }
    }

    /// [§ 4.9 attachShadow](https://dom.spec.whatwg.org/#dom-element-attachshadow)
    ///
    /// Returns the new shadow root, or `None` if `host` is not an element or
    /// already hosts a shadow root.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Option<NodeId> {
        if self.as_element(host).is_none() || self.nodes[host.0].shadow_root.is_some() {
            return None;
        }
        let root = self.alloc(NodeType::ShadowRoot(ShadowRootData { host, mode }));
        self.nodes[host.0].shadow_root = Some(root);
        let _ = self.generation.bump();
        Some(root)
    }

    /// The shadow root hosted by `host`, if any.
    #[must_use]
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.get(host).and_then(|n| n.shadow_root)
    }

    /// The host of a shadow root node.
    #[must_use]
    pub fn host(&self, shadow_root: NodeId) -> Option<NodeId> {
        self.get(shadow_root).and_then(|n| match &n.node_type {
            NodeType::ShadowRoot(data) => Some(data.host),
            _ => None,
        })
    }

    /// [§ 4.2.2 Root](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// Topmost ancestor reached through parent links. [`NodeId::ROOT`] for
    /// connected light-tree nodes and the shadow root inside a shadow tree.
    #[must_use]
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// [§ 4.2.2 Shadow-including root](https://dom.spec.whatwg.org/#concept-shadow-including-root)
    #[must_use]
    pub fn shadow_including_root(&self, id: NodeId) -> NodeId {
        let mut root = self.tree_root(id);
        while let Some(host) = self.host(root) {
            root = self.tree_root(host);
        }
        root
    }

    /// [§ 4.4 isConnected](https://dom.spec.whatwg.org/#dom-node-isconnected)
    ///
    /// Connected means the shadow-including root is the document.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.shadow_including_root(id) == NodeId::ROOT
    }

    /// The parent node, which may be the document or a shadow root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The parent element for inheritance purposes: the parent if it is an
    /// element, the host if the parent is a shadow root, otherwise `None`.
    #[must_use]
    pub fn parent_element_composed(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        if self.as_element(parent).is_some() {
            Some(parent)
        } else {
            self.host(parent)
        }
    }

    /// Children of `id`, empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// Next sibling of `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Previous sibling of `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Parent, grandparent and so on up to the tree root. Stops at a shadow
    /// root instead of continuing to its host.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Siblings before `id`, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over the descendants of `id` in tree order, excluding `id`
    /// itself. Shadow trees are not entered.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// Element data if `id` is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Lowercased tag name if this node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.as_element(id).map(|e| e.tag_name.to_ascii_lowercase())
    }

    /// Data of a text node. Comments are not text.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Text node data of every descendant, joined in tree order. This is how a
    /// `<style>` element's sheet text is read.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// First element child of the document, the one `:root` matches.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// See [`DomTree::ancestors`].
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// See [`DomTree::preceding_siblings`].
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Tree-order iterator over descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
