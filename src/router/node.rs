//! Radix tree vertex.
//!
//! A [`Node`] owns a fragment of a route path and, exclusively, its children.
//! Concatenating the segments along a root-to-node path reconstructs the route
//! prefix up to that node. Variable segments are split out into dedicated
//! `Param` / `Wildcard` nodes so that a node either fans out over static
//! children (indexed by their first character in `child_order`) or has exactly
//! one variable child.

use std::sync::Arc;

/// Node type tag
///
/// The kind is fixed when the node is created. Splitting moves the kind to the
/// new child rather than mutating it in place.
pub(crate) enum NodeKind<T> {
    /// Tree root; the only kind that carries middleware
    Root,
    /// Ordinary literal fragment
    Static,
    /// `:name` single-segment variable; the segment is `:name`
    Param { name: Arc<str> },
    /// Catch-all pair: `name == None` is the empty-segment marker, `Some` is
    /// the `/*name` node that holds the handler
    Wildcard { name: Option<Arc<str>> },
    /// Mounted sub-router; the box is that router's tree root
    Group(Box<Node<T>>),
}

impl<T> NodeKind<T> {
    pub(crate) fn is_variable(&self) -> bool {
        matches!(self, NodeKind::Param { .. } | NodeKind::Wildcard { .. })
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Static => "static",
            NodeKind::Param { .. } => "param",
            NodeKind::Wildcard { .. } => "wildcard",
            NodeKind::Group(_) => "group",
        }
    }
}

/// Value attached to the node a route terminates at
pub(crate) enum Payload<T> {
    Handler(T),
    Group(Box<Node<T>>),
}

impl<T> Payload<T> {
    pub(crate) fn is_group(&self) -> bool {
        matches!(self, Payload::Group(_))
    }
}

/// Radix tree vertex
pub(crate) struct Node<T> {
    pub(crate) segment: String,
    pub(crate) kind: NodeKind<T>,
    /// True iff the single child is a `Param` or `Wildcard` node
    pub(crate) has_variable_child: bool,
    /// Most variable segments of any route below (and including) this node
    pub(crate) max_variable_depth: usize,
    /// First character of each static child's segment, co-sorted with `children`
    pub(crate) child_order: Vec<char>,
    /// Ordered by descending priority; ties keep insertion order
    pub(crate) children: Vec<Node<T>>,
    pub(crate) handler: Option<T>,
    pub(crate) priority: u32,
    /// Only populated on the root; a mounted sub-router brings its own root
    pub(crate) middleware: Vec<T>,
}

impl<T> Node<T> {
    fn with_kind(segment: impl Into<String>, kind: NodeKind<T>) -> Self {
        Self {
            segment: segment.into(),
            kind,
            has_variable_child: false,
            max_variable_depth: 0,
            child_order: Vec::new(),
            children: Vec::new(),
            handler: None,
            priority: 0,
            middleware: Vec::new(),
        }
    }

    /// An empty tree root
    pub(crate) fn root() -> Self {
        Self::with_kind(String::new(), NodeKind::Root)
    }

    /// A fresh static node; its segment is assigned by the insertion
    pub(crate) fn new_static() -> Self {
        Self::with_kind(String::new(), NodeKind::Static)
    }

    /// `:name` node
    pub(crate) fn new_param(segment: &str, name: &str) -> Self {
        Self::with_kind(
            segment,
            NodeKind::Param {
                name: Arc::from(name),
            },
        )
    }

    /// Empty-segment catch-all marker
    pub(crate) fn new_wildcard_marker() -> Self {
        Self::with_kind(String::new(), NodeKind::Wildcard { name: None })
    }

    /// `/*name` node holding the route's handler
    pub(crate) fn new_catch_all(segment: &str, name: &str) -> Self {
        Self::with_kind(
            segment,
            NodeKind::Wildcard {
                name: Some(Arc::from(name)),
            },
        )
    }

    /// A root that has never received a route
    pub(crate) fn is_empty_tree(&self) -> bool {
        self.segment.is_empty() && self.children.is_empty() && self.handler.is_none()
    }

    pub(crate) fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// Index of the static child whose segment starts with `c`
    #[inline]
    pub(crate) fn static_child(&self, c: char) -> Option<usize> {
        if self.has_variable_child {
            return None;
        }
        self.child_order.iter().position(|&first| first == c)
    }

    /// Append a static child and index it under the first character of `first`.
    pub(crate) fn push_static_child(&mut self, first: char, child: Node<T>) -> usize {
        self.child_order.push(first);
        self.children.push(child);
        self.children.len() - 1
    }

    /// Make `child` the one and only (variable) child of this node.
    pub(crate) fn set_variable_child(&mut self, child: Node<T>) {
        debug_assert!(child.kind.is_variable());
        debug_assert!(self.children.is_empty());
        self.children.push(child);
        self.has_variable_child = true;
    }

    /// Increment the priority of the child at `idx` and move it forward past
    /// every sibling with a strictly lower priority.
    ///
    /// Equal priorities keep their insertion order, so the resulting order is
    /// deterministic. `child_order` is moved in lockstep. Returns the child's
    /// new index.
    pub(crate) fn bump(&mut self, idx: usize) -> usize {
        self.children[idx].priority += 1;
        let priority = self.children[idx].priority;

        let mut new_idx = idx;
        while new_idx > 0 && self.children[new_idx - 1].priority < priority {
            new_idx -= 1;
        }

        if new_idx != idx {
            self.children[new_idx..=idx].rotate_right(1);
            if !self.has_variable_child {
                self.child_order[new_idx..=idx].rotate_right(1);
            }
        }
        new_idx
    }

    /// Number of nodes in this tree, mounted sub-trees included
    pub(crate) fn node_count(&self) -> usize {
        let own = match &self.kind {
            NodeKind::Group(sub) => 1 + sub.node_count(),
            _ => 1,
        };
        own + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Every route stored under this node, as `(path, kind label)` pairs
    pub(crate) fn collect_routes(&self, prefix: &str, out: &mut Vec<(String, &'static str)>) {
        let path = format!("{prefix}{}", self.segment);
        if self.handler.is_some() {
            let kind = match self.kind {
                NodeKind::Root => "static",
                _ => self.kind.label(),
            };
            out.push((path.clone(), kind));
        }
        if let NodeKind::Group(sub) = &self.kind {
            out.push((path.clone(), "group"));
            sub.collect_routes(&path, out);
        }
        for child in &self.children {
            child.collect_routes(&path, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_children(priorities: &[(char, u32)]) -> Node<()> {
        let mut node = Node::root();
        for &(c, priority) in priorities {
            let mut child = Node::new_static();
            child.segment = c.to_string();
            child.priority = priority;
            node.push_static_child(c, child);
        }
        node
    }

    #[test]
    fn test_bump_moves_child_forward() {
        let mut node = with_children(&[('a', 3), ('b', 2), ('c', 2)]);
        let idx = node.bump(2);
        assert_eq!(idx, 1);
        assert_eq!(node.child_order, vec!['a', 'c', 'b']);
        assert_eq!(node.children[1].segment, "c");
        assert_eq!(node.children[1].priority, 3);
    }

    #[test]
    fn test_bump_keeps_ties_in_insertion_order() {
        let mut node = with_children(&[('a', 1), ('b', 0)]);
        let idx = node.bump(1);
        assert_eq!(idx, 1);
        assert_eq!(node.child_order, vec!['a', 'b']);
    }

    #[test]
    fn test_bump_to_front() {
        let mut node = with_children(&[('a', 1), ('b', 1), ('c', 1)]);
        assert_eq!(node.bump(2), 0);
        assert_eq!(node.child_order, vec!['c', 'a', 'b']);
        assert_eq!(node.bump(2), 1);
        assert_eq!(node.child_order, vec!['c', 'b', 'a']);
        assert_eq!(node.bump(1), 0);
        assert_eq!(node.child_order, vec!['b', 'c', 'a']);
        for (c, child) in node.child_order.iter().zip(&node.children) {
            assert_eq!(child.segment.chars().next(), Some(*c));
        }
    }

    #[test]
    fn test_static_child_lookup() {
        let node = with_children(&[('u', 1), ('p', 1)]);
        assert_eq!(node.static_child('p'), Some(1));
        assert_eq!(node.static_child('x'), None);
    }
}
