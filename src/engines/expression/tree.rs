use std::collections::VecDeque;
use std::fmt;

use crate::error::{PicEvolveError, Result};
use crate::functions::FunctionPrototype;
use crate::types::{Axis, NodeClass, Terminal};

/// Stable index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Function { name: String, arity: usize },
    Scalar(f64),
    Vector([f64; 3]),
    Variable(Axis),
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::Function { .. } => NodeClass::Function,
            NodeKind::Scalar(_) => NodeClass::Scalar,
            NodeKind::Vector(_) => NodeClass::Vector,
            NodeKind::Variable(_) => NodeClass::Variable,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            NodeKind::Function { arity, .. } => *arity,
            _ => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, NodeKind::Function { .. })
    }

    pub fn as_terminal(&self) -> Option<Terminal> {
        match self {
            NodeKind::Function { .. } => None,
            NodeKind::Scalar(v) => Some(Terminal::Scalar(*v)),
            NodeKind::Vector(v) => Some(Terminal::Vector(*v)),
            NodeKind::Variable(axis) => Some(Terminal::Variable(*axis)),
        }
    }
}

impl From<Terminal> for NodeKind {
    fn from(terminal: Terminal) -> Self {
        match terminal {
            Terminal::Scalar(v) => NodeKind::Scalar(v),
            Terminal::Vector(v) => NodeKind::Vector(v),
            Terminal::Variable(axis) => NodeKind::Variable(axis),
        }
    }
}

impl From<&FunctionPrototype> for NodeKind {
    fn from(prototype: &FunctionPrototype) -> Self {
        NodeKind::Function {
            name: prototype.name.clone(),
            arity: prototype.arity,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Expression tree stored as an arena of nodes.
///
/// Parent links are plain indices and never own anything; children lists own
/// their subtrees. Nodes spliced out of the tree stay in the arena, detached
/// and unreachable from the root, so every walk starts at `root()`.
#[derive(Debug, Clone)]
pub struct ExprTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ExprTree {
    /// Arena with no nodes yet; the caller must push nodes and call `set_root`.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: NodeId(0),
        }
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Single-node tree
    pub fn leaf(terminal: Terminal) -> Self {
        let mut tree = Self::with_capacity(1);
        let root = tree.add_terminal(terminal);
        tree.set_root(root);
        tree
    }

    /// Tree rooted at a new function node whose children are the given trees, in order
    pub fn function(prototype: &FunctionPrototype, children: Vec<ExprTree>) -> Result<Self> {
        let capacity = 1 + children.iter().map(|c| c.nodes.len()).sum::<usize>();
        let mut tree = Self::with_capacity(capacity);
        let root = tree.add_function(prototype);
        let grafted = children
            .iter()
            .map(|child| tree.graft(child, child.root()))
            .collect();
        tree.set_children(root, grafted)?;
        tree.set_root(root);
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// Follow parent links up to the top of whatever tree `id` belongs to
    pub fn ultimate_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Number of levels from `id` down to its deepest leaf; a leaf has height 1
    pub fn height(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut level = vec![id];
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&n| self.children(n).iter().copied())
                .collect();
        }
        height
    }

    /// Nodes reachable from the root
    pub fn node_count(&self) -> usize {
        self.preorder(self.root).len()
    }

    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Children before parents, siblings left to right
    pub fn postorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![(from, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
            } else {
                stack.push((id, true));
                stack.extend(self.children(id).iter().rev().map(|&c| (c, false)));
            }
        }
        order
    }

    pub fn add_terminal(&mut self, terminal: Terminal) -> NodeId {
        self.push_node(terminal.into())
    }

    pub fn add_function(&mut self, prototype: &FunctionPrototype) -> NodeId {
        self.push_node(prototype.into())
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Replace a terminal's value in place
    pub fn set_terminal(&mut self, id: NodeId, terminal: Terminal) -> Result<()> {
        let node = &mut self.nodes[id.0];
        if !node.kind.is_terminal() {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "cannot assign a terminal value to function node {}",
                id.0
            )));
        }
        node.kind = terminal.into();
        Ok(())
    }

    /// Give a function node its full, ordered child list.
    ///
    /// Every child must currently be detached. Previous children of `parent`
    /// become detached.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<()> {
        let arity = match &self.nodes[parent.0].kind {
            NodeKind::Function { arity, .. } => *arity,
            _ => {
                return Err(PicEvolveError::StructuralInvariant(format!(
                    "terminal node {} cannot have children",
                    parent.0
                )))
            }
        };
        if children.len() != arity {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "function node {} has arity {} but was given {} children",
                parent.0,
                arity,
                children.len()
            )));
        }
        if let Some(attached) = children
            .iter()
            .find(|&&c| c == parent || self.nodes[c.0].parent.is_some())
        {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "node {} is already attached to a tree",
                attached.0
            )));
        }

        self.take_children(parent);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
        Ok(())
    }

    /// Detach and return a node's children, leaving it mid-rewrite
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Copy the subtree of `other` rooted at `from` into this arena as a detached subtree
    pub fn graft(&mut self, other: &ExprTree, from: NodeId) -> NodeId {
        let top = self.push_node(other.kind(from).clone());
        let mut pending = VecDeque::from([(from, top)]);
        while let Some((source, target)) = pending.pop_front() {
            let copies: Vec<NodeId> = other
                .children(source)
                .iter()
                .map(|&child| {
                    let copy = self.push_node(other.kind(child).clone());
                    self.nodes[copy.0].parent = Some(target);
                    pending.push_back((child, copy));
                    copy
                })
                .collect();
            self.nodes[target.0].children = copies;
        }
        top
    }

    /// Splice `replacement` into the exact child slot `target` occupies.
    ///
    /// `replacement` must be detached, or be a child of `target` being promoted.
    /// `target` ends up detached; its remaining subtree hangs off it, unreachable
    /// from the root.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) -> Result<()> {
        let parent = self.parent(target).ok_or_else(|| {
            PicEvolveError::StructuralInvariant(format!(
                "node {} has no parent slot to splice into",
                target.0
            ))
        })?;
        let slot = self
            .children(parent)
            .iter()
            .position(|&c| c == target)
            .ok_or_else(|| {
                PicEvolveError::StructuralInvariant(format!(
                    "node {} is missing from its parent's children",
                    target.0
                ))
            })?;
        match self.parent(replacement) {
            None if replacement != self.root => {}
            Some(p) if p == target => {}
            _ => {
                return Err(PicEvolveError::StructuralInvariant(format!(
                    "node {} is attached elsewhere and cannot be spliced",
                    replacement.0
                )))
            }
        }

        if self.parent(replacement) == Some(target) {
            self.take_children(target);
        }
        self.nodes[parent.0].children[slot] = replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[target.0].parent = None;
        Ok(())
    }

    /// Check parent links and arities for every node reachable from the root
    pub fn validate(&self) -> Result<()> {
        if self.parent(self.root).is_some() {
            return Err(PicEvolveError::StructuralInvariant(
                "root node has a parent".to_string(),
            ));
        }
        for id in self.preorder(self.root) {
            let node = &self.nodes[id.0];
            if node.children.len() != node.kind.arity() {
                return Err(PicEvolveError::StructuralInvariant(format!(
                    "node {} has {} children but arity {}",
                    id.0,
                    node.children.len(),
                    node.kind.arity()
                )));
            }
            for &child in &node.children {
                if self.parent(child) != Some(id) {
                    return Err(PicEvolveError::StructuralInvariant(format!(
                        "node {} does not point back at its parent {}",
                        child.0, id.0
                    )));
                }
            }
            let occurrences = node
                .parent
                .map(|p| self.children(p).iter().filter(|&&c| c == id).count());
            if matches!(occurrences, Some(n) if n != 1) {
                return Err(PicEvolveError::StructuralInvariant(format!(
                    "node {} appears more than once among its siblings",
                    id.0
                )));
            }
        }
        Ok(())
    }

    /// Textual form of the subtree rooted at `id`
    pub fn to_sexpr(&self, id: NodeId) -> String {
        self.display(id).to_string()
    }

    /// Displayable view of the subtree rooted at `id`
    pub fn display(&self, id: NodeId) -> Subtree<'_> {
        Subtree { tree: self, id }
    }

    fn write_node<W: fmt::Write>(&self, id: NodeId, out: &mut W) -> fmt::Result {
        enum Step {
            /// Node to write, and whether a separating space goes first
            Open(NodeId, bool),
            Close,
        }

        let mut pending = vec![Step::Open(id, false)];
        while let Some(step) = pending.pop() {
            let (current, spaced) = match step {
                Step::Open(current, spaced) => (current, spaced),
                Step::Close => {
                    out.write_char(')')?;
                    continue;
                }
            };
            if spaced {
                out.write_char(' ')?;
            }
            match self.kind(current) {
                NodeKind::Function { name, .. } => {
                    write!(out, "({}", name)?;
                    pending.push(Step::Close);
                    pending.extend(self.children(current).iter().rev().map(|&c| Step::Open(c, true)));
                }
                NodeKind::Scalar(v) => write!(out, "{:?}", v)?,
                NodeKind::Vector([r, g, b]) => write!(out, "#{:?},{:?},{:?}", r, g, b)?,
                NodeKind::Variable(axis) => out.write_str(axis.as_str())?,
            }
        }
        Ok(())
    }
}

/// Borrowed subtree that formats as its s-expression
pub struct Subtree<'a> {
    tree: &'a ExprTree,
    id: NodeId,
}

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.write_node(self.id, f)
    }
}

impl fmt::Display for ExprTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minus() -> FunctionPrototype {
        FunctionPrototype::new("-", 2)
    }

    fn sample() -> ExprTree {
        // (abs (- x 0.3))
        let inner = ExprTree::function(
            &minus(),
            vec![
                ExprTree::leaf(Terminal::Variable(Axis::X)),
                ExprTree::leaf(Terminal::Scalar(0.3)),
            ],
        )
        .unwrap();
        ExprTree::function(&FunctionPrototype::new("abs", 1), vec![inner]).unwrap()
    }

    #[test]
    fn test_build_and_serialize() {
        let tree = sample();
        assert_eq!(tree.to_string(), "(abs (- x 0.3))");
        assert_eq!(tree.node_count(), 4);
        tree.validate().unwrap();
    }

    #[test]
    fn test_subtree_display() {
        let tree = sample();
        let minus = tree.children(tree.root())[0];
        assert_eq!(format!("[{}]", tree.display(minus)), "[(- x 0.3)]");
        assert_eq!(tree.to_sexpr(tree.children(minus)[0]), "x");
    }

    #[test]
    fn test_vector_serialization() {
        let tree = ExprTree::leaf(Terminal::Vector([0.5, 1.0, 0.25]));
        assert_eq!(tree.to_string(), "#0.5,1.0,0.25");
    }

    #[test]
    fn test_height() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(tree.height(root), 3);
        let minus = tree.children(root)[0];
        assert_eq!(tree.height(minus), 2);
        assert_eq!(tree.height(tree.children(minus)[1]), 1);
    }

    #[test]
    fn test_postorder_visits_children_first() {
        let tree = sample();
        let names: Vec<String> = tree
            .postorder(tree.root())
            .into_iter()
            .map(|id| tree.to_sexpr(id))
            .collect();
        assert_eq!(names, vec!["x", "0.3", "(- x 0.3)", "(abs (- x 0.3))"]);
    }

    #[test]
    fn test_replace_updates_slot_and_parent() {
        let mut tree = sample();
        let minus = tree.children(tree.root())[0];
        let scalar = tree.children(minus)[1];
        let y = tree.add_terminal(Terminal::Variable(Axis::Y));

        tree.replace(scalar, y).unwrap();

        assert_eq!(tree.to_string(), "(abs (- x y))");
        assert_eq!(tree.parent(y), Some(minus));
        assert_eq!(tree.parent(scalar), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_replace_promotes_child() {
        let mut tree = sample();
        let minus = tree.children(tree.root())[0];
        let x = tree.children(minus)[0];

        tree.replace(minus, x).unwrap();

        assert_eq!(tree.to_string(), "(abs x)");
        assert_eq!(tree.parent(x), Some(tree.root()));
        tree.validate().unwrap();
    }

    #[test]
    fn test_replace_root_is_invariant_violation() {
        let mut tree = sample();
        let y = tree.add_terminal(Terminal::Variable(Axis::Y));
        let result = tree.replace(tree.root(), y);
        assert!(matches!(result, Err(PicEvolveError::StructuralInvariant(_))));
        assert_eq!(tree.to_string(), "(abs (- x 0.3))");
    }

    #[test]
    fn test_replace_with_attached_node_rejected() {
        let mut tree = sample();
        let minus = tree.children(tree.root())[0];
        let x = tree.children(minus)[0];
        let scalar = tree.children(minus)[1];
        assert!(tree.replace(scalar, x).is_err());
    }

    #[test]
    fn test_set_children_checks_arity() {
        let mut tree = ExprTree::leaf(Terminal::Scalar(1.0));
        let f = tree.add_function(&minus());
        let a = tree.add_terminal(Terminal::Scalar(2.0));
        assert!(tree.set_children(f, vec![a]).is_err());
    }

    #[test]
    fn test_graft_copies_without_aliasing() {
        let source = sample();
        let mut target = ExprTree::leaf(Terminal::Scalar(0.0));
        let copy = target.graft(&source, source.children(source.root())[0]);
        assert_eq!(target.to_sexpr(copy), "(- x 0.3)");
        assert_eq!(target.parent(copy), None);
        assert_eq!(source.to_string(), "(abs (- x 0.3))");
    }

    #[test]
    fn test_ultimate_root() {
        let tree = sample();
        let minus = tree.children(tree.root())[0];
        let x = tree.children(minus)[0];
        assert_eq!(tree.ultimate_root(x), tree.root());
    }
}
