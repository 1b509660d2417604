//! Generic syntax tree delivered by tree providers.
//!
//! Every dialect parser lowers its own AST into this small vocabulary so
//! the extraction walker can stay dialect-agnostic. Nodes live in an arena
//! and refer to each other by [`NodeId`]; ranges are byte offsets into the
//! file content the tree was built from.

use std::ops::Range;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document itself. Always node 0.
    Root,
    /// A markup element. Children are attributes first, then content.
    Element { tag: String },
    /// Raw markup text between tags.
    Text,
    /// An attribute. `bound` marks expression-valued attributes in template
    /// dialects (`:title="..."`). The single child, if any, is the value.
    Attribute { name: String, bound: bool },
    /// A string literal. The range includes the quotes, `value` does not.
    StringLiteral { value: String },
    /// A template literal. Children alternate chunks and expressions.
    TemplateLiteral,
    /// A static chunk of a template literal.
    TemplateChunk { value: String },
    /// An interpolation region in markup (`{...}`, `{{ ... }}`). The range
    /// includes the delimiters; the child is the inner expression.
    ExpressionContainer,
    /// A binary operation. Children are `[left, right]`.
    Binary { op: String },
    /// `test ? consequent : alternate`. Children are `[test, cons, alt]`.
    Conditional,
    /// A call. `callee` is the dotted callee path (`t`, `i18n.t`), empty if
    /// the callee is not a plain path. Children are the arguments.
    Call { callee: String },
    /// An identifier, property access chain or index access.
    Reference,
    /// Any other expression. Children are structures embedded in it.
    Expression,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub const ROOT: NodeId = 0;

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn range(&self, id: NodeId) -> Range<usize> {
        self.nodes[id].range.clone()
    }

    /// Source text covered by the node, or "" if the range is invalid for `content`.
    pub fn text<'a>(&self, id: NodeId, content: &'a str) -> &'a str {
        content.get(self.range(id)).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }
}

/// Incrementally builds a [`SyntaxTree`], keeping parent/child links consistent.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    /// Creates a builder whose root spans `0..content_len`.
    pub fn new(content_len: usize) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                range: 0..content_len,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        SyntaxTree::ROOT
    }

    /// Appends a node as the last child of `parent`.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, range: Range<usize>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree { nodes: self.nodes }
    }
}
