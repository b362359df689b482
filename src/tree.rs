//! Syntax tree structure handed back by the parser engine
//!
//! The coordinator never inspects grammar internals; it only needs the
//! resolved module name (for reload suppression) and a leaf-token view
//! (for editor-side highlighting and outline features).

use serde::{Deserialize, Serialize};

use crate::location::SourceSpan;

/// Coarse classification of a leaf token, for editor consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Operator,
    Literal,
    Comment,
    Whitespace,
    Other,
}

/// One node of a parsed module tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Inner node with a grammar production kind
    Node {
        kind: String,
        span: SourceSpan,
        children: Vec<TreeNode>,
    },
    /// Leaf token
    Token {
        category: TokenCategory,
        span: SourceSpan,
        text: String,
    },
}

/// A successfully parsed module: its resolved name plus the syntax tree.
///
/// The name is what the reload guard suppresses after a successful parse, so
/// engines must fill it with the module's own declared name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTree {
    pub name: String,
    pub root: TreeNode,
}

impl ModuleTree {
    pub fn new(name: impl Into<String>, root: TreeNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Depth-first iterator over the leaf tokens of this tree, in source
    /// order.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            stack: vec![&self.root],
        }
    }
}

/// Borrowed view of one leaf token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenView<'a> {
    pub category: TokenCategory,
    pub span: SourceSpan,
    pub text: &'a str,
}

/// See [`ModuleTree::tokens`].
pub struct Tokens<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = TokenView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                TreeNode::Node { children, .. } => {
                    // push reversed so the leftmost child pops first
                    self.stack.extend(children.iter().rev());
                }
                TreeNode::Token {
                    category,
                    span,
                    text,
                } => {
                    return Some(TokenView {
                        category: *category,
                        span: *span,
                        text,
                    });
                }
            }
        }
        None
    }
}
