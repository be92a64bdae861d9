use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::tree::{NodeId, SyntaxNode, SyntaxTree};
use crate::LineRange;

/// Constructs that may be reported as an enclosing context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    FunctionDefinition,
    ClassDefinition,
    IfStatement,
    ForStatement,
    WhileStatement,
}

impl ConstructKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "function_definition" => Some(Self::FunctionDefinition),
            "class_definition" => Some(Self::ClassDefinition),
            "if_statement" => Some(Self::IfStatement),
            "for_statement" => Some(Self::ForStatement),
            "while_statement" => Some(Self::WhileStatement),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FunctionDefinition => "function_definition",
            Self::ClassDefinition => "class_definition",
            Self::IfStatement => "if_statement",
            Self::ForStatement => "for_statement",
            Self::WhileStatement => "while_statement",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnclosingContext {
    #[serde(rename = "type")]
    pub kind: ConstructKind,
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// How a `for` loop's iterable is located.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForIterableRule {
    /// First `identifier` child, plus a `call` child starting on the row the
    /// `in` keyword ends on.
    #[default]
    SameRowAsIn,
    /// The `left` and `right` fields of the loop, whatever the iterable is.
    Structural,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    pub for_iterable: ForIterableRule,
}

/// When a candidate may take over the running best.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Replacement {
    /// Nested-function precedence: always replaces.
    Always,
    /// Replaces on ties as well, so the later-visited candidate wins.
    SmallerOrEqual,
    StrictlySmaller,
}

struct Candidate {
    kind: ConstructKind,
    name: String,
    replacement: Replacement,
}

#[derive(Default)]
struct Best {
    size: Option<u32>,
    context: Option<EnclosingContext>,
}

impl Best {
    fn offer(&mut self, candidate: Candidate, node: &SyntaxNode) {
        let size = node.end_line().saturating_sub(node.start_line());
        let accepted = match (candidate.replacement, self.size) {
            (Replacement::Always, _) | (_, None) => true,
            (Replacement::SmallerOrEqual, Some(best)) => size <= best,
            (Replacement::StrictlySmaller, Some(best)) => size < best,
        };
        if !accepted {
            return;
        }

        debug!(
            kind = candidate.kind.as_str(),
            name = %candidate.name,
            start_line = node.start_line(),
            end_line = node.end_line(),
            "enclosing context candidate accepted"
        );
        self.size = Some(size);
        self.context = Some(EnclosingContext {
            kind: candidate.kind,
            name: candidate.name,
            start_line: node.start_line(),
            end_line: node.end_line(),
        });
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnclosingContextResolver {
    options: ResolverOptions,
}

impl EnclosingContextResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Smallest construct whose span fully contains `range`, or `None`.
    pub fn resolve(&self, tree: &SyntaxTree, range: LineRange) -> Option<EnclosingContext> {
        let mut best = Best::default();

        tree.walk_pre_order(|id, node| {
            if node.start_line() > range.end || node.end_line() < range.start {
                trace!(kind = node.kind(), "pruned non-overlapping subtree");
                return false;
            }

            let contains = node.start_line() <= range.start && range.end <= node.end_line();
            if contains {
                if let Some(candidate) = self.candidate(tree, id) {
                    best.offer(candidate, node);
                }
            }
            true
        });

        best.context
    }

    /// Resolves every range against the same tree. Output order follows input.
    pub fn resolve_many(
        &self,
        tree: &SyntaxTree,
        ranges: &[LineRange],
    ) -> Vec<Option<EnclosingContext>> {
        ranges
            .par_iter()
            .map(|range| self.resolve(tree, range.clone()))
            .collect()
    }

    fn candidate(&self, tree: &SyntaxTree, id: NodeId) -> Option<Candidate> {
        let kind = ConstructKind::from_node_kind(tree.kind(id))?;
        match kind {
            ConstructKind::FunctionDefinition => {
                let name = field_text(tree, id, "name")?;
                let replacement = if is_nested_function(tree, id) {
                    Replacement::Always
                } else {
                    Replacement::StrictlySmaller
                };
                Some(Candidate {
                    kind,
                    name,
                    replacement,
                })
            }
            ConstructKind::IfStatement => {
                let condition = tree.child_of_kind(id, "comparison_operator")?;
                Some(Candidate {
                    kind,
                    name: format!("if {}", tree.text(condition)),
                    replacement: Replacement::SmallerOrEqual,
                })
            }
            ConstructKind::ForStatement => {
                let (variable, iterable) = match self.options.for_iterable {
                    ForIterableRule::SameRowAsIn => same_row_loop_parts(tree, id)?,
                    ForIterableRule::Structural => structural_loop_parts(tree, id)?,
                };
                Some(Candidate {
                    kind,
                    name: format!("for {} in {}", tree.text(variable), tree.text(iterable)),
                    replacement: Replacement::StrictlySmaller,
                })
            }
            ConstructKind::ClassDefinition | ConstructKind::WhileStatement => Some(Candidate {
                kind,
                name: field_text(tree, id, "name")?,
                replacement: Replacement::StrictlySmaller,
            }),
        }
    }
}

/// A function whose parent is a `block` directly owned by another function,
/// i.e. defined in the outer function's body.
pub fn is_nested_function(tree: &SyntaxTree, id: NodeId) -> bool {
    let Some(block) = tree.parent(id) else {
        return false;
    };
    if tree.kind(block) != "block" {
        return false;
    }
    tree.parent(block)
        .is_some_and(|owner| tree.kind(owner) == "function_definition")
}

fn field_text(tree: &SyntaxTree, id: NodeId, field: &str) -> Option<String> {
    tree.child_by_field_name(id, field)
        .map(|child| tree.text(child).to_string())
}

fn same_row_loop_parts(tree: &SyntaxTree, id: NodeId) -> Option<(NodeId, NodeId)> {
    let variable = tree.child_of_kind(id, "identifier")?;
    let in_keyword = tree.child_of_kind(id, "in")?;
    let in_row = tree.node(in_keyword).end().row;
    let iterable = tree.children(id).iter().copied().find(|child| {
        let node = tree.node(*child);
        node.kind() == "call" && node.start().row == in_row
    })?;
    Some((variable, iterable))
}

fn structural_loop_parts(tree: &SyntaxTree, id: NodeId) -> Option<(NodeId, NodeId)> {
    let variable = tree
        .child_by_field_name(id, "left")
        .filter(|left| tree.kind(*left) == "identifier")?;
    let iterable = tree.child_by_field_name(id, "right")?;
    Some((variable, iterable))
}
