use thiserror::Error;
use tree_sitter::{Language, LanguageError, Node, Parser, Tree};

use super::languages;
use super::tree::{NodeInit, Position, SyntaxTree, SyntaxTreeBuilder};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("incompatible grammar: {0}")]
    IncompatibleGrammar(#[from] LanguageError),
    #[error("parser produced no tree")]
    NoTree,
}

/// Immutable grammar handle. A fresh `Parser` is built for every parse, so
/// one `Grammar` can be shared across threads.
#[derive(Clone)]
pub struct Grammar {
    label: String,
    language: Language,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar").field("label", &self.label).finish()
    }
}

impl Grammar {
    pub fn resolve(label: &str) -> Result<Self, ParseError> {
        let language = languages::resolve_language(label)
            .ok_or_else(|| ParseError::UnsupportedLanguage(label.trim().to_string()))?;
        Ok(Self {
            label: label.trim().to_lowercase(),
            language,
        })
    }

    pub fn python() -> Self {
        Self {
            label: "python".to_string(),
            language: tree_sitter_python::language(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parse_content(&self, content: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(self.language)?;
        parser.parse(content, None).ok_or(ParseError::NoTree)
    }

    pub fn parse(&self, content: &str) -> Result<SyntaxTree, ParseError> {
        let tree = self.parse_content(content)?;
        Ok(build_syntax_tree(&tree, content))
    }
}

/// Copies a tree-sitter tree into an owned arena, keeping field names.
pub fn build_syntax_tree(tree: &Tree, source: &str) -> SyntaxTree {
    let mut cursor = tree.walk();
    let mut builder = SyntaxTreeBuilder::new(source, node_init(cursor.node(), None));
    let mut path = vec![builder.root()];

    loop {
        if cursor.goto_first_child() {
            let parent = *path.last().unwrap_or(&builder.root());
            let id = builder.push(parent, node_init(cursor.node(), cursor.field_name()));
            path.push(id);
            continue;
        }

        loop {
            path.pop();
            if cursor.goto_next_sibling() {
                let parent = *path.last().unwrap_or(&builder.root());
                let id = builder.push(parent, node_init(cursor.node(), cursor.field_name()));
                path.push(id);
                break;
            }
            if !cursor.goto_parent() {
                return builder.finish();
            }
        }
    }
}

fn node_init(node: Node, field: Option<&'static str>) -> NodeInit {
    let start = node.start_position();
    let end = node.end_position();
    NodeInit {
        kind: node.kind(),
        field,
        start: Position::new(start.row as u32, start.column as u32),
        end: Position::new(end.row as u32, end.column as u32),
        bytes: node.byte_range(),
        is_error: node.is_error(),
        is_missing: node.is_missing(),
    }
}
