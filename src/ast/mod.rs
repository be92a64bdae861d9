use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::LineRange;

mod context;
mod languages;
mod parser;
mod tree;
mod validity;

pub use context::{
    is_nested_function, ConstructKind, EnclosingContext, EnclosingContextResolver,
    ForIterableRule, ResolverOptions,
};
pub use languages::SUPPORTED_LANGUAGES;
pub use parser::{build_syntax_tree, Grammar, ParseError};
pub use tree::{NodeId, NodeInit, Position, SyntaxNode, SyntaxTree, SyntaxTreeBuilder};
pub use validity::{check_tree, check_validity, ErrorPosition, ValidityResult, SYNTAX_ERROR_MESSAGE};

/// Contract shared by language parsers used for hunk attribution.
pub trait SourceParser {
    fn find_enclosing_context(&self, content: &str, range: LineRange) -> Option<EnclosingContext>;

    fn dry_run(&self, content: &str) -> ValidityResult;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    pub language: String,
    #[serde(flatten)]
    pub resolver: ResolverOptions,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            resolver: ResolverOptions::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SourceAnalyzer {
    grammar: Grammar,
    resolver: EnclosingContextResolver,
}

impl SourceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ParseError> {
        Ok(Self {
            grammar: Grammar::resolve(&config.language)?,
            resolver: EnclosingContextResolver::new(config.resolver),
        })
    }

    pub fn python() -> Self {
        Self {
            grammar: Grammar::python(),
            resolver: EnclosingContextResolver::default(),
        }
    }

    pub fn language(&self) -> &str {
        self.grammar.label()
    }

    pub fn parse(&self, content: &str) -> Result<SyntaxTree, ParseError> {
        self.grammar.parse(content)
    }

    /// Resolves each range against a single parse of `content`. A failed
    /// parse yields `None` for every range.
    pub fn find_enclosing_contexts(
        &self,
        content: &str,
        ranges: &[LineRange],
    ) -> Vec<Option<EnclosingContext>> {
        match self.parse(content) {
            Ok(tree) => self.resolver.resolve_many(&tree, ranges),
            Err(error) => {
                warn!(language = self.language(), %error, "enclosing context parse failed");
                vec![None; ranges.len()]
            }
        }
    }
}

impl SourceParser for SourceAnalyzer {
    fn find_enclosing_context(&self, content: &str, range: LineRange) -> Option<EnclosingContext> {
        match self.parse(content) {
            Ok(tree) => self.resolver.resolve(&tree, range),
            Err(error) => {
                warn!(language = self.language(), %error, "enclosing context parse failed");
                None
            }
        }
    }

    fn dry_run(&self, content: &str) -> ValidityResult {
        check_validity(&self.grammar, content)
    }
}
