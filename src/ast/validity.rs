use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::{Grammar, ParseError};
use super::tree::SyntaxTree;

pub const SYNTAX_ERROR_MESSAGE: &str = "Syntax errors detected";

/// Location of the first error node: 1-indexed line, 0-indexed column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPosition {
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityResult {
    pub valid: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_position: Option<ErrorPosition>,
}

impl ValidityResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: String::new(),
            error_position: None,
        }
    }

    pub fn invalid(error: impl Into<String>, error_position: Option<ErrorPosition>) -> Self {
        Self {
            valid: false,
            error: error.into(),
            error_position,
        }
    }
}

impl From<ParseError> for ValidityResult {
    fn from(error: ParseError) -> Self {
        Self::invalid(error.to_string(), None)
    }
}

/// Judges an already-built tree. Any error or missing node invalidates it.
pub fn check_tree(tree: &SyntaxTree) -> ValidityResult {
    match tree.first_error(tree.root()) {
        Some(id) => {
            let start = tree.node(id).start();
            let position = ErrorPosition {
                line: start.row + 1,
                column: start.column,
            };
            debug!(line = position.line, column = position.column, "syntax error found");
            ValidityResult::invalid(SYNTAX_ERROR_MESSAGE, Some(position))
        }
        None => ValidityResult::valid(),
    }
}

/// Parses `content` only to report whether it is free of syntax errors.
pub fn check_validity(grammar: &Grammar, content: &str) -> ValidityResult {
    match grammar.parse(content) {
        Ok(tree) => check_tree(&tree),
        Err(error) => {
            debug!(language = grammar.label(), %error, "dry run parse failed");
            error.into()
        }
    }
}
