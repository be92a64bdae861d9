mod ast;

pub use ast::{
    build_syntax_tree, check_tree, check_validity, is_nested_function, AnalyzerConfig,
    ConstructKind, EnclosingContext, EnclosingContextResolver, ErrorPosition, ForIterableRule,
    Grammar, NodeId, NodeInit, ParseError, Position, ResolverOptions, SourceAnalyzer,
    SourceParser, SyntaxNode, SyntaxTree, SyntaxTreeBuilder, ValidityResult,
    SUPPORTED_LANGUAGES, SYNTAX_ERROR_MESSAGE,
};

use napi::bindgen_prelude::Result as NapiResult;
use napi_derive::napi;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// Types
// =============================================================================

/// 1-indexed, inclusive line span. Callers keep `start <= end`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[napi(object)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

static PYTHON_ANALYZER: Lazy<SourceAnalyzer> = Lazy::new(SourceAnalyzer::python);

// =============================================================================
// Helpers
// =============================================================================

fn to_napi_error(error: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(error.to_string())
}

fn parse_input<T: DeserializeOwned>(value: Value, label: &str) -> NapiResult<T> {
    serde_json::from_value(value).map_err(|error| to_napi_error(format!("Invalid {label}: {error}")))
}

fn analyzer_for(language: Option<String>) -> NapiResult<SourceAnalyzer> {
    match language {
        Some(language) => SourceAnalyzer::new(AnalyzerConfig {
            language,
            ..AnalyzerConfig::default()
        })
        .map_err(to_napi_error),
        None => Ok(PYTHON_ANALYZER.clone()),
    }
}

fn enclosing_context_envelope(context: Option<EnclosingContext>) -> NapiResult<Value> {
    let context = serde_json::to_value(context).map_err(to_napi_error)?;
    Ok(json!({ "enclosingContext": context }))
}

// =============================================================================
// Bindings
// =============================================================================

#[napi(js_name = "PythonParser")]
pub struct PythonParserBinding {
    analyzer: SourceAnalyzer,
}

#[napi]
impl PythonParserBinding {
    #[napi(constructor)]
    pub fn new(options: Option<Value>) -> napi::Result<Self> {
        let resolver = match options {
            Some(value) => parse_input::<ResolverOptions>(value, "parser options")?,
            None => ResolverOptions::default(),
        };
        let analyzer = SourceAnalyzer::new(AnalyzerConfig {
            resolver,
            ..AnalyzerConfig::default()
        })
        .map_err(to_napi_error)?;
        Ok(Self { analyzer })
    }

    /// Returns `{ enclosingContext }`, where the context is `null` when no
    /// construct contains the lines.
    #[napi(js_name = "findEnclosingContext")]
    pub fn find_enclosing_context(
        &self,
        file: String,
        line_start: u32,
        line_end: u32,
    ) -> NapiResult<Value> {
        let range = LineRange {
            start: line_start,
            end: line_end,
        };
        enclosing_context_envelope(self.analyzer.find_enclosing_context(&file, range))
    }

    #[napi(js_name = "findEnclosingContexts")]
    pub fn find_enclosing_contexts(&self, file: String, ranges: Vec<LineRange>) -> NapiResult<Value> {
        let contexts = self.analyzer.find_enclosing_contexts(&file, &ranges);
        serde_json::to_value(contexts).map_err(to_napi_error)
    }

    #[napi(js_name = "dryRun")]
    pub fn dry_run(&self, file: String) -> NapiResult<Value> {
        serde_json::to_value(self.analyzer.dry_run(&file)).map_err(to_napi_error)
    }
}

#[napi(js_name = "findEnclosingContext")]
pub fn find_enclosing_context(
    content: String,
    language: Option<String>,
    line_start: u32,
    line_end: u32,
) -> NapiResult<Value> {
    let analyzer = analyzer_for(language)?;
    let range = LineRange {
        start: line_start,
        end: line_end,
    };
    enclosing_context_envelope(analyzer.find_enclosing_context(&content, range))
}

#[napi(js_name = "dryRun")]
pub fn dry_run(content: String, language: Option<String>) -> NapiResult<Value> {
    let analyzer = analyzer_for(language)?;
    serde_json::to_value(analyzer.dry_run(&content)).map_err(to_napi_error)
}

#[napi(js_name = "supportedLanguages")]
pub fn supported_languages() -> Vec<String> {
    SUPPORTED_LANGUAGES.iter().map(|label| label.to_string()).collect()
}

// =============================================================================
// Tests
// =============================================================================
