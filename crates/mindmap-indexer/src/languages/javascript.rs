//! JavaScript language extractor using tree-sitter
//!
//! The JavaScript grammar parses JSX natively, so `.js`, `.jsx`, `.mjs` and
//! `.cjs` all share one dialect.

use std::path::PathBuf;

use anyhow::Result;

use super::{ecmascript, FileExtraction, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct JavaScriptExtractor {
    parser_pool: ParserPool,
}

impl JavaScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn extract(&self, rel_path: &str, source: &str) -> Result<FileExtraction> {
        let request = ParseRequest {
            file_type: FileType::JavaScript,
            content: source.to_string(),
            path: PathBuf::from(rel_path),
        };

        let parse_result = self.parser_pool.parse_blocking(request)?;
        Ok(ecmascript::extract(&parse_result.tree, &parse_result.content, rel_path))
    }
}
