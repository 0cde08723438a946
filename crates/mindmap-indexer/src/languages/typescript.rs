//! TypeScript language extractor using tree-sitter

use std::path::PathBuf;

use anyhow::Result;

use super::{ecmascript, FileExtraction, LanguageExtractor};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};

pub struct TypeScriptExtractor {
    parser_pool: ParserPool,
}

impl TypeScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn extract(&self, rel_path: &str, source: &str) -> Result<FileExtraction> {
        // JSX is only legal in the TSX dialect
        let file_type = if rel_path.ends_with(".tsx") {
            FileType::Tsx
        } else {
            FileType::TypeScript
        };
        let request = ParseRequest {
            file_type,
            content: source.to_string(),
            path: PathBuf::from(rel_path),
        };

        let parse_result = self.parser_pool.parse_blocking(request)?;
        Ok(ecmascript::extract(&parse_result.tree, &parse_result.content, rel_path))
    }
}
