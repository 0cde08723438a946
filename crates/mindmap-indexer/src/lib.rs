//! Source scanning: tree-sitter parsing, declaration extraction and import resolution

pub mod languages;
pub mod parser_pool;
pub mod resolve;
pub mod scanner;

#[cfg(test)]
pub mod test_utils;


pub use languages::{FileExtraction, LanguageExtractor};
pub use parser_pool::{create_parser_pool, FileType, ParseRequest, ParseResult, ParserPool};
pub use scanner::{ScanResult, SourceScanner};
