//! File-format parsers
//!
//! Each format exposes the same three operations: extension matching,
//! extraction of translatable strings, and lossless reconstruction with a
//! translation map substituted in place. Reconstruction joins lines with
//! `\n` and appends a trailing `\n`; everything that was not translated is
//! preserved byte for byte.

mod ini;
mod lua;
mod txt;

pub use ini::IniParser;
pub use lua::LuaParser;
pub use txt::TxtParser;

use crate::error::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// A translatable string extracted from a game file.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// The original translatable string.
    pub text: String,
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 0-based column for tab-separated files (-1 if not applicable).
    pub column: i32,
    /// Additional context (function name, section, etc.), sorted by key.
    pub context: BTreeMap<String, String>,
}

/// Parsing output for a single file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Absolute path of the parsed file.
    pub file_path: String,
    /// Detected type: lua, ini, txt, or tsv.
    pub file_type: String,
    /// Extracted translatable strings, in document order.
    pub texts: Vec<ExtractedText>,
    /// Original lines kept verbatim for reconstruction.
    pub raw_lines: Vec<String>,
}

/// Common interface for all file format parsers.
pub trait Parser: Send + Sync {
    /// Returns true if this parser handles the given extension (".lua" etc).
    fn can_parse(&self, ext: &str) -> bool;

    /// Extracts translatable strings from a file.
    fn parse(&self, path: &Path) -> Result<ParseResult>;

    /// Rebuilds the file contents with translated strings substituted.
    fn reconstruct(
        &self,
        result: &ParseResult,
        translations: &HashMap<String, String>,
    ) -> Result<Vec<u8>>;
}

/// The default parser set, in binding order.
pub fn default_parsers() -> Vec<Arc<dyn Parser>> {
    vec![
        Arc::new(LuaParser),
        Arc::new(IniParser),
        Arc::new(TxtParser),
    ]
}

/// Joins raw lines with LF and a trailing LF, the normalised output form.
pub(crate) fn join_lines(lines: &[String]) -> Vec<u8> {
    let mut out = lines.join("\n");
    out.push('\n');
    out.into_bytes()
}

/// Reads a file into lines, assuming UTF-8.
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}
