//! Lua script parser
//!
//! Extracts quoted string literals that contain Han characters, skipping
//! comments. The enclosing call expression's identifier path is captured as
//! function context when it precedes the literal on the same line.

use super::{join_lines, read_lines, ExtractedText, ParseResult, Parser};
use crate::error::Result;
use crate::textutil;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

/// Double- or single-quoted literals with standard escape handling.
static LUA_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\\]*(?:\\.[^"\\]*)*)"|'([^'\\]*(?:\\.[^'\\]*)*)'"#).unwrap()
});

/// Identifier dotted/colon path directly before an opening parenthesis at
/// the end of the prefix span.
static LUA_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_.:]*)\s*\($").unwrap());

static MULTILINE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--\[=*\[").unwrap());
static MULTILINE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]=*\]").unwrap());

pub struct LuaParser;

impl Parser for LuaParser {
    fn can_parse(&self, ext: &str) -> bool {
        ext == ".lua"
    }

    fn parse(&self, path: &Path) -> Result<ParseResult> {
        let raw_lines = read_lines(path)?;
        let file_path = path.to_string_lossy().to_string();

        let mut texts = Vec::new();
        let mut in_multiline_comment = false;

        for (idx, line) in raw_lines.iter().enumerate() {
            let line_num = idx + 1;

            if in_multiline_comment {
                if MULTILINE_CLOSE.is_match(line) {
                    in_multiline_comment = false;
                }
                continue;
            }

            if MULTILINE_OPEN.is_match(line) {
                if !MULTILINE_CLOSE.is_match(line) {
                    in_multiline_comment = true;
                }
                continue;
            }

            // Strip a single-line comment unless "--" sits inside a string.
            let mut code_part: &str = line;
            if let Some(pos) = line.find("--") {
                if !is_inside_string(line, pos) {
                    code_part = &line[..pos];
                }
            }

            for caps in LUA_STRING.captures_iter(code_part) {
                let (text, full) = match (caps.get(1), caps.get(2)) {
                    (Some(m), _) => (m.as_str(), caps.get(0).unwrap()),
                    (_, Some(m)) => (m.as_str(), caps.get(0).unwrap()),
                    _ => continue,
                };

                if text.is_empty() || !textutil::contains_han(text) {
                    continue;
                }

                let mut context = BTreeMap::new();
                context.insert("file".to_string(), file_path.clone());
                let prefix = &code_part[..full.start()];
                if let Some(fn_caps) = LUA_FUNC.captures(prefix) {
                    context.insert("function".to_string(), fn_caps[1].to_string());
                }

                texts.push(ExtractedText {
                    text: text.to_string(),
                    file: file_path.clone(),
                    line: line_num,
                    column: -1,
                    context,
                });
            }
        }

        Ok(ParseResult {
            file_path,
            file_type: "lua".to_string(),
            texts,
            raw_lines,
        })
    }

    fn reconstruct(
        &self,
        result: &ParseResult,
        translations: &HashMap<String, String>,
    ) -> Result<Vec<u8>> {
        let mut lines = result.raw_lines.clone();

        for et in &result.texts {
            let idx = et.line - 1;
            if idx >= lines.len() {
                continue;
            }
            if let Some(translated) = translations.get(&et.text) {
                lines[idx] = lines[idx].replacen(&et.text, translated, 1);
            }
        }

        Ok(join_lines(&lines))
    }
}

/// Checks whether byte position `idx` lies inside a string literal.
fn is_inside_string(line: &str, idx: usize) -> bool {
    let bytes = line.as_bytes();
    let mut in_double = false;
    let mut in_single = false;
    let mut i = 0;
    while i < idx {
        match bytes[i] {
            b'\\' => i += 1, // skip escaped char
            b'"' if !in_single => in_double = !in_double,
            b'\'' if !in_double => in_single = !in_single,
            _ => {}
        }
        i += 1;
    }
    in_double || in_single
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_str(content: &str) -> ParseResult {
        let mut file = NamedTempFile::with_suffix(".lua").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        LuaParser.parse(file.path()).unwrap()
    }

    #[test]
    fn test_extracts_literal_with_function_context() {
        let result = parse_str(r#"UI.ShowMessage("获得%d金币")"#);
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "获得%d金币");
        assert_eq!(
            result.texts[0].context.get("function").map(String::as_str),
            Some("UI.ShowMessage")
        );
        assert_eq!(result.texts[0].line, 1);
    }

    #[test]
    fn test_skips_non_chinese_literals() {
        let result = parse_str(r#"print("hello") print('获得经验')"#);
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "获得经验");
        assert_eq!(
            result.texts[0].context.get("function").map(String::as_str),
            Some("print")
        );
    }

    #[test]
    fn test_skips_single_line_comments() {
        let result = parse_str("-- print(\"获得经验\")\nlocal s = \"技能升级\" -- \"注释里\"\n");
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "技能升级");
        assert_eq!(result.texts[0].line, 2);
    }

    #[test]
    fn test_dashes_inside_string_are_not_comments() {
        let result = parse_str(r#"local s = "前--后获得经验""#);
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "前--后获得经验");
    }

    #[test]
    fn test_skips_multiline_comment_blocks() {
        let content = "--[[\nlocal a = \"获得经验\"\n]]\nlocal b = \"技能升级\"\n--[=[\n\"门派任务\"\n]=]\n";
        let result = parse_str(content);
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "技能升级");
    }

    #[test]
    fn test_reconstruct_replaces_in_place() {
        let result = parse_str(r#"UI.ShowMessage("获得%d金币")"#);
        let mut translations = HashMap::new();
        translations.insert("获得%d金币".to_string(), "Nhận được %d vàng".to_string());
        let bytes = LuaParser.reconstruct(&result, &translations).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "UI.ShowMessage(\"Nhận được %d vàng\")\n"
        );
    }

    #[test]
    fn test_reconstruct_empty_map_is_identity() {
        let content = "local a = 1\nUI.Show(\"获得经验\")\n-- tail comment";
        let result = parse_str(content);
        let bytes = LuaParser.reconstruct(&result, &HashMap::new()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "local a = 1\nUI.Show(\"获得经验\")\n-- tail comment\n"
        );
    }
}
