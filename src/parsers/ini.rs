//! INI/config file parser

use super::{join_lines, read_lines, ExtractedText, ParseResult, Parser};
use crate::error::Result;
use crate::textutil;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub struct IniParser;

impl Parser for IniParser {
    fn can_parse(&self, ext: &str) -> bool {
        ext == ".ini"
    }

    fn parse(&self, path: &Path) -> Result<ParseResult> {
        let raw_lines = read_lines(path)?;
        let file_path = path.to_string_lossy().to_string();

        let mut texts = Vec::new();
        let mut current_section = String::new();

        for (idx, line) in raw_lines.iter().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].to_string();
                continue;
            }

            let Some(eq_idx) = trimmed.find('=') else {
                continue;
            };

            let value = trimmed[eq_idx + 1..].trim();
            if value.is_empty() || !textutil::contains_han(value) {
                continue;
            }

            let key = trimmed[..eq_idx].trim();

            let mut context = BTreeMap::new();
            context.insert("file".to_string(), file_path.clone());
            context.insert("section".to_string(), current_section.clone());
            context.insert("key".to_string(), key.to_string());

            texts.push(ExtractedText {
                text: value.to_string(),
                file: file_path.clone(),
                line: idx + 1,
                column: -1,
                context,
            });
        }

        Ok(ParseResult {
            file_path,
            file_type: "ini".to_string(),
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
            let Some(translated) = translations.get(&et.text) else {
                continue;
            };

            let line = &lines[idx];
            let Some(eq_idx) = line.find('=') else {
                continue;
            };

            // Preserve the whitespace between '=' and the value.
            let after_eq = &line[eq_idx + 1..];
            let leading: String = after_eq
                .chars()
                .take_while(|&c| c == ' ' || c == '\t')
                .collect();

            lines[idx] = format!("{}{}{}", &line[..eq_idx + 1], leading, translated);
        }

        Ok(join_lines(&lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_str(content: &str) -> ParseResult {
        let mut file = NamedTempFile::with_suffix(".ini").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        IniParser.parse(file.path()).unwrap()
    }

    #[test]
    fn test_extracts_value_with_section_and_key() {
        let result = parse_str("[ui]\ngreeting =   欢迎来到江湖\n");
        assert_eq!(result.texts.len(), 1);
        let et = &result.texts[0];
        assert_eq!(et.text, "欢迎来到江湖");
        assert_eq!(et.context.get("section").map(String::as_str), Some("ui"));
        assert_eq!(et.context.get("key").map(String::as_str), Some("greeting"));
    }

    #[test]
    fn test_skips_comments_and_non_chinese() {
        let result = parse_str("; comment = 注释\n# another = 注释\nname = jianghu\ntitle = 江湖\n");
        assert_eq!(result.texts.len(), 1);
        assert_eq!(result.texts[0].text, "江湖");
    }

    #[test]
    fn test_reconstruct_preserves_whitespace_after_eq() {
        let result = parse_str("[ui]\ngreeting =   欢迎来到江湖\n");
        let mut translations = HashMap::new();
        translations.insert(
            "欢迎来到江湖".to_string(),
            "Chào mừng đến Giang hồ".to_string(),
        );
        let bytes = IniParser.reconstruct(&result, &translations).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "[ui]\ngreeting =   Chào mừng đến Giang hồ\n"
        );
    }

    #[test]
    fn test_reconstruct_empty_map_is_identity() {
        let content = "[skill]\n; 注释\nname = 真气护体\nlevel = 3";
        let result = parse_str(content);
        let bytes = IniParser.reconstruct(&result, &HashMap::new()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "[skill]\n; 注释\nname = 真气护体\nlevel = 3\n"
        );
    }
}
