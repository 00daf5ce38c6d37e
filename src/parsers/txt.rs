//! Plain-text and tab-separated game data parser
//!
//! A .txt file is sampled to decide whether it is a tab-separated table
//! (most game data dumps are). TSV rows translate per-column; plain text
//! translates per-line.

use super::{join_lines, read_lines, ExtractedText, ParseResult, Parser};
use crate::error::Result;
use crate::textutil;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub struct TxtParser;

impl Parser for TxtParser {
    fn can_parse(&self, ext: &str) -> bool {
        ext == ".txt"
    }

    fn parse(&self, path: &Path) -> Result<ParseResult> {
        let raw_lines = read_lines(path)?;
        let file_path = path.to_string_lossy().to_string();

        let is_tsv = detect_tsv(&raw_lines);

        let mut result = ParseResult {
            file_path: file_path.clone(),
            file_type: if is_tsv { "tsv" } else { "txt" }.to_string(),
            texts: Vec::new(),
            raw_lines,
        };

        if is_tsv {
            parse_tsv(&mut result, &file_path);
        } else {
            parse_plain(&mut result, &file_path);
        }

        Ok(result)
    }

    fn reconstruct(
        &self,
        result: &ParseResult,
        translations: &HashMap<String, String>,
    ) -> Result<Vec<u8>> {
        let mut lines = result.raw_lines.clone();

        if result.file_type == "tsv" {
            for et in &result.texts {
                let idx = et.line - 1;
                if idx >= lines.len() {
                    continue;
                }
                let Some(translated) = translations.get(&et.text) else {
                    continue;
                };
                let mut cols: Vec<&str> = lines[idx].split('\t').collect();
                let col = et.column as usize;
                if et.column >= 0 && col < cols.len() {
                    cols[col] = translated;
                    lines[idx] = cols.join("\t");
                }
            }
        } else {
            for et in &result.texts {
                let idx = et.line - 1;
                if idx >= lines.len() {
                    continue;
                }
                let Some(translated) = translations.get(&et.text) else {
                    continue;
                };
                let trimmed = lines[idx].trim().to_string();
                lines[idx] = lines[idx].replacen(&trimmed, translated, 1);
            }
        }

        Ok(join_lines(&lines))
    }
}

/// Samples up to the first 20 lines; the file is TSV when more than 60% of
/// the non-empty sampled lines share the same positive tab count.
pub fn detect_tsv(lines: &[String]) -> bool {
    if lines.len() < 2 {
        return false;
    }

    let mut tab_counts: HashMap<usize, usize> = HashMap::new();
    let mut non_empty = 0usize;

    for line in lines.iter().take(20) {
        if line.trim().is_empty() {
            continue;
        }
        non_empty += 1;
        let count = line.matches('\t').count();
        if count > 0 {
            *tab_counts.entry(count).or_insert(0) += 1;
        }
    }

    if non_empty == 0 {
        return false;
    }

    let max_count = tab_counts.values().copied().max().unwrap_or(0);
    max_count as f64 / non_empty as f64 > 0.6
}

fn parse_tsv(result: &mut ParseResult, file_path: &str) {
    for (idx, line) in result.raw_lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let cols: Vec<&str> = line.split('\t').collect();
        for (col_idx, col) in cols.iter().enumerate() {
            if !is_translatable_column(col) {
                continue;
            }

            let mut context = BTreeMap::new();
            context.insert("file".to_string(), file_path.to_string());
            context.insert("format".to_string(), "tsv".to_string());
            if col_idx > 0 {
                context.insert("id".to_string(), cols[0].to_string());
            }

            result.texts.push(ExtractedText {
                text: col.to_string(),
                file: file_path.to_string(),
                line: idx + 1,
                column: col_idx as i32,
                context,
            });
        }
    }
}

fn parse_plain(result: &mut ParseResult, file_path: &str) {
    for (idx, line) in result.raw_lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || !textutil::contains_han(trimmed) {
            continue;
        }

        let mut context = BTreeMap::new();
        context.insert("file".to_string(), file_path.to_string());
        context.insert("format".to_string(), "txt".to_string());

        result.texts.push(ExtractedText {
            text: trimmed.to_string(),
            file: file_path.to_string(),
            line: idx + 1,
            column: -1,
            context,
        });
    }
}

/// A TSV column is worth translating when it holds human-readable Chinese:
/// at least one Han character, any non-ASCII rune, and two or more runes
/// (single characters are usually codes).
fn is_translatable_column(col: &str) -> bool {
    if col.is_empty() || !textutil::contains_han(col) {
        return false;
    }
    if col.chars().all(|c| c.is_ascii()) {
        return false;
    }
    col.chars().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_str(content: &str) -> ParseResult {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        TxtParser.parse(file.path()).unwrap()
    }

    #[test]
    fn test_detect_tsv_consistent_tabs() {
        let lines = vec![
            "1001\treward\t获得经验".to_string(),
            "1002\treward_gold\t获得%d金币".to_string(),
        ];
        assert!(detect_tsv(&lines));
    }

    #[test]
    fn test_detect_tsv_no_tabs() {
        let lines = vec!["第一行".to_string(), "第二行".to_string()];
        assert!(!detect_tsv(&lines));
    }

    #[test]
    fn test_detect_tsv_single_line() {
        let lines = vec!["1001\t获得经验".to_string()];
        assert!(!detect_tsv(&lines));
    }

    #[test]
    fn test_tsv_extracts_only_translatable_columns() {
        let result = parse_str("1001\treward\t获得经验\n1002\treward_gold\t获得%d金币\n");
        assert_eq!(result.file_type, "tsv");
        assert_eq!(result.texts.len(), 2);
        assert_eq!(result.texts[0].text, "获得经验");
        assert_eq!(result.texts[0].column, 2);
        assert_eq!(
            result.texts[0].context.get("id").map(String::as_str),
            Some("1001")
        );
        assert_eq!(result.texts[1].text, "获得%d金币");
    }

    #[test]
    fn test_tsv_reconstruct_preserves_other_columns() {
        let result = parse_str("1001\treward\t获得经验\n1002\treward_gold\t获得%d金币\n");
        let mut translations = HashMap::new();
        translations.insert("获得经验".to_string(), "Nhận được Kinh nghiệm".to_string());
        translations.insert("获得%d金币".to_string(), "Nhận được %d vàng".to_string());
        let bytes = TxtParser.reconstruct(&result, &translations).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "1001\treward\tNhận được Kinh nghiệm\n1002\treward_gold\tNhận được %d vàng\n"
        );
    }

    #[test]
    fn test_plain_mode_extracts_trimmed_lines() {
        let result = parse_str("  任务完成  \nplain ascii line\n\n门派公告\n");
        assert_eq!(result.file_type, "txt");
        assert_eq!(result.texts.len(), 2);
        assert_eq!(result.texts[0].text, "任务完成");
        assert_eq!(result.texts[1].text, "门派公告");
    }

    #[test]
    fn test_plain_reconstruct_preserves_surrounding_whitespace() {
        let result = parse_str("  任务完成  \n");
        let mut translations = HashMap::new();
        translations.insert("任务完成".to_string(), "Nhiệm vụ hoàn thành".to_string());
        let bytes = TxtParser.reconstruct(&result, &translations).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "  Nhiệm vụ hoàn thành  \n"
        );
    }

    #[test]
    fn test_reconstruct_empty_map_is_identity() {
        let content = "1001\treward\t获得经验\n1002\treward_gold\t获得金币";
        let result = parse_str(content);
        let bytes = TxtParser.reconstruct(&result, &HashMap::new()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "1001\treward\t获得经验\n1002\treward_gold\t获得金币\n"
        );
    }

    #[test]
    fn test_column_translatability_rules() {
        assert!(is_translatable_column("获得经验"));
        assert!(!is_translatable_column("1001"));
        assert!(!is_translatable_column(""));
        // Single Han character: too short to be prose.
        assert!(!is_translatable_column("气"));
    }
}
