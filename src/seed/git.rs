//! Git-diff seed mining
//!
//! Diffs two revisions of a folder with zero context, pairs the i-th
//! removed line with the i-th added line inside each hunk, and extracts a
//! pair per file format. Pairing is positional, not LCS-based: it matches
//! the common case of translators editing one line at a time and mis-pairs
//! reordered blocks.

use super::SeedEntry;
use crate::error::{Error, Result};
use crate::textutil;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

static LUA_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\\]*(?:\\.[^"\\]*)*)"|'([^'\\]*(?:\\.[^'\\]*)*)'"#).unwrap()
});

static LUA_FUNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_.:]*)\s*\(").unwrap());

const SUPPORTED_EXTS: [&str; 3] = [".lua", ".ini", ".txt"];

pub struct GitIngestor;

impl GitIngestor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts seed pairs by diffing two git refs for a folder.
    pub async fn ingest_from_git(
        &self,
        token: &CancellationToken,
        repo_root: &Path,
        commit_base: &str,
        commit_target: &str,
        folder: &str,
    ) -> Result<Vec<SeedEntry>> {
        let files = self
            .changed_files(repo_root, commit_base, commit_target, folder)
            .await?;

        info!(files = files.len(), "Found changed files in Git diff");

        let mut entries = Vec::new();

        for file in &files {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let ext = extension_of(file);
            if !SUPPORTED_EXTS.contains(&ext.as_str()) {
                continue;
            }

            match self
                .pairs_from_diff(repo_root, commit_base, commit_target, file, &ext)
                .await
            {
                Ok(pairs) => {
                    debug!(file, pairs = pairs.len(), "Extracted translation pairs");
                    entries.extend(pairs);
                }
                Err(e) => {
                    warn!(error = %e, file, "Failed to extract pairs from diff");
                }
            }
        }

        info!(total_pairs = entries.len(), "Git diff ingestion complete");
        Ok(entries)
    }

    async fn changed_files(
        &self,
        repo_root: &Path,
        commit_base: &str,
        commit_target: &str,
        folder: &str,
    ) -> Result<Vec<String>> {
        let output = run_git(
            repo_root,
            &["diff", "--name-only", commit_base, commit_target, "--", folder],
        )
        .await?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    async fn pairs_from_diff(
        &self,
        repo_root: &Path,
        commit_base: &str,
        commit_target: &str,
        file: &str,
        ext: &str,
    ) -> Result<Vec<SeedEntry>> {
        let output = run_git(
            repo_root,
            &["diff", "-U0", commit_base, commit_target, "--", file],
        )
        .await?;

        let mut entries = Vec::new();
        for hunk in parse_hunks(&output) {
            entries.extend(match_pairs(&hunk, ext, file));
        }
        Ok(entries)
    }
}

impl Default for GitIngestor {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| Error::Git(format!("spawn git: {}", e)))?;

    if !output.status.success() {
        return Err(Error::Git(format!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn extension_of(file: &str) -> String {
    Path::new(file)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Removed/added lines of a single diff hunk.
#[derive(Debug, Default)]
struct DiffHunk {
    removed: Vec<String>,
    added: Vec<String>,
}

/// Groups unified-diff output into hunks of removed/added lines.
fn parse_hunks(diff_output: &str) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut current = DiffHunk::default();
    let mut in_hunk = false;

    for line in diff_output.lines() {
        if line.starts_with("diff ")
            || line.starts_with("index ")
            || line.starts_with("--- ")
            || line.starts_with("+++ ")
        {
            continue;
        }

        if line.starts_with("@@") {
            if in_hunk && (!current.removed.is_empty() || !current.added.is_empty()) {
                hunks.push(std::mem::take(&mut current));
            }
            current = DiffHunk::default();
            in_hunk = true;
            continue;
        }

        if !in_hunk {
            continue;
        }

        if let Some(rest) = line.strip_prefix('-') {
            current.removed.push(rest.to_string());
        } else if let Some(rest) = line.strip_prefix('+') {
            current.added.push(rest.to_string());
        }
    }

    if in_hunk && (!current.removed.is_empty() || !current.added.is_empty()) {
        hunks.push(current);
    }

    hunks
}

/// Pairs the i-th removed line with the i-th added line; unpaired leftovers
/// are discarded.
fn match_pairs(hunk: &DiffHunk, ext: &str, file: &str) -> Vec<SeedEntry> {
    let pair_count = hunk.removed.len().min(hunk.added.len());
    let mut entries = Vec::new();

    for i in 0..pair_count {
        let (source, translated, function) =
            extract_text_pair(&hunk.removed[i], &hunk.added[i], ext);

        if source.is_empty() || translated.is_empty() || !textutil::contains_han(&source) {
            continue;
        }

        let entity_type = detect_entity_type(file, &function, &source);
        let hash = textutil::hash(&source);

        entries.push(SeedEntry {
            source_text: source,
            translated_text: translated,
            file: file.to_string(),
            function,
            entity_type,
            hash,
        });
    }

    entries
}

fn extract_text_pair(source: &str, translated: &str, ext: &str) -> (String, String, String) {
    match ext {
        ".lua" => extract_lua_pair(source, translated),
        ".ini" => extract_ini_pair(source, translated),
        ".txt" => extract_txt_pair(source, translated),
        _ => (
            source.trim().to_string(),
            translated.trim().to_string(),
            String::new(),
        ),
    }
}

fn first_literal(line: &str) -> Option<String> {
    let caps = LUA_STRING.captures(line)?;
    let text = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default();
    Some(text.to_string())
}

fn extract_lua_pair(source: &str, translated: &str) -> (String, String, String) {
    let (Some(src), Some(dst)) = (first_literal(source), first_literal(translated)) else {
        return (String::new(), String::new(), String::new());
    };

    let function = LUA_FUNC
        .captures(source)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    (src, dst, function)
}

fn extract_ini_pair(source: &str, translated: &str) -> (String, String, String) {
    let (Some((src_key, src_val)), Some((dst_key, dst_val))) =
        (source.split_once('='), translated.split_once('='))
    else {
        return (String::new(), String::new(), String::new());
    };

    if src_key.trim() != dst_key.trim() {
        return (String::new(), String::new(), String::new());
    }

    (
        src_val.trim().to_string(),
        dst_val.trim().to_string(),
        String::new(),
    )
}

fn extract_txt_pair(source: &str, translated: &str) -> (String, String, String) {
    let src_cols: Vec<&str> = source.split('\t').collect();
    let dst_cols: Vec<&str> = translated.split('\t').collect();

    if src_cols.len() != dst_cols.len() || src_cols.len() < 2 {
        return (String::new(), String::new(), String::new());
    }

    for (src, dst) in src_cols.iter().zip(&dst_cols) {
        if src != dst && textutil::contains_han(src) {
            return (src.to_string(), dst.to_string(), String::new());
        }
    }

    (String::new(), String::new(), String::new())
}

/// File/function name patterns, matched in alphabetical key order so that
/// inference is reproducible when several patterns apply.
const ENTITY_PATTERNS: &[(&str, &str)] = &[
    ("buff", "buff"),
    ("char", "character"),
    ("chat", "dialog"),
    ("dialog", "dialog"),
    ("equip", "item"),
    ("faction", "faction"),
    ("guild", "faction"),
    ("item", "item"),
    ("map", "location"),
    ("mount", "mount"),
    ("npc", "character"),
    ("pet", "pet"),
    ("quest", "quest"),
    ("scene", "location"),
    ("skill", "skill"),
    ("ui", "ui"),
    ("weapon", "item"),
];

/// Known wuxia terms to entity types, matched in declared order.
const TERM_ENTITY_MAP: &[(&str, &str)] = &[
    ("技能", "skill"),
    ("武功", "skill"),
    ("心法", "skill"),
    ("装备", "item"),
    ("丹药", "item"),
    ("秘籍", "item"),
    ("副本", "dungeon"),
    ("任务", "quest"),
    ("门派", "faction"),
    ("帮派", "faction"),
    ("坐骑", "mount"),
];

/// Infers a coarse entity type from file name, function name, or content.
fn detect_entity_type(file: &str, function: &str, text: &str) -> String {
    let file_lower = file.to_lowercase();
    let func_lower = function.to_lowercase();

    for (pattern, entity_type) in ENTITY_PATTERNS {
        if file_lower.contains(pattern) || func_lower.contains(pattern) {
            return entity_type.to_string();
        }
    }

    for (term, entity_type) in TERM_ENTITY_MAP {
        if text.contains(term) {
            return entity_type.to_string();
        }
    }

    "general".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "\
diff --git a/scripts/skill.lua b/scripts/skill.lua
index 1111111..2222222 100644
--- a/scripts/skill.lua
+++ b/scripts/skill.lua
@@ -10 +10 @@
-return \"获得真气\"
+return \"Nhận được Chân khí\"
@@ -20,2 +20,2 @@
-UI.Show(\"技能升级\")
-UI.Show(\"装备强化\")
+UI.Show(\"Kỹ năng nâng cấp\")
+UI.Show(\"Trang bị cường hóa\")
";

    #[test]
    fn test_parse_hunks_groups_by_marker() {
        let hunks = parse_hunks(DIFF);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].removed, vec!["return \"获得真气\""]);
        assert_eq!(hunks[0].added, vec!["return \"Nhận được Chân khí\""]);
        assert_eq!(hunks[1].removed.len(), 2);
        assert_eq!(hunks[1].added.len(), 2);
    }

    #[test]
    fn test_match_pairs_lua() {
        let hunks = parse_hunks(DIFF);
        let entries = match_pairs(&hunks[0], ".lua", "scripts/skill.lua");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_text, "获得真气");
        assert_eq!(entries[0].translated_text, "Nhận được Chân khí");
        assert_eq!(entries[0].entity_type, "skill");
        assert_eq!(entries[0].hash, textutil::hash("获得真气"));
    }

    #[test]
    fn test_match_pairs_discards_unpaired() {
        let hunk = DiffHunk {
            removed: vec!["a = \"甲\"".into(), "b = \"乙\"".into()],
            added: vec!["a = \"giáp\"".into()],
        };
        let entries = match_pairs(&hunk, ".ini", "cfg/ui.ini");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_text, "甲");
    }

    #[test]
    fn test_extract_lua_pair_with_function() {
        let (src, dst, func) =
            extract_lua_pair("UI.Show(\"技能升级\")", "UI.Show(\"Kỹ năng nâng cấp\")");
        assert_eq!(src, "技能升级");
        assert_eq!(dst, "Kỹ năng nâng cấp");
        assert_eq!(func, "UI.Show");
    }

    #[test]
    fn test_extract_ini_pair_requires_matching_keys() {
        let (src, dst, _) = extract_ini_pair("title = 江湖", "title = Giang hồ");
        assert_eq!(src, "江湖");
        assert_eq!(dst, "Giang hồ");

        let (src, _, _) = extract_ini_pair("title = 江湖", "name = Giang hồ");
        assert!(src.is_empty());
    }

    #[test]
    fn test_extract_txt_pair_finds_changed_chinese_column() {
        let (src, dst, _) = extract_txt_pair(
            "1001\treward\t获得经验",
            "1001\treward\tNhận được Kinh nghiệm",
        );
        assert_eq!(src, "获得经验");
        assert_eq!(dst, "Nhận được Kinh nghiệm");

        // Column counts must match.
        let (src, _, _) = extract_txt_pair("1001\t获得经验", "1001\tx\ty");
        assert!(src.is_empty());
    }

    #[test]
    fn test_detect_entity_type_file_pattern_first() {
        assert_eq!(detect_entity_type("data/skill_cfg.lua", "", "装备强化"), "skill");
        assert_eq!(detect_entity_type("data/misc.lua", "Equip.Use", "文本"), "item");
        // "char" sorts before "npc": both match, char wins.
        assert_eq!(detect_entity_type("npc_char.lua", "", "文本"), "character");
    }

    #[test]
    fn test_detect_entity_type_term_table_fallback() {
        assert_eq!(detect_entity_type("data/misc.txt", "", "进入副本"), "dungeon");
        assert_eq!(detect_entity_type("data/misc.txt", "", "修炼心法"), "skill");
        assert_eq!(detect_entity_type("data/misc.txt", "", "普通文本"), "general");
    }
}
