//! Prompt construction

use std::collections::HashMap;
use std::fmt::Write as _;

const SYSTEM_PROMPT: &str = "You are a professional Vietnamese localizer specializing in Chinese wuxia MMORPG games, specifically 剑侠世界2 (Jianxia World 2).

Rules:
1. Translate Simplified Chinese to Vietnamese.
2. Use correct wuxia terminology from the provided knowledge graph context.
3. Preserve ALL placeholders like {{var_1}}, {{var_2}}, etc. — copy them exactly as-is into your translation.
4. Preserve ALL formatting, syntax, and special characters.
5. Output ONLY the Vietnamese translation, nothing else.
6. Do NOT add explanations, notes, or extra text.
7. If a term has a standard wuxia Vietnamese translation, always use it.
8. Maintain the same tone and register as the original.
9. For game UI text, keep it concise and natural in Vietnamese.";

/// Builds system and user prompts for translation requests.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// The fixed system prompt.
    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// Single-item user prompt with retrieval context prepended.
    pub fn build_user_prompt(&self, text: &str, context: &str) -> String {
        let mut out = String::new();
        if !context.is_empty() {
            out.push_str(context);
        }
        let _ = write!(out, "Text to translate:\n{}", text);
        out
    }

    /// Batch user prompt: terminology header, then a numbered item list with
    /// the `|||` delimiter protocol.
    pub fn build_batch_user_prompt(
        &self,
        texts: &[String],
        terminology: &HashMap<String, String>,
    ) -> String {
        let mut out = String::new();

        if !terminology.is_empty() {
            out.push_str("=== Terminology Reference ===\n");
            for (zh, vi) in terminology {
                let _ = writeln!(out, "• {} → {}", zh, vi);
            }
            out.push('\n');
        }

        out.push_str(
            "Translate each text below. Return ONLY the translations, separated by ||| delimiter, in the same order.\n\n",
        );
        for (i, t) in texts.iter().enumerate() {
            let _ = writeln!(out, "[{}] {}", i + 1, t);
        }

        out
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_the_sentinel() {
        let pb = PromptBuilder::new();
        assert!(pb.system_prompt().contains("{{var_1}}"));
        assert!(pb.system_prompt().contains("Vietnamese"));
    }

    #[test]
    fn test_user_prompt_with_context() {
        let pb = PromptBuilder::new();
        let prompt = pb.build_user_prompt("获得{{var_1}}金币", "=== ctx ===\n");
        assert!(prompt.starts_with("=== ctx ===\n"));
        assert!(prompt.ends_with("Text to translate:\n获得{{var_1}}金币"));
    }

    #[test]
    fn test_batch_prompt_numbering_and_terms() {
        let pb = PromptBuilder::new();
        let mut terms = HashMap::new();
        terms.insert("技能".to_string(), "Kỹ năng".to_string());
        let texts = vec!["技能升级".to_string(), "装备强化".to_string()];

        let prompt = pb.build_batch_user_prompt(&texts, &terms);
        assert!(prompt.contains("=== Terminology Reference ===\n• 技能 → Kỹ năng\n"));
        assert!(prompt.contains("[1] 技能升级\n"));
        assert!(prompt.contains("[2] 装备强化\n"));
        assert!(prompt.contains("|||"));
    }

    #[test]
    fn test_batch_prompt_without_terms_omits_header() {
        let pb = PromptBuilder::new();
        let prompt = pb.build_batch_user_prompt(&["文本".to_string()], &HashMap::new());
        assert!(!prompt.contains("Terminology Reference"));
        assert!(prompt.starts_with("Translate each text below."));
    }
}
