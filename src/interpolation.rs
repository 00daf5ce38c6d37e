//! Interpolation-variable protection
//!
//! Game strings carry placeholder tokens (`%d`, `{0}`, `${name}`) that a
//! translation model will happily mangle. Before a string is sent out, every
//! recognised token is swapped for a neutral `{{var_N}}` sentinel; after the
//! translation comes back, the sentinels are swapped back in order.

use regex::Regex;
use std::sync::LazyLock;

/// One protected token: the original text, its sentinel, and its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub original: String,
    pub placeholder: String,
    pub index: usize,
}

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap(), // ${value}
        Regex::new(r"\{[0-9]+\}").unwrap(),                   // {0}, {1}
        Regex::new(r"%[-+0-9]*\.?[0-9]*[dsfieEgGxXoubcpq]").unwrap(), // %d, %s, %2d, ...
        Regex::new(r"%%").unwrap(),                           // escaped percent literal
    ]
});

/// Replaces all interpolation variables with `{{var_N}}` sentinels.
/// Returns the safe string and the mappings needed to restore it.
pub fn protect(text: &str) -> (String, Vec<Mapping>) {
    let mut matches: Vec<(usize, usize)> = Vec::new();
    for pattern in PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            matches.push((m.start(), m.end()));
        }
    }

    if matches.is_empty() {
        return (text.to_string(), Vec::new());
    }

    // By start position, longest first on ties.
    matches.sort_by(|a, b| a.0.cmp(&b.0).then((b.1 - b.0).cmp(&(a.1 - a.0))));

    // Drop anything that starts before the previously accepted match ends.
    let mut filtered: Vec<(usize, usize)> = Vec::new();
    let mut last_end = 0usize;
    for (start, end) in matches {
        if filtered.is_empty() || start >= last_end {
            filtered.push((start, end));
            last_end = end;
        }
    }

    let mut mappings = Vec::with_capacity(filtered.len());
    let mut result = text.to_string();
    // Replace right to left so earlier byte offsets stay valid.
    for (i, &(start, end)) in filtered.iter().enumerate().rev() {
        let placeholder = format!("{{{{var_{}}}}}", i + 1);
        mappings.insert(
            0,
            Mapping {
                original: text[start..end].to_string(),
                placeholder: placeholder.clone(),
                index: i + 1,
            },
        );
        result.replace_range(start..end, &placeholder);
    }

    (result, mappings)
}

/// Replaces `{{var_N}}` sentinels back with the original tokens, consuming
/// one occurrence per mapping. Sentinels the model duplicated or renumbered
/// are left in place so the defect stays visible.
pub fn restore(translated: &str, mappings: &[Mapping]) -> String {
    let mut result = translated.to_string();
    for m in mappings {
        result = result.replacen(&m.placeholder, &m.original, 1);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_format_specifier() {
        let (safe, mappings) = protect("获得%d金币");
        assert_eq!(safe, "获得{{var_1}}金币");
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].original, "%d");
        assert_eq!(mappings[0].placeholder, "{{var_1}}");
        assert_eq!(mappings[0].index, 1);
    }

    #[test]
    fn test_protect_orders_left_to_right() {
        let (safe, mappings) = protect("${name}获得{0}个%s");
        assert_eq!(safe, "{{var_1}}获得{{var_2}}个{{var_3}}");
        assert_eq!(mappings[0].original, "${name}");
        assert_eq!(mappings[1].original, "{0}");
        assert_eq!(mappings[2].original, "%s");
    }

    #[test]
    fn test_protect_no_tokens() {
        let (safe, mappings) = protect("获得经验");
        assert_eq!(safe, "获得经验");
        assert!(mappings.is_empty());
    }

    #[test]
    fn test_protect_escaped_percent() {
        let (safe, mappings) = protect("增加10%%伤害");
        assert_eq!(safe, "增加10{{var_1}}伤害");
        assert_eq!(mappings[0].original, "%%");
    }

    #[test]
    fn test_restore_round_trip() {
        for text in [
            "获得%d金币",
            "${player}对%s造成{0}点伤害",
            "纯文本无变量",
            "%.2f秒后冷却",
        ] {
            let (safe, mappings) = protect(text);
            assert_eq!(restore(&safe, &mappings), text, "round trip for {}", text);
        }
    }

    #[test]
    fn test_restore_leaves_unknown_sentinels() {
        let (safe, mappings) = protect("获得%d金币");
        // Model duplicated the sentinel; the second occurrence must survive.
        let mangled = safe.replace("{{var_1}}", "{{var_1}}{{var_1}}");
        let restored = restore(&mangled, &mappings);
        assert_eq!(restored, "获得%d{{var_1}}金币");
    }

    #[test]
    fn test_restore_drops_missing_original() {
        let (_, mappings) = protect("获得%d金币");
        // Model dropped the sentinel entirely: nothing to restore, no panic.
        assert_eq!(restore("Nhận được vàng", &mappings), "Nhận được vàng");
    }
}
