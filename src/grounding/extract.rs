//! 启发式实体抽取
//!
//! 两条规则：连续的首字母大写单词组成的短语（"Dragon Knight"），
//! 以及长度 ≥ 3、以大写开头的内部大写词（"ChoGath"）。

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*",
            r"\b[A-Z][A-Za-z0-9]{2,}\b",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// 抽取候选实体；没有任何候选时返回 `{text}`
pub fn extract_entities(text: &str) -> BTreeSet<String> {
    let mut candidates: BTreeSet<String> = patterns()
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().trim())
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect();
    if candidates.is_empty() {
        candidates.insert(text.to_string());
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_phrases() {
        let c = extract_entities("is Dragon Knight better than Infinity Edge on carries?");
        assert!(c.contains("Dragon Knight"));
        assert!(c.contains("Infinity Edge"));
        assert!(!c.contains("carries"));
    }

    #[test]
    fn test_internal_caps_token() {
        let c = extract_entities("how strong is ChoGath now");
        assert!(c.contains("ChoGath"));
        assert!(c.contains("Cho"));
        assert!(c.contains("Gath"));
    }

    #[test]
    fn test_all_caps_abbreviation() {
        let c = extract_entities("build IE and BT");
        assert!(!c.contains("BT"));
        assert!(!c.contains("IE"));
        let c = extract_entities("DCAP on ap carries");
        assert!(c.contains("DCAP"));
    }

    #[test]
    fn test_fallback_to_whole_text() {
        for text in ["asdf qwer", "", "lowercase only 123", "a b c"] {
            let c = extract_entities(text);
            assert_eq!(c.len(), 1);
            assert!(c.contains(text));
        }
    }

    #[test]
    fn test_single_letter_capital_dropped() {
        let c = extract_entities("I think so");
        assert_eq!(c.into_iter().collect::<Vec<_>>(), vec!["I think so".to_string()]);
    }
}
