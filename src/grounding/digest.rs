//! Digest 格式：每条事实一行 `[kind] name: description`，统一置于 "Retrieved facts:" 标题下

use crate::knowledge::Fact;

pub const DIGEST_HEADER: &str = "Retrieved facts:";

pub fn format_fact(fact: &Fact) -> String {
    match &fact.name {
        Some(name) => format!("[{}] {}: {}", fact.kind, name, fact.description()),
        None => format!("[{}] {}", fact.kind, fact.description()),
    }
}

/// 无事实时返回 None
pub fn build_digest(facts: &[Fact]) -> Option<String> {
    if facts.is_empty() {
        return None;
    }
    let lines: Vec<String> = facts.iter().map(format_fact).collect();
    Some(format!("{DIGEST_HEADER}\n{}", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{FactKind, SearchHit};
    use serde_json::json;

    fn fact(kind: FactKind, fields: serde_json::Value) -> Fact {
        let hit = SearchHit {
            fields: fields.as_object().cloned().unwrap_or_default(),
            ..SearchHit::default()
        };
        Fact::from_hit(kind, &hit)
    }

    #[test]
    fn test_format_named_and_unnamed() {
        let named = fact(FactKind::Unit, json!({"name": "Yasuo", "description": "4-cost duelist"}));
        assert_eq!(format_fact(&named), "[unit] Yasuo: 4-cost duelist");

        let unnamed = fact(FactKind::Item, json!({"chunk": "Grants crit"}));
        assert_eq!(format_fact(&unnamed), "[item] {\"chunk\":\"Grants crit\"}");
    }

    #[test]
    fn test_build_digest() {
        assert!(build_digest(&[]).is_none());
        let facts = vec![
            fact(FactKind::Unit, json!({"name": "Yasuo", "description": "a"})),
            fact(FactKind::Trait, json!({"name": "Duelist", "description": "b"})),
        ];
        assert_eq!(
            build_digest(&facts).unwrap(),
            "Retrieved facts:\n[unit] Yasuo: a\n[trait] Duelist: b"
        );
    }
}
