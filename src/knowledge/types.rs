//! 知识索引的结构化命中：Fact 与其去重键

use std::fmt;

use serde_json::{Map, Value};

use crate::knowledge::SearchHit;

/// 三类知识索引
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactKind {
    Unit,
    Item,
    Trait,
}

impl FactKind {
    pub const ALL: [FactKind; 3] = [FactKind::Unit, FactKind::Item, FactKind::Trait];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Unit => "unit",
            FactKind::Item => "item",
            FactKind::Trait => "trait",
        }
    }

    /// 该类索引投影保留的字段
    pub fn projected_fields(&self) -> &'static [&'static str] {
        match self {
            FactKind::Unit => &["name", "tier", "trait_ids", "trait_names", "chunk"],
            FactKind::Item => &["name", "tier", "components", "chunk"],
            FactKind::Trait => &["name", "breakpoints", "chunk"],
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 描述类字段，存在时优先作为 digest 行的描述
const DESCRIPTION_FIELDS: [&str; 2] = ["description", "desc"];

/// 一条结构化事实：类别、名称与按类别投影后的字段（含 chunk 与语义摘要 caption）
#[derive(Clone, Debug, PartialEq)]
pub struct Fact {
    pub kind: FactKind,
    pub name: Option<String>,
    pub payload: Map<String, Value>,
}

/// 事实身份：(kind, 小写名称)；无名称时退化为 chunk 或整段 payload
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FactKey {
    pub kind: FactKind,
    pub ident: String,
}

impl Fact {
    /// 按类别投影原始命中，丢弃空值
    pub fn from_hit(kind: FactKind, hit: &SearchHit) -> Self {
        let mut payload = Map::new();
        for field in kind.projected_fields().iter().chain(DESCRIPTION_FIELDS.iter()) {
            if let Some(v) = hit.fields.get(*field).filter(|v| !v.is_null()) {
                payload.insert((*field).to_string(), v.clone());
            }
        }
        if let Some(caption) = hit.caption.as_deref().filter(|c| !c.trim().is_empty()) {
            payload.insert("caption".to_string(), Value::String(caption.to_string()));
        }
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        Self {
            kind,
            name,
            payload,
        }
    }

    pub fn key(&self) -> FactKey {
        let ident = match (&self.name, self.chunk()) {
            (Some(name), _) => name.to_lowercase(),
            (None, Some(chunk)) => format!("chunk:{chunk}"),
            (None, None) => format!("payload:{}", Value::Object(self.payload.clone())),
        };
        FactKey {
            kind: self.kind,
            ident,
        }
    }

    pub fn chunk(&self) -> Option<&str> {
        self.payload.get("chunk").and_then(Value::as_str)
    }

    /// description / desc 字段，否则为投影 payload 的紧凑 JSON
    pub fn description(&self) -> String {
        DESCRIPTION_FIELDS
            .iter()
            .filter_map(|f| self.payload.get(*f).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Value::Object(self.payload.clone()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(fields: Value, caption: Option<&str>) -> SearchHit {
        SearchHit {
            fields: fields.as_object().cloned().unwrap_or_default(),
            score: Some(1.0),
            caption: caption.map(String::from),
        }
    }

    #[test]
    fn test_projection_keeps_kind_fields_only() {
        let h = hit(
            json!({"name": "Infinity Edge", "tier": 3, "components": ["B.F. Sword", "Sparring Gloves"],
                   "trait_ids": ["x"], "text_vector": [0.1, 0.2], "chunk": "Crit damage"}),
            None,
        );
        let fact = Fact::from_hit(FactKind::Item, &h);
        assert_eq!(fact.name.as_deref(), Some("Infinity Edge"));
        assert!(fact.payload.contains_key("components"));
        assert!(!fact.payload.contains_key("trait_ids"));
        assert!(!fact.payload.contains_key("text_vector"));
        assert_eq!(fact.payload.get("tier"), Some(&json!(3)));
    }

    #[test]
    fn test_description_prefers_description_field() {
        let h = hit(json!({"name": "Sorcerer", "description": "Grants AP"}), None);
        assert_eq!(Fact::from_hit(FactKind::Trait, &h).description(), "Grants AP");

        let h = hit(json!({"name": "Sorcerer", "breakpoints": [2, 4]}), Some("Sorcerers gain AP"));
        let desc = Fact::from_hit(FactKind::Trait, &h).description();
        assert!(desc.contains("\"breakpoints\":[2,4]"));
        assert!(desc.contains("Sorcerers gain AP"));
    }

    #[test]
    fn test_key_is_case_insensitive_name() {
        let a = Fact::from_hit(FactKind::Unit, &hit(json!({"name": "Yasuo"}), None));
        let b = Fact::from_hit(FactKind::Unit, &hit(json!({"name": "yasuo", "tier": 4}), None));
        let c = Fact::from_hit(FactKind::Trait, &hit(json!({"name": "Yasuo"}), None));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_unnamed_fact_keys_on_chunk() {
        let f = Fact::from_hit(FactKind::Unit, &hit(json!({"name": "  ", "chunk": "abc"}), None));
        assert!(f.name.is_none());
        assert_eq!(f.key().ident, "chunk:abc");
    }
}
