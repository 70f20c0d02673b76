//! 工具参数结构与 JSON Schema（schemars 自动生成）
//!
//! Schema 作为工具声明的 parameters 发给远端 agent，减少参数格式错误。

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

/// Query delegated to a specialist agent
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct QueryArgs {
    /// Full question for the downstream agent
    #[serde(default)]
    pub query: String,
}

/// Entities to ground, grouped by kind, or free text
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GroundFactsArgs {
    /// Unit names, e.g. ["Yasuo", "Garen"]
    #[serde(default)]
    pub units: Vec<String>,
    /// Item names, e.g. ["Infinity Edge"]
    #[serde(default)]
    pub items: Vec<String>,
    /// Trait names, e.g. ["Sorcerer"]
    #[serde(default)]
    pub traits: Vec<String>,
    /// Free text to ground when no entity lists are given
    #[serde(default)]
    pub text: Option<String>,
}

impl GroundFactsArgs {
    /// 合并为一段查询文本：优先 text，否则按 units / items / traits 顺序拼接实体名
    pub fn query_text(&self) -> String {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return text.to_string();
        }
        self.units
            .iter()
            .chain(&self.items)
            .chain(&self.traits)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 参数解析：形状不符时回退默认值
pub fn parse_args<T>(args: Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    serde_json::from_value(args).unwrap_or_default()
}

pub fn query_args_schema() -> Value {
    serde_json::to_value(schema_for!(QueryArgs)).unwrap_or(Value::Null)
}

pub fn ground_facts_args_schema() -> Value {
    serde_json::to_value(schema_for!(GroundFactsArgs)).unwrap_or(Value::Null)
}
