//! ground_facts：把实体名或文本交给 Grounding Engine，返回事实摘要

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::grounding::{GroundingEngine, SeenFacts};
use crate::tools::schema::{ground_facts_args_schema, parse_args, GroundFactsArgs};
use crate::tools::{Tool, ToolName};

pub const NO_GROUNDED_FACTS: &str = "No grounded facts found.";

pub struct GroundFactsTool {
    engine: Arc<GroundingEngine>,
    seen: Arc<SeenFacts>,
}

impl GroundFactsTool {
    pub fn new(engine: Arc<GroundingEngine>, seen: Arc<SeenFacts>) -> Self {
        Self { engine, seen }
    }
}

#[async_trait]
impl Tool for GroundFactsTool {
    fn name(&self) -> ToolName {
        ToolName::GroundFacts
    }

    fn description(&self) -> &str {
        "Look up authoritative facts about TFT units, items and traits. Pass entity names grouped by kind, or free text."
    }

    fn parameters_schema(&self) -> Value {
        ground_facts_args_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: GroundFactsArgs = parse_args(args);
        let text = args.query_text();
        if text.is_empty() {
            return Err("ground_facts needs units, items, traits or text".to_string());
        }
        let result = self.engine.ground(&text, Some(self.seen.as_ref())).await;
        Ok(result.digest.unwrap_or_else(|| NO_GROUNDED_FACTS.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{IndexNames, KnowledgeClient, StaticSearchBackend};
    use serde_json::json;

    fn tool() -> GroundFactsTool {
        let backend = StaticSearchBackend::new()
            .with_doc("items", json!({"name": "Infinity Edge", "description": "crit damage"}));
        let client = KnowledgeClient::new(Arc::new(backend), IndexNames::new("units", "items", "traits"));
        GroundFactsTool::new(
            Arc::new(GroundingEngine::new(Arc::new(client))),
            Arc::new(SeenFacts::new()),
        )
    }

    #[tokio::test]
    async fn test_digest_then_seen() {
        let tool = tool();
        let out = tool.execute(json!({"items": ["Infinity Edge"]})).await.unwrap();
        assert_eq!(out, "Retrieved facts:\n[item] Infinity Edge: crit damage");
        // 同一会话再次查询：已呈现过的事实不再输出
        let again = tool.execute(json!({"items": ["Infinity Edge"]})).await.unwrap();
        assert_eq!(again, NO_GROUNDED_FACTS);
    }

    #[tokio::test]
    async fn test_empty_args_rejected() {
        assert!(tool().execute(json!({})).await.is_err());
    }
}
