//! 角色到远端 agent id 的解析：优先配置，缺失时按定义在远端创建

use std::sync::Arc;

use crate::agents::AgentRole;
use crate::config::AgentsSection;
use crate::core::AgentError;
use crate::runtime::{AgentDefinition, AgentId, AgentRuntime, ToolDefinition};

pub struct AgentCatalog {
    runtime: Arc<dyn AgentRuntime>,
    config: AgentsSection,
}

impl AgentCatalog {
    pub fn new(runtime: Arc<dyn AgentRuntime>, config: AgentsSection) -> Self {
        Self { runtime, config }
    }

    pub fn definition(&self, role: AgentRole, tools: Vec<ToolDefinition>) -> AgentDefinition {
        AgentDefinition {
            name: role.remote_name().to_string(),
            model: self.config.model.clone(),
            instructions: role.instructions().to_string(),
            tools,
        }
    }

    pub async fn resolve(&self, role: AgentRole, tools: Vec<ToolDefinition>) -> Result<AgentId, AgentError> {
        if let Some(id) = role.configured_id(&self.config) {
            return Ok(AgentId::new(id));
        }
        let id = self.runtime.create_agent(&self.definition(role, tools)).await?;
        tracing::info!(
            role = %role,
            id = %id,
            "created remote agent; set agents.{}_id to reuse it",
            role.as_str()
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ScriptedRuntime;

    #[tokio::test]
    async fn test_configured_id_wins() {
        let runtime = Arc::new(ScriptedRuntime::new());
        let cfg = AgentsSection {
            stats_id: Some("asst_stats".into()),
            ..AgentsSection::default()
        };
        let catalog = AgentCatalog::new(runtime.clone(), cfg);
        let id = catalog.resolve(AgentRole::Stats, Vec::new()).await.unwrap();
        assert_eq!(id.as_str(), "asst_stats");
        assert!(runtime.created_agents().is_empty());
    }

    #[tokio::test]
    async fn test_missing_id_creates_agent() {
        let runtime = Arc::new(ScriptedRuntime::new());
        let catalog = AgentCatalog::new(runtime.clone(), AgentsSection::default());
        let id = catalog.resolve(AgentRole::Grounding, Vec::new()).await.unwrap();
        assert!(id.as_str().starts_with("asst_"));
        assert_eq!(runtime.created_agents(), vec!["grounding-agent".to_string()]);
    }

    #[test]
    fn test_definition_uses_role_prompt() {
        let catalog = AgentCatalog::new(Arc::new(ScriptedRuntime::new()), AgentsSection::default());
        let def = catalog.definition(AgentRole::PatchNotes, Vec::new());
        assert_eq!(def.model, "gpt-4o");
        assert!(def.instructions.contains("get_patch_notes"));
    }
}
