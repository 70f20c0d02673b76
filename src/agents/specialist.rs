//! 专家 agent：角色元数据 + 绑定到远端 agent id 的 Run Driver

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::agents::prompts;
use crate::config::AgentsSection;
use crate::driver::AgentRunDriver;
use crate::runtime::AgentId;
use crate::tools::ToolName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Orchestrator,
    PatchNotes,
    Stats,
    Grounding,
}

impl AgentRole {
    pub const SPECIALISTS: [AgentRole; 3] = [AgentRole::PatchNotes, AgentRole::Stats, AgentRole::Grounding];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "orchestrator",
            AgentRole::PatchNotes => "patch_notes",
            AgentRole::Stats => "stats",
            AgentRole::Grounding => "grounding",
        }
    }

    /// 面向模型的称呼
    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "orchestrator agent",
            AgentRole::PatchNotes => "patch notes agent",
            AgentRole::Stats => "stats agent",
            AgentRole::Grounding => "grounding agent",
        }
    }

    /// 远端创建时使用的名称
    pub fn remote_name(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "tft-orchestrator",
            AgentRole::PatchNotes => "patch-notes-agent",
            AgentRole::Stats => "tactics-tools-agent",
            AgentRole::Grounding => "grounding-agent",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => prompts::ORCHESTRATOR_PROMPT,
            AgentRole::PatchNotes => prompts::PATCH_NOTES_PROMPT,
            AgentRole::Stats => prompts::STATS_PROMPT,
            AgentRole::Grounding => prompts::GROUNDING_PROMPT,
        }
    }

    pub fn prompt_prefix(&self) -> &'static str {
        match self {
            AgentRole::Orchestrator => "",
            AgentRole::PatchNotes => prompts::PATCH_NOTES_PREFIX,
            AgentRole::Stats => prompts::STATS_PREFIX,
            AgentRole::Grounding => prompts::GROUNDING_PREFIX,
        }
    }

    /// 编排器调用该专家所用的工具名
    pub fn delegate_tool(&self) -> Option<ToolName> {
        match self {
            AgentRole::Orchestrator => None,
            AgentRole::PatchNotes => Some(ToolName::PatchNotesAgent),
            AgentRole::Stats => Some(ToolName::StatsAgent),
            AgentRole::Grounding => Some(ToolName::GroundingAgent),
        }
    }

    pub fn configured_id<'a>(&self, cfg: &'a AgentsSection) -> Option<&'a str> {
        let id = match self {
            AgentRole::Orchestrator => &cfg.orchestrator_id,
            AgentRole::PatchNotes => &cfg.patch_notes_id,
            AgentRole::Stats => &cfg.stats_id,
            AgentRole::Grounding => &cfg.grounding_id,
        };
        id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 远端 agent 的本地句柄
pub struct SpecialistAgent {
    role: AgentRole,
    id: AgentId,
    driver: AgentRunDriver,
}

impl SpecialistAgent {
    pub fn new(role: AgentRole, id: AgentId, driver: AgentRunDriver) -> Self {
        Self { role, id, driver }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// 加上角色前缀后跑一次 run；失败或未完成时返回空文本
    pub async fn ask(&self, query: &str, cancel: CancellationToken) -> String {
        let message = format!("{}{}", self.role.prompt_prefix(), query);
        tracing::info!(agent = %self.role, id = %self.id, "calling agent");
        let answer = self.driver.run_text(&self.id, &message, cancel).await;
        if answer.trim().is_empty() {
            tracing::warn!(agent = %self.role, "agent returned no answer");
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_id_ignores_blank() {
        let cfg = AgentsSection {
            stats_id: Some("  ".into()),
            grounding_id: Some("asst_g".into()),
            ..AgentsSection::default()
        };
        assert_eq!(AgentRole::Stats.configured_id(&cfg), None);
        assert_eq!(AgentRole::Grounding.configured_id(&cfg), Some("asst_g"));
    }

    #[test]
    fn test_delegate_tools() {
        assert_eq!(AgentRole::Orchestrator.delegate_tool(), None);
        let tools: Vec<_> = AgentRole::SPECIALISTS.iter().filter_map(|r| r.delegate_tool()).collect();
        assert_eq!(
            tools,
            vec![ToolName::PatchNotesAgent, ToolName::StatsAgent, ToolName::GroundingAgent]
        );
    }
}
