//! 应用构建器：从配置装配 runtime、知识客户端、各专家 agent 与编排器

use std::sync::Arc;

use crate::agents::{AgentCatalog, AgentRole, Orchestrator, SpecialistAgent, TurnContext};
use crate::config::AppConfig;
use crate::core::{AgentError, TaskScheduler};
use crate::driver::{AgentRunDriver, PollPolicy};
use crate::grounding::{GroundingEngine, SeenFacts};
use crate::knowledge::KnowledgeClient;
use crate::runtime::{AgentRuntime, HttpAgentRuntime};
use crate::tools::{
    AgentTool, GetCompStatsTool, GetGeneralStatsTool, GetPatchNotesTool, GroundFactsTool,
    PatchNotesSource, StatsSource, ToolExecutor, ToolRegistry,
};

pub struct AppBuilder {
    config: AppConfig,
    runtime: Option<Arc<dyn AgentRuntime>>,
    knowledge: Option<KnowledgeClient>,
}

impl AppBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            runtime: None,
            knowledge: None,
        }
    }

    /// 替换远端 runtime（默认按 [runtime] 段构建 HTTP 客户端）
    pub fn with_runtime(mut self, runtime: Arc<dyn AgentRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// 替换知识客户端（默认按 [search] 段构建 Azure AI Search 客户端）
    pub fn with_knowledge(mut self, knowledge: KnowledgeClient) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    fn driver(
        &self,
        runtime: &Arc<dyn AgentRuntime>,
        scheduler: &TaskScheduler,
        registry: ToolRegistry,
        tool_timeout_secs: u64,
    ) -> AgentRunDriver {
        let executor = ToolExecutor::new(registry, tool_timeout_secs);
        AgentRunDriver::new(runtime.clone(), executor)
            .with_policy(PollPolicy::from_config(&self.config.polling))
            .with_scheduler(scheduler.clone())
            .with_unknown_tool_policy(self.config.tools.unknown_tool_policy)
    }

    /// 缺少必需配置时立即返回 Config 错误；缺少 agent id 时在远端创建
    pub async fn build(self) -> Result<Orchestrator, AgentError> {
        let runtime: Arc<dyn AgentRuntime> = match &self.runtime {
            Some(r) => r.clone(),
            None => Arc::new(HttpAgentRuntime::from_config(&self.config.runtime)?),
        };
        let knowledge = match &self.knowledge {
            Some(k) => k.clone(),
            None => KnowledgeClient::from_config(&self.config.search)?,
        };
        let patch_notes = Arc::new(PatchNotesSource::from_config(&self.config.sources)?);
        let stats = Arc::new(StatsSource::from_config(&self.config.sources)?);

        let scheduler = TaskScheduler::new(self.config.tools.max_concurrent_tools);
        let tool_timeout = self.config.tools.tool_timeout_secs;
        let catalog = AgentCatalog::new(runtime.clone(), self.config.agents.clone());
        let engine = Arc::new(GroundingEngine::new(Arc::new(knowledge)));
        let seen = Arc::new(SeenFacts::new());
        let turn = Arc::new(TurnContext::new());

        let mut orchestrator_tools = ToolRegistry::new();
        for role in AgentRole::SPECIALISTS {
            let registry = match role {
                AgentRole::PatchNotes => ToolRegistry::new().with(GetPatchNotesTool::new(patch_notes.clone())),
                AgentRole::Stats => ToolRegistry::new()
                    .with(GetGeneralStatsTool::new(stats.clone()))
                    .with(GetCompStatsTool::new(stats.clone())),
                _ => ToolRegistry::new().with(GroundFactsTool::new(engine.clone(), seen.clone())),
            };
            let id = catalog.resolve(role, registry.definitions()).await?;
            let agent = SpecialistAgent::new(role, id, self.driver(&runtime, &scheduler, registry, tool_timeout));
            if let Some(tool) = AgentTool::new(Arc::new(agent), turn.clone()) {
                orchestrator_tools.register(tool);
            }
        }

        let id = catalog
            .resolve(AgentRole::Orchestrator, orchestrator_tools.definitions())
            .await?;
        let agent = SpecialistAgent::new(
            AgentRole::Orchestrator,
            id,
            self.driver(
                &runtime,
                &scheduler,
                orchestrator_tools,
                delegate_timeout_secs(&self.config),
            ),
        );
        tracing::info!("orchestrator ready");
        Ok(Orchestrator::new(
            agent,
            engine,
            seen,
            turn,
            self.config.app.max_context_turns,
        ))
    }
}

/// 委派工具的超时：专家 run 自身时限之外再留一次工具调用的余量，使专家的时限先生效
fn delegate_timeout_secs(config: &AppConfig) -> u64 {
    config
        .polling
        .deadline_secs
        .max(1)
        .saturating_add(config.tools.tool_timeout_secs.max(1))
}
