//! 编排器侧的委派工具：patch_notes_agent / stats_agent / grounding_agent
//!
//! 把 `{query}` 交给对应专家 agent，回答记入本轮上下文；专家无回答时返回明确的说明文本。
//! 专家 run 在独立任务中执行并持有本轮令牌的子令牌；调用方（如执行器超时）丢弃本调用时子令牌被取消，
//! 由专家的 Run Driver 完成远端取消。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agents::{Consultation, SpecialistAgent, TurnContext};
use crate::tools::schema::{parse_args, query_args_schema, QueryArgs};
use crate::tools::{Tool, ToolName};

pub struct AgentTool {
    name: ToolName,
    description: String,
    agent: Arc<SpecialistAgent>,
    turn: Arc<TurnContext>,
}

impl AgentTool {
    /// 工具名取自专家角色；编排器角色没有对应工具
    pub fn new(agent: Arc<SpecialistAgent>, turn: Arc<TurnContext>) -> Option<Self> {
        let role = agent.role();
        let name = role.delegate_tool()?;
        let description = match name {
            ToolName::PatchNotesAgent => {
                "Ask the patch notes agent about balance changes and wording in the latest official patch notes."
            }
            ToolName::StatsAgent => {
                "Ask the stats agent for live unit, item and trait statistics."
            }
            _ => "Ask the grounding agent for verified facts about units, items and traits named in the query.",
        };
        Some(Self {
            name,
            description: description.to_string(),
            agent,
            turn,
        })
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> ToolName {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        query_args_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let QueryArgs { query } = parse_args(args);
        let query = query.trim();
        if query.is_empty() {
            return Err(format!("{} needs a non-empty query", self.name));
        }
        let role = self.agent.role();
        let cancel = self.turn.cancel_token().child_token();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let agent = self.agent.clone();
        let message = query.to_string();
        let answer = match tokio::spawn(async move { agent.ask(&message, cancel).await }).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(agent = %role, error = %e, "delegated run task failed");
                String::new()
            }
        };
        self.turn.record(Consultation {
            role,
            query: query.to_string(),
            answer: answer.clone(),
        });
        if answer.trim().is_empty() {
            Ok(format!("The {} could not answer this query.", role.label()))
        } else {
            Ok(answer)
        }
    }
}
