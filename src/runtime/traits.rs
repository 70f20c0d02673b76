//! 远端 Agent Runtime 抽象
//!
//! Driver 只依赖这里的操作：建 thread、追加消息、建 run、查 run、提交工具输出、读最后一条 agent 消息。
//! create_agent / cancel_run 为可选操作，默认不支持 / 空操作。

use async_trait::async_trait;

use crate::core::AgentError;
use crate::runtime::{AgentDefinition, AgentId, MessageRole, Run, RunId, ThreadId, ToolOutput};

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn create_thread(&self) -> Result<ThreadId, AgentError>;

    async fn append_message(
        &self,
        thread: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AgentError>;

    async fn create_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<Run, AgentError>;

    async fn get_run(&self, thread: &ThreadId, run: &RunId) -> Result<Run, AgentError>;

    /// 一次性提交整批输出（协议不支持部分提交）
    async fn submit_tool_outputs(
        &self,
        thread: &ThreadId,
        run: &RunId,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run, AgentError>;

    /// thread 中该角色最近一条消息的文本
    async fn last_message_text(
        &self,
        thread: &ThreadId,
        role: MessageRole,
    ) -> Result<Option<String>, AgentError>;

    async fn cancel_run(&self, _thread: &ThreadId, _run: &RunId) -> Result<(), AgentError> {
        Ok(())
    }

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentId, AgentError> {
        Err(AgentError::Config(format!(
            "runtime cannot create agent '{}'; configure its id",
            definition.name
        )))
    }
}
