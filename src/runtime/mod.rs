//! 远端 Agent Runtime：领域类型、抽象、HTTP 实现与脚本化内存实现

pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

pub use http::HttpAgentRuntime;
pub use mock::{RunScript, ScriptedPoll, ScriptedReply, ScriptedRuntime};
pub use traits::AgentRuntime;
pub use types::{
    AgentDefinition, AgentId, MessageRole, Run, RunId, RunStatus, ThreadId, ToolDefinition,
    ToolInvocation, ToolOutput,
};
