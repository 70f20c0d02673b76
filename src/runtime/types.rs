//! 远端 Agent Runtime 的领域类型：thread / run / 工具调用请求与输出

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(ThreadId);
id_type!(RunId);
id_type!(AgentId);

/// run 状态：queued → in_progress → (requires_action ⇄ in_progress)* → completed | failed
///
/// cancelling / cancelled / expired / incomplete 为远端额外可能返回的状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
}

impl RunStatus {
    /// 需要继续轮询
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次待应答的工具调用请求（远端发出后不可变）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    /// 原始 JSON 参数串
    pub arguments: String,
}

impl ToolInvocation {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// JSON 解析参数；空串或解析失败时为空对象
    pub fn parsed_arguments(&self) -> Value {
        if self.arguments.trim().is_empty() {
            return Value::Object(Default::default());
        }
        serde_json::from_str(&self.arguments).unwrap_or_else(|e| {
            tracing::debug!(call_id = %self.call_id, error = %e, "tool arguments not valid JSON, using {{}}");
            Value::Object(Default::default())
        })
    }
}

/// 对某个 call id 的应答
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(rename = "tool_call_id")]
    pub call_id: String,
    pub output: String,
}

impl ToolOutput {
    pub fn new(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}

/// 一次 run 的快照
#[derive(Clone, Debug)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub agent_id: AgentId,
    pub status: RunStatus,
    /// 仅 requires_action 时非空
    pub pending_tool_calls: Vec<ToolInvocation>,
    pub last_error: Option<String>,
}

/// thread 中消息的作者
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Agent,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Agent => "assistant",
        }
    }
}

/// 工具声明（名称、描述、参数 schema），供远端规划使用
#[derive(Clone, Debug, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 创建远端 agent 所需的定义
#[derive(Clone, Debug)]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}
