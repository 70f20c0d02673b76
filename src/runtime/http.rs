//! Azure AI Foundry agents REST 客户端
//!
//! 端点形如 `https://<resource>.services.ai.azure.com/api/projects/<project>`，Bearer token 认证，
//! 每个请求带 `api-version` 查询参数。连接配置缺失时在构造时返回 Config 错误。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::RuntimeSection;
use crate::core::AgentError;
use crate::runtime::{
    AgentDefinition, AgentId, AgentRuntime, MessageRole, Run, RunId, RunStatus, ThreadId,
    ToolInvocation, ToolOutput,
};

/// 读取最后一条消息时向后翻看的条数
const MESSAGE_PAGE_SIZE: usize = 20;

pub struct HttpAgentRuntime {
    client: Client,
    endpoint: String,
    token: String,
    api_version: String,
}

#[derive(Deserialize)]
struct IdWire {
    id: String,
}

#[derive(Deserialize)]
struct RunWire {
    id: String,
    thread_id: String,
    assistant_id: String,
    status: RunStatus,
    #[serde(default)]
    required_action: Option<RequiredActionWire>,
    #[serde(default)]
    last_error: Option<LastErrorWire>,
}

#[derive(Deserialize)]
struct RequiredActionWire {
    #[serde(default)]
    submit_tool_outputs: Option<SubmitToolOutputsWire>,
}

#[derive(Deserialize)]
struct SubmitToolOutputsWire {
    #[serde(default)]
    tool_calls: Vec<ToolCallWire>,
}

#[derive(Deserialize)]
struct ToolCallWire {
    id: String,
    #[serde(default)]
    function: Option<FunctionWire>,
}

#[derive(Deserialize)]
struct FunctionWire {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct LastErrorWire {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageListWire {
    #[serde(default)]
    data: Vec<MessageWire>,
}

#[derive(Deserialize)]
struct MessageWire {
    role: String,
    #[serde(default)]
    content: Vec<ContentWire>,
}

#[derive(Deserialize)]
struct ContentWire {
    #[serde(default)]
    text: Option<TextWire>,
}

#[derive(Deserialize)]
struct TextWire {
    value: String,
}

impl From<RunWire> for Run {
    fn from(w: RunWire) -> Self {
        let pending_tool_calls = w
            .required_action
            .and_then(|a| a.submit_tool_outputs)
            .map(|s| {
                s.tool_calls
                    .into_iter()
                    .map(|c| {
                        let (name, arguments) = match c.function {
                            Some(f) => (f.name, f.arguments.unwrap_or_default()),
                            None => (String::new(), String::new()),
                        };
                        ToolInvocation::new(c.id, name, arguments)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let last_error = w.last_error.map(|e| {
            match (e.code, e.message) {
                (Some(code), Some(msg)) => format!("{code}: {msg}"),
                (Some(code), None) => code,
                (None, Some(msg)) => msg,
                (None, None) => "unknown error".to_string(),
            }
        });
        Run {
            id: RunId(w.id),
            thread_id: ThreadId(w.thread_id),
            agent_id: AgentId(w.assistant_id),
            status: w.status,
            pending_tool_calls,
            last_error,
        }
    }
}

impl HttpAgentRuntime {
    pub fn from_config(cfg: &RuntimeSection) -> Result<Self, AgentError> {
        let endpoint = cfg
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentError::Config("missing runtime.endpoint (AIPROJECT_ENDPOINT)".into()))?;
        let token = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentError::Config("missing runtime.api_key (AIPROJECT_TOKEN)".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            api_version: cfg.api_version.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(&[("api-version", self.api_version.as_str())])
    }

    fn post(&self, path: &str, body: serde_json::Value) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .query(&[("api-version", self.api_version.as_str())])
            .json(&body)
    }
}

/// 发送请求并解析 JSON；429/5xx 视为瞬时错误，其余非 2xx 视为协议错误
async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, AgentError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(300).collect();
        let msg = format!("HTTP {status}: {snippet}");
        return Err(if status.is_server_error() || status.as_u16() == 429 {
            AgentError::Transport(msg)
        } else {
            AgentError::Protocol(msg)
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| AgentError::Protocol(format!("decode response: {e}")))
}

#[async_trait]
impl AgentRuntime for HttpAgentRuntime {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let w: IdWire = send_json(self.post("threads", json!({}))).await?;
        Ok(ThreadId(w.id))
    }

    async fn append_message(
        &self,
        thread: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AgentError> {
        let body = json!({ "role": role.as_str(), "content": content });
        let _: IdWire = send_json(self.post(&format!("threads/{thread}/messages"), body)).await?;
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<Run, AgentError> {
        let body = json!({ "assistant_id": agent.as_str() });
        let w: RunWire = send_json(self.post(&format!("threads/{thread}/runs"), body)).await?;
        Ok(w.into())
    }

    async fn get_run(&self, thread: &ThreadId, run: &RunId) -> Result<Run, AgentError> {
        let w: RunWire = send_json(self.get(&format!("threads/{thread}/runs/{run}"))).await?;
        Ok(w.into())
    }

    async fn submit_tool_outputs(
        &self,
        thread: &ThreadId,
        run: &RunId,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run, AgentError> {
        let body = json!({ "tool_outputs": outputs });
        let w: RunWire = send_json(self.post(
            &format!("threads/{thread}/runs/{run}/submit_tool_outputs"),
            body,
        ))
        .await?;
        Ok(w.into())
    }

    async fn last_message_text(
        &self,
        thread: &ThreadId,
        role: MessageRole,
    ) -> Result<Option<String>, AgentError> {
        let limit = MESSAGE_PAGE_SIZE.to_string();
        let list: MessageListWire = send_json(
            self.get(&format!("threads/{thread}/messages"))
                .query(&[("order", "desc"), ("limit", limit.as_str())]),
        )
        .await?;
        Ok(list
            .data
            .into_iter()
            .find(|m| m.role == role.as_str())
            .map(|m| {
                m.content
                    .into_iter()
                    .filter_map(|c| c.text.map(|t| t.value))
                    .collect::<Vec<_>>()
                    .join("\n")
            }))
    }

    async fn cancel_run(&self, thread: &ThreadId, run: &RunId) -> Result<(), AgentError> {
        let _: RunWire =
            send_json(self.post(&format!("threads/{thread}/runs/{run}/cancel"), json!({}))).await?;
        Ok(())
    }

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentId, AgentError> {
        let tools: Vec<_> = definition
            .tools
            .iter()
            .map(|t| json!({ "type": "function", "function": t }))
            .collect();
        let body = json!({
            "model": definition.model,
            "name": definition.name,
            "instructions": definition.instructions,
            "tools": tools,
        });
        let w: IdWire = send_json(self.post("assistants", body)).await?;
        Ok(AgentId(w.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let cfg = RuntimeSection::default();
        assert!(matches!(
            HttpAgentRuntime::from_config(&cfg),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_run_wire_conversion() {
        let raw = r#"{
            "id": "run_1",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [
                        {"id": "call_a", "type": "function", "function": {"name": "get_patch_notes", "arguments": "{}"}},
                        {"id": "call_b", "type": "function", "function": {"name": "ground_facts", "arguments": null}}
                    ]
                }
            },
            "last_error": null
        }"#;
        let run: Run = serde_json::from_str::<RunWire>(raw).unwrap().into();
        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(run.pending_tool_calls.len(), 2);
        assert_eq!(run.pending_tool_calls[0].name, "get_patch_notes");
        assert_eq!(run.pending_tool_calls[1].arguments, "");
        assert!(run.last_error.is_none());
    }

    #[test]
    fn test_failed_run_error_text() {
        let raw = r#"{"id":"r","thread_id":"t","assistant_id":"a","status":"failed",
            "last_error":{"code":"rate_limit_exceeded","message":"slow down"}}"#;
        let run: Run = serde_json::from_str::<RunWire>(raw).unwrap().into();
        assert_eq!(run.last_error.as_deref(), Some("rate_limit_exceeded: slow down"));
    }

    #[test]
    fn test_url_join() {
        let cfg = RuntimeSection {
            endpoint: Some("https://example.test/api/projects/p/".into()),
            api_key: Some("tok".into()),
            ..RuntimeSection::default()
        };
        let rt = HttpAgentRuntime::from_config(&cfg).unwrap();
        assert_eq!(rt.url("threads"), "https://example.test/api/projects/p/threads");
    }
}
