//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），由 ToolRegistry 按
//! ToolName 注册与查找。远端 run 报告的调用名先解析为封闭的 ToolName 集合，
//! 解析失败或本注册表未注册的名称一律归为 ToolDispatch::Unknown，由 UnknownToolPolicy 决定处理方式。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::runtime::ToolDefinition;

/// 系统内全部可声明的工具名
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolName {
    GetPatchNotes,
    GetGeneralStats,
    GetCompStats,
    GroundFacts,
    PatchNotesAgent,
    StatsAgent,
    GroundingAgent,
}

impl ToolName {
    pub const ALL: [ToolName; 7] = [
        ToolName::GetPatchNotes,
        ToolName::GetGeneralStats,
        ToolName::GetCompStats,
        ToolName::GroundFacts,
        ToolName::PatchNotesAgent,
        ToolName::StatsAgent,
        ToolName::GroundingAgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetPatchNotes => "get_patch_notes",
            ToolName::GetGeneralStats => "get_general_stats",
            ToolName::GetCompStats => "get_comp_stats",
            ToolName::GroundFacts => "ground_facts",
            ToolName::PatchNotesAgent => "patch_notes_agent",
            ToolName::StatsAgent => "stats_agent",
            ToolName::GroundingAgent => "grounding_agent",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 调用名解析结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolDispatch {
    Known(ToolName),
    Unknown(String),
}

/// 遇到未注册工具时的策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownToolPolicy {
    /// 为该 call id 提交错误输出，run 继续
    #[default]
    ErrorOutput,
    /// 取消 run 并返回 UnknownTool 错误
    AbortRun,
}

/// 工具 trait：名称、描述（供远端规划）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 返回的 Err 文本会作为工具输出交给远端 agent
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具注册表：按 ToolName 存储 Arc<dyn Tool>
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: ToolName) -> Option<Arc<dyn Tool>> {
        self.tools.get(&name).cloned()
    }

    /// 将远端报告的调用名解析为本注册表中的工具
    pub fn resolve(&self, raw: &str) -> ToolDispatch {
        match ToolName::parse(raw) {
            Some(name) if self.tools.contains_key(&name) => ToolDispatch::Known(name),
            _ => ToolDispatch::Unknown(raw.to_string()),
        }
    }

    pub async fn execute(&self, name: ToolName, args: Value) -> Result<String, String> {
        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(args).await
    }

    pub fn tool_names(&self) -> Vec<ToolName> {
        let mut names: Vec<_> = self.tools.keys().copied().collect();
        names.sort();
        names
    }

    /// 工具声明列表（按名称排序），用于创建远端 agent
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| self.tools.get(&name))
            .map(|tool| ToolDefinition {
                name: tool.name().as_str().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
