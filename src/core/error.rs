//! 错误类型
//!
//! 配置错误在客户端构造时立即返回；传输/轮询类错误由 Driver 与 Grounding Engine 降级处理，
//! 只有上限/取消/协议违规会终止一次 run。

use std::time::Duration;

use thiserror::Error;

/// 驱动远端 agent、执行工具、查询知识索引过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 缺少必需的连接/索引配置（构造时即失败）
    #[error("Config error: {0}")]
    Config(String),

    /// 网络/超时等瞬时错误
    #[error("Transport error: {0}")]
    Transport(String),

    /// 远端返回了无法解析或不符合约定的数据
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    /// run 请求了注册表之外的工具（AbortRun 策略下）
    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Run deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Run still pending after {0} polls")]
    PollLimitExceeded(usize),

    #[error("Run requested more than {0} tool rounds")]
    ToolRoundLimitExceeded(usize),

    #[error("Cancelled")]
    Cancelled,
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        AgentError::Transport(e.to_string())
    }
}

impl AgentError {
    /// 是否属于可继续轮询的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, AgentError::Transport(_))
    }
}
