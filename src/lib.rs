//! Tactician - 多 agent TFT 助手
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + .env + 环境变量）
//! - **core**: 错误、单槽缓存、工具并发调度
//! - **runtime**: 远端 Agent Runtime 抽象、HTTP 实现与脚本化内存实现
//! - **driver**: Agent Run Driver（轮询、退避、批量工具调用）
//! - **tools**: 工具注册表、执行器与各具体工具
//! - **knowledge**: 三类知识索引的检索客户端
//! - **grounding**: 实体抽取、去重与事实摘要
//! - **memory**: 编排器会话历史
//! - **agents**: 专家 agent、编排器会话与装配
//! - **observability**: tracing 初始化

pub mod agents;
pub mod config;
pub mod core;
pub mod driver;
pub mod grounding;
pub mod knowledge;
pub mod memory;
pub mod observability;
pub mod runtime;
pub mod tools;

pub use agents::{AppBuilder, Orchestrator, TurnReply};
pub use config::{load_config, AppConfig};
pub use core::AgentError;
