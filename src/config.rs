//! 应用配置：从 .env、config/default.toml 与环境变量加载
//!
//! 加载顺序：先用 dotenvy 载入最近的 .env（不覆盖已有变量），再读 TOML 文件，
//! 最后用环境变量 `TACTICIAN__*` 覆盖（双下划线表示嵌套，如 `TACTICIAN__SEARCH__ENDPOINT=...`）。
//! 结构化键缺失时回退到部署沿用的旧变量名（AZURE_SEARCH_ENDPOINT、GROUNDING_AGENT_ID 等）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::tools::UnknownToolPolicy;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub runtime: RuntimeSection,
    pub agents: AgentsSection,
    pub polling: PollingSection,
    pub tools: ToolsSection,
    pub search: SearchSection,
    pub sources: SourcesSection,
}

/// [app] 段：会话历史保留轮数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub max_context_turns: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            max_context_turns: 20,
        }
    }
}

/// [runtime] 段：远端 Agent Runtime 连接
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub endpoint: Option<String>,
    /// Bearer token
    pub api_key: Option<String>,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: "v1".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// [agents] 段：各角色的远端 agent id；缺失时按 model 创建
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentsSection {
    pub orchestrator_id: Option<String>,
    pub patch_notes_id: Option<String>,
    pub stats_id: Option<String>,
    pub grounding_id: Option<String>,
    pub model: String,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            orchestrator_id: None,
            patch_notes_id: None,
            stats_id: None,
            grounding_id: None,
            model: "gpt-4o".to_string(),
        }
    }
}

/// [polling] 段：run 轮询退避与上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub multiplier: f64,
    /// 单次 run 的绝对时限（秒）
    pub deadline_secs: u64,
    pub max_polls: usize,
    /// 连续轮询失败达到此值则放弃
    pub max_consecutive_errors: usize,
    pub max_tool_rounds: usize,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1000,
            max_interval_ms: 3000,
            multiplier: 1.5,
            deadline_secs: 180,
            max_polls: 240,
            max_consecutive_errors: 5,
            max_tool_rounds: 16,
        }
    }
}

/// [tools] 段：工具超时、并发与未知工具策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub max_concurrent_tools: usize,
    pub unknown_tool_policy: UnknownToolPolicy,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 60,
            max_concurrent_tools: 4,
            unknown_tool_policy: UnknownToolPolicy::ErrorOutput,
        }
    }
}

/// [search] 段：知识索引后端
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_version: String,
    pub vector_field: String,
    pub timeout_secs: u64,
    pub indexes: IndexesSection,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: "2024-07-01".to_string(),
            vector_field: "text_vector".to_string(),
            timeout_secs: 20,
            indexes: IndexesSection::default(),
        }
    }
}

/// [search.indexes] 段：三类索引名
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexesSection {
    pub units: Option<String>,
    pub items: Option<String>,
    pub traits: Option<String>,
}

/// [sources] 段：补丁说明页与统计接口
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesSection {
    pub patch_notes_url: String,
    pub general_stats_url: String,
    pub comp_stats_url: String,
    /// 阵容统计工具默认禁用
    pub comp_stats_enabled: bool,
    pub timeout_secs: u64,
    pub max_result_chars: usize,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            patch_notes_url: "https://www.leagueoflegends.com/en-us/news/tags/teamfight-tactics-patch-notes/"
                .to_string(),
            general_stats_url: "https://d3.tft.tools/stats2/general/1100/15151/1".to_string(),
            comp_stats_url: "https://api.tft.tools/team-compositions/1/15151".to_string(),
            comp_stats_enabled: false,
            timeout_secs: 20,
            max_result_chars: 60_000,
        }
    }
}

/// 加载配置：.env → config 目录 TOML → 可选指定文件 → TACTICIAN__* 环境变量 → 旧变量名回退
///
/// 1. dotenvy 从当前目录向上查找 .env，已存在的进程变量不被覆盖
/// 2. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 3. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 4. 叠加环境变量 TACTICIAN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TACTICIAN")
            .separator("__")
            .try_parsing(true),
    );

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    apply_legacy_env(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// 结构化键未设置时，用旧部署变量名补齐
fn apply_legacy_env(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let fill = |slot: &mut Option<String>, key: &str| {
        if slot.is_none() {
            *slot = lookup(key).filter(|v| !v.trim().is_empty());
        }
    };

    fill(&mut cfg.runtime.endpoint, "AIPROJECT_ENDPOINT");
    fill(&mut cfg.runtime.api_key, "AIPROJECT_TOKEN");
    fill(&mut cfg.agents.orchestrator_id, "ORCHESTRATOR_AGENT_ID");
    fill(&mut cfg.agents.patch_notes_id, "PATCH_NOTES_RESEARCHER_AGENT_ID");
    fill(&mut cfg.agents.stats_id, "TACTICS_DOT_TOOLS_AGENT_ID");
    fill(&mut cfg.agents.grounding_id, "GROUNDING_AGENT_ID");
    fill(&mut cfg.search.endpoint, "AZURE_SEARCH_ENDPOINT");
    fill(&mut cfg.search.api_key, "AZURE_SEARCH_ADMIN_KEY");
    fill(&mut cfg.search.indexes.units, "AZURE_SEARCH_INDEX_UNITS");
    fill(&mut cfg.search.indexes.items, "AZURE_SEARCH_INDEX_ITEMS");
    fill(&mut cfg.search.indexes.traits, "AZURE_SEARCH_INDEX_TRAITS");
}
