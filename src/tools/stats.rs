//! 统计类工具：get_general_stats（缓存）与 get_comp_stats（默认由宿主禁用）

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::SourcesSection;
use crate::core::{AgentError, OnceSlot};
use crate::tools::web::{build_client, get_text, truncate};
use crate::tools::{Tool, ToolName};

/// 阵容统计禁用时的固定输出
pub fn comp_stats_disabled_output() -> String {
    json!({ "error": "get_comp_stats is disabled by host" }).to_string()
}

/// 统计数据源：通用统计快照只抓取一次，阵容统计每次实时抓取
pub struct StatsSource {
    client: Client,
    general_url: String,
    comp_url: String,
    comp_enabled: bool,
    max_chars: usize,
    general: OnceSlot<String>,
}

impl StatsSource {
    pub fn from_config(cfg: &SourcesSection) -> Result<Self, AgentError> {
        Ok(Self {
            client: build_client(cfg.timeout_secs)?,
            general_url: cfg.general_stats_url.clone(),
            comp_url: cfg.comp_stats_url.clone(),
            comp_enabled: cfg.comp_stats_enabled,
            max_chars: cfg.max_result_chars,
            general: OnceSlot::new(),
        })
    }

    pub fn comp_enabled(&self) -> bool {
        self.comp_enabled
    }

    pub async fn general_stats(&self) -> Result<String, AgentError> {
        self.general
            .get_or_fetch(|| async {
                tracing::info!(url = %self.general_url, "fetching general stats");
                self.fetch_json(&self.general_url).await
            })
            .await
            .cloned()
    }

    pub async fn comp_stats(&self) -> Result<String, AgentError> {
        if !self.comp_enabled {
            tracing::info!("get_comp_stats requested but disabled by host");
            return Ok(comp_stats_disabled_output());
        }
        self.fetch_json(&self.comp_url).await
    }

    /// 抓取 JSON 并紧凑序列化
    async fn fetch_json(&self, url: &str) -> Result<String, AgentError> {
        let body = get_text(&self.client, url).await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AgentError::Fetch(format!("{url}: invalid JSON: {e}")))?;
        Ok(truncate(value.to_string(), self.max_chars))
    }
}

pub struct GetGeneralStatsTool {
    source: Arc<StatsSource>,
}

impl GetGeneralStatsTool {
    pub fn new(source: Arc<StatsSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetGeneralStatsTool {
    fn name(&self) -> ToolName {
        ToolName::GetGeneralStats
    }

    fn description(&self) -> &str {
        "Retrieve general statistics (placement, play rate) for TFT units, items and traits in the current patch. No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        self.source.general_stats().await.map_err(|e| e.to_string())
    }
}

pub struct GetCompStatsTool {
    source: Arc<StatsSource>,
}

impl GetCompStatsTool {
    pub fn new(source: Arc<StatsSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetCompStatsTool {
    fn name(&self) -> ToolName {
        ToolName::GetCompStats
    }

    fn description(&self) -> &str {
        "Team composition statistics. Disabled in this deployment: do not call."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        self.source.comp_stats().await.map_err(|e| e.to_string())
    }
}
