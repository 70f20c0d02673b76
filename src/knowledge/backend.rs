//! 知识索引后端：抽象与 Azure AI Search 实现
//!
//! 查询为向量 + 语义重排的混合检索：文本向量化查询（k 个近邻，exhaustive），
//! `queryType=semantic`，语义配置名为 `{index}-semantic-config`，同时请求抽取式 caption。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::SearchSection;
use crate::core::AgentError;

/// 一条原始命中：去掉 `@search.*` 元数据后的字段、得分与语义 caption
#[derive(Clone, Debug, Default)]
pub struct SearchHit {
    pub fields: Map<String, Value>,
    pub score: Option<f64>,
    pub caption: Option<String>,
}

/// 按服务端排序返回命中（最佳在前），最多 top 条
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, index: &str, query: &str, top: usize) -> Result<Vec<SearchHit>, AgentError>;
}

pub struct AzureSearchBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    vector_field: String,
}

#[derive(Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

impl AzureSearchBackend {
    /// endpoint / api_key 缺失时立即返回 Config 错误
    pub fn from_config(cfg: &SearchSection) -> Result<Self, AgentError> {
        let mut missing = Vec::new();
        let endpoint = non_empty(&cfg.endpoint);
        let api_key = non_empty(&cfg.api_key);
        if endpoint.is_none() {
            missing.push("search.endpoint (AZURE_SEARCH_ENDPOINT)");
        }
        if api_key.is_none() {
            missing.push("search.api_key (AZURE_SEARCH_ADMIN_KEY)");
        }
        match (endpoint, api_key) {
            (Some(endpoint), Some(api_key)) => {
                let client = Client::builder()
                    .timeout(Duration::from_secs(cfg.timeout_secs))
                    .build()?;
                Ok(Self {
                    client,
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    api_key: api_key.to_string(),
                    api_version: cfg.api_version.clone(),
                    vector_field: cfg.vector_field.clone(),
                })
            }
            _ => Err(AgentError::Config(format!(
                "missing search settings: {}",
                missing.join(", ")
            ))),
        }
    }

    fn request_body(&self, index: &str, query: &str, top: usize) -> Value {
        json!({
            "vectorQueries": [{
                "kind": "text",
                "text": query,
                "k": top,
                "fields": self.vector_field,
                "exhaustive": true,
            }],
            "top": top,
            "queryType": "semantic",
            "semanticConfiguration": format!("{index}-semantic-config"),
            "captions": "extractive",
            "answers": "extractive",
        })
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 拆出 `@search.*` 元数据
fn into_hit(mut doc: Map<String, Value>) -> SearchHit {
    let score = doc
        .get("@search.rerankerScore")
        .or_else(|| doc.get("@search.score"))
        .and_then(Value::as_f64);
    let caption = doc
        .get("@search.captions")
        .and_then(Value::as_array)
        .and_then(|caps| caps.first())
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .map(String::from);
    doc.retain(|k, _| !k.starts_with("@search."));
    SearchHit {
        fields: doc,
        score,
        caption,
    }
}

#[async_trait]
impl SearchBackend for AzureSearchBackend {
    async fn search(&self, index: &str, query: &str, top: usize) -> Result<Vec<SearchHit>, AgentError> {
        let url = format!("{}/indexes/{}/docs/search", self.endpoint, index);
        let resp = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .json(&self.request_body(index, query, top))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body: String = resp.text().await.unwrap_or_default().chars().take(300).collect();
            return Err(AgentError::Search(format!("{index}: HTTP {status}: {body}")));
        }
        let wire: SearchResponseWire = resp
            .json()
            .await
            .map_err(|e| AgentError::Search(format!("{index}: decode response: {e}")))?;
        Ok(wire.value.into_iter().map(into_hit).take(top).collect())
    }
}
