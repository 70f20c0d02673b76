//! 内存知识索引（用于测试与离线演示）
//!
//! 以名称子串近似语义检索：查询文本包含文档名，或文档名包含查询文本（均不区分大小写）即命中。
//! 记录每次查询，可整体设为失败。

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::AgentError;
use crate::knowledge::{SearchBackend, SearchHit};

#[derive(Default)]
pub struct StaticSearchBackend {
    indexes: HashMap<String, Vec<SearchHit>>,
    queries: Mutex<Vec<(String, String, usize)>>,
    fail: bool,
}

impl StaticSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向索引追加一篇文档（JSON 对象）
    pub fn with_doc(mut self, index: &str, doc: Value) -> Self {
        let hit = SearchHit {
            fields: doc.as_object().cloned().unwrap_or_default(),
            score: None,
            caption: None,
        };
        self.indexes.entry(index.to_string()).or_default().push(hit);
        self
    }

    /// 所有查询都返回 Search 错误
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// 已执行的 (index, query, top)
    pub fn queries(&self) -> Vec<(String, String, usize)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or_default()
    }
}

fn matches(hit: &SearchHit, query: &str) -> bool {
    let name = hit
        .fields
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    let query = query.trim().to_lowercase();
    !name.is_empty() && !query.is_empty() && (query.contains(&name) || name.contains(&query))
}

#[async_trait]
impl SearchBackend for StaticSearchBackend {
    async fn search(&self, index: &str, query: &str, top: usize) -> Result<Vec<SearchHit>, AgentError> {
        if let Ok(mut q) = self.queries.lock() {
            q.push((index.to_string(), query.to_string(), top));
        }
        if self.fail {
            return Err(AgentError::Search(format!("{index}: backend unavailable")));
        }
        Ok(self
            .indexes
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|h| matches(h, query))
                    .take(top)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
