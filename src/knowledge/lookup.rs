//! 知识查询客户端：按类别查询对应索引，截断并投影为 Fact
//!
//! 对外查询每类最多返回 MAX_HITS_PER_KIND 条；索引访问层未指定条数时取 DEFAULT_INDEX_TOP。
//! 索引名在构造时校验，缺失即 Config 错误。

use std::sync::Arc;

use crate::config::{IndexesSection, SearchSection};
use crate::core::AgentError;
use crate::knowledge::{AzureSearchBackend, Fact, FactKind, SearchBackend, SearchHit};

pub const MAX_HITS_PER_KIND: usize = 5;
pub const DEFAULT_INDEX_TOP: usize = 8;

/// 三类索引名
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexNames {
    pub units: String,
    pub items: String,
    pub traits: String,
}

impl IndexNames {
    pub fn new(units: impl Into<String>, items: impl Into<String>, traits: impl Into<String>) -> Self {
        Self {
            units: units.into(),
            items: items.into(),
            traits: traits.into(),
        }
    }

    pub fn from_config(cfg: &IndexesSection) -> Result<Self, AgentError> {
        let pick = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        let (units, items, traits) = (pick(&cfg.units), pick(&cfg.items), pick(&cfg.traits));
        let missing: Vec<&str> = [
            (units.is_none(), "AZURE_SEARCH_INDEX_UNITS"),
            (items.is_none(), "AZURE_SEARCH_INDEX_ITEMS"),
            (traits.is_none(), "AZURE_SEARCH_INDEX_TRAITS"),
        ]
        .into_iter()
        .filter(|(is_missing, _)| *is_missing)
        .map(|(_, name)| name)
        .collect();
        match (units, items, traits) {
            (Some(units), Some(items), Some(traits)) => Ok(Self { units, items, traits }),
            _ => Err(AgentError::Config(format!(
                "missing search index names: {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn for_kind(&self, kind: FactKind) -> &str {
        match kind {
            FactKind::Unit => &self.units,
            FactKind::Item => &self.items,
            FactKind::Trait => &self.traits,
        }
    }
}

/// 知识查询客户端
#[derive(Clone)]
pub struct KnowledgeClient {
    backend: Arc<dyn SearchBackend>,
    indexes: IndexNames,
}

impl KnowledgeClient {
    pub fn new(backend: Arc<dyn SearchBackend>, indexes: IndexNames) -> Self {
        Self { backend, indexes }
    }

    /// 从 [search] 段构建 Azure AI Search 客户端；连接或索引配置缺失时立即失败
    pub fn from_config(cfg: &SearchSection) -> Result<Self, AgentError> {
        let indexes = IndexNames::from_config(&cfg.indexes)?;
        let backend = AzureSearchBackend::from_config(cfg)?;
        Ok(Self::new(Arc::new(backend), indexes))
    }

    /// 查询某类索引，返回至多 5 条投影后的事实（最佳在前）
    pub async fn lookup(&self, kind: FactKind, query: &str) -> Result<Vec<Fact>, AgentError> {
        self.lookup_with_cap(kind, query, MAX_HITS_PER_KIND).await
    }

    pub async fn lookup_with_cap(
        &self,
        kind: FactKind,
        query: &str,
        cap: usize,
    ) -> Result<Vec<Fact>, AgentError> {
        let hits = self.search_index(kind, query, Some(cap)).await?;
        let facts: Vec<Fact> = hits
            .iter()
            .take(cap)
            .map(|h| Fact::from_hit(kind, h))
            .collect();
        tracing::debug!(kind = %kind, hits = facts.len(), "knowledge lookup");
        Ok(facts)
    }

    /// 索引访问层：原始命中，top 缺省为 DEFAULT_INDEX_TOP
    pub async fn search_index(
        &self,
        kind: FactKind,
        query: &str,
        top: Option<usize>,
    ) -> Result<Vec<SearchHit>, AgentError> {
        let top = top.unwrap_or(DEFAULT_INDEX_TOP).max(1);
        self.backend
            .search(self.indexes.for_kind(kind), query, top)
            .await
    }

    pub fn indexes(&self) -> &IndexNames {
        &self.indexes
    }
}
