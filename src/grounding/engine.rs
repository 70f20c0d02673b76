//! Grounding Engine：把任意文本转换为知识库支撑的事实摘要
//!
//! 1. 直接查询：整段文本并发查询 unit / item / trait 三个索引，任一有命中即采用
//! 2. 回退：三类均无命中时抽取候选实体，对 候选 × 类别 并发查询并展平
//! 3. 去重（本次调用内 + 会话 SeenFacts），生成 digest
//!
//! 任何查询错误都降级为空结果，不向调用方抛出。

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::core::AgentError;
use crate::grounding::{build_digest, extract_entities, SeenFacts};
use crate::knowledge::{Fact, FactKind, KnowledgeClient};

/// 本次 grounding 走的查询路径
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LookupPath {
    /// 空文本或查询失败，未产生结果
    #[default]
    Skipped,
    Direct,
    Entities(Vec<String>),
}

#[derive(Clone, Debug, Default)]
pub struct GroundingResult {
    /// 新呈现的事实数（已去重）
    pub added: usize,
    pub digest: Option<String>,
    pub facts: Vec<Fact>,
    pub path: LookupPath,
}

pub struct GroundingEngine {
    knowledge: Arc<KnowledgeClient>,
}

impl GroundingEngine {
    pub fn new(knowledge: Arc<KnowledgeClient>) -> Self {
        Self { knowledge }
    }

    /// 对文本做 grounding；`seen` 为会话级去重集合，已见过的事实不再输出
    pub async fn ground(&self, text: &str, seen: Option<&SeenFacts>) -> GroundingResult {
        let text = text.trim();
        if text.is_empty() {
            return GroundingResult::default();
        }
        match self.collect(text).await {
            Ok((facts, path)) => {
                let facts = dedupe(facts, seen);
                let digest = build_digest(&facts);
                tracing::info!(added = facts.len(), path = ?path, "grounding finished");
                GroundingResult {
                    added: facts.len(),
                    digest,
                    facts,
                    path,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "grounding lookup failed, returning no facts");
                GroundingResult::default()
            }
        }
    }

    async fn collect(&self, text: &str) -> Result<(Vec<Fact>, LookupPath), AgentError> {
        let (units, items, traits) = tokio::try_join!(
            self.knowledge.lookup(FactKind::Unit, text),
            self.knowledge.lookup(FactKind::Item, text),
            self.knowledge.lookup(FactKind::Trait, text),
        )?;
        if !(units.is_empty() && items.is_empty() && traits.is_empty()) {
            let facts = units.into_iter().chain(items).chain(traits).collect();
            return Ok((facts, LookupPath::Direct));
        }

        let candidates: Vec<String> = extract_entities(text).into_iter().collect();
        tracing::debug!(candidates = candidates.len(), "direct lookup empty, falling back to entities");
        let lookups = FactKind::ALL.into_iter().flat_map(|kind| {
            candidates
                .iter()
                .map(move |c| self.knowledge.lookup(kind, c))
        });
        let facts = try_join_all(lookups).await?.into_iter().flatten().collect();
        Ok((facts, LookupPath::Entities(candidates)))
    }
}

fn dedupe(facts: Vec<Fact>, seen: Option<&SeenFacts>) -> Vec<Fact> {
    let mut local = HashSet::new();
    facts
        .into_iter()
        .filter(|f| {
            let key = f.key();
            if !local.insert(key.clone()) {
                return false;
            }
            seen.map_or(true, |s| s.insert_if_new(key))
        })
        .collect()
}
