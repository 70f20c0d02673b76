//! 编排器会话：多轮对话、专家委派、事实校正
//!
//! 每轮：记录用户消息 → 编排 agent 起草 → 对（本轮专家回答 + 草稿）做 grounding →
//! 有新事实时作为 system 消息注入并让编排 agent 校正一次 → 写回答案。
//! 摘要随历史剪枝移出上下文时，其中的事实从已呈现集合中移除，之后可再次注入。

use std::collections::VecDeque;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::agents::prompts::{FALLBACK_ANSWER, RECONCILE_INSTRUCTION};
use crate::agents::{AgentRole, SpecialistAgent, TurnContext};
use crate::grounding::{GroundingEngine, SeenFacts};
use crate::knowledge::FactKey;
use crate::memory::{ConversationMemory, Message, Role};

/// 一轮的结果
#[derive(Clone, Debug)]
pub struct TurnReply {
    pub answer: String,
    pub digest: Option<String>,
    pub facts_added: usize,
    /// 本轮被调用的专家（按调用顺序，可重复）
    pub consulted: Vec<AgentRole>,
}

pub struct Orchestrator {
    agent: SpecialistAgent,
    grounding: Arc<GroundingEngine>,
    seen: Arc<SeenFacts>,
    turn: Arc<TurnContext>,
    history: ConversationMemory,
    /// 历史中每条 system 摘要对应的事实，与摘要同序
    digest_keys: VecDeque<Vec<FactKey>>,
}

impl Orchestrator {
    pub fn new(
        agent: SpecialistAgent,
        grounding: Arc<GroundingEngine>,
        seen: Arc<SeenFacts>,
        turn: Arc<TurnContext>,
        max_context_turns: usize,
    ) -> Self {
        Self {
            agent,
            grounding,
            seen,
            turn,
            history: ConversationMemory::new(max_context_turns),
            digest_keys: VecDeque::new(),
        }
    }

    pub async fn ask(&mut self, user_text: &str, cancel: CancellationToken) -> TurnReply {
        self.turn.begin(cancel.clone());
        self.remember(Message::user(user_text.trim()));

        let draft = self.agent.ask(&self.history.render(), cancel.clone()).await;

        let merged = [self.turn.render(), draft.trim().to_string()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let grounding = self.grounding.ground(&merged, Some(self.seen.as_ref())).await;

        let mut answer = draft;
        if let Some(digest) = &grounding.digest {
            self.digest_keys
                .push_back(grounding.facts.iter().map(|f| f.key()).collect());
            self.remember(Message::system(digest.clone()));
            let prompt = format!(
                "{}\nassistant (draft): {}\n\n{}",
                self.history.render(),
                answer.trim(),
                RECONCILE_INSTRUCTION
            );
            let revised = self.agent.ask(&prompt, cancel).await;
            if !revised.trim().is_empty() {
                answer = revised;
            }
        }
        if answer.trim().is_empty() {
            answer = FALLBACK_ANSWER.to_string();
        }
        self.remember(Message::assistant(answer.clone()));

        let consulted: Vec<AgentRole> = self.turn.consultations().iter().map(|c| c.role).collect();
        tracing::info!(
            facts_added = grounding.added,
            consulted = consulted.len(),
            "turn finished"
        );
        TurnReply {
            answer,
            digest: grounding.digest,
            facts_added: grounding.added,
            consulted,
        }
    }

    /// 写入历史；被剪掉的摘要中的事实不再视为已呈现
    fn remember(&mut self, msg: Message) {
        for pruned in self.history.push(msg) {
            if pruned.role != Role::System {
                continue;
            }
            if let Some(keys) = self.digest_keys.pop_front() {
                for key in &keys {
                    self.seen.remove(key);
                }
                tracing::debug!(facts = keys.len(), "digest left context, facts may be grounded again");
            }
        }
    }

    /// 会话边界：清空历史与已呈现事实
    pub fn reset(&mut self) {
        self.history.clear();
        self.digest_keys.clear();
        self.seen.clear();
        tracing::info!("session reset");
    }

    pub fn history(&self) -> &ConversationMemory {
        &self.history
    }

    pub fn seen_facts(&self) -> &SeenFacts {
        &self.seen
    }
}
