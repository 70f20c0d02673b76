//! 单轮上下文：本轮各专家的问答记录与取消令牌

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::agents::AgentRole;

/// 一次专家调用
#[derive(Clone, Debug, PartialEq)]
pub struct Consultation {
    pub role: AgentRole,
    pub query: String,
    pub answer: String,
}

#[derive(Debug, Default)]
pub struct TurnContext {
    consultations: Mutex<Vec<Consultation>>,
    cancel: Mutex<CancellationToken>,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始新一轮：清空记录并换上本轮的取消令牌
    pub fn begin(&self, cancel: CancellationToken) {
        if let Ok(mut c) = self.consultations.lock() {
            c.clear();
        }
        if let Ok(mut t) = self.cancel.lock() {
            *t = cancel;
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn record(&self, consultation: Consultation) {
        if let Ok(mut c) = self.consultations.lock() {
            c.push(consultation);
        }
    }

    pub fn consultations(&self) -> Vec<Consultation> {
        self.consultations
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// 本轮所有专家回答，按调用顺序拼接
    pub fn render(&self) -> String {
        self.consultations()
            .iter()
            .filter(|c| !c.answer.trim().is_empty())
            .map(|c| format!("[{}] {}", c.role.label(), c.answer.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resets_turn() {
        let turn = TurnContext::new();
        turn.record(Consultation {
            role: AgentRole::Stats,
            query: "q".into(),
            answer: "Yasuo top 4 rate 55%".into(),
        });
        turn.record(Consultation {
            role: AgentRole::PatchNotes,
            query: "q".into(),
            answer: " ".into(),
        });
        assert_eq!(turn.render(), "[stats agent] Yasuo top 4 rate 55%");

        let token = CancellationToken::new();
        turn.begin(token.clone());
        assert!(turn.consultations().is_empty());
        token.cancel();
        assert!(turn.cancel_token().is_cancelled());
    }
}
