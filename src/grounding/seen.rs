//! 会话级已呈现事实集合

use std::collections::HashSet;
use std::sync::Mutex;

use crate::knowledge::FactKey;

/// 已在本会话中呈现过的事实身份；由 GroundingEngine 写入，摘要移出上下文时 remove，会话结束时 clear
#[derive(Debug, Default)]
pub struct SeenFacts {
    keys: Mutex<HashSet<FactKey>>,
}

impl SeenFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次出现返回 true 并记录
    pub fn insert_if_new(&self, key: FactKey) -> bool {
        self.keys.lock().map(|mut k| k.insert(key)).unwrap_or(false)
    }

    /// 忘记一条事实，之后可再次呈现
    pub fn remove(&self, key: &FactKey) -> bool {
        self.keys.lock().map(|mut k| k.remove(key)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut k) = self.keys.lock() {
            k.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::FactKind;

    fn key(kind: FactKind, ident: &str) -> FactKey {
        FactKey {
            kind,
            ident: ident.to_string(),
        }
    }

    #[test]
    fn test_insert_if_new() {
        let seen = SeenFacts::new();
        assert!(seen.insert_if_new(key(FactKind::Unit, "yasuo")));
        assert!(!seen.insert_if_new(key(FactKind::Unit, "yasuo")));
        assert!(seen.insert_if_new(key(FactKind::Trait, "yasuo")));
        assert_eq!(seen.len(), 2);
        assert!(seen.remove(&key(FactKind::Unit, "yasuo")));
        assert!(!seen.remove(&key(FactKind::Unit, "yasuo")));
        assert!(seen.insert_if_new(key(FactKind::Unit, "yasuo")));
        seen.clear();
        assert!(seen.is_empty());
    }
}
