//! 单槽缓存：写一次、读多次
//!
//! 补丁说明、统计快照等进程级资源只抓取一次。并发的首次调用者等待同一次抓取完成，
//! 抓取失败不写入，下次调用重新抓取。

use std::future::Future;

use tokio::sync::OnceCell;

/// 由执行抓取的组件持有的单槽缓存
#[derive(Debug)]
pub struct OnceSlot<T> {
    cell: OnceCell<T>,
}

impl<T> Default for OnceSlot<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T> OnceSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已有值直接返回；否则执行 fetch 并写入（原子的 populate-if-absent）
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(fetch).await
    }

    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetches_once() {
        let slot: OnceSlot<String> = OnceSlot::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v = slot
                .get_or_fetch(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("notes".to_string())
                })
                .await
                .unwrap();
            assert_eq!(v, "notes");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slot.is_populated());
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let slot: OnceSlot<String> = OnceSlot::new();
        let first = slot
            .get_or_fetch(|| async { Err::<String, _>("boom".to_string()) })
            .await;
        assert!(first.is_err());
        assert!(!slot.is_populated());

        let second = slot
            .get_or_fetch(|| async { Ok::<_, String>("ok".to_string()) })
            .await
            .unwrap();
        assert_eq!(second, "ok");
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_fetch() {
        let slot = Arc::new(OnceSlot::<usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let slot = slot.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    *slot
                        .get_or_fetch(|| async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                            Ok::<_, String>(7)
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();

        for t in tasks {
            assert_eq!(t.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
