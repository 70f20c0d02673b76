//! 任务调度：工具执行并发池
//!
//! 同一批 requires_action 内的工具调用可并行，使用 Semaphore 限制同时执行的数量。

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// 工具并发调度器（默认 4）
#[derive(Clone, Debug)]
pub struct TaskScheduler {
    tool_semaphore: Arc<Semaphore>,
}

impl TaskScheduler {
    pub fn new(max_concurrent_tools: usize) -> Self {
        Self {
            tool_semaphore: Arc::new(Semaphore::new(max_concurrent_tools.max(1))),
        }
    }

    /// 获取工具执行许可；信号量从不关闭，None 仅在关闭时出现
    pub async fn acquire_tool(&self) -> Option<OwnedSemaphorePermit> {
        self.tool_semaphore.clone().acquire_owned().await.ok()
    }

    pub fn available(&self) -> usize {
        self.tool_semaphore.available_permits()
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permits_bounded() {
        let scheduler = TaskScheduler::new(2);
        let a = scheduler.acquire_tool().await;
        let b = scheduler.acquire_tool().await;
        assert!(a.is_some() && b.is_some());
        assert_eq!(scheduler.available(), 0);
        drop(a);
        assert_eq!(scheduler.available(), 1);
    }

    #[test]
    fn test_zero_is_clamped() {
        assert_eq!(TaskScheduler::new(0).available(), 1);
    }
}
