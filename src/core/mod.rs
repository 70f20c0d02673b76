//! 核心层：错误、单槽缓存、工具并发调度

pub mod cache;
pub mod error;
pub mod task_scheduler;

pub use cache::OnceSlot;
pub use error::AgentError;
pub use task_scheduler::TaskScheduler;
