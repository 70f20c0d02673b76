//! Agent Run Driver：工具调用状态机（轮询 → 批量执行工具 → 提交 → 继续轮询）

pub mod backoff;
pub mod run;

pub use backoff::{PollBackoff, PollPolicy};
pub use run::{error_output, AgentRunDriver, RunOutcome};
