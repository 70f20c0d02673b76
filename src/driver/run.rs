//! Agent Run Driver：驱动一次远端 agent run 直至终态
//!
//! 新建 thread → 追加 user 消息 → 创建 run → 轮询：
//! - queued / in_progress / cancelling：按指数退避等待后重新查询
//! - requires_action：并发执行整批工具调用，收齐后一次性提交
//! - completed：读取最近一条 agent 消息作为结果
//! - failed / cancelled / expired / incomplete：记录原因，结果为空文本（软失败）
//!
//! 时限、轮询次数、工具轮数、连续轮询错误均有上限，超限或取消时尽力取消远端 run 并返回错误。

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, TaskScheduler};
use crate::driver::{PollBackoff, PollPolicy};
use crate::runtime::{
    AgentId, AgentRuntime, MessageRole, Run, RunId, RunStatus, ThreadId, ToolInvocation, ToolOutput,
};
use crate::tools::{ToolDispatch, ToolExecutor, UnknownToolPolicy};

/// 一次 run 的结果
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub thread_id: ThreadId,
    pub run_id: RunId,
    pub status: RunStatus,
    /// 最近一条 agent 消息；非 completed 时为空
    pub text: String,
    pub polls: usize,
    pub tool_rounds: usize,
    pub failure: Option<String>,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// 工具输出中的错误形态
pub fn error_output(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[derive(Clone)]
pub struct AgentRunDriver {
    runtime: Arc<dyn AgentRuntime>,
    executor: ToolExecutor,
    scheduler: TaskScheduler,
    policy: PollPolicy,
    unknown_tool_policy: UnknownToolPolicy,
}

impl AgentRunDriver {
    pub fn new(runtime: Arc<dyn AgentRuntime>, executor: ToolExecutor) -> Self {
        Self {
            runtime,
            executor,
            scheduler: TaskScheduler::default(),
            policy: PollPolicy::default(),
            unknown_tool_policy: UnknownToolPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scheduler(mut self, scheduler: TaskScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_unknown_tool_policy(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tool_policy = policy;
        self
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// 驱动一次完整 run；上限、取消、未知工具（AbortRun）及非瞬时远端错误返回 Err
    pub async fn run(
        &self,
        agent: &AgentId,
        message: &str,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, AgentError> {
        let thread = self.runtime.create_thread().await?;
        self.runtime
            .append_message(&thread, MessageRole::User, message)
            .await?;
        let mut run = self.runtime.create_run(&thread, agent).await?;
        tracing::debug!(agent = %agent, thread_id = %thread, run_id = %run.id, "run created");

        let started = Instant::now();
        let mut backoff = PollBackoff::new(&self.policy);
        let mut polls = 0usize;
        let mut tool_rounds = 0usize;
        let mut consecutive_errors = 0usize;

        loop {
            match run.status {
                status if status.is_pending() => {
                    if polls >= self.policy.max_polls {
                        return Err(self.abort(&run, AgentError::PollLimitExceeded(polls)).await);
                    }
                    let Some(remaining) = self
                        .policy
                        .deadline
                        .checked_sub(started.elapsed())
                        .filter(|r| !r.is_zero())
                    else {
                        return Err(self
                            .abort(&run, AgentError::DeadlineExceeded(self.policy.deadline))
                            .await);
                    };
                    let delay = backoff.next_delay().min(remaining);
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return Err(self.abort(&run, AgentError::Cancelled).await);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }

                    polls += 1;
                    match self.runtime.get_run(&thread, &run.id).await {
                        Ok(next) => {
                            consecutive_errors = 0;
                            if next.status != run.status {
                                tracing::debug!(run_id = %run.id, status = %next.status, "run status changed");
                            }
                            run = next;
                        }
                        Err(e) if e.is_transient() => {
                            consecutive_errors += 1;
                            tracing::warn!(
                                run_id = %run.id,
                                error = %e,
                                consecutive_errors,
                                "run poll failed"
                            );
                            if consecutive_errors >= self.policy.max_consecutive_errors {
                                return Err(self.abort(&run, e).await);
                            }
                        }
                        Err(e) => return Err(self.abort(&run, e).await),
                    }
                }
                RunStatus::RequiresAction => {
                    tool_rounds += 1;
                    if tool_rounds > self.policy.max_tool_rounds {
                        return Err(self
                            .abort(&run, AgentError::ToolRoundLimitExceeded(self.policy.max_tool_rounds))
                            .await);
                    }
                    let outputs = match self.dispatch_batch(&run.pending_tool_calls).await {
                        Ok(outputs) => outputs,
                        Err(e) => return Err(self.abort(&run, e).await),
                    };
                    tracing::info!(
                        run_id = %run.id,
                        round = tool_rounds,
                        outputs = outputs.len(),
                        "submitting tool outputs"
                    );
                    run = match self
                        .runtime
                        .submit_tool_outputs(&thread, &run.id, outputs)
                        .await
                    {
                        Ok(next) => next,
                        Err(e) => return Err(self.abort(&run, e).await),
                    };
                    backoff.reset();
                }
                RunStatus::Completed => {
                    let text = loop {
                        match self.runtime.last_message_text(&thread, MessageRole::Agent).await {
                            Ok(text) => break text.unwrap_or_default(),
                            Err(e) if e.is_transient() => {
                                consecutive_errors += 1;
                                tracing::warn!(
                                    run_id = %run.id,
                                    error = %e,
                                    consecutive_errors,
                                    "reading agent reply failed"
                                );
                                if consecutive_errors >= self.policy.max_consecutive_errors {
                                    return Err(e);
                                }
                                tokio::select! {
                                    _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                                    _ = tokio::time::sleep(backoff.next_delay()) => {}
                                }
                            }
                            Err(e) => return Err(e),
                        }
                    };
                    tracing::info!(agent = %agent, run_id = %run.id, polls, tool_rounds, "run completed");
                    return Ok(RunOutcome {
                        thread_id: thread,
                        run_id: run.id,
                        status: RunStatus::Completed,
                        text,
                        polls,
                        tool_rounds,
                        failure: None,
                    });
                }
                status => {
                    let reason = run
                        .last_error
                        .clone()
                        .unwrap_or_else(|| format!("run ended with status {status}"));
                    tracing::warn!(agent = %agent, run_id = %run.id, status = %status, reason = %reason, "run did not complete");
                    return Ok(RunOutcome {
                        thread_id: thread,
                        run_id: run.id,
                        status,
                        text: String::new(),
                        polls,
                        tool_rounds,
                        failure: Some(reason),
                    });
                }
            }
        }
    }

    /// 软失败语义：任何错误或非 completed 终态都返回空文本
    pub async fn run_text(&self, agent: &AgentId, message: &str, cancel: CancellationToken) -> String {
        match self.run(agent, message, cancel).await {
            Ok(outcome) => outcome.text,
            Err(e) => {
                tracing::warn!(agent = %agent, error = %e, "agent run aborted");
                String::new()
            }
        }
    }

    /// 执行一批工具调用；每个 call id 恰好对应一条输出
    async fn dispatch_batch(&self, calls: &[ToolInvocation]) -> Result<Vec<ToolOutput>, AgentError> {
        let dispatch: Vec<ToolDispatch> = calls.iter().map(|c| self.executor.resolve(&c.name)).collect();
        if self.unknown_tool_policy == UnknownToolPolicy::AbortRun {
            if let Some(ToolDispatch::Unknown(name)) = dispatch
                .iter()
                .find(|d| matches!(d, ToolDispatch::Unknown(_)))
            {
                return Err(AgentError::UnknownTool(name.clone()));
            }
        }

        let futures = calls.iter().zip(dispatch).map(|(call, dispatch)| async move {
            let output = match dispatch {
                ToolDispatch::Known(tool) => {
                    let _permit = self.scheduler.acquire_tool().await;
                    match self.executor.execute(tool, call.parsed_arguments()).await {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!(tool = %tool, call_id = %call.call_id, error = %e, "tool call failed");
                            error_output(&e.to_string())
                        }
                    }
                }
                ToolDispatch::Unknown(name) => {
                    tracing::warn!(tool = %name, call_id = %call.call_id, "unknown tool requested");
                    error_output(&format!("unknown tool '{name}'"))
                }
            };
            ToolOutput::new(call.call_id.clone(), output)
        });
        Ok(join_all(futures).await)
    }

    /// 尽力取消远端 run，返回原错误
    async fn abort(&self, run: &Run, err: AgentError) -> AgentError {
        tracing::warn!(run_id = %run.id, error = %err, "aborting run");
        if let Err(e) = self.runtime.cancel_run(&run.thread_id, &run.id).await {
            tracing::warn!(run_id = %run.id, error = %e, "cancel run failed");
        }
        err
    }
}
