//! 脚本化的内存 Agent Runtime（用于测试与本地演示，无需远端服务）
//!
//! 每个 agent 可预置多段 RunScript，create_run 依次取用；get_run 按脚本逐步推进状态。
//! 所有提交的工具输出与追加的消息都会被记录，便于断言。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::runtime::{
    AgentDefinition, AgentId, AgentRuntime, MessageRole, Run, RunId, RunStatus, ThreadId,
    ToolInvocation, ToolOutput,
};

/// 单次轮询返回的结果
#[derive(Clone, Debug)]
pub enum ScriptedPoll {
    Status(RunStatus),
    RequiresAction(Vec<ToolInvocation>),
    Failed(String),
    /// 本次 get_run 返回瞬时错误
    PollError(String),
}

/// run 完成时写入 thread 的 agent 回复
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    None,
    Fixed(String),
    /// 把本 run 所有提交过的工具输出按行拼接作为回复
    EchoToolOutputs,
}

/// 一次 run 的脚本
#[derive(Clone, Debug)]
pub struct RunScript {
    polls: VecDeque<ScriptedPoll>,
    reply: ScriptedReply,
}

impl RunScript {
    pub fn new(polls: impl IntoIterator<Item = ScriptedPoll>) -> Self {
        Self {
            polls: polls.into_iter().collect(),
            reply: ScriptedReply::None,
        }
    }

    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.reply = ScriptedReply::Fixed(text.into());
        self
    }

    pub fn echo_tool_outputs(mut self) -> Self {
        self.reply = ScriptedReply::EchoToolOutputs;
        self
    }

    /// queued → in_progress → completed，回复固定文本
    pub fn completes_with(text: impl Into<String>) -> Self {
        Self::new([
            ScriptedPoll::Status(RunStatus::InProgress),
            ScriptedPoll::Status(RunStatus::Completed),
        ])
        .reply(text)
    }
}

#[derive(Debug)]
struct RunState {
    run: Run,
    script: RunScript,
    submitted: Vec<ToolOutput>,
}

#[derive(Default)]
struct State {
    next_id: usize,
    scripts: HashMap<AgentId, VecDeque<RunScript>>,
    runs: HashMap<RunId, RunState>,
    messages: Vec<(ThreadId, MessageRole, String)>,
    submissions: Vec<(RunId, Vec<ToolOutput>)>,
    polls: usize,
    cancelled: Vec<RunId>,
    created_agents: Vec<String>,
    /// 接下来这么多次 last_message_text 返回瞬时错误
    message_read_errors: usize,
}

impl State {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

/// 内存 runtime；脚本耗尽后 get_run 持续返回 in_progress
#[derive(Default)]
pub struct ScriptedRuntime {
    state: Mutex<State>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 agent 追加一段 run 脚本
    pub fn script(self, agent: &AgentId, script: RunScript) -> Self {
        self.push_script(agent, script);
        self
    }

    /// 之后 n 次读取 agent 回复返回瞬时错误
    pub fn failing_message_reads(self, n: usize) -> Self {
        self.lock().message_read_errors = n;
        self
    }

    pub fn push_script(&self, agent: &AgentId, script: RunScript) {
        let mut st = self.lock();
        st.scripts.entry(agent.clone()).or_default().push_back(script);
    }

    /// 每次 submit_tool_outputs 的 (run, 输出批次)
    pub fn submissions(&self) -> Vec<(RunId, Vec<ToolOutput>)> {
        self.lock().submissions.clone()
    }

    /// 追加到各 thread 的消息（含 run 完成后写入的 agent 回复）
    pub fn messages(&self) -> Vec<(ThreadId, MessageRole, String)> {
        self.lock().messages.clone()
    }

    pub fn user_messages(&self) -> Vec<String> {
        self.lock()
            .messages
            .iter()
            .filter(|(_, role, _)| *role == MessageRole::User)
            .map(|(_, _, text)| text.clone())
            .collect()
    }

    pub fn poll_count(&self) -> usize {
        self.lock().polls
    }

    pub fn run_count(&self) -> usize {
        self.lock().runs.len()
    }

    pub fn cancelled_runs(&self) -> Vec<RunId> {
        self.lock().cancelled.clone()
    }

    pub fn created_agents(&self) -> Vec<String> {
        self.lock().created_agents.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn reply_text(rs: &RunState) -> Option<String> {
    match &rs.script.reply {
        ScriptedReply::None => None,
        ScriptedReply::Fixed(t) => Some(t.clone()),
        ScriptedReply::EchoToolOutputs => Some(
            rs.submitted
                .iter()
                .map(|o| o.output.clone())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        Ok(ThreadId(self.lock().next("thread")))
    }

    async fn append_message(
        &self,
        thread: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AgentError> {
        self.lock()
            .messages
            .push((thread.clone(), role, content.to_string()));
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<Run, AgentError> {
        let mut st = self.lock();
        let script = st
            .scripts
            .get_mut(agent)
            .and_then(|q| q.pop_front())
            .ok_or_else(|| AgentError::Protocol(format!("no scripted run for agent {agent}")))?;
        let run = Run {
            id: RunId(st.next("run")),
            thread_id: thread.clone(),
            agent_id: agent.clone(),
            status: RunStatus::Queued,
            pending_tool_calls: Vec::new(),
            last_error: None,
        };
        st.runs.insert(
            run.id.clone(),
            RunState {
                run: run.clone(),
                script,
                submitted: Vec::new(),
            },
        );
        Ok(run)
    }

    async fn get_run(&self, thread: &ThreadId, run: &RunId) -> Result<Run, AgentError> {
        let mut st = self.lock();
        st.polls += 1;
        let rs = st
            .runs
            .get_mut(run)
            .ok_or_else(|| AgentError::Protocol(format!("unknown run {run}")))?;
        let next = rs
            .script
            .polls
            .pop_front()
            .unwrap_or(ScriptedPoll::Status(RunStatus::InProgress));
        match next {
            ScriptedPoll::PollError(msg) => return Err(AgentError::Transport(msg)),
            ScriptedPoll::Status(status) => {
                rs.run.status = status;
                rs.run.pending_tool_calls.clear();
            }
            ScriptedPoll::RequiresAction(calls) => {
                rs.run.status = RunStatus::RequiresAction;
                rs.run.pending_tool_calls = calls;
            }
            ScriptedPoll::Failed(reason) => {
                rs.run.status = RunStatus::Failed;
                rs.run.last_error = Some(reason);
            }
        }
        let snapshot = rs.run.clone();
        let reply = if snapshot.status == RunStatus::Completed {
            reply_text(rs)
        } else {
            None
        };
        if let Some(text) = reply {
            st.messages.push((thread.clone(), MessageRole::Agent, text));
        }
        Ok(snapshot)
    }

    async fn submit_tool_outputs(
        &self,
        _thread: &ThreadId,
        run: &RunId,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run, AgentError> {
        let mut st = self.lock();
        st.submissions.push((run.clone(), outputs.clone()));
        let rs = st
            .runs
            .get_mut(run)
            .ok_or_else(|| AgentError::Protocol(format!("unknown run {run}")))?;
        if rs.run.status != RunStatus::RequiresAction {
            return Err(AgentError::Protocol(format!(
                "run {run} is {}, not requires_action",
                rs.run.status
            )));
        }
        rs.submitted.extend(outputs);
        rs.run.status = RunStatus::Queued;
        rs.run.pending_tool_calls.clear();
        Ok(rs.run.clone())
    }

    async fn last_message_text(
        &self,
        thread: &ThreadId,
        role: MessageRole,
    ) -> Result<Option<String>, AgentError> {
        let mut st = self.lock();
        if st.message_read_errors > 0 {
            st.message_read_errors -= 1;
            return Err(AgentError::Transport("message read failed".into()));
        }
        Ok(st
            .messages
            .iter()
            .rev()
            .find(|(t, r, _)| t == thread && *r == role)
            .map(|(_, _, text)| text.clone()))
    }

    async fn cancel_run(&self, _thread: &ThreadId, run: &RunId) -> Result<(), AgentError> {
        let mut st = self.lock();
        st.cancelled.push(run.clone());
        if let Some(rs) = st.runs.get_mut(run) {
            rs.run.status = RunStatus::Cancelled;
        }
        Ok(())
    }

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentId, AgentError> {
        let mut st = self.lock();
        st.created_agents.push(definition.name.clone());
        Ok(AgentId(st.next("asst")))
    }
}
