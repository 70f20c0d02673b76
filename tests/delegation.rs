//! 委派工具：执行器超时丢弃专家调用时，专家的远端 run 被取消

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tactician::agents::{AgentRole, SpecialistAgent, TurnContext};
    use tactician::driver::{AgentRunDriver, PollPolicy};
    use tactician::runtime::{
        AgentId, AgentRuntime, RunId, RunScript, RunStatus, ScriptedPoll, ScriptedRuntime, ToolInvocation,
    };
    use tactician::tools::{AgentTool, ToolExecutor, ToolRegistry};
    use tokio_util::sync::CancellationToken;

    fn fast_policy() -> PollPolicy {
        PollPolicy::default()
            .with_intervals(Duration::from_millis(1), Duration::from_millis(2))
            .with_deadline(Duration::from_secs(5))
            .with_max_polls(100_000)
    }

    async fn wait_for_cancel(runtime: &ScriptedRuntime) -> Vec<RunId> {
        for _ in 0..100 {
            let cancelled = runtime.cancelled_runs();
            if !cancelled.is_empty() {
                return cancelled;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        runtime.cancelled_runs()
    }

    #[tokio::test]
    async fn test_timed_out_delegation_cancels_specialist_run() {
        let orch = AgentId::new("asst_orch");
        let patch = AgentId::new("asst_patch");
        let runtime = Arc::new(
            ScriptedRuntime::new()
                .script(
                    &orch,
                    RunScript::new([
                        ScriptedPoll::RequiresAction(vec![ToolInvocation::new(
                            "o1",
                            "patch_notes_agent",
                            json!({ "query": "latest changes" }).to_string(),
                        )]),
                        ScriptedPoll::Status(RunStatus::Completed),
                    ])
                    .echo_tool_outputs(),
                )
                // 专家 run 一直停在 in_progress
                .script(&patch, RunScript::new([])),
        );
        let rt: Arc<dyn AgentRuntime> = runtime.clone();

        let specialist_driver =
            AgentRunDriver::new(rt.clone(), ToolExecutor::new(ToolRegistry::new(), 5)).with_policy(fast_policy());
        let specialist = Arc::new(SpecialistAgent::new(AgentRole::PatchNotes, patch, specialist_driver));
        let turn = Arc::new(TurnContext::new());
        let tool = AgentTool::new(specialist, turn.clone()).unwrap();
        let executor = ToolExecutor::with_timeout(ToolRegistry::new().with(tool), Duration::from_millis(50));
        let orchestrator = AgentRunDriver::new(rt, executor).with_policy(fast_policy());

        let outcome = orchestrator
            .run(&orch, "what changed?", CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert!(outcome.text.contains("Tool timeout: patch_notes_agent"));
        assert!(turn.consultations().is_empty());

        let cancelled = wait_for_cancel(&runtime).await;
        assert_eq!(cancelled.len(), 1);
        assert_ne!(cancelled[0], outcome.run_id);
        assert_eq!(runtime.run_count(), 2);
    }
}
