//! Tactician 控制台入口
//!
//! 加载配置、初始化日志、装配编排器，然后逐行读取标准输入：每行一轮，`exit` 结束，空行忽略。

use anyhow::Context;
use tactician::{agents::AppBuilder, config::load_config, observability};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

const GREETING: &str =
    "Hello! Feel free to ask me anything about the current meta in TFT or the latest patch notes (type 'exit' to quit).";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    let mut orchestrator = AppBuilder::new(cfg)
        .build()
        .await
        .context("Failed to build orchestrator")?;

    let session_id = uuid::Uuid::new_v4();
    tracing::info!(session = %session_id, "orchestrator session started");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(format!("{GREETING}\n> ").as_bytes()).await?;
    stdout.flush().await?;

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };
        let Some(line) = line else { break };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if !input.is_empty() {
            let reply = orchestrator.ask(input, shutdown.child_token()).await;
            stdout.write_all(format!("{}\n", reply.answer).as_bytes()).await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    tracing::info!(session = %session_id, "orchestrator session ended");
    Ok(())
}
