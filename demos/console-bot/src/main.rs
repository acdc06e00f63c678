//! Terminal front end for the chatter bot.
//!
//! Every line typed on stdin is dispatched as a message from `--author` in
//! `--channel`; replies are printed as `#channel> text`. Commands work as they
//! would on a chat platform, e.g. `!change_context Q: "INPUT"\nA: "`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use bot_adapters::ollama::{OllamaAdapter, OllamaConfig};
use bot_adapters::openai::{OpenAiCompletionsAdapter, OpenAiCompletionsConfig};
use bot_adapters::stub::EchoAdapter;
use bot_adapters::{CompletionOracle, ModelAdapter, OracleSettings};
use bot_config::{BotConfig, ConfigLoader, OracleProvider, OracleSection};
use bot_kernel::{Dispatcher, KernelError, KernelResult, ReplySink, ResponsePipeline};
use bot_memory::FileAuditLog;
use bot_primitives::{ChannelId, InboundMessage, OutboundReply, UserId};
use bot_telemetry::{LogFormat, init_tracing};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Continuation returned by the offline echo backend.
const OFFLINE_REPLY: &str = "I can only repeat myself while offline.\"";

#[derive(Debug, Parser)]
#[command(name = "console-bot", about = "Chat with the bot from a terminal")]
struct Args {
    /// Configuration directory holding channels.txt, owner.txt and friends.
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
    /// Use the in-process echo backend instead of the configured provider.
    #[arg(long)]
    offline: bool,
    /// Channel the typed messages arrive in. Defaults to the first allow-listed channel.
    #[arg(long)]
    channel: Option<ChannelId>,
    /// Author of the typed messages. Defaults to the configured owner.
    #[arg(long)]
    author: Option<UserId>,
    /// Fallback log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
    /// Emit compact single-line logs.
    #[arg(long)]
    compact: bool,
}

/// Prints replies to stdout.
struct StdoutSink;

#[async_trait]
impl ReplySink for StdoutSink {
    async fn send(&self, reply: OutboundReply) -> KernelResult<()> {
        let line = format!("#{}> {}\n", reply.channel_id(), reply.text());
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|err| KernelError::delivery(err.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|err| KernelError::delivery(err.to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let format = if args.compact {
        LogFormat::Compact
    } else {
        LogFormat::Full
    };
    init_tracing(&args.log, format)?;

    let config = ConfigLoader::new(&args.config_dir)
        .load()
        .with_context(|| format!("loading {}", args.config_dir.display()))?;

    let oracle = build_oracle(&config, args.offline)?;
    let audit = Arc::new(
        FileAuditLog::open(config.audit_log_path())
            .await
            .context("opening audit log")?,
    );
    let pipeline = Arc::new(ResponsePipeline::from_config(&config, oracle, audit));
    let dispatcher = Dispatcher::from_config(&config, pipeline);

    let channel = match args.channel {
        Some(channel) => channel,
        None => config
            .channels()
            .iter()
            .next()
            .cloned()
            .ok_or_else(|| anyhow!("no allow-listed channels configured"))?,
    };
    let author = args.author.unwrap_or_else(|| config.owner().clone());
    info!(%channel, %author, "reading messages from stdin");

    let (tx, rx) = mpsc::channel(16);
    let reader = tokio::spawn(read_stdin(tx, channel, author));

    tokio::select! {
        () = dispatcher.serve(rx, &StdoutSink) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for ctrl-c")?;
            info!("interrupted; shutting down");
        }
    }

    reader.abort();
    Ok(())
}

async fn read_stdin(tx: mpsc::Sender<InboundMessage>, channel: ChannelId, author: UserId) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let message = InboundMessage::new(channel.clone(), author.clone(), line);
                if tx.send(message).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "stdin read failed");
                break;
            }
        }
    }
}

fn build_oracle(config: &BotConfig, offline: bool) -> Result<CompletionOracle> {
    let generation = config.generation();
    let section = &config.settings().oracle;
    let provider = if offline {
        OracleProvider::Echo
    } else {
        section.provider
    };
    let adapter = build_adapter(provider, section, generation.oracle_timeout)?;
    info!(
        provider = adapter.metadata().provider(),
        model = adapter.metadata().model(),
        "completion backend ready"
    );

    Ok(CompletionOracle::new(
        adapter,
        OracleSettings {
            max_length: generation.max_length,
            timeout: generation.oracle_timeout,
            temperature: section.temperature,
        },
    ))
}

fn build_adapter(
    provider: OracleProvider,
    section: &OracleSection,
    timeout: Duration,
) -> Result<Arc<dyn ModelAdapter>> {
    Ok(match provider {
        OracleProvider::Ollama => {
            let mut cfg = OllamaConfig::new(&section.model).with_timeout(timeout);
            if let Some(url) = &section.base_url {
                cfg = cfg.with_base_url(url)?;
            }
            if let Some(temperature) = section.temperature {
                cfg = cfg.with_default_temperature(temperature);
            }
            Arc::new(OllamaAdapter::new(cfg)?)
        }
        OracleProvider::Openai => {
            let mut cfg = OpenAiCompletionsConfig::from_env(&section.model).with_timeout(timeout);
            if let Some(url) = &section.base_url {
                cfg = cfg.with_base_url(url)?;
            }
            if let Some(key) = &section.api_key {
                cfg = cfg.with_api_key(key);
            }
            if let Some(temperature) = section.temperature {
                cfg = cfg.with_default_temperature(temperature);
            }
            Arc::new(OpenAiCompletionsAdapter::new(cfg)?)
        }
        OracleProvider::Echo => Arc::new(EchoAdapter::new(OFFLINE_REPLY)),
    })
}
