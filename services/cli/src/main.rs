//! Terminal driver for the interview conductor.
//!
//! Reads a topic catalog, greets the candidate and then takes one line of
//! stdin per turn (introduction, answers, closing questions) until the
//! interview completes or stdin closes.

mod catalog;

use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use clap::{Parser, ValueEnum};
use conductor_core::{
    ConductorConfig, InterviewConductor, InterviewContext, InterviewType, Phase,
    judgment::{HeuristicJudge, JudgmentClient, OpenAICompatibleJudge, load_prompts},
    selector::RotationPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Provider {
    Openai,
    Gemini,
    Heuristic,
}

#[derive(Parser, Debug)]
#[command(name = "conductor", version, about = "Run a mock interview in the terminal")]
struct Args {
    /// JSON file with the topic catalog
    #[arg(long, short = 'c')]
    catalog: PathBuf,

    /// Judgment provider
    #[arg(long, value_enum, default_value = "heuristic", env = "JUDGMENT_PROVIDER")]
    provider: Provider,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, default_value = "gpt-4o", env = "CHAT_MODEL")]
    chat_model: String,

    /// Directory of prompt templates (*.md)
    #[arg(long, default_value = "./prompts", env = "PROMPTS_PATH")]
    prompts: PathBuf,

    #[arg(long)]
    candidate_name: Option<String>,

    #[arg(long)]
    position: Option<String>,

    #[arg(long)]
    company: Option<String>,

    /// technical_behavioral, technical_only or behavioral_only
    #[arg(long, default_value = "technical_behavioral")]
    interview_type: InterviewType,

    #[arg(long, default_value_t = conductor_core::validator::DEFAULT_MIN_FOLLOW_UPS)]
    min_follow_ups: u32,

    /// 0 disables the follow-up ceiling
    #[arg(long, default_value_t = conductor_core::validator::DEFAULT_MAX_FOLLOW_UPS)]
    max_follow_ups: u32,

    #[arg(long, default_value_t = conductor_core::machine::DEFAULT_MAX_TURNS)]
    max_turns: u32,

    #[arg(long, default_value_t = 20)]
    judgment_timeout_secs: u64,

    #[arg(long, default_value_t = conductor_core::machine::DEFAULT_JUDGMENT_ATTEMPTS)]
    judgment_attempts: u32,

    #[arg(long, default_value_t = conductor_core::machine::DEFAULT_CLOSING_MAX_EXCHANGES)]
    closing_max_exchanges: u32,

    /// balanced or avoid_repeat
    #[arg(long, default_value = "balanced")]
    rotation: RotationPolicy,

    /// Write the final session record (turns and transcript) to this file
    #[arg(long)]
    record: Option<PathBuf>,
}

impl Args {
    fn conductor_config(&self) -> ConductorConfig {
        ConductorConfig {
            min_follow_ups: self.min_follow_ups,
            max_follow_ups: (self.max_follow_ups > 0).then_some(self.max_follow_ups),
            max_turns: self.max_turns,
            judgment_timeout: Duration::from_secs(self.judgment_timeout_secs.max(1)),
            judgment_attempts: self.judgment_attempts,
            closing_max_exchanges: self.closing_max_exchanges,
            rotation: self.rotation,
            ..ConductorConfig::default()
        }
    }

    fn context(&self) -> InterviewContext {
        InterviewContext {
            candidate_name: self.candidate_name.clone(),
            position: self.position.clone(),
            company: self.company.clone(),
            interview_type: self.interview_type,
        }
    }

    fn judge(&self) -> Result<Arc<dyn JudgmentClient>> {
        let (api_key, api_base) = match self.provider {
            Provider::Heuristic => return Ok(Arc::new(HeuristicJudge)),
            Provider::Openai => (&self.openai_api_key, "https://api.openai.com/v1/"),
            Provider::Gemini => (
                &self.gemini_api_key,
                "https://generativelanguage.googleapis.com/v1beta/openai",
            ),
        };
        let api_key = api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .context("An API key is required for the selected provider")?;
        let prompts = load_prompts(&self.prompts)?;
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Ok(Arc::new(OpenAICompatibleJudge::new(
            config,
            self.chat_model.clone(),
            prompts,
        )))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = catalog::load_catalog(&args.catalog)?;
    info!(topics = catalog.len(), provider = ?args.provider, "Catalog loaded");

    let conductor = InterviewConductor::new(args.judge()?, args.conductor_config());
    let id = Uuid::new_v4();
    let greeting = conductor
        .initialize(id, Arc::new(catalog), args.context())
        .await?;
    println!("Interviewer: {}", greeting.utterance);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut phase = greeting.phase;
    while phase != Phase::Completed {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = if phase == Phase::Introduction {
            conductor.submit_introduction(id, line).await?
        } else {
            conductor.submit_answer(id, line).await?
        };
        println!("Interviewer: {}", outcome.utterance);
        phase = outcome.phase;
    }

    let status = conductor.get_status(id).await?;
    eprintln!(
        "[{} | {}/{} topics | {} turns]",
        status.session.phase,
        status.progress.topics_visited,
        status.progress.topics_total,
        status.session.turn_count
    );

    if let Some(path) = &args.record {
        let record = conductor.record(id).await?;
        std::fs::write(path, serde_json::to_string_pretty(&record)?)
            .with_context(|| format!("Failed to write session record to {}", path.display()))?;
        info!(path = %path.display(), "Session record written");
    }
    Ok(())
}
