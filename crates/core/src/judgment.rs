//! Judgment Collaborator
//!
//! The conductor asks an external collaborator (usually a language model) to
//! judge each candidate answer and to answer candidate questions during the
//! closing Q&A. This module defines that contract and its implementations:
//!
//! - [`OpenAICompatibleJudge`] talks to any OpenAI-compatible chat API and
//!   asks for the decision through a `record_decision` tool call.
//! - [`HeuristicJudge`] needs no network and is meant for local development.

use crate::decision::{ConductorAction, ConductorDecision, parse_decision};
use crate::phrasing;
use crate::session::{InterviewContext, TranscriptEntry};
use crate::topic::Topic;
use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Name of the tool the model is asked to call with its decision.
pub const DECISION_TOOL: &str = "record_decision";
/// Prompt template used to judge an answer.
pub const CONDUCTOR_PROMPT: &str = "conductor";
/// Prompt template used to answer a candidate question.
pub const CLOSING_PROMPT: &str = "closing_qna";

/// Everything the collaborator sees when judging one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentRequest {
    pub context: InterviewContext,
    pub topic: Topic,
    pub follow_up_count: u32,
    pub min_follow_ups: u32,
    pub answer: String,
    pub transcript_tail: Vec<TranscriptEntry>,
}

/// A candidate question asked during the closing Q&A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingRequest {
    pub context: InterviewContext,
    pub question: String,
    /// True when this is the last question the interviewer will take.
    pub is_final: bool,
    pub transcript_tail: Vec<TranscriptEntry>,
}

/// The contract every judgment collaborator fulfils.
///
/// Implementations may fail or stall; the state machine bounds every call
/// with a timeout and falls back to deterministic behavior, so errors here
/// never end an interview.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgmentClient: Send + Sync {
    /// Proposes the next action for the latest answer.
    async fn decide(&self, request: &JudgmentRequest) -> Result<ConductorDecision>;

    /// Answers a candidate question in the closing phase.
    async fn answer_question(&self, request: &ClosingRequest) -> Result<String>;
}

/// A judge backed by any OpenAI-compatible chat completion API.
pub struct OpenAICompatibleJudge {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: HashMap<String, String>,
}

impl OpenAICompatibleJudge {
    /// Creates a new judge.
    ///
    /// # Arguments
    ///
    /// * `config` - The OpenAI client configuration (API key and base URL).
    /// * `model` - The chat model to use (e.g., "gpt-4o").
    /// * `prompts` - Prompt templates keyed by name; must include
    ///   `"conductor"` and `"closing_qna"`.
    pub fn new(config: OpenAIConfig, model: String, prompts: HashMap<String, String>) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            prompts,
        }
    }

    fn template(&self, name: &str) -> Result<&str> {
        self.prompts
            .get(name)
            .map(String::as_str)
            .with_context(|| format!("Missing prompt template: '{}'", name))
    }

    fn decision_tool() -> Result<ChatCompletionTool> {
        let schema = schemars::schema_for!(ConductorDecision);
        Ok(ChatCompletionToolArgs::default()
            .function(
                FunctionObjectArgs::default()
                    .name(DECISION_TOOL)
                    .description("Record your judgment of the candidate's last answer.")
                    .parameters(serde_json::to_value(&schema)?)
                    .build()?,
            )
            .build()?)
    }

    fn messages(system: String, user: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()?
                .into(),
        ])
    }
}

#[async_trait]
impl JudgmentClient for OpenAICompatibleJudge {
    async fn decide(&self, request: &JudgmentRequest) -> Result<ConductorDecision> {
        let follow_ups = request.follow_up_count.to_string();
        let min_follow_ups = request.min_follow_ups.to_string();
        let transcript = format_transcript(&request.transcript_tail);
        let system = render(
            self.template(CONDUCTOR_PROMPT)?,
            &[
                ("topic", &request.topic.seed_text),
                ("topic_id", &request.topic.id),
                ("category", &request.topic.category),
                ("follow_up_count", &follow_ups),
                ("min_follow_ups", &min_follow_ups),
                ("position", request.context.position.as_deref().unwrap_or("the role")),
                ("company", request.context.company.as_deref().unwrap_or("the company")),
                ("transcript", &transcript),
            ],
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(system, &request.answer)?)
            .tools(vec![Self::decision_tool()?])
            .tool_choice(DECISION_TOOL)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let message = &response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message;

        if let Some(call) = message
            .tool_calls
            .iter()
            .flatten()
            .find(|call| call.function.name == DECISION_TOOL)
        {
            debug!(arguments = %call.function.arguments, "Decision received via tool call");
            return parse_decision(&call.function.arguments);
        }
        match &message.content {
            Some(content) => parse_decision(content),
            None => Err(anyhow!(
                "LLM response had neither text content nor a decision tool call."
            )),
        }
    }

    async fn answer_question(&self, request: &ClosingRequest) -> Result<String> {
        let transcript = format_transcript(&request.transcript_tail);
        let system = render(
            self.template(CLOSING_PROMPT)?,
            &[
                ("position", request.context.position.as_deref().unwrap_or("the role")),
                ("company", request.context.company.as_deref().unwrap_or("the company")),
                ("is_final", if request.is_final { "yes" } else { "no" }),
                ("transcript", &transcript),
            ],
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(system, &request.question)?)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(anyhow!("LLM returned an empty closing answer"));
        }
        Ok(answer.to_string())
    }
}

/// An offline judge driven by simple rules, applied in order:
/// a concession pivots, a very short answer is challenged, a topic below the
/// minimum depth is deepened, anything else transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicJudge;

/// Answers with fewer words than this are challenged.
const SHORT_ANSWER_WORDS: usize = 8;

#[async_trait]
impl JudgmentClient for HeuristicJudge {
    async fn decide(&self, request: &JudgmentRequest) -> Result<ConductorDecision> {
        let words = request.answer.split_whitespace().count();
        let decision = if phrasing::is_concession(&request.answer) {
            ConductorDecision::new(
                ConductorAction::ConcedeAndPivot,
                "No problem, let's move on.",
            )
            .with_rationale("The candidate conceded.")
        } else if words < SHORT_ANSWER_WORDS {
            ConductorDecision::new(
                ConductorAction::Challenge,
                format!(
                    "Could you expand on that a little? {}",
                    request.topic.seed_text
                ),
            )
            .with_rationale(format!("The answer was only {} words long.", words))
        } else if request.follow_up_count < request.min_follow_ups {
            ConductorDecision::new(
                ConductorAction::Deepen,
                "That's helpful. Could you walk me through a concrete example of that in practice?",
            )
            .with_rationale("The topic has not been explored in depth yet.")
        } else {
            ConductorDecision::new(ConductorAction::Transition, "Thanks, that's a thorough answer.")
                .with_rationale("The topic is covered.")
        };
        Ok(decision)
    }

    async fn answer_question(&self, request: &ClosingRequest) -> Result<String> {
        Ok(phrasing::fallback_closing_answer(&request.context))
    }
}

/// Substitutes `{name}` placeholders in a prompt template.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

/// Renders transcript entries as `Speaker: text` lines.
pub fn format_transcript(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.speaker, entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads every `*.md` file in `dir` as a prompt template keyed by file stem.
pub fn load_prompts(dir: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt {}", path.display()))?;
            prompts.insert(key, content);
        }
    }
    Ok(prompts)
}
