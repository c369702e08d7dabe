//! Conductor Actions and Decisions
//!
//! A `ConductorDecision` is the structured proposal the judgment collaborator
//! returns every turn. It is advisory: the validator may change its action and
//! the selector alone decides which topic comes next.

use anyhow::{Context, Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four per-turn actions. The first two keep the current topic, the
/// latter two move away from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConductorAction {
    /// The answer was weak, evasive or incorrect; probe the same point again.
    Challenge,
    /// The answer was sound; go one level deeper on the same topic.
    Deepen,
    /// The topic is covered; move to the next one.
    Transition,
    /// The candidate conceded ("I don't know"); move on gracefully.
    ConcedeAndPivot,
}

impl ConductorAction {
    pub fn keeps_topic(self) -> bool {
        matches!(self, ConductorAction::Challenge | ConductorAction::Deepen)
    }

    pub fn changes_topic(self) -> bool {
        !self.keeps_topic()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConductorAction::Challenge => "CHALLENGE",
            ConductorAction::Deepen => "DEEPEN",
            ConductorAction::Transition => "TRANSITION",
            ConductorAction::ConcedeAndPivot => "CONCEDE_AND_PIVOT",
        }
    }
}

impl fmt::Display for ConductorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured judgment produced for one candidate turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConductorDecision {
    /// The proposed next action.
    #[schemars(description = "One of CHALLENGE, DEEPEN, TRANSITION, CONCEDE_AND_PIVOT")]
    #[serde(alias = "chosen_action")]
    pub action: ConductorAction,
    /// Short analysis of the candidate's last answer.
    #[schemars(description = "A brief analysis of the candidate's last answer")]
    #[serde(default, alias = "analysis_of_last_answer")]
    pub rationale: String,
    /// What the interviewer says next.
    #[schemars(description = "The interviewer's next utterance, spoken to the candidate")]
    #[serde(alias = "next_utterance")]
    pub utterance: String,
    /// Advisory only. The conductor's selector picks the next topic.
    #[schemars(description = "Optional id or name of the topic you would move to next")]
    #[serde(
        default,
        rename = "suggestedTopicHint",
        alias = "suggested_topic_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_topic_hint: Option<String>,
}

impl ConductorDecision {
    pub fn new(action: ConductorAction, utterance: impl Into<String>) -> Self {
        Self {
            action,
            rationale: String::new(),
            utterance: utterance.into(),
            suggested_topic_hint: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.suggested_topic_hint = Some(hint.into());
        self
    }
}

/// Parses a decision out of free-form model output.
///
/// Models regularly wrap JSON in code fences, surround it with prose, or
/// double the braces they saw in a prompt template. This strips all three
/// before handing the object to serde.
pub fn parse_decision(raw: &str) -> Result<ConductorDecision> {
    let candidate = extract_json_object(raw).context("No JSON object found in model output")?;
    serde_json::from_str(&candidate).context("Model output is not a valid conductor decision")
}

fn extract_json_object(raw: &str) -> Result<String> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
        text = text.strip_suffix("```").unwrap_or(text);
        text = text.trim();
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        bail!("model output contains no braces");
    };
    if end <= start {
        bail!("model output has unbalanced braces");
    }
    let mut object = &text[start..=end];

    // Collapse `{{ ... }}` left over from template escaping.
    while object.starts_with("{{") && object.ends_with("}}") {
        object = &object[1..object.len() - 1];
    }
    Ok(object.to_string())
}
