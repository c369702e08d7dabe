//! API Models
//!
//! Request and response bodies of the HTTP API, with `utoipa` schemas for the
//! OpenAPI document. Conductor types are mapped into these at the edge so the
//! core crate stays free of HTTP concerns.

use chrono::{DateTime, Utc};
use conductor_core::{
    InterviewContext, InterviewType, SessionSnapshot, Topic, TopicCatalog, TurnOutcome,
    session::TranscriptEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicPayload {
    #[schema(example = "load-paths")]
    pub id: String,
    #[schema(example = "technical")]
    pub category: String,
    #[schema(example = 1)]
    pub priority_rank: u32,
    #[schema(example = "Walk me through how you would trace the load path in a truss.")]
    pub seed_text: String,
}

impl From<TopicPayload> for Topic {
    fn from(payload: TopicPayload) -> Self {
        Topic::new(
            payload.id,
            payload.category,
            payload.priority_rank,
            payload.seed_text,
        )
    }
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionPayload {
    /// Client-chosen id; one is generated when omitted.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub session_id: Option<Uuid>,
    pub topics: Vec<TopicPayload>,
    #[schema(example = "Ada")]
    pub candidate_name: Option<String>,
    #[schema(example = "Structural Engineer")]
    pub position: Option<String>,
    #[schema(example = "Acme")]
    pub company: Option<String>,
    /// `technical_behavioral` (default), `technical_only` or `behavioral_only`.
    #[schema(example = "technical_behavioral")]
    pub interview_type: Option<String>,
}

impl CreateSessionPayload {
    /// Splits the payload into the catalog and the interview context.
    pub fn into_parts(self) -> Result<(TopicCatalog, InterviewContext), String> {
        let interview_type = match self.interview_type.as_deref() {
            Some(raw) => raw.parse::<InterviewType>()?,
            None => InterviewType::default(),
        };
        let catalog = TopicCatalog::new(self.topics.into_iter().map(Topic::from).collect())
            .map_err(|e| e.to_string())?;
        let context = InterviewContext {
            candidate_name: self.candidate_name,
            position: self.position,
            company: self.company,
            interview_type,
        };
        Ok((catalog, context))
    }
}

/// A candidate message: the introduction, an answer, or a closing question.
#[derive(Deserialize, ToSchema, Debug)]
pub struct MessagePayload {
    #[schema(example = "I'd start by drawing the free-body diagram.")]
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    #[schema(example = "questioning")]
    pub phase: String,
    pub utterance: String,
    pub topic_id: Option<String>,
    #[schema(example = "DEEPEN")]
    pub action: Option<String>,
    pub turn_count: u32,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            session_id: outcome.session_id,
            phase: outcome.phase.to_string(),
            utterance: outcome.utterance,
            topic_id: outcome.topic_id,
            action: outcome.action.map(|a| a.to_string()),
            turn_count: outcome.turn_count,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub topics_visited: usize,
    pub topics_total: usize,
    pub percentage: u8,
    #[schema(example = "exploration")]
    pub stage: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    #[schema(example = "questioning")]
    pub phase: String,
    pub current_topic_id: Option<String>,
    pub visited_topic_ids: Vec<String>,
    pub follow_up_count: BTreeMap<String, u32>,
    pub turn_count: u32,
    pub closing_exchanges: u32,
    pub progress: ProgressResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionSnapshot> for SessionStatusResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        let SessionSnapshot { session, progress } = snapshot;
        Self {
            id: session.id,
            phase: session.phase.to_string(),
            current_topic_id: session.current_topic_id,
            visited_topic_ids: session.visited_topic_ids,
            follow_up_count: session.follow_up_count,
            turn_count: session.turn_count,
            closing_exchanges: session.closing_exchanges,
            progress: ProgressResponse {
                topics_visited: progress.topics_visited,
                topics_total: progress.topics_total,
                percentage: progress.percentage,
                stage: progress.stage,
            },
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct TranscriptEntryResponse {
    #[schema(example = "candidate")]
    pub speaker: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl From<TranscriptEntry> for TranscriptEntryResponse {
    fn from(entry: TranscriptEntry) -> Self {
        Self {
            speaker: entry.speaker.as_str().to_string(),
            text: entry.text,
            at: entry.at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
