//! Interview State Machine
//!
//! Drives a session through `not_started → introduction → questioning →
//! closing_qna → completed`. Each public call is one logical turn and runs
//! under the session's lock from start to finish, judgment call included.
//!
//! The judgment collaborator only ever *proposes*. The validator decides
//! whether a topic change is allowed and the selector decides which topic
//! comes next; the collaborator's wording is kept where it does not
//! contradict either.

use crate::decision::{ConductorAction, ConductorDecision};
use crate::error::{ConductorError, Result};
use crate::judgment::{ClosingRequest, JudgmentClient, JudgmentRequest};
use crate::phrasing;
use crate::selector::{RotationPolicy, Selection, select_next_with};
use crate::session::{
    InterviewContext, Phase, Progress, Session, SessionId, SessionRecord, SessionStore, Speaker,
    TranscriptEntry, TurnUpdate,
};
use crate::topic::{InterviewType, TopicCatalog};
use crate::validator::{
    DEFAULT_MAX_FOLLOW_UPS, DEFAULT_MIN_FOLLOW_UPS, TransitionValidator, VerdictReason,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_MAX_TURNS: u32 = 30;
pub const DEFAULT_JUDGMENT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_JUDGMENT_ATTEMPTS: u32 = 2;
pub const DEFAULT_TRANSCRIPT_TAIL: usize = 12;
pub const DEFAULT_CLOSING_MAX_EXCHANGES: u32 = 3;

/// Tunables of a conductor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConductorConfig {
    pub min_follow_ups: u32,
    /// `None` disables the follow-up ceiling.
    pub max_follow_ups: Option<u32>,
    /// Applied turns after which questioning ends regardless of coverage.
    pub max_turns: u32,
    pub judgment_timeout: Duration,
    pub judgment_attempts: u32,
    /// Transcript entries handed to the judgment collaborator.
    pub transcript_tail: usize,
    pub closing_max_exchanges: u32,
    pub rotation: RotationPolicy,
    /// Drop a completed session from memory once the archive accepted it.
    pub evict_archived: bool,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            min_follow_ups: DEFAULT_MIN_FOLLOW_UPS,
            max_follow_ups: Some(DEFAULT_MAX_FOLLOW_UPS),
            max_turns: DEFAULT_MAX_TURNS,
            judgment_timeout: DEFAULT_JUDGMENT_TIMEOUT,
            judgment_attempts: DEFAULT_JUDGMENT_ATTEMPTS,
            transcript_tail: DEFAULT_TRANSCRIPT_TAIL,
            closing_max_exchanges: DEFAULT_CLOSING_MAX_EXCHANGES,
            rotation: RotationPolicy::default(),
            evict_archived: false,
        }
    }
}

/// Receives every session that reaches `completed`.
#[async_trait]
pub trait SessionArchive: Send + Sync {
    async fn archive(&self, record: &SessionRecord) -> anyhow::Result<()>;
}

/// What the caller gets back from every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub session_id: SessionId,
    pub phase: Phase,
    pub utterance: String,
    pub topic_id: Option<String>,
    /// The applied action, for turns that went through the validator.
    pub action: Option<ConductorAction>,
    pub turn_count: u32,
}

impl TurnOutcome {
    fn of(record: &SessionRecord, utterance: String, action: Option<ConductorAction>) -> Self {
        let session = &record.session;
        Self {
            session_id: session.id,
            phase: session.phase,
            utterance,
            topic_id: session.current_topic_id.clone(),
            action,
            turn_count: session.turn_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session: Session,
    pub progress: Progress,
}

pub struct InterviewConductor {
    store: SessionStore,
    judge: Arc<dyn JudgmentClient>,
    archive: Option<Arc<dyn SessionArchive>>,
    validator: TransitionValidator,
    config: ConductorConfig,
}

impl InterviewConductor {
    pub fn new(judge: Arc<dyn JudgmentClient>, config: ConductorConfig) -> Self {
        Self {
            store: SessionStore::new(),
            judge,
            archive: None,
            validator: TransitionValidator::new(config.min_follow_ups, config.max_follow_ups),
            config,
        }
    }

    pub fn with_archive(mut self, archive: Arc<dyn SessionArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Creates the session and greets the candidate.
    ///
    /// The catalog is filtered by the interview type once, here; an empty
    /// result is `CatalogExhaustedPrematurely`.
    #[instrument(skip(self, catalog, context), fields(session_id = %id))]
    pub async fn initialize(
        &self,
        id: SessionId,
        catalog: Arc<TopicCatalog>,
        context: InterviewContext,
    ) -> Result<TurnOutcome> {
        let catalog = match context.interview_type {
            InterviewType::TechnicalBehavioral => catalog,
            other => Arc::new(catalog.for_interview_type(other)),
        };
        if catalog.is_empty() {
            return Err(ConductorError::CatalogExhaustedPrematurely);
        }

        self.store.create(id, catalog, context).await?;
        let mut record = self.store.checkout(id).await?;
        record.advance_phase(Phase::Introduction);
        let greeting = phrasing::greeting(&record.session.context);
        record.push_transcript(Speaker::Interviewer, greeting.clone());
        info!(
            topics = record.session.catalog.len(),
            interview_type = ?record.session.context.interview_type,
            "Interview initialized"
        );
        Ok(TurnOutcome::of(&record, greeting, None))
    }

    /// Takes the self-introduction and opens the first topic.
    #[instrument(skip(self, introduction), fields(session_id = %id))]
    pub async fn submit_introduction(&self, id: SessionId, introduction: &str) -> Result<TurnOutcome> {
        let mut record = self.store.checkout(id).await?;
        let phase = record.session.phase;
        if phase != Phase::Introduction {
            return Err(ConductorError::InvalidTransition {
                phase,
                action: "submit an introduction",
            });
        }

        let first = match select_next_with(
            &record.session.catalog,
            &record.session.visited_topic_ids,
            self.config.rotation,
        )? {
            Selection::Next(topic) => topic.clone(),
            Selection::Exhausted => return Err(ConductorError::CatalogExhaustedPrematurely),
        };

        record.push_transcript(Speaker::Candidate, introduction);
        record.advance_phase(Phase::Questioning);
        let utterance = phrasing::first_topic(&first);
        record.apply_turn(
            TurnUpdate::new(first.id.clone(), ConductorAction::Transition)
                .with_utterance(utterance.clone()),
        )?;
        record.push_transcript(Speaker::Interviewer, utterance.clone());
        info!(topic = %first.id, "First topic selected");
        Ok(TurnOutcome::of(&record, utterance, Some(ConductorAction::Transition)))
    }

    /// Takes a candidate message: an answer while questioning, a question
    /// during the closing Q&A.
    #[instrument(skip(self, message), fields(session_id = %id))]
    pub async fn submit_answer(&self, id: SessionId, message: &str) -> Result<TurnOutcome> {
        let mut record = self.store.checkout(id).await?;
        match record.session.phase {
            Phase::Questioning => self.questioning_turn(&mut record, message).await,
            Phase::ClosingQna => self.closing_turn(&mut record, message).await,
            phase => Err(ConductorError::InvalidTransition {
                phase,
                action: "submit an answer",
            }),
        }
    }

    pub async fn get_status(&self, id: SessionId) -> Result<SessionSnapshot> {
        let session = self.store.get(id).await?;
        Ok(SessionSnapshot {
            progress: session.progress(),
            session,
        })
    }

    pub async fn transcript(&self, id: SessionId) -> Result<Vec<TranscriptEntry>> {
        Ok(self.store.checkout(id).await?.transcript.clone())
    }

    pub async fn record(&self, id: SessionId) -> Result<SessionRecord> {
        self.store.record(id).await
    }

    async fn questioning_turn(
        &self,
        record: &mut SessionRecord,
        answer: &str,
    ) -> Result<TurnOutcome> {
        record.push_transcript(Speaker::Candidate, answer);

        let session_id = record.session.id;
        let topic = record.session.current_topic().cloned().unwrap_or_else(|| {
            panic!("session {}: questioning without a current topic", session_id)
        });
        let follow_ups = record.session.current_follow_ups();

        let request = JudgmentRequest {
            context: record.session.context.clone(),
            topic: topic.clone(),
            follow_up_count: follow_ups,
            min_follow_ups: self.validator.min_follow_ups(),
            answer: answer.to_string(),
            transcript_tail: record.transcript_tail(self.config.transcript_tail).to_vec(),
        };
        let decision: Option<ConductorDecision> =
            match self.consult(|| self.judge.decide(&request)).await {
                Ok(decision) => Some(decision),
                Err(e) => {
                    warn!(error = %e, follow_ups, "Using safe default action");
                    None
                }
            };

        let conceded = phrasing::is_concession(answer);
        let (proposed, origin) = match &decision {
            Some(d) if conceded && d.action.keeps_topic() => {
                (ConductorAction::ConcedeAndPivot, VerdictReason::ConcessionDetected)
            }
            Some(d) => (d.action, VerdictReason::Accepted),
            None if conceded => {
                (ConductorAction::ConcedeAndPivot, VerdictReason::ConcessionDetected)
            }
            None => (
                self.validator.safe_default(follow_ups),
                VerdictReason::JudgmentFallback,
            ),
        };
        let verdict = self.validator.check_with_reason(proposed, follow_ups, origin);
        let effective = verdict.effective;
        if effective != proposed {
            info!(%proposed, %effective, reason = ?verdict.reason, follow_ups, "Proposal overridden");
        }

        let hint_topic_id = decision
            .as_ref()
            .and_then(|d| d.suggested_topic_hint.as_deref())
            .and_then(|hint| record.session.catalog.resolve_hint(hint))
            .map(|t| t.id.clone());
        // Wording written for an action other than the applied one is dropped.
        let judged = decision
            .as_ref()
            .filter(|d| d.action == effective)
            .map(|d| d.utterance.trim())
            .filter(|u| !u.is_empty());

        let at_ceiling = record.session.turn_count + 1 >= self.config.max_turns;
        if at_ceiling {
            info!(max_turns = self.config.max_turns, "Turn ceiling reached");
        }

        let (topic_after, utterance, closes) = if effective.keeps_topic() {
            let utterance = judged
                .map(str::to_string)
                .unwrap_or_else(|| phrasing::generic_deepen(Some(&topic)));
            (topic.id.clone(), utterance, at_ceiling)
        } else if at_ceiling {
            (topic.id.clone(), String::new(), true)
        } else {
            match select_next_with(
                &record.session.catalog,
                &record.session.visited_topic_ids,
                self.config.rotation,
            )? {
                Selection::Next(next) => {
                    if let Some(hint) = hint_topic_id.as_deref().filter(|h| *h != next.id) {
                        debug!(hint, selected = %next.id, "Advisory hint not followed");
                    }
                    let utterance = if effective == ConductorAction::ConcedeAndPivot {
                        phrasing::compose_concession_pivot(next)
                    } else {
                        phrasing::compose_transition(judged, next)
                    };
                    (next.id.clone(), utterance, false)
                }
                Selection::Exhausted => {
                    info!(
                        topics = record.session.visited_topic_ids.len(),
                        "All topics visited"
                    );
                    (topic.id.clone(), String::new(), true)
                }
            }
        };
        let utterance = if closes {
            let bridge = judged.filter(|_| effective.changes_topic());
            phrasing::closing_invitation(bridge, &record.session.context)
        } else {
            utterance
        };

        record.apply_turn(
            TurnUpdate::new(topic_after, effective)
                .with_reason(verdict.reason)
                .with_utterance(utterance.clone())
                .with_hint(hint_topic_id),
        )?;
        record.push_transcript(Speaker::Interviewer, utterance.clone());
        if closes {
            record.advance_phase(Phase::ClosingQna);
        }
        Ok(TurnOutcome::of(record, utterance, Some(effective)))
    }

    async fn closing_turn(&self, record: &mut SessionRecord, question: &str) -> Result<TurnOutcome> {
        record.push_transcript(Speaker::Candidate, question);

        if phrasing::wants_to_end(question) {
            info!("Candidate has no further questions");
            let utterance = phrasing::farewell();
            record.push_transcript(Speaker::Interviewer, utterance.clone());
            self.complete(record).await;
            return Ok(TurnOutcome::of(record, utterance, None));
        }

        let exchanges = record.record_closing_exchange();
        let is_final = exchanges >= self.config.closing_max_exchanges;
        let request = ClosingRequest {
            context: record.session.context.clone(),
            question: question.to_string(),
            is_final,
            transcript_tail: record.transcript_tail(self.config.transcript_tail).to_vec(),
        };
        let answer = match self.consult(|| self.judge.answer_question(&request)).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Using generic closing answer");
                phrasing::fallback_closing_answer(&record.session.context)
            }
        };

        let utterance = phrasing::finish_closing_answer(&answer, is_final);
        record.push_transcript(Speaker::Interviewer, utterance.clone());
        if is_final {
            self.complete(record).await;
        }
        Ok(TurnOutcome::of(record, utterance, None))
    }

    async fn complete(&self, record: &mut SessionRecord) {
        record.advance_phase(Phase::Completed);
        info!(
            turns = record.session.turn_count,
            topics = record.session.visited_topic_ids.len(),
            "Interview completed"
        );
        let Some(archive) = &self.archive else {
            return;
        };
        match archive.archive(record).await {
            Ok(()) if self.config.evict_archived => {
                self.store.remove(record.session.id).await;
                debug!("Archived session evicted from memory");
            }
            Ok(()) => {}
            Err(e) => warn!(error = ?e, "Failed to archive completed session"),
        }
    }

    /// Calls the judgment collaborator with a per-attempt timeout.
    async fn consult<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let attempts = self.config.judgment_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.config.judgment_timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    warn!(attempt, attempts, error = %e, "Judgment call failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(
                        attempt,
                        attempts,
                        timeout_ms = self.config.judgment_timeout.as_millis() as u64,
                        "Judgment call timed out"
                    );
                    last_error = format!("timed out after {:?}", self.config.judgment_timeout);
                }
            }
        }
        Err(ConductorError::JudgmentUnavailable(last_error))
    }
}
