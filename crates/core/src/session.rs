//! Session State Store
//!
//! Each interview is an explicit `Session` record with a single mutation entry
//! point, [`SessionRecord::apply_turn`]. Records live behind one fair async
//! mutex per session: a whole turn (judgment call included) runs while the
//! lock is held, so turns for a session are applied strictly in submission
//! order while different sessions never contend on the same lock.

use crate::decision::ConductorAction;
use crate::error::{ConductorError, Result};
use crate::topic::{InterviewType, TopicCatalog};
use crate::validator::VerdictReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;

pub type SessionId = Uuid;

/// Interview phases. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Introduction,
    Questioning,
    ClosingQna,
    Completed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::Introduction => "introduction",
            Phase::Questioning => "questioning",
            Phase::ClosingQna => "closing_qna",
            Phase::Completed => "completed",
        }
    }

    /// The only phase reachable from this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::NotStarted => Some(Phase::Introduction),
            Phase::Introduction => Some(Phase::Questioning),
            Phase::Questioning => Some(Phase::ClosingQna),
            Phase::ClosingQna => Some(Phase::Completed),
            Phase::Completed => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-interview metadata, used for phrasing and catalog filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewContext {
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub interview_type: InterviewType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::Interviewer => "interviewer",
            Speaker::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "Interviewer"),
            Speaker::Candidate => write!(f, "Candidate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// One applied candidate turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub sequence: u32,
    pub action: ConductorAction,
    pub reason: VerdictReason,
    pub topic_before: Option<String>,
    pub topic_after: Option<String>,
    pub utterance: String,
    /// The catalog topic the judgment's advisory hint resolved to, if any.
    pub hint_topic_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// The input to [`SessionRecord::apply_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnUpdate {
    pub topic_after: String,
    pub action: ConductorAction,
    pub reason: VerdictReason,
    pub utterance: String,
    pub hint_topic_id: Option<String>,
}

impl TurnUpdate {
    pub fn new(topic_after: impl Into<String>, action: ConductorAction) -> Self {
        Self {
            topic_after: topic_after.into(),
            action,
            reason: VerdictReason::Accepted,
            utterance: String::new(),
            hint_topic_id: None,
        }
    }

    pub fn with_reason(mut self, reason: VerdictReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_utterance(mut self, utterance: impl Into<String>) -> Self {
        self.utterance = utterance.into();
        self
    }

    pub fn with_hint(mut self, hint_topic_id: Option<String>) -> Self {
        self.hint_topic_id = hint_topic_id;
        self
    }
}

/// The state of one interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub catalog: Arc<TopicCatalog>,
    pub context: InterviewContext,
    /// Visited topics in visit order; never shrinks, never repeats.
    pub visited_topic_ids: Vec<String>,
    pub current_topic_id: Option<String>,
    pub follow_up_count: BTreeMap<String, u32>,
    pub turn_count: u32,
    pub phase: Phase,
    pub closing_exchanges: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, catalog: Arc<TopicCatalog>, context: InterviewContext) -> Self {
        let now = Utc::now();
        Self {
            id,
            catalog,
            context,
            visited_topic_ids: Vec::new(),
            current_topic_id: None,
            follow_up_count: BTreeMap::new(),
            turn_count: 0,
            phase: Phase::NotStarted,
            closing_exchanges: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn current_topic(&self) -> Option<&crate::topic::Topic> {
        self.current_topic_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    /// Follow-ups received by the current topic, 0 if there is none.
    pub fn current_follow_ups(&self) -> u32 {
        self.current_topic_id
            .as_ref()
            .and_then(|id| self.follow_up_count.get(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_visited(&self, topic_id: &str) -> bool {
        self.visited_topic_ids.iter().any(|id| id == topic_id)
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self)
    }

    /// Panics if any structural invariant of the session is broken.
    ///
    /// These can only be broken by a bug in the conductor itself, so they are
    /// asserted rather than reported.
    pub fn assert_invariants(&self) {
        if let Some(current) = &self.current_topic_id {
            assert!(
                self.has_visited(current),
                "session {}: current topic '{}' is not in the visited set",
                self.id,
                current
            );
        }
        let mut seen = std::collections::HashSet::new();
        for id in &self.visited_topic_ids {
            assert!(
                self.catalog.contains(id),
                "session {}: visited topic '{}' is not in the catalog",
                self.id,
                id
            );
            assert!(
                seen.insert(id.as_str()),
                "session {}: topic '{}' visited twice",
                self.id,
                id
            );
        }
        for id in self.follow_up_count.keys() {
            assert!(
                self.has_visited(id),
                "session {}: follow-up counter for unvisited topic '{}'",
                self.id,
                id
            );
        }
    }
}

/// Coarse interview progress for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub topics_visited: usize,
    pub topics_total: usize,
    pub percentage: u8,
    pub stage: String,
}

impl Progress {
    fn of(session: &Session) -> Self {
        let visited = session.visited_topic_ids.len();
        let total = session.catalog.len();
        let (percentage, stage) = match session.phase {
            Phase::NotStarted | Phase::Introduction => (0, "introduction"),
            Phase::ClosingQna => (95, "completion"),
            Phase::Completed => (100, "completed"),
            Phase::Questioning => {
                let ratio = if total == 0 { 1.0 } else { visited as f64 / total as f64 };
                let percentage = (10.0 + ratio * 80.0).round() as u8;
                let stage = if ratio <= 0.5 { "exploration" } else { "deep_dive" };
                (percentage, stage)
            }
        };
        Self {
            topics_visited: visited,
            topics_total: total,
            percentage,
            stage: stage.to_string(),
        }
    }
}

/// A session together with its turn log and transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session: Session,
    pub turns: Vec<Turn>,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionRecord {
    fn new(session: Session) -> Self {
        Self {
            session,
            turns: Vec::new(),
            transcript: Vec::new(),
        }
    }

    /// Applies one candidate turn atomically.
    ///
    /// Increments `turn_count`. If `topic_after` differs from the current
    /// topic it becomes current, is marked visited and gets a zeroed
    /// counter. A follow-up action on the current topic increments its
    /// counter. A topic-changing action that names the current topic (the
    /// catalog is exhausted) leaves the counters alone.
    pub fn apply_turn(&mut self, update: TurnUpdate) -> Result<&Session> {
        let session = &mut self.session;
        if session.phase == Phase::Completed {
            return Err(ConductorError::InvalidTransition {
                phase: session.phase,
                action: "apply a turn",
            });
        }
        assert!(
            session.catalog.contains(&update.topic_after),
            "session {}: topic '{}' is not in the catalog",
            session.id,
            update.topic_after
        );

        let topic_before = session.current_topic_id.clone();
        let moves = topic_before.as_deref() != Some(update.topic_after.as_str());

        if moves {
            assert!(
                !update.action.keeps_topic(),
                "session {}: {} cannot move to topic '{}'",
                session.id,
                update.action,
                update.topic_after
            );
            assert!(
                !session.has_visited(&update.topic_after),
                "session {}: topic '{}' was already visited",
                session.id,
                update.topic_after
            );
            session.visited_topic_ids.push(update.topic_after.clone());
            session
                .follow_up_count
                .insert(update.topic_after.clone(), 0);
            session.current_topic_id = Some(update.topic_after.clone());
        } else if update.action.keeps_topic() {
            let id = session.id;
            let counter = session
                .follow_up_count
                .get_mut(&update.topic_after)
                .unwrap_or_else(|| {
                    panic!(
                        "session {}: no follow-up counter for current topic '{}'",
                        id, update.topic_after
                    )
                });
            *counter += 1;
        }

        session.turn_count += 1;
        session.updated_at = Utc::now();

        self.turns.push(Turn {
            sequence: session.turn_count,
            action: update.action,
            reason: update.reason,
            topic_before,
            topic_after: Some(update.topic_after),
            utterance: update.utterance,
            hint_topic_id: update.hint_topic_id,
            recorded_at: session.updated_at,
        });

        session.assert_invariants();
        debug!(
            session_id = %session.id,
            turn = session.turn_count,
            action = %update.action,
            "Turn applied"
        );
        Ok(&self.session)
    }

    /// Moves the session one phase forward.
    ///
    /// Callers check the phase before mutating; a skip or a backward move
    /// here is a bug.
    pub fn advance_phase(&mut self, to: Phase) {
        let from = self.session.phase;
        assert_eq!(
            from.next(),
            Some(to),
            "session {}: illegal phase change {} -> {}",
            self.session.id,
            from,
            to
        );
        self.session.phase = to;
        self.session.updated_at = Utc::now();
        debug!(session_id = %self.session.id, %from, %to, "Phase advanced");
    }

    pub fn record_closing_exchange(&mut self) -> u32 {
        self.session.closing_exchanges += 1;
        self.session.updated_at = Utc::now();
        self.session.closing_exchanges
    }

    pub fn push_transcript(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            speaker,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// The last `n` transcript entries, oldest first.
    pub fn transcript_tail(&self, n: usize) -> &[TranscriptEntry] {
        let start = self.transcript.len().saturating_sub(n);
        &self.transcript[start..]
    }
}

/// In-memory key-value store of session records.
///
/// The map itself is only locked long enough to look up or insert a record,
/// so a slow turn on one session never blocks another session.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionRecord>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session in the `not_started` phase.
    pub async fn create(
        &self,
        id: SessionId,
        catalog: Arc<TopicCatalog>,
        context: InterviewContext,
    ) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(ConductorError::SessionAlreadyExists(id));
        }
        let session = Session::new(id, catalog, context);
        sessions.insert(id, Arc::new(Mutex::new(SessionRecord::new(session.clone()))));
        Ok(session)
    }

    /// A snapshot of the session.
    pub async fn get(&self, id: SessionId) -> Result<Session> {
        Ok(self.checkout(id).await?.session.clone())
    }

    /// A snapshot of the whole record, turns and transcript included.
    pub async fn record(&self, id: SessionId) -> Result<SessionRecord> {
        Ok(self.checkout(id).await?.clone())
    }

    /// Locks the session for the duration of a turn.
    ///
    /// Waiters are served in the order they asked for the lock.
    pub async fn checkout(&self, id: SessionId) -> Result<OwnedMutexGuard<SessionRecord>> {
        let record = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&id)
                .cloned()
                .ok_or(ConductorError::SessionNotFound(id))?
        };
        Ok(record.lock_owned().await)
    }

    /// Applies a turn under the session's lock and returns the new state.
    pub async fn apply_turn(&self, id: SessionId, update: TurnUpdate) -> Result<Session> {
        let mut record = self.checkout(id).await?;
        record.apply_turn(update).cloned()
    }

    /// Forgets a session. Turns already waiting on its lock still finish.
    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Topic;
    use ConductorAction::*;

    fn catalog() -> Arc<TopicCatalog> {
        Arc::new(
            TopicCatalog::new(vec![
                Topic::new("T1", "technical", 1, "Explain T1."),
                Topic::new("T2", "technical", 2, "Explain T2."),
                Topic::new("T3", "behavioral", 1, "Describe T3."),
            ])
            .unwrap(),
        )
    }

    async fn store_with_session() -> (SessionStore, SessionId) {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store
            .create(id, catalog(), InterviewContext::default())
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (store, id) = store_with_session().await;
        let session = store.get(id).await.unwrap();
        assert_eq!(session.phase, Phase::NotStarted);
        assert_eq!(session.turn_count, 0);
        assert!(session.visited_topic_ids.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let (store, id) = store_with_session().await;
        let err = store
            .create(id, catalog(), InterviewContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConductorError::SessionAlreadyExists(e) if e == id));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.get(id).await,
            Err(ConductorError::SessionNotFound(e)) if e == id
        ));
        assert!(matches!(
            store.apply_turn(id, TurnUpdate::new("T1", Transition)).await,
            Err(ConductorError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_turn_visits_and_counts() {
        let (store, id) = store_with_session().await;

        let s = store
            .apply_turn(id, TurnUpdate::new("T1", Transition))
            .await
            .unwrap();
        assert_eq!(s.current_topic_id.as_deref(), Some("T1"));
        assert_eq!(s.follow_up_count["T1"], 0);
        assert_eq!(s.turn_count, 1);

        store.apply_turn(id, TurnUpdate::new("T1", Deepen)).await.unwrap();
        let s = store
            .apply_turn(id, TurnUpdate::new("T1", Challenge))
            .await
            .unwrap();
        assert_eq!(s.follow_up_count["T1"], 2);
        assert_eq!(s.current_follow_ups(), 2);

        let s = store
            .apply_turn(id, TurnUpdate::new("T3", ConcedeAndPivot))
            .await
            .unwrap();
        assert_eq!(s.visited_topic_ids, vec!["T1", "T3"]);
        assert_eq!(s.current_topic_id.as_deref(), Some("T3"));
        assert_eq!(s.follow_up_count["T3"], 0);
        assert_eq!(s.follow_up_count["T1"], 2);
        assert_eq!(s.turn_count, 4);

        let record = store.record(id).await.unwrap();
        let sequences: Vec<u32> = record.turns.iter().map(|t| t.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
        assert_eq!(record.turns[3].topic_before.as_deref(), Some("T1"));
        assert_eq!(record.turns[3].topic_after.as_deref(), Some("T3"));
    }

    #[tokio::test]
    async fn test_exhausted_transition_keeps_counters() {
        let (store, id) = store_with_session().await;
        store.apply_turn(id, TurnUpdate::new("T1", Transition)).await.unwrap();
        let s = store
            .apply_turn(id, TurnUpdate::new("T1", Transition))
            .await
            .unwrap();
        assert_eq!(s.follow_up_count["T1"], 0);
        assert_eq!(s.turn_count, 2);
        assert_eq!(s.visited_topic_ids, vec!["T1"]);
    }

    #[tokio::test]
    async fn test_apply_turn_rejected_when_completed() {
        let (store, id) = store_with_session().await;
        {
            let mut record = store.checkout(id).await.unwrap();
            for phase in [
                Phase::Introduction,
                Phase::Questioning,
                Phase::ClosingQna,
                Phase::Completed,
            ] {
                record.advance_phase(phase);
            }
        }
        let err = store
            .apply_turn(id, TurnUpdate::new("T1", Transition))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConductorError::InvalidTransition {
                phase: Phase::Completed,
                ..
            }
        ));
    }

    #[tokio::test]
    #[should_panic(expected = "already visited")]
    async fn test_revisit_is_a_programming_error() {
        let (store, id) = store_with_session().await;
        store.apply_turn(id, TurnUpdate::new("T1", Transition)).await.unwrap();
        store.apply_turn(id, TurnUpdate::new("T3", Transition)).await.unwrap();
        let _ = store.apply_turn(id, TurnUpdate::new("T1", Transition)).await;
    }

    #[tokio::test]
    #[should_panic(expected = "not in the catalog")]
    async fn test_unknown_topic_is_a_programming_error() {
        let (store, id) = store_with_session().await;
        let _ = store.apply_turn(id, TurnUpdate::new("T9", Transition)).await;
    }

    #[tokio::test]
    #[should_panic(expected = "cannot move to topic")]
    async fn test_follow_up_cannot_change_topic() {
        let (store, id) = store_with_session().await;
        store.apply_turn(id, TurnUpdate::new("T1", Transition)).await.unwrap();
        let _ = store.apply_turn(id, TurnUpdate::new("T2", Deepen)).await;
    }

    #[test]
    #[should_panic(expected = "illegal phase change")]
    fn test_phases_cannot_skip() {
        let session = Session::new(Uuid::new_v4(), catalog(), InterviewContext::default());
        let mut record = SessionRecord::new(session);
        record.advance_phase(Phase::Questioning);
    }

    #[tokio::test]
    async fn test_concurrent_turns_are_gap_free() {
        let (store, id) = store_with_session().await;
        let store = Arc::new(store);
        store.apply_turn(id, TurnUpdate::new("T1", Transition)).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .apply_turn(id, TurnUpdate::new("T1", Deepen))
                        .await
                        .unwrap()
                        .turn_count
                })
            })
            .collect();
        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();
        assert_eq!(counts, (2..=33).collect::<Vec<u32>>());

        let record = store.record(id).await.unwrap();
        let sequences: Vec<u32> = record.turns.iter().map(|t| t.sequence).collect();
        assert_eq!(sequences, (1..=33).collect::<Vec<u32>>());
        assert_eq!(record.session.follow_up_count["T1"], 32);
    }

    #[tokio::test]
    async fn test_concurrent_turns_to_different_topics() {
        let (store, id) = store_with_session().await;
        store.apply_turn(id, TurnUpdate::new("T1", Transition)).await.unwrap();

        let (a, b) = futures::join!(
            store.apply_turn(id, TurnUpdate::new("T2", Transition)),
            store.apply_turn(id, TurnUpdate::new("T3", Transition)),
        );
        let mut counts = vec![a.unwrap().turn_count, b.unwrap().turn_count];
        counts.sort_unstable();
        assert_eq!(counts, vec![2, 3]);

        let session = store.get(id).await.unwrap();
        assert_eq!(session.visited_topic_ids.len(), 3);
        assert_eq!(session.turn_count, 3);
        session.assert_invariants();
    }

    #[tokio::test]
    async fn test_sessions_do_not_block_each_other() {
        let store = SessionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.create(a, catalog(), InterviewContext::default()).await.unwrap();
        store.create(b, catalog(), InterviewContext::default()).await.unwrap();

        let _held = store.checkout(a).await.unwrap();
        let s = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.apply_turn(b, TurnUpdate::new("T1", Transition)),
        )
        .await
        .expect("session b must not wait for session a")
        .unwrap();
        assert_eq!(s.turn_count, 1);
    }

    #[tokio::test]
    async fn test_remove_while_checked_out() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.create(id, catalog(), InterviewContext::default()).await.unwrap();

        let held = store.checkout(id).await.unwrap();
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert_eq!(held.session.id, id);
        drop(held);
        assert!(matches!(
            store.get(id).await.unwrap_err(),
            ConductorError::SessionNotFound(_)
        ));
    }

    #[test]
    fn test_transcript_tail() {
        let session = Session::new(Uuid::new_v4(), catalog(), InterviewContext::default());
        let mut record = SessionRecord::new(session);
        for i in 0..5 {
            record.push_transcript(Speaker::Candidate, format!("answer {}", i));
        }
        let tail: Vec<&str> = record.transcript_tail(2).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(tail, vec!["answer 3", "answer 4"]);
        assert_eq!(record.transcript_tail(10).len(), 5);
    }

    #[test]
    fn test_progress_stages() {
        let mut session = Session::new(Uuid::new_v4(), catalog(), InterviewContext::default());
        assert_eq!(session.progress().stage, "introduction");

        session.phase = Phase::Questioning;
        session.visited_topic_ids = vec!["T1".into()];
        let progress = session.progress();
        assert_eq!(progress.stage, "exploration");
        assert_eq!(progress.topics_total, 3);
        assert_eq!(progress.percentage, 37);

        session.phase = Phase::Completed;
        assert_eq!(session.progress().percentage, 100);
    }

    #[test]
    fn test_session_serialization() {
        let session = Session::new(Uuid::new_v4(), catalog(), InterviewContext::default());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["phase"], "not_started");
        assert_eq!(json["turnCount"], 0);
        assert_eq!(json["catalog"][2]["id"], "T3");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
