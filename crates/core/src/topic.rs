//! Topic Catalog
//!
//! The catalog is the ordered list of subject areas an interview may visit.
//! It is produced once per session by the external analysis step and is
//! immutable afterwards, so a single `Arc<TopicCatalog>` can be shared by
//! every session built from the same analysis result.

use crate::error::{ConductorError, Result};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single subject area the interview may probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    /// Free-form category tag, e.g. `technical-design` or `behavioral`.
    pub category: String,
    /// Lower ranks are explored earlier.
    pub priority_rank: u32,
    /// Opening question or display text used when the topic becomes current.
    pub seed_text: String,
}

impl Topic {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        priority_rank: u32,
        seed_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            priority_rank,
            seed_text: seed_text.into(),
        }
    }

    /// Technical categories are the ones tagged `technical*`.
    pub fn is_technical(&self) -> bool {
        self.category.to_lowercase().starts_with("technical")
    }
}

/// Which slice of the catalog an interview should cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    #[default]
    TechnicalBehavioral,
    TechnicalOnly,
    BehavioralOnly,
}

impl InterviewType {
    fn admits(self, topic: &Topic) -> bool {
        match self {
            InterviewType::TechnicalBehavioral => true,
            InterviewType::TechnicalOnly => topic.is_technical(),
            InterviewType::BehavioralOnly => !topic.is_technical(),
        }
    }
}

impl std::str::FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "technical_behavioral" | "behavioral_technical" | "mixed" => {
                Ok(InterviewType::TechnicalBehavioral)
            }
            "technical_only" | "technical" => Ok(InterviewType::TechnicalOnly),
            "behavioral_only" | "behavioral" => Ok(InterviewType::BehavioralOnly),
            other => Err(format!("unknown interview type '{}'", other)),
        }
    }
}

/// An ordered, validated, read-only list of topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Topic>", into = "Vec<Topic>")]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Builds a catalog, rejecting blank or duplicate topic ids.
    ///
    /// An empty catalog is accepted here; it is rejected with
    /// `CatalogExhaustedPrematurely` when a session tries to select from it.
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if topic.id.trim().is_empty() {
                return Err(ConductorError::InvalidCatalog(
                    "topic id must not be blank".to_string(),
                ));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(ConductorError::InvalidCatalog(format!(
                    "duplicate topic id '{}'",
                    topic.id
                )));
            }
        }
        Ok(Self { topics })
    }

    /// Returns a new catalog holding only the topics the interview type admits,
    /// preserving catalog order.
    pub fn for_interview_type(&self, interview_type: InterviewType) -> Self {
        Self {
            topics: self
                .topics
                .iter()
                .filter(|t| interview_type.admits(t))
                .cloned()
                .collect(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Position of a topic in catalog order, used as the final tie-break.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.id == id)
    }

    /// Fuzzy-matches an advisory hint from the judgment collaborator against
    /// topic ids and seed texts.
    ///
    /// The result is only ever used for logging whether the judgment agreed
    /// with the selector; it never influences which topic is chosen.
    pub fn resolve_hint(&self, hint: &str) -> Option<&Topic> {
        let hint = hint.trim();
        if hint.is_empty() {
            return None;
        }
        if let Some(exact) = self.topics.iter().find(|t| t.id.eq_ignore_ascii_case(hint)) {
            return Some(exact);
        }
        let matcher = SkimMatcherV2::default().ignore_case();
        self.topics
            .iter()
            .filter_map(|t| {
                let by_id = matcher.fuzzy_match(&t.id, hint);
                let by_seed = matcher.fuzzy_match(&t.seed_text, hint);
                by_id.max(by_seed).map(|score| (score, t))
            })
            // Highest score wins; earlier catalog entries win ties.
            .fold(None, |best: Option<(i64, &Topic)>, (score, t)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, t)),
            })
            .map(|(_, t)| t)
    }
}

impl TryFrom<Vec<Topic>> for TopicCatalog {
    type Error = ConductorError;

    fn try_from(topics: Vec<Topic>) -> Result<Self> {
        Self::new(topics)
    }
}

impl From<TopicCatalog> for Vec<Topic> {
    fn from(catalog: TopicCatalog) -> Self {
        catalog.topics
    }
}
