//! Transition Validator
//!
//! The judgment collaborator is reasonably good at deciding *that* a topic
//! change is warranted and unreliable at deciding *when*. The validator puts
//! the "when" under deterministic control: a topic may only be left once it
//! has received a minimum number of follow-ups, and (optionally) must be left
//! once it has received a maximum number.

use crate::decision::ConductorAction;
use serde::{Deserialize, Serialize};

/// Minimum follow-ups before a topic may be left, unless configured otherwise.
pub const DEFAULT_MIN_FOLLOW_UPS: u32 = 2;
/// Follow-ups after which a topic is left regardless of the proposal.
pub const DEFAULT_MAX_FOLLOW_UPS: u32 = 3;

/// Applies the minimum-depth rule.
///
/// A topic change proposed before `min_follow_ups_before_transition`
/// follow-ups is demoted to `Deepen`; anything else passes through.
pub fn validate(
    proposed: ConductorAction,
    follow_up_count: u32,
    min_follow_ups_before_transition: u32,
) -> ConductorAction {
    if proposed.changes_topic() && follow_up_count < min_follow_ups_before_transition {
        ConductorAction::Deepen
    } else {
        proposed
    }
}

/// Why the effective action of a turn is what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// The proposal was applied unchanged.
    Accepted,
    /// A topic change was proposed before the minimum depth was reached.
    DemotedTooEarly,
    /// A follow-up was proposed after the follow-up ceiling was reached.
    ForcedByFollowUpCeiling,
    /// The candidate conceded, so the proposal was replaced by a pivot.
    ConcessionDetected,
    /// The judgment collaborator was unavailable; a safe default was used.
    JudgmentFallback,
}

impl VerdictReason {
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictReason::Accepted => "accepted",
            VerdictReason::DemotedTooEarly => "demoted_too_early",
            VerdictReason::ForcedByFollowUpCeiling => "forced_by_follow_up_ceiling",
            VerdictReason::ConcessionDetected => "concession_detected",
            VerdictReason::JudgmentFallback => "judgment_fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub effective: ConductorAction,
    pub reason: VerdictReason,
}

/// The validator as configured for a conductor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionValidator {
    min_follow_ups: u32,
    max_follow_ups: Option<u32>,
}

impl Default for TransitionValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FOLLOW_UPS, Some(DEFAULT_MAX_FOLLOW_UPS))
    }
}

impl TransitionValidator {
    /// A ceiling below the minimum would make the two rules contradict each
    /// other, so it is raised to the minimum.
    pub fn new(min_follow_ups: u32, max_follow_ups: Option<u32>) -> Self {
        Self {
            min_follow_ups,
            max_follow_ups: max_follow_ups.map(|max| max.max(min_follow_ups)),
        }
    }

    pub fn min_follow_ups(&self) -> u32 {
        self.min_follow_ups
    }

    pub fn max_follow_ups(&self) -> Option<u32> {
        self.max_follow_ups
    }

    /// Validates a proposal coming from the judgment collaborator.
    pub fn check(&self, proposed: ConductorAction, follow_up_count: u32) -> Verdict {
        self.check_with_reason(proposed, follow_up_count, VerdictReason::Accepted)
    }

    /// Validates a proposal whose origin already carries a reason (a detected
    /// concession or a fallback); the reason is kept unless a rule overrides
    /// the action.
    pub fn check_with_reason(
        &self,
        proposed: ConductorAction,
        follow_up_count: u32,
        origin: VerdictReason,
    ) -> Verdict {
        if let Some(max) = self.max_follow_ups {
            if proposed.keeps_topic() && follow_up_count >= max {
                return Verdict {
                    effective: ConductorAction::Transition,
                    reason: VerdictReason::ForcedByFollowUpCeiling,
                };
            }
        }

        let effective = validate(proposed, follow_up_count, self.min_follow_ups);
        let reason = if effective != proposed {
            VerdictReason::DemotedTooEarly
        } else {
            origin
        };
        Verdict { effective, reason }
    }

    /// The action used when no judgment could be obtained.
    pub fn safe_default(&self, follow_up_count: u32) -> ConductorAction {
        if follow_up_count < self.min_follow_ups {
            ConductorAction::Deepen
        } else {
            ConductorAction::Transition
        }
    }
}
