//! Deterministic interviewer phrasing and candidate-signal detection.
//!
//! Everything the conductor says on its own authority (greetings, pivots it
//! forced, closing lines) is built here, so none of it depends on the
//! judgment collaborator being reachable.

use crate::session::InterviewContext;
use crate::topic::{InterviewType, Topic};

const CONCESSION_PHRASES: &[&str] = &[
    "i don't know",
    "i do not know",
    "dont know",
    "don't know",
    "not sure",
    "i'm not sure",
    "im not sure",
    "can't recall",
    "cannot recall",
    "cant recall",
    "can't remember",
    "cannot remember",
    "cant remember",
    "don't remember",
    "do not remember",
    "dont remember",
    "no idea",
];

const END_PHRASES: &[&str] = &[
    "no",
    "nope",
    "no thanks",
    "no thank you",
    "that's all",
    "that's it",
    "nothing else",
    "no more",
    "no more questions",
    "i'm good",
    "i'm all set",
    "that covers it",
    "no further questions",
    "nothing more",
    "all good",
    "no other questions",
    "that's everything",
    "nothing additional",
];

const NEGATIONS: &[&str] = &["no", "nope", "nah"];

const QUESTION_STARTERS: &[&str] = &[
    "Can you tell me",
    "Could you",
    "What",
    "How",
    "Describe",
    "Walk me through",
    "Tell me about",
];

pub const OTHER_QUESTIONS_PROMPT: &str = "Do you have any other questions?";
pub const FEEDBACK_NOTICE: &str = "Your detailed feedback will be ready shortly.";

/// True if the candidate said they don't know or can't recall.
pub fn is_concession(answer: &str) -> bool {
    let answer = normalize(answer);
    CONCESSION_PHRASES.iter().any(|phrase| answer.contains(phrase))
}

/// True if a closing-phase reply signals the candidate has no more questions.
pub fn wants_to_end(reply: &str) -> bool {
    let words: Vec<String> = normalize(reply)
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    if END_PHRASES.contains(&words.join(" ").as_str()) {
        return true;
    }
    words.len() <= 3 && words.iter().any(|w| NEGATIONS.contains(&w.as_str()))
}

/// Byte offset of the first question the utterance asks: either a known
/// question starter at a word boundary, or the start of the first sentence
/// ending in `?`.
fn question_start(utterance: &str) -> Option<usize> {
    let by_starter = QUESTION_STARTERS
        .iter()
        .flat_map(|starter| {
            utterance
                .match_indices(starter)
                .map(|(at, _)| at)
                .filter(|&at| at_word_boundary(utterance, at, starter.len()))
        })
        .min();
    let by_mark = utterance.find('?').map(|mark| {
        utterance[..mark]
            .rfind(['.', '!'])
            .map_or(0, |end| end + 1)
    });
    match (by_starter, by_mark) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn at_word_boundary(text: &str, at: usize, len: usize) -> bool {
    let before = text[..at].chars().next_back();
    let after = text[at + len..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Keeps only the bridging phrase of a judgment utterance, dropping any
/// question it asked about a topic the selector may not have chosen.
pub fn transition_phrase(utterance: &str) -> String {
    let cut = question_start(utterance).unwrap_or(utterance.len());
    let phrase = utterance[..cut].trim();
    if phrase.is_empty() {
        return String::new();
    }
    if phrase.ends_with(['.', '!', '?']) {
        phrase.to_string()
    } else {
        format!("{}.", phrase)
    }
}

/// Bridges from the judgment's wording into the selected topic's seed text.
pub fn compose_transition(judgment_utterance: Option<&str>, next: &Topic) -> String {
    let bridge = judgment_utterance
        .map(transition_phrase)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "Let's move on to another area.".to_string());
    format!("{} {}", bridge, next.seed_text)
}

/// A pivot after the candidate conceded.
pub fn compose_concession_pivot(next: &Topic) -> String {
    format!(
        "No problem, that's completely understandable. Let's move on to a different area then. {}",
        next.seed_text
    )
}

/// A follow-up question that needs no judgment input.
pub fn generic_deepen(current: Option<&Topic>) -> String {
    match current {
        Some(topic) => format!(
            "Before we move on, I'd like to go a bit deeper on this. Could you elaborate on that point with a specific example from your experience? ({})",
            topic.seed_text
        ),
        None => "Could you elaborate on that point with more specific details?".to_string(),
    }
}

pub fn greeting(context: &InterviewContext) -> String {
    let name = context
        .candidate_name
        .as_deref()
        .map(|n| format!(" {}", n))
        .unwrap_or_default();
    let company = context.company.as_deref().unwrap_or("the company");
    let position = context.position.as_deref().unwrap_or("role");
    let focus = match context.interview_type {
        InterviewType::TechnicalOnly => "technical interview focusing on your technical expertise and problem-solving approach",
        InterviewType::BehavioralOnly => "behavioral interview focusing on your professional experiences and how you handle various situations",
        InterviewType::TechnicalBehavioral => "technical and behavioral interview covering both your technical expertise and past experiences",
    };
    format!(
        "Hi{}, thanks for joining today. This is a {} for the {} position at {}. Can you start by telling me a bit about yourself and what excites you about this position?",
        name, focus, position, company
    )
}

pub fn first_topic(topic: &Topic) -> String {
    format!("Thanks for the introduction. Let's get started. {}", topic.seed_text)
}

/// Opens the closing Q&A, optionally after a bridging phrase.
pub fn closing_invitation(bridge: Option<&str>, context: &InterviewContext) -> String {
    let company = context.company.as_deref().unwrap_or("the company");
    let invitation = format!(
        "Thank you for the detailed discussion today. That concludes our interview. Do you have any questions for me or about {}?",
        company
    );
    match bridge.map(transition_phrase).filter(|p| !p.is_empty()) {
        Some(bridge) => format!("{} {}", bridge, invitation),
        None => invitation,
    }
}

/// Makes a closing-phase answer end the way the phase requires.
pub fn finish_closing_answer(answer: &str, is_final: bool) -> String {
    let answer = answer.trim();
    let lower = answer.to_lowercase();
    if is_final {
        if lower.contains("feedback will be ready shortly") {
            answer.to_string()
        } else {
            format!("{} Thank you! {}", answer, FEEDBACK_NOTICE)
        }
    } else if lower.contains("other questions") {
        answer.to_string()
    } else {
        format!("{} {}", answer, OTHER_QUESTIONS_PROMPT)
    }
}

pub fn fallback_closing_answer(context: &InterviewContext) -> String {
    let company = context.company.as_deref().unwrap_or("the company");
    let position = context.position.as_deref().unwrap_or("this role");
    format!(
        "Great question! While specific details may vary, I'd be happy to share general information about {} and the {} position.",
        company, position
    )
}

pub fn farewell() -> String {
    format!("Thank you! {}", FEEDBACK_NOTICE)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('’', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concession_detection() {
        assert!(is_concession("Honestly, I don't know."));
        assert!(is_concession("I CAN'T RECALL the exact number"));
        assert!(is_concession("I don’t remember the details"));
        assert!(is_concession("no idea to be honest"));
        assert!(!is_concession("I know exactly how that works."));
        assert!(!is_concession(""));
    }

    #[test]
    fn test_wants_to_end() {
        assert!(wants_to_end("No"));
        assert!(wants_to_end("That's all."));
        assert!(wants_to_end("no more questions"));
        assert!(wants_to_end("no, thanks!"));
        assert!(wants_to_end("I'm all set"));
        assert!(!wants_to_end("What does the on-call rotation look like?"));
        assert!(!wants_to_end("Is there no remote option for this team at all?"));
        assert!(wants_to_end("Nope, thanks"));
        assert!(wants_to_end("No more questions!"));
        assert!(!wants_to_end("Is nobody remote?"));
    }

    #[test]
    fn test_transition_phrase_drops_question() {
        assert_eq!(
            transition_phrase("That's a clear explanation. Can you tell me about casting?"),
            "That's a clear explanation."
        );
        assert_eq!(
            transition_phrase("Great, let's switch gears Walk me through a project"),
            "Great, let's switch gears."
        );
        assert_eq!(transition_phrase("What about testing?"), "");
        assert_eq!(transition_phrase("Thanks!"), "Thanks!");
        assert_eq!(
            transition_phrase("However, let's move on."),
            "However, let's move on."
        );
        assert_eq!(
            transition_phrase("Whatever the cause, that was well handled."),
            "Whatever the cause, that was well handled."
        );
        assert_eq!(
            transition_phrase("Good point. Why did you pick steel over aluminium?"),
            "Good point."
        );
        assert_eq!(transition_phrase("Is that the whole story?"), "");
    }

    #[test]
    fn test_compose_transition_uses_selected_seed() {
        let next = Topic::new("T3", "behavioral", 1, "Tell me about a time you led a team.");
        let text = compose_transition(
            Some("Nice work on that. How do you approach casting design?"),
            &next,
        );
        assert_eq!(text, "Nice work on that. Tell me about a time you led a team.");

        let text = compose_transition(None, &next);
        assert_eq!(
            text,
            "Let's move on to another area. Tell me about a time you led a team."
        );
    }

    #[test]
    fn test_closing_invitation_names_company() {
        let context = InterviewContext {
            company: Some("Acme".into()),
            ..Default::default()
        };
        let text = closing_invitation(Some("Thanks. What else?"), &context);
        assert!(text.starts_with("Thanks. Thank you for the detailed discussion"));
        assert!(text.ends_with("about Acme?"));
    }

    #[test]
    fn test_finish_closing_answer() {
        assert_eq!(
            finish_closing_answer("We ship weekly.", false),
            "We ship weekly. Do you have any other questions?"
        );
        assert_eq!(
            finish_closing_answer("We ship weekly. Any other questions?", false),
            "We ship weekly. Any other questions?"
        );
        assert_eq!(
            finish_closing_answer("We ship weekly.", true),
            "We ship weekly. Thank you! Your detailed feedback will be ready shortly."
        );
    }

    #[test]
    fn test_greeting_mentions_context() {
        let context = InterviewContext {
            candidate_name: Some("Ada".into()),
            position: Some("Mechanical Engineer".into()),
            company: Some("Acme".into()),
            interview_type: InterviewType::TechnicalOnly,
        };
        let text = greeting(&context);
        assert!(text.starts_with("Hi Ada,"));
        assert!(text.contains("technical interview"));
        assert!(text.contains("Mechanical Engineer position at Acme"));
    }
}
