pub mod decision;
pub mod error;
pub mod judgment;
pub mod machine;
pub mod phrasing;
pub mod selector;
pub mod session;
pub mod topic;
pub mod validator;

pub use decision::{ConductorAction, ConductorDecision};
pub use error::{ConductorError, Result};
pub use machine::{ConductorConfig, InterviewConductor, SessionArchive, SessionSnapshot, TurnOutcome};
pub use session::{InterviewContext, Phase, Session, SessionId, SessionRecord};
pub use topic::{InterviewType, Topic, TopicCatalog};
