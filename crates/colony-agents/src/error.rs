//! Error types for the colony-agents crate.

use colony_types::AgentId;

/// Errors raised by roster and equipment bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The agent is already a member of this colony.
    #[error("agent {0} is already a member")]
    AlreadyMember(AgentId),

    /// The agent is not a member of this colony.
    #[error("agent {0} is not a member")]
    NotMember(AgentId),
}
