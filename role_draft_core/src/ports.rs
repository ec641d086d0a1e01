// Collaborator interfaces the host coordinator consumes.
//
// The draft core owns none of: lobby membership, gameplay role activation,
// or the chat-driven forced-role queue. Each is a trait here, and the host
// gets all of them per call through `HostPorts` rather than holding them,
// so one coordinator value can be driven by whatever owns the game session.
//
// `Lobby` and `RoleAssignmentSink` are mockable in unit tests. In-memory
// implementations for integration use live in `table.rs`; `FifoOverrides`
// is the stock forced-role queue.

use std::collections::VecDeque;

use role_draft_protocol::ParticipantId;
use thiserror::Error;

use crate::pool::RoleCatalog;
use crate::registry::RoleId;

/// Session gate and roster.
#[cfg_attr(test, mockall::automock)]
pub trait Lobby {
    /// The game has not started yet, so a draft may begin.
    fn is_pre_game(&self) -> bool;
    /// Participants that should be seated, in any order.
    fn eligible_participants(&self) -> Vec<ParticipantId>;
    /// The authoritative participant.
    fn host(&self) -> ParticipantId;
    fn is_connected(&self, participant: ParticipantId) -> bool;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("assigning {role} to {participant} rejected: {reason}")]
    Rejected {
        participant: ParticipantId,
        role: String,
        reason: String,
    },
}

/// Receives the hand-off of finalized roles.
#[cfg_attr(test, mockall::automock)]
pub trait RoleAssignmentSink {
    fn apply(
        &mut self,
        participant: ParticipantId,
        role: RoleId,
        canonical_name: &str,
    ) -> Result<(), AssignmentError>;
}

/// Pending `(participant, role)` overrides consulted before offer generation.
pub trait ForcedRoleQueue {
    /// Remove and return the oldest override for `participant`.
    fn take_for(&mut self, participant: ParticipantId) -> Option<String>;
    fn clear(&mut self);
}

/// First-in-first-out override queue.
#[derive(Clone, Debug, Default)]
pub struct FifoOverrides {
    pending: VecDeque<(ParticipantId, String)>,
}

impl FifoOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, participant: ParticipantId, role: impl Into<String>) {
        self.pending.push_back((participant, role.into()));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ForcedRoleQueue for FifoOverrides {
    fn take_for(&mut self, participant: ParticipantId) -> Option<String> {
        let index = self.pending.iter().position(|(p, _)| *p == participant)?;
        self.pending.remove(index).map(|(_, role)| role)
    }

    fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Everything the host needs from outside for one operation.
pub struct HostPorts<'a> {
    pub lobby: &'a dyn Lobby,
    pub catalog: &'a dyn RoleCatalog,
    pub sink: &'a mut dyn RoleAssignmentSink,
    pub forced: &'a mut dyn ForcedRoleQueue,
}
