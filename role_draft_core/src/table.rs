// In-process draft table: one host and its followers on a loopback.
//
// `LocalTable` wires a `DraftCoordinator` to a `DraftMirror` per follower
// with the real wire path in between. Every host broadcast is framed with
// `role_draft_protocol::send`, then decoded separately for each follower and
// once more for the host's own handler (the echo). Follower picks travel the
// other way through the same codec. Nothing is shared between the two sides
// except bytes, so a mirror that stays in step here stays in step over any
// ordered transport.
//
// Also home to the in-memory collaborators the table (and the `draft-sim`
// binary) plug into the host: `InMemoryLobby` and `RecordingSink`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use role_draft_protocol::{DraftMessage, ParticipantId, ProtocolError, recv, send};
use thiserror::Error;

use crate::config::DraftConfig;
use crate::coordinator::{DraftCoordinator, StartDraftError};
use crate::event::DraftEvent;
use crate::mirror::DraftMirror;
use crate::pool::RoleCatalog;
use crate::ports::{AssignmentError, FifoOverrides, HostPorts, Lobby, RoleAssignmentSink};
use crate::registry::{RoleId, RoleRegistry};

/// Lobby with a fixed roster and a disconnect list.
#[derive(Clone, Debug)]
pub struct InMemoryLobby {
    host: ParticipantId,
    roster: Vec<ParticipantId>,
    disconnected: BTreeSet<ParticipantId>,
    pre_game: bool,
}

impl InMemoryLobby {
    pub fn new(host: ParticipantId, roster: Vec<ParticipantId>) -> Self {
        Self {
            host,
            roster,
            disconnected: BTreeSet::new(),
            pre_game: true,
        }
    }

    pub fn add(&mut self, participant: ParticipantId) {
        if !self.roster.contains(&participant) {
            self.roster.push(participant);
        }
    }

    pub fn disconnect(&mut self, participant: ParticipantId) {
        self.disconnected.insert(participant);
    }

    pub fn set_pre_game(&mut self, pre_game: bool) {
        self.pre_game = pre_game;
    }
}

impl Lobby for InMemoryLobby {
    fn is_pre_game(&self) -> bool {
        self.pre_game
    }

    fn eligible_participants(&self) -> Vec<ParticipantId> {
        self.roster.clone()
    }

    fn host(&self) -> ParticipantId {
        self.host
    }

    fn is_connected(&self, participant: ParticipantId) -> bool {
        self.roster.contains(&participant) && !self.disconnected.contains(&participant)
    }
}

/// Assignment sink that records what it was given.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    applied: Vec<(ParticipantId, RoleId, String)>,
    refused: BTreeSet<ParticipantId>,
}

impl RecordingSink {
    /// Make every later `apply` for `participant` fail.
    pub fn refuse(&mut self, participant: ParticipantId) {
        self.refused.insert(participant);
    }

    pub fn applied(&self) -> &[(ParticipantId, RoleId, String)] {
        &self.applied
    }
}

impl RoleAssignmentSink for RecordingSink {
    fn apply(
        &mut self,
        participant: ParticipantId,
        role: RoleId,
        canonical_name: &str,
    ) -> Result<(), AssignmentError> {
        if self.refused.contains(&participant) {
            return Err(AssignmentError::Rejected {
                participant,
                role: canonical_name.to_string(),
                reason: "refused".into(),
            });
        }
        self.applied.push((participant, role, canonical_name.to_string()));
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Start(#[from] StartDraftError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{0} is not at this table")]
    UnknownParticipant(ParticipantId),
}

pub struct LocalTable {
    host_id: ParticipantId,
    host: DraftCoordinator,
    followers: BTreeMap<ParticipantId, DraftMirror>,
    config: DraftConfig,
    lobby: InMemoryLobby,
    catalog: Box<dyn RoleCatalog>,
    sink: RecordingSink,
    overrides: FifoOverrides,
    transcript: Vec<DraftMessage>,
}

impl LocalTable {
    /// Seat `participants` (which should include `host_id`) around a host
    /// seeded with `seed`.
    pub fn new(
        host_id: ParticipantId,
        participants: &[ParticipantId],
        config: DraftConfig,
        seed: u64,
        catalog: Box<dyn RoleCatalog>,
    ) -> Self {
        let registry = RoleRegistry::from_catalog(catalog.as_ref());
        let mut roster = participants.to_vec();
        if !roster.contains(&host_id) {
            roster.push(host_id);
        }
        let followers = roster
            .iter()
            .filter(|p| **p != host_id)
            .map(|p| (*p, DraftMirror::new(*p, config.clone())))
            .collect();
        Self {
            host_id,
            host: DraftCoordinator::new(config.clone(), seed, registry),
            followers,
            config,
            lobby: InMemoryLobby::new(host_id, roster),
            catalog,
            sink: RecordingSink::default(),
            overrides: FifoOverrides::new(),
            transcript: Vec::new(),
        }
    }

    fn with_host<T>(
        &mut self,
        f: impl FnOnce(&mut DraftCoordinator, &mut HostPorts<'_>) -> T,
    ) -> T {
        let mut ports = HostPorts {
            lobby: &self.lobby,
            catalog: self.catalog.as_ref(),
            sink: &mut self.sink,
            forced: &mut self.overrides,
        };
        f(&mut self.host, &mut ports)
    }

    pub fn start(&mut self) -> Result<(), TableError> {
        self.with_host(|host, ports| host.start_draft(ports))?;
        self.pump()
    }

    /// Advance every clock at the table by `elapsed`. When an auto-start
    /// wrap-up finishes, the lobby leaves pre-game, so no new draft can start.
    pub fn tick(&mut self, elapsed: Duration) -> Result<(), TableError> {
        let wrapping_up = self.host.post_draft_phase().is_some();
        self.with_host(|host, ports| host.tick(elapsed, ports));
        if wrapping_up
            && self.host.post_draft_phase().is_none()
            && self.host.config().auto_start_game
        {
            tracing::info!("game started after draft");
            self.lobby.set_pre_game(false);
        }
        for mirror in self.followers.values_mut() {
            mirror.tick(elapsed);
        }
        self.pump()
    }

    /// `participant` picks `choice_index`. The host picks directly; a
    /// follower's pick goes through its mirror and over the wire. Returns
    /// whether the host accepted it.
    pub fn submit(
        &mut self,
        participant: ParticipantId,
        choice_index: u8,
    ) -> Result<bool, TableError> {
        let accepted = if participant == self.host_id {
            let index = usize::from(choice_index);
            self.with_host(|host, ports| host.submit_pick(participant, index, ports))
        } else {
            let mirror = self
                .followers
                .get(&participant)
                .ok_or(TableError::UnknownParticipant(participant))?;
            let Some(msg) = mirror.submit_pick(choice_index) else {
                return Ok(false);
            };
            let delivered = relay(&msg)?;
            self.with_host(|host, ports| host.handle_message(participant, &delivered, ports))
        };
        self.pump()?;
        Ok(accepted)
    }

    /// Cancel whatever is running.
    pub fn cancel(&mut self) -> Result<(), TableError> {
        self.host.reset(true, &mut self.overrides);
        self.pump()
    }

    pub fn renotify(&mut self) -> Result<bool, TableError> {
        let sent = self.host.renotify_slots();
        self.pump()?;
        Ok(sent)
    }

    /// Seat a newcomer, unless a draft is under way.
    pub fn join(&mut self, participant: ParticipantId) -> bool {
        if !self.host.accepts_joiner() {
            tracing::info!(%participant, "draft in progress; join refused");
            return false;
        }
        self.lobby.add(participant);
        if participant != self.host_id {
            self.followers
                .entry(participant)
                .or_insert_with(|| DraftMirror::new(participant, self.config.clone()));
        }
        true
    }

    /// Deliver everything the host has queued to every follower and back to
    /// the host itself.
    fn pump(&mut self) -> Result<(), TableError> {
        for msg in self.host.drain_outbox() {
            let mut frame = Vec::new();
            send(&mut frame, &msg)?;
            for mirror in self.followers.values_mut() {
                let delivered = recv(&mut frame.as_slice())?;
                mirror.apply(&delivered);
            }
            let echo = recv(&mut frame.as_slice())?;
            let host_id = self.host_id;
            self.with_host(|host, ports| host.handle_message(host_id, &echo, ports));
            self.transcript.push(msg);
        }
        Ok(())
    }

    /// Deliver `msg` again to everyone, as a duplicating transport would.
    /// Returns whether any participant's state changed.
    pub fn redeliver(&mut self, msg: &DraftMessage) -> Result<bool, TableError> {
        let mut frame = Vec::new();
        send(&mut frame, msg)?;
        let mut changed = false;
        for mirror in self.followers.values_mut() {
            let delivered = recv(&mut frame.as_slice())?;
            changed |= mirror.apply(&delivered);
        }
        let echo = recv(&mut frame.as_slice())?;
        let host_id = self.host_id;
        changed |= self.with_host(|host, ports| host.handle_message(host_id, &echo, ports));
        self.pump()?;
        Ok(changed)
    }

    /// The current picker's offer as that participant sees it.
    pub fn offer_for(&self, participant: ParticipantId) -> Option<Vec<String>> {
        if participant == self.host_id {
            let session = self.host.session();
            if session.current_picker() != Some(participant) {
                return None;
            }
            let slot = session.current_slot()?;
            return session.state(slot).map(|s| s.offered_roles.clone());
        }
        self.followers
            .get(&participant)?
            .local_offer()
            .map(<[String]>::to_vec)
    }

    pub fn current_picker(&self) -> Option<ParticipantId> {
        self.host.session().current_picker()
    }

    pub fn host(&self) -> &DraftCoordinator {
        &self.host
    }

    pub fn follower(&self, participant: ParticipantId) -> Option<&DraftMirror> {
        self.followers.get(&participant)
    }

    pub fn followers(&self) -> impl Iterator<Item = &DraftMirror> {
        self.followers.values()
    }

    pub fn host_events(&mut self) -> Vec<DraftEvent> {
        self.host.drain_events()
    }

    pub fn follower_events(&mut self, participant: ParticipantId) -> Vec<DraftEvent> {
        self.followers
            .get_mut(&participant)
            .map(DraftMirror::drain_events)
            .unwrap_or_default()
    }

    pub fn lobby_mut(&mut self) -> &mut InMemoryLobby {
        &mut self.lobby
    }

    pub fn sink(&self) -> &RecordingSink {
        &self.sink
    }

    pub fn overrides_mut(&mut self) -> &mut FifoOverrides {
        &mut self.overrides
    }

    /// Every host broadcast so far, in send order.
    pub fn transcript(&self) -> &[DraftMessage] {
        &self.transcript
    }
}

/// Put one message through framing and back.
fn relay(msg: &DraftMessage) -> Result<DraftMessage, ProtocolError> {
    let mut frame = Vec::new();
    send(&mut frame, msg)?;
    recv(&mut frame.as_slice())
}
