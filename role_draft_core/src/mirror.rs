// Follower-side draft mirror.
//
// A follower never decides anything. `DraftMirror` rebuilds a `DraftSession`
// purely from host broadcasts, applied one at a time in delivery order, and
// turns them into `DraftEvent`s for the local UI. The only thing it ever
// sends back is a `SubmitPick` for the local participant's own turn.
//
// Phases:
//
//   Idle ──StartDraft / SlotNotify──> Waiting ──AnnounceTurn──> Drafting
//   Drafting ──Recap──> PostDraft ──Teardown──> Idle
//   any seated phase ──empty Recap (host cancelled)──> Idle
//
// Messages that do not fit the mirror (a turn before any seating, an unknown
// picker or slot, a stale turn) are logged and dropped without touching
// state. Re-delivery of the message that produced the current state is a
// no-op, so applying an echo twice changes nothing.

use std::time::Duration;

use role_draft_protocol::{
    DraftMessage, ParticipantId, RecapEntry, SlotAssignment, SlotNumber, TurnNumber,
};

use crate::config::DraftConfig;
use crate::event::DraftEvent;
use crate::postdraft::{PostDraftPhase, PostDraftSequence};
use crate::session::DraftSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorPhase {
    Idle,
    /// Seated, no turn announced yet.
    Waiting,
    Drafting,
    /// Recap received; running the post-draft sequence.
    PostDraft,
}

pub struct DraftMirror {
    local: ParticipantId,
    config: DraftConfig,
    session: DraftSession,
    phase: MirrorPhase,
    post_draft: Option<PostDraftSequence>,
    last_recap: Vec<RecapEntry>,
    events: Vec<DraftEvent>,
}

impl DraftMirror {
    pub fn new(local: ParticipantId, config: DraftConfig) -> Self {
        Self {
            local,
            config,
            session: DraftSession::new(),
            phase: MirrorPhase::Idle,
            post_draft: None,
            last_recap: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Apply one host broadcast. Returns whether the mirror changed.
    pub fn apply(&mut self, msg: &DraftMessage) -> bool {
        match msg {
            DraftMessage::SlotNotify { slots } => self.apply_slots(slots, false),
            DraftMessage::StartDraft { total_slots, slots } => {
                if usize::from(*total_slots) != slots.len() {
                    tracing::warn!(
                        total_slots,
                        listed = slots.len(),
                        "StartDraft slot count mismatch; ignoring"
                    );
                    return false;
                }
                self.apply_slots(slots, true)
            }
            DraftMessage::AnnounceTurn {
                turn,
                slot,
                picker,
                offered,
            } => self.apply_turn(*turn, *slot, *picker, offered),
            DraftMessage::Recap { show_recap, picks } => self.apply_recap(*show_recap, picks),
            DraftMessage::SubmitPick { .. } => {
                tracing::warn!(local = %self.local, "follower received SubmitPick; ignoring");
                false
            }
        }
    }

    fn apply_slots(&mut self, slots: &[SlotAssignment], started: bool) -> bool {
        let mut rebuilt = DraftSession::new();
        if !rebuilt.seat(slots) {
            tracing::warn!(count = slots.len(), "malformed slot assignment; ignoring");
            return false;
        }
        rebuilt.set_active(started || self.session.is_active());
        self.session = rebuilt;
        self.phase = MirrorPhase::Waiting;
        self.events.push(DraftEvent::SlotsAssigned {
            slots: slots.to_vec(),
            started,
        });
        if started {
            self.post_draft = None;
            self.last_recap.clear();
            self.events.push(DraftEvent::CloseAll);
        }
        true
    }

    fn apply_turn(
        &mut self,
        turn: TurnNumber,
        slot: SlotNumber,
        picker: ParticipantId,
        offered: &[String],
    ) -> bool {
        if !self.session.is_seated() {
            tracing::warn!(%turn, %slot, "turn announced before any seating; ignoring");
            return false;
        }
        if self.phase == MirrorPhase::PostDraft {
            tracing::debug!(%turn, %slot, "turn announced after the recap; ignoring");
            return false;
        }
        if self.session.turn_of(slot) != Some(turn) {
            tracing::warn!(%turn, %slot, "turn number does not match slot order; ignoring");
            return false;
        }
        let Some(state) = self.session.state(slot) else {
            return false;
        };
        if state.participant != picker {
            tracing::warn!(%slot, %picker, seated = %state.participant, "unknown picker; ignoring");
            return false;
        }
        if state.has_picked {
            tracing::debug!(%turn, %slot, "slot has already picked; ignoring");
            return false;
        }
        if turn < self.session.current_turn() {
            tracing::debug!(%turn, current = %self.session.current_turn(), "stale turn; ignoring");
            return false;
        }
        if turn == self.session.current_turn()
            && state.is_picking_now
            && state.offered_roles.as_slice() == offered
        {
            return false;
        }

        self.session.set_current_turn(turn);
        self.session.set_active(true);
        self.session.mark_earlier_slots_picked(slot);
        self.session.open_turn(slot, offered.to_vec());
        self.phase = MirrorPhase::Drafting;
        self.events.push(DraftEvent::OfferReady {
            turn,
            slot,
            picker,
            offered: offered.to_vec(),
        });
        true
    }

    fn apply_recap(&mut self, show_recap: bool, picks: &[RecapEntry]) -> bool {
        if !self.session.is_seated() {
            tracing::warn!("recap before any seating; ignoring");
            return false;
        }
        if picks.is_empty() {
            tracing::info!(local = %self.local, "draft cancelled by host");
            self.session.clear();
            self.phase = MirrorPhase::Idle;
            self.post_draft = None;
            self.events.push(DraftEvent::DraftCancelled);
            self.events.push(DraftEvent::CloseAll);
            return true;
        }
        if self.phase == MirrorPhase::PostDraft && self.last_recap.as_slice() == picks {
            return false;
        }

        // Earlier slots are already marked picked by turn announcements, so
        // the recap fills in roles directly rather than through record_pick.
        for entry in picks {
            match self.session.state_mut(entry.slot) {
                Some(st) => {
                    st.chosen_role = Some(entry.role.clone());
                    st.has_picked = true;
                    st.is_picking_now = false;
                    st.offered_roles.clear();
                }
                None => tracing::warn!(slot = %entry.slot, "recap names an unknown slot"),
            }
        }
        self.session.set_active(false);
        self.last_recap = picks.to_vec();
        self.phase = MirrorPhase::PostDraft;
        self.post_draft = Some(PostDraftSequence::begin(&self.config, show_recap, false));
        self.events.push(DraftEvent::DraftComplete {
            show_recap,
            picks: picks.to_vec(),
        });
        self.events.push(DraftEvent::PostDraft(PostDraftPhase::Recap));
        true
    }

    /// Drive the post-draft sequence. Teardown discards the mirror.
    pub fn tick(&mut self, elapsed: Duration) {
        let Some(seq) = self.post_draft.as_mut() else {
            return;
        };
        let entered = seq.advance(elapsed);
        let finished = seq.is_finished();
        for phase in entered {
            self.events.push(DraftEvent::PostDraft(phase));
        }
        if finished {
            self.post_draft = None;
            self.session.clear();
            self.phase = MirrorPhase::Idle;
            self.events.push(DraftEvent::CloseAll);
        }
    }

    /// The message to send for the local participant's pick, if it is their
    /// turn. `choice_index` equal to the offer length is the random card.
    pub fn submit_pick(&self, choice_index: u8) -> Option<DraftMessage> {
        if self.phase != MirrorPhase::Drafting {
            return None;
        }
        let slot = self.session.current_slot()?;
        let state = self.session.state(slot)?;
        if state.participant != self.local || state.has_picked {
            return None;
        }
        Some(DraftMessage::SubmitPick { choice_index })
    }

    /// Index of the random card for the local picker's current offer.
    pub fn random_card_index(&self) -> Option<u8> {
        self.local_offer().and_then(|offer| u8::try_from(offer.len()).ok())
    }

    /// The current offer, when the local participant is the picker.
    pub fn local_offer(&self) -> Option<&[String]> {
        let slot = self.session.current_slot()?;
        let state = self.session.state(slot)?;
        (state.participant == self.local && state.is_picking_now)
            .then_some(state.offered_roles.as_slice())
    }

    pub fn local(&self) -> ParticipantId {
        self.local
    }

    pub fn phase(&self) -> MirrorPhase {
        self.phase
    }

    pub fn session(&self) -> &DraftSession {
        &self.session
    }

    pub fn last_recap(&self) -> &[RecapEntry] {
        &self.last_recap
    }

    pub fn drain_events(&mut self) -> Vec<DraftEvent> {
        std::mem::take(&mut self.events)
    }
}
