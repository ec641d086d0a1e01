// Host-authoritative draft turn coordinator.
//
// `DraftCoordinator` is the only place draft state is decided. It owns the
// session, the per-session role pool and counters, the role registry, and the
// PRNG; everything else (lobby, catalog, assignment sink, forced-role queue)
// is passed in per call through `HostPorts`. All mutation happens through
// `start_draft`, `tick`, `submit_pick`, `handle_message` and `reset`, which
// the owner calls from one thread of control, so there is no locking.
//
// Outputs are queued rather than pushed: protocol messages for every
// participant go to the outbox (`drain_outbox`), UI-facing transitions to the
// event queue (`drain_events`). The owner broadcasts the outbox, including
// back to the host's own handler, where those echoes are no-ops.
//
// Lifecycle:
//
//   Idle ──start_draft──> Active ──last pick──> (complete) ──> Idle
//                           │                      │
//                           └──reset(cancelled)────┘ post-draft sequence
//                                                    ticks on until Teardown
//
// Offer generation for a turn, in order:
// 1. A queued forced role for the picker replaces the offer outright.
// 2. `available` = pool roles under their max count whose faction is under
//    its cap. Empty means `target` copies of the baseline role.
// 3. With `target >= 3`: one Impostor and one neutral (killing preferred),
//    each a weighted single pick.
// 4. Fill from Crewmate-faction roles, then from anything left that is not in
//    a faction already guaranteed above.
// 5. Shuffle.
//
// A submitted index past the end of the offer is the "random card": a pick
// from all of `available`. Timeouts pick from the offer itself when the
// random card is disabled, otherwise they behave like the random card.

use std::time::Duration;

use role_draft_prng::DraftRng;
use role_draft_protocol::{DraftMessage, ParticipantId, SlotAssignment, SlotNumber, TurnNumber};
use thiserror::Error;

use crate::config::DraftConfig;
use crate::event::DraftEvent;
use crate::faction::{self, BASELINE_ROLE, Faction};
use crate::handoff::{self, HandoffReport};
use crate::pool::RolePool;
use crate::ports::{ForcedRoleQueue, HostPorts};
use crate::postdraft::{PostDraftPhase, PostDraftSequence};
use crate::registry::RoleRegistry;
use crate::selector;
use crate::session::{DraftCounters, DraftSession};

/// Why `start_draft` did nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartDraftError {
    #[error("a draft is already running")]
    AlreadyActive,
    #[error("the previous draft is still wrapping up")]
    PostDraftPending,
    #[error("the game has already started")]
    LobbyNotReady,
    #[error("no connected participants to seat")]
    NoParticipants,
    #[error("{0} participants exceed the 255 slot limit")]
    TooManyParticipants(usize),
}

pub struct DraftCoordinator {
    config: DraftConfig,
    rng: DraftRng,
    registry: RoleRegistry,
    session: DraftSession,
    pool: Option<RolePool>,
    counters: DraftCounters,
    /// Forced role for the current turn, taken from the override queue.
    forced_pick: Option<String>,
    post_draft: Option<PostDraftSequence>,
    last_handoff: Option<HandoffReport>,
    outbox: Vec<DraftMessage>,
    events: Vec<DraftEvent>,
}

impl DraftCoordinator {
    pub fn new(config: DraftConfig, seed: u64, registry: RoleRegistry) -> Self {
        Self {
            config: config.validated(),
            rng: DraftRng::new(seed),
            registry,
            session: DraftSession::new(),
            pool: None,
            counters: DraftCounters::default(),
            forced_pick: None,
            post_draft: None,
            last_handoff: None,
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Seat every connected eligible participant in a random slot order and
    /// open the first turn. Broadcasts `StartDraft` then `AnnounceTurn`.
    pub fn start_draft(&mut self, ports: &mut HostPorts<'_>) -> Result<(), StartDraftError> {
        if self.session.is_active() {
            return Err(StartDraftError::AlreadyActive);
        }
        if self.post_draft.is_some() {
            return Err(StartDraftError::PostDraftPending);
        }
        if !ports.lobby.is_pre_game() {
            return Err(StartDraftError::LobbyNotReady);
        }

        let mut participants: Vec<ParticipantId> = ports
            .lobby
            .eligible_participants()
            .into_iter()
            .filter(|p| ports.lobby.is_connected(*p))
            .collect();
        participants.sort_unstable();
        participants.dedup();
        if participants.is_empty() {
            return Err(StartDraftError::NoParticipants);
        }
        let count = u8::try_from(participants.len())
            .map_err(|_| StartDraftError::TooManyParticipants(participants.len()))?;

        let mut slots: Vec<u8> = (1..=count).collect();
        self.rng.shuffle(&mut slots);
        let assignments: Vec<SlotAssignment> = participants
            .iter()
            .zip(&slots)
            .map(|(p, s)| SlotAssignment {
                participant: *p,
                slot: SlotNumber(*s),
            })
            .collect();
        if !self.session.seat(&assignments) {
            // Participants are deduplicated and slots are a permutation.
            tracing::warn!("slot seating rejected; not starting");
            return Err(StartDraftError::NoParticipants);
        }

        self.counters = DraftCounters::default();
        self.forced_pick = None;
        self.last_handoff = None;
        let pool = RolePool::build(ports.catalog);
        tracing::info!(participants = count, roles = pool.len(), "draft started");
        self.pool = Some(pool);

        self.session.set_active(true);
        self.session.set_current_turn(TurnNumber(1));
        self.session.reset_deadline(self.config.turn_duration());

        let slots = self.session.assignments();
        self.outbox.push(DraftMessage::StartDraft {
            total_slots: count,
            slots: slots.clone(),
        });
        self.events.push(DraftEvent::SlotsAssigned {
            slots,
            started: true,
        });
        self.offer_roles_to_current_picker(ports.forced);
        Ok(())
    }

    /// Advance time. While active this runs the turn deadline down and
    /// auto-picks at zero; afterwards it drives the post-draft sequence.
    pub fn tick(&mut self, elapsed: Duration, ports: &mut HostPorts<'_>) {
        if self.session.is_active() {
            if self.session.run_down_deadline(elapsed) {
                self.auto_pick(ports);
            }
        } else {
            self.advance_post_draft(elapsed);
        }
    }

    /// A participant's pick. `choice_index` past the end of the offer is the
    /// random card. False (and no change) unless the draft is active, the
    /// sender is the current picker, and the slot has not picked.
    pub fn submit_pick(
        &mut self,
        participant: ParticipantId,
        choice_index: usize,
        ports: &mut HostPorts<'_>,
    ) -> bool {
        if !self.session.is_active() {
            return false;
        }
        let Some(slot) = self.session.current_slot() else {
            return false;
        };
        let Some(state) = self.session.state(slot) else {
            return false;
        };
        if state.participant != participant || state.has_picked {
            tracing::debug!(%participant, "pick rejected: not the current picker");
            return false;
        }

        let shown = state.offered_roles.get(choice_index).cloned();

        let role = match (self.forced_pick.clone(), shown) {
            (Some(forced), _) => forced,
            (None, Some(shown)) => shown,
            (None, None) => self.random_from_available(),
        };
        self.finalise_pick(role, ports);
        true
    }

    /// Apply an inbound protocol message from `from`. Only `SubmitPick` means
    /// anything to the host; its own broadcasts echoing back are no-ops.
    /// Returns whether anything changed.
    pub fn handle_message(
        &mut self,
        from: ParticipantId,
        msg: &DraftMessage,
        ports: &mut HostPorts<'_>,
    ) -> bool {
        if msg.is_host_broadcast() {
            if from == ports.lobby.host() {
                tracing::trace!(kind = msg.kind(), "ignoring own broadcast echo");
            } else {
                tracing::warn!(
                    %from,
                    kind = msg.kind(),
                    "non-host participant sent a host-only message"
                );
            }
            return false;
        }
        let DraftMessage::SubmitPick { choice_index } = msg else {
            return false;
        };
        self.submit_pick(from, usize::from(*choice_index), ports)
    }

    /// Drop all session state and return to Idle. A cancel also empties the
    /// forced-role queue, stops any post-draft sequence, tells followers to
    /// tear down (if a draft was running) and closes UIs. Completion resets
    /// with `cancelled == false`, leaving the queue alone.
    pub fn reset(&mut self, cancelled: bool, forced: &mut dyn ForcedRoleQueue) {
        if cancelled {
            forced.clear();
            if self.session.is_active() {
                self.outbox.push(DraftMessage::Recap {
                    show_recap: false,
                    picks: Vec::new(),
                });
                tracing::info!(turn = %self.session.current_turn(), "draft cancelled");
            }
            self.post_draft = None;
            self.events.push(DraftEvent::DraftCancelled);
            self.events.push(DraftEvent::CloseAll);
        }
        self.session.clear();
        self.pool = None;
        self.counters = DraftCounters::default();
        self.forced_pick = None;
    }

    /// Rebroadcast the live seating so followers can rebuild their mirror.
    /// Mid-draft, the open turn is announced again (same offer) right after,
    /// since a rebuilt mirror starts out waiting.
    pub fn renotify_slots(&mut self) -> bool {
        if !self.session.is_seated() {
            return false;
        }
        let slots = self.session.assignments();
        self.outbox.push(DraftMessage::SlotNotify {
            slots: slots.clone(),
        });
        self.events.push(DraftEvent::SlotsAssigned {
            slots,
            started: false,
        });
        if !self.session.is_active() {
            return true;
        }
        let current = self.session.current_slot().and_then(|slot| {
            let state = self.session.state(slot)?;
            Some((slot, state.participant, state.offered_roles.clone()))
        });
        if let Some((slot, picker, offered)) = current {
            self.outbox.push(DraftMessage::AnnounceTurn {
                turn: self.session.current_turn(),
                slot,
                picker,
                offered,
            });
        }
        true
    }

    /// Late joiners are refused while a draft or its wrap-up is running.
    pub fn accepts_joiner(&self) -> bool {
        !self.session.is_active() && self.post_draft.is_none()
    }

    // -----------------------------------------------------------------------
    // Turn mechanics
    // -----------------------------------------------------------------------

    fn offer_roles_to_current_picker(&mut self, forced: &mut dyn ForcedRoleQueue) {
        let (Some(slot), Some(picker)) =
            (self.session.current_slot(), self.session.current_picker())
        else {
            return;
        };

        let offered = match forced.take_for(picker) {
            Some(role) => {
                tracing::debug!(%picker, role = %role, "forced role replaces offer");
                self.forced_pick = Some(role.clone());
                vec![role]
            }
            None => self.build_offer(),
        };
        tracing::debug!(%slot, %picker, ?offered, "turn offered");

        self.session.open_turn(slot, offered.clone());
        let turn = self.session.current_turn();
        self.outbox.push(DraftMessage::AnnounceTurn {
            turn,
            slot,
            picker,
            offered: offered.clone(),
        });
        self.events.push(DraftEvent::OfferReady {
            turn,
            slot,
            picker,
            offered,
        });
    }

    fn build_offer(&mut self) -> Vec<String> {
        let target = self.config.offer_target();
        let available = self.available_roles();
        if available.is_empty() {
            return vec![BASELINE_ROLE.to_string(); target];
        }
        let Some(pool) = self.pool.as_ref() else {
            return vec![BASELINE_ROLE.to_string(); target];
        };
        let weighted = self.config.weighted_selection;
        let weight = |r: &String| pool.weight(r);
        let of = |f: Faction| -> Vec<String> {
            available
                .iter()
                .filter(|r| pool.faction(r) == f)
                .cloned()
                .collect()
        };

        let mut offer: Vec<String> = Vec::with_capacity(target);
        let mut guaranteed: Vec<Faction> = Vec::new();
        if target >= 3 {
            let impostor = selector::pick_weighted_unique(
                &mut self.rng,
                &of(Faction::Impostor),
                1,
                weighted,
                weight,
            );
            if !impostor.is_empty() {
                guaranteed.push(Faction::Impostor);
            }
            offer.extend(impostor);

            let killing = of(Faction::NeutralKilling);
            let neutrals = if killing.is_empty() {
                of(Faction::Neutral)
            } else {
                killing
            };
            let neutral =
                selector::pick_weighted_unique(&mut self.rng, &neutrals, 1, weighted, weight);
            if !neutral.is_empty() {
                guaranteed.push(Faction::NeutralKilling);
                guaranteed.push(Faction::Neutral);
            }
            offer.extend(neutral);
        }

        let crew = of(Faction::Crewmate);
        let need = target.saturating_sub(offer.len());
        offer.extend(selector::pick_weighted_unique(
            &mut self.rng,
            &crew,
            need,
            weighted,
            weight,
        ));

        if offer.len() < target {
            let rest: Vec<String> = available
                .iter()
                .filter(|r| !offer.contains(r) && !guaranteed.contains(&pool.faction(r)))
                .cloned()
                .collect();
            let need = target - offer.len();
            offer.extend(selector::pick_weighted_unique(
                &mut self.rng,
                &rest,
                need,
                weighted,
                weight,
            ));
        }

        self.rng.shuffle(&mut offer);
        offer
    }

    /// Pool roles still under their max count whose faction is under its cap,
    /// in pool order.
    fn available_roles(&self) -> Vec<String> {
        let Some(pool) = self.pool.as_ref() else {
            return Vec::new();
        };
        pool.roles()
            .iter()
            .filter(|r| {
                let max = pool.max_count(r).unwrap_or(0);
                self.counters.drafted(r) < max
                    && !self.counters.faction_capped(pool.faction(r), &self.config)
            })
            .cloned()
            .collect()
    }

    /// The random card: one role from `available`, or the baseline role when
    /// nothing is left.
    fn random_from_available(&mut self) -> String {
        let available = self.available_roles();
        let chosen = match self.pool.as_ref() {
            Some(pool) if self.config.weighted_selection => {
                selector::pick_weighted(&mut self.rng, &available, |r| pool.weight(r)).cloned()
            }
            _ => self.rng.choose(&available).cloned(),
        };
        chosen.unwrap_or_else(|| BASELINE_ROLE.to_string())
    }

    fn auto_pick(&mut self, ports: &mut HostPorts<'_>) {
        let offered = self
            .session
            .current_slot()
            .and_then(|s| self.session.state(s))
            .map(|st| st.offered_roles.clone())
            .unwrap_or_default();
        let role = if let Some(forced) = self.forced_pick.clone() {
            forced
        } else if !self.config.random_option_enabled {
            match self.rng.choose(&offered) {
                Some(role) => role.clone(),
                None => self.random_from_available(),
            }
        } else {
            self.random_from_available()
        };
        tracing::debug!(role = %role, "turn timed out; auto-picking");
        self.finalise_pick(role, ports);
    }

    fn finalise_pick(&mut self, role: String, ports: &mut HostPorts<'_>) {
        let (Some(slot), Some(picker)) =
            (self.session.current_slot(), self.session.current_picker())
        else {
            return;
        };
        let faction = match self.pool.as_ref() {
            Some(pool) => pool.faction(&role),
            None => faction::classify(&role),
        };
        if !self.session.record_pick(slot, role.clone()) {
            return;
        }
        self.counters.record(&role, faction);
        self.forced_pick = None;
        tracing::debug!(%slot, %picker, role = %role, ?faction, "pick finalized");
        self.events.push(DraftEvent::PickFinalized { slot, picker, role });

        let next = TurnNumber(self.session.current_turn().0.saturating_add(1));
        self.session.set_current_turn(next);
        if self.session.is_past_last_turn() {
            self.complete(ports);
        } else {
            self.session.reset_deadline(self.config.turn_duration());
            self.offer_roles_to_current_picker(ports.forced);
        }
    }

    fn complete(&mut self, ports: &mut HostPorts<'_>) {
        self.session.set_active(false);
        let picks = self.session.recap();
        let show_recap = self.config.show_recap;
        self.outbox.push(DraftMessage::Recap {
            show_recap,
            picks: picks.clone(),
        });
        tracing::info!(slots = picks.len(), "draft complete");
        self.events.push(DraftEvent::DraftComplete { show_recap, picks });

        let report = handoff::hand_off(&self.session, &self.registry, ports.lobby, ports.sink);
        if !report.skipped.is_empty() {
            tracing::info!(skipped = report.skipped.len(), "some roles were not handed off");
        }
        self.last_handoff = Some(report);

        self.post_draft = Some(PostDraftSequence::begin(
            &self.config,
            show_recap,
            self.config.auto_start_game,
        ));
        self.events.push(DraftEvent::PostDraft(PostDraftPhase::Recap));
        self.reset(false, ports.forced);
    }

    fn advance_post_draft(&mut self, elapsed: Duration) {
        let Some(seq) = self.post_draft.as_mut() else {
            return;
        };
        let auto_start = seq.auto_start();
        let entered = seq.advance(elapsed);
        let finished = seq.is_finished();
        for phase in entered {
            self.events.push(DraftEvent::PostDraft(phase));
            if phase == PostDraftPhase::Teardown {
                if auto_start {
                    tracing::info!("requesting game start after draft");
                    self.events.push(DraftEvent::GameStartRequested);
                }
                self.events.push(DraftEvent::CloseAll);
            }
        }
        if finished {
            self.post_draft = None;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    pub fn session(&self) -> &DraftSession {
        &self.session
    }

    pub fn pool(&self) -> Option<&RolePool> {
        self.pool.as_ref()
    }

    pub fn counters(&self) -> &DraftCounters {
        &self.counters
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn post_draft_phase(&self) -> Option<PostDraftPhase> {
        self.post_draft.as_ref().map(|s| s.phase())
    }

    /// Outcome of the most recent completed draft's hand-off.
    pub fn last_handoff(&self) -> Option<&HandoffReport> {
        self.last_handoff.as_ref()
    }

    /// Roles currently draftable, in pool order.
    pub fn available(&self) -> Vec<String> {
        self.available_roles()
    }

    pub fn drain_outbox(&mut self) -> Vec<DraftMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_events(&mut self) -> Vec<DraftEvent> {
        std::mem::take(&mut self.events)
    }
}
