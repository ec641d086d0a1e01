// Draft session data model.
//
// `DraftSession` is the per-draft state shared in shape by the host (where it
// is the live authority) and by every follower (where `DraftMirror` keeps a
// copy rebuilt purely from protocol messages). `DraftCounters` is host-only:
// how many of each role and faction have been drafted so far.
//
// Invariants maintained by the methods here:
// - `turn_order` is exactly the sorted key set of `slot_states`.
// - `participant_index` is the inverse of the participant field of
//   `slot_states`.
// - `current_turn` only moves forward until `clear()`.
// - At most one slot has `is_picking_now`, and while active it is the slot at
//   `turn_order[current_turn - 1]`.
//
// Both maps are `BTreeMap` so iteration (and therefore anything derived from
// it, like recap order) is deterministic.

use std::collections::BTreeMap;
use std::time::Duration;

use role_draft_protocol::{ParticipantId, RecapEntry, SlotAssignment, SlotNumber, TurnNumber};

use crate::config::DraftConfig;
use crate::faction::Faction;

/// One seated participant's view of the draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerDraftState {
    pub participant: ParticipantId,
    pub slot: SlotNumber,
    /// Set once, when this slot's pick is finalized.
    pub chosen_role: Option<String>,
    pub has_picked: bool,
    pub is_picking_now: bool,
    /// Filled while this slot is picking; empty otherwise.
    pub offered_roles: Vec<String>,
}

impl PlayerDraftState {
    fn new(participant: ParticipantId, slot: SlotNumber) -> Self {
        Self {
            participant,
            slot,
            chosen_role: None,
            has_picked: false,
            is_picking_now: false,
            offered_roles: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DraftSession {
    active: bool,
    turn_order: Vec<SlotNumber>,
    current_turn: TurnNumber,
    deadline: Duration,
    slot_states: BTreeMap<SlotNumber, PlayerDraftState>,
    participant_index: BTreeMap<ParticipantId, SlotNumber>,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the seating with `assignments`. Refuses (returning false and
    /// leaving the session untouched) if any slot or participant repeats, or
    /// if a slot number is 0.
    pub fn seat(&mut self, assignments: &[SlotAssignment]) -> bool {
        let mut slot_states = BTreeMap::new();
        let mut participant_index = BTreeMap::new();
        for a in assignments {
            if a.slot.0 == 0
                || slot_states.contains_key(&a.slot)
                || participant_index.contains_key(&a.participant)
            {
                return false;
            }
            slot_states.insert(a.slot, PlayerDraftState::new(a.participant, a.slot));
            participant_index.insert(a.participant, a.slot);
        }
        self.turn_order = slot_states.keys().copied().collect();
        self.slot_states = slot_states;
        self.participant_index = participant_index;
        self.current_turn = TurnNumber(0);
        self.active = false;
        true
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_seated(&self) -> bool {
        !self.slot_states.is_empty()
    }

    pub fn turn_order(&self) -> &[SlotNumber] {
        &self.turn_order
    }

    pub fn slot_count(&self) -> usize {
        self.turn_order.len()
    }

    pub fn current_turn(&self) -> TurnNumber {
        self.current_turn
    }

    /// Move to `turn`. Refuses to go backwards.
    pub fn set_current_turn(&mut self, turn: TurnNumber) -> bool {
        if turn < self.current_turn {
            return false;
        }
        self.current_turn = turn;
        true
    }

    /// True once `current_turn` has moved past the last slot.
    pub fn is_past_last_turn(&self) -> bool {
        usize::from(self.current_turn.0) > self.turn_order.len()
    }

    /// The slot whose turn it is.
    pub fn current_slot(&self) -> Option<SlotNumber> {
        let index = usize::from(self.current_turn.0).checked_sub(1)?;
        self.turn_order.get(index).copied()
    }

    /// 1-based position of `slot` in the turn order.
    pub fn turn_of(&self, slot: SlotNumber) -> Option<TurnNumber> {
        let index = self.turn_order.iter().position(|s| *s == slot)?;
        u16::try_from(index + 1).ok().map(TurnNumber)
    }

    pub fn current_picker(&self) -> Option<ParticipantId> {
        self.current_slot()
            .and_then(|s| self.slot_states.get(&s))
            .map(|st| st.participant)
    }

    pub fn slot_of(&self, participant: ParticipantId) -> Option<SlotNumber> {
        self.participant_index.get(&participant).copied()
    }

    pub fn state(&self, slot: SlotNumber) -> Option<&PlayerDraftState> {
        self.slot_states.get(&slot)
    }

    pub fn state_mut(&mut self, slot: SlotNumber) -> Option<&mut PlayerDraftState> {
        self.slot_states.get_mut(&slot)
    }

    /// States in turn order.
    pub fn states(&self) -> impl Iterator<Item = &PlayerDraftState> {
        self.slot_states.values()
    }

    pub fn reset_deadline(&mut self, turn_length: Duration) {
        self.deadline = turn_length;
    }

    /// Count the deadline down; true once it has reached zero.
    pub fn run_down_deadline(&mut self, elapsed: Duration) -> bool {
        self.deadline = self.deadline.saturating_sub(elapsed);
        self.deadline.is_zero()
    }

    /// Make `slot` the (only) picker with `offered` on the table.
    pub fn open_turn(&mut self, slot: SlotNumber, offered: Vec<String>) -> bool {
        if !self.slot_states.contains_key(&slot) {
            return false;
        }
        for st in self.slot_states.values_mut() {
            if st.slot == slot {
                st.is_picking_now = true;
                st.offered_roles = offered.clone();
            } else {
                st.is_picking_now = false;
                st.offered_roles.clear();
            }
        }
        true
    }

    /// Mark every slot ahead of `slot` in the order as done picking.
    pub fn mark_earlier_slots_picked(&mut self, slot: SlotNumber) {
        for s in &self.turn_order {
            if *s >= slot {
                break;
            }
            if let Some(st) = self.slot_states.get_mut(s) {
                st.has_picked = true;
                st.is_picking_now = false;
                st.offered_roles.clear();
            }
        }
    }

    /// Record `role` for `slot` and close its turn.
    pub fn record_pick(&mut self, slot: SlotNumber, role: String) -> bool {
        match self.slot_states.get_mut(&slot) {
            Some(st) if !st.has_picked => {
                st.chosen_role = Some(role);
                st.has_picked = true;
                st.is_picking_now = false;
                st.offered_roles.clear();
                true
            }
            _ => false,
        }
    }

    /// Seating in slot order.
    pub fn assignments(&self) -> Vec<SlotAssignment> {
        self.slot_states
            .values()
            .map(|st| SlotAssignment {
                participant: st.participant,
                slot: st.slot,
            })
            .collect()
    }

    /// `(slot, role)` for every slot that has a chosen role, in turn order.
    pub fn recap(&self) -> Vec<RecapEntry> {
        self.turn_order
            .iter()
            .filter_map(|s| {
                let st = self.slot_states.get(s)?;
                Some(RecapEntry {
                    slot: *s,
                    role: st.chosen_role.clone()?,
                })
            })
            .collect()
    }
}

/// Host-only tallies of what has been drafted this session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftCounters {
    pub impostors: u32,
    pub neutral_killing: u32,
    pub neutral_passive: u32,
    per_role: BTreeMap<String, u32>,
}

impl DraftCounters {
    pub fn record(&mut self, role: &str, faction: Faction) {
        *self.per_role.entry(role.to_string()).or_insert(0) += 1;
        match faction {
            Faction::Impostor => self.impostors += 1,
            Faction::NeutralKilling => self.neutral_killing += 1,
            Faction::Neutral => self.neutral_passive += 1,
            Faction::Crewmate => {}
        }
    }

    pub fn drafted(&self, role: &str) -> u32 {
        self.per_role.get(role).copied().unwrap_or(0)
    }

    /// Whether `faction` has hit its configured cap. Crewmate is uncapped.
    pub fn faction_capped(&self, faction: Faction, config: &DraftConfig) -> bool {
        match faction {
            Faction::Impostor => self.impostors >= config.max_impostors,
            Faction::NeutralKilling => self.neutral_killing >= config.max_neutral_killing,
            Faction::Neutral => self.neutral_passive >= config.max_neutral_passive,
            Faction::Crewmate => false,
        }
    }

    pub fn per_role(&self) -> &BTreeMap<String, u32> {
        &self.per_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(pairs: &[(u8, u8)]) -> Vec<SlotAssignment> {
        pairs
            .iter()
            .map(|(p, s)| SlotAssignment {
                participant: ParticipantId(*p),
                slot: SlotNumber(*s),
            })
            .collect()
    }

    #[test]
    fn turn_order_is_sorted_slots() {
        let mut session = DraftSession::new();
        assert!(session.seat(&seat(&[(10, 3), (11, 1), (12, 2)])));
        assert_eq!(
            session.turn_order(),
            &[SlotNumber(1), SlotNumber(2), SlotNumber(3)]
        );
        assert_eq!(session.slot_of(ParticipantId(10)), Some(SlotNumber(3)));
        assert_eq!(session.turn_of(SlotNumber(3)), Some(TurnNumber(3)));
    }

    #[test]
    fn duplicate_seating_rejected() {
        let mut session = DraftSession::new();
        assert!(!session.seat(&seat(&[(1, 1), (2, 1)])));
        assert!(!session.seat(&seat(&[(1, 1), (1, 2)])));
        assert!(!session.seat(&seat(&[(1, 0)])));
        assert!(!session.is_seated());
    }

    #[test]
    fn current_turn_never_decreases() {
        let mut session = DraftSession::new();
        session.seat(&seat(&[(1, 1), (2, 2)]));
        assert!(session.set_current_turn(TurnNumber(2)));
        assert!(!session.set_current_turn(TurnNumber(1)));
        assert_eq!(session.current_turn(), TurnNumber(2));
        assert_eq!(session.current_picker(), Some(ParticipantId(2)));
    }

    #[test]
    fn only_one_picker_at_a_time() {
        let mut session = DraftSession::new();
        session.seat(&seat(&[(1, 1), (2, 2), (3, 3)]));
        session.open_turn(SlotNumber(1), vec!["A".into()]);
        session.open_turn(SlotNumber(2), vec!["B".into()]);
        let picking: Vec<_> = session.states().filter(|s| s.is_picking_now).collect();
        assert_eq!(picking.len(), 1);
        assert_eq!(picking[0].slot, SlotNumber(2));
        assert!(session.state(SlotNumber(1)).unwrap().offered_roles.is_empty());
    }

    #[test]
    fn pick_recorded_once() {
        let mut session = DraftSession::new();
        session.seat(&seat(&[(1, 1)]));
        assert!(session.record_pick(SlotNumber(1), "Mayor".into()));
        assert!(!session.record_pick(SlotNumber(1), "Sheriff".into()));
        assert_eq!(session.recap()[0].role, "Mayor");
    }

    #[test]
    fn deadline_runs_down_to_zero() {
        let mut session = DraftSession::new();
        session.reset_deadline(Duration::from_secs(2));
        assert!(!session.run_down_deadline(Duration::from_secs(1)));
        assert!(session.run_down_deadline(Duration::from_secs(5)));
        // Stays expired until reset.
        assert!(session.run_down_deadline(Duration::ZERO));
    }

    #[test]
    fn counters_and_caps() {
        let config = DraftConfig::default();
        let mut c = DraftCounters::default();
        assert!(!c.faction_capped(Faction::Impostor, &config));
        c.record("Vampire", Faction::Impostor);
        c.record("Sheriff", Faction::Crewmate);
        c.record("Sheriff", Faction::Crewmate);
        assert!(c.faction_capped(Faction::Impostor, &config));
        assert!(!c.faction_capped(Faction::Crewmate, &config));
        assert_eq!(c.drafted("Sheriff"), 2);
        assert_eq!(c.drafted("Mayor"), 0);
    }
}
