// End-to-end draft tests over the in-process table.
//
// Each test seats a host and followers on a `LocalTable`, so every host
// broadcast goes through the real codec and framing to every follower mirror
// and back to the host as an echo. Follower picks travel the same wire path.
// Assertions check both sides: the host's authoritative session and what the
// followers rebuilt from messages alone.

use std::collections::BTreeSet;
use std::time::Duration;

use role_draft_core::faction::{self, BASELINE_ROLE, Faction};
use role_draft_core::presenter::{Presenter, route_events};
use role_draft_core::{
    DraftConfig, DraftEvent, LocalTable, MirrorPhase, RoleDescriptor, StartDraftError,
    TableError,
};
use role_draft_protocol::{DraftMessage, ParticipantId, RecapEntry, SlotNumber, TurnNumber};

const HOST: ParticipantId = ParticipantId(1);

fn ids(n: u8) -> Vec<ParticipantId> {
    (1..=n).map(ParticipantId).collect()
}

fn role(name: &str, max_count: i32, chance: i32) -> RoleDescriptor {
    RoleDescriptor {
        name: name.into(),
        enabled: true,
        max_count,
        chance,
        faction: None,
    }
}

fn crowded_catalog() -> Vec<RoleDescriptor> {
    vec![
        role("Sheriff", 2, 60),
        role("Mayor", 1, 40),
        role("Medic", 1, 40),
        role("Engineer", 2, 40),
        role("Investigator", 1, 30),
        role("Impostor", 3, 80),
        role("Vampire", 2, 50),
        role("Warlock", 1, 50),
        role("Jackal", 2, 50),
        role("Serial Killer", 1, 50),
        role("Jester", 2, 50),
        role("Executioner", 1, 50),
    ]
}

fn table(n: u8, config: DraftConfig, seed: u64, catalog: Vec<RoleDescriptor>) -> LocalTable {
    LocalTable::new(HOST, &ids(n), config, seed, Box::new(catalog))
}

/// Run the draft to completion with every picker taking `index`.
fn pick_through(t: &mut LocalTable, index: u8) -> Result<(), TableError> {
    while t.host().is_active() {
        let picker = t.current_picker().unwrap();
        assert!(t.submit(picker, index)?);
    }
    Ok(())
}

fn final_recap(t: &LocalTable) -> Vec<RecapEntry> {
    t.transcript()
        .iter()
        .rev()
        .find_map(|m| match m {
            DraftMessage::Recap { picks, .. } => Some(picks.clone()),
            _ => None,
        })
        .unwrap()
}

#[test]
fn five_players_get_slots_then_first_offer() {
    let mut t = table(5, DraftConfig::default(), 2024, crowded_catalog());
    t.start().unwrap();

    let transcript = t.transcript();
    assert_eq!(transcript.len(), 2);
    let DraftMessage::StartDraft { total_slots, slots } = &transcript[0] else {
        panic!("expected StartDraft first, got {:?}", transcript[0]);
    };
    assert_eq!(*total_slots, 5);
    let numbers: BTreeSet<u8> = slots.iter().map(|s| s.slot.0).collect();
    assert_eq!(numbers, (1..=5).collect());
    let first = slots.iter().find(|s| s.slot == SlotNumber(1)).unwrap();

    let DraftMessage::AnnounceTurn {
        turn,
        slot,
        picker,
        offered,
    } = &transcript[1]
    else {
        panic!("expected AnnounceTurn second, got {:?}", transcript[1]);
    };
    assert_eq!(*turn, TurnNumber(1));
    assert_eq!(*slot, SlotNumber(1));
    assert_eq!(*picker, first.participant);
    assert_eq!(offered.len(), 3);

    for mirror in t.followers() {
        assert_eq!(mirror.phase(), MirrorPhase::Drafting);
        assert_eq!(mirror.session().slot_count(), 5);
    }
}

#[test]
fn completed_draft_fills_every_slot_and_hands_off() {
    let mut t = table(5, DraftConfig::default(), 7, crowded_catalog());
    t.start().unwrap();
    pick_through(&mut t, 0).unwrap();

    let recap = final_recap(&t);
    let slots: Vec<u8> = recap.iter().map(|e| e.slot.0).collect();
    assert_eq!(slots, vec![1, 2, 3, 4, 5]);
    assert!(recap.iter().all(|e| !e.role.is_empty()));
    for mirror in t.followers() {
        assert_eq!(mirror.last_recap(), recap.as_slice());
        assert_eq!(mirror.phase(), MirrorPhase::PostDraft);
    }
    assert_eq!(t.sink().applied().len(), 5);
    assert!(!t.host().is_active());
}

#[test]
fn caps_and_max_counts_hold_after_every_pick() {
    let catalog = crowded_catalog();
    for seed in 0..15 {
        let mut t = table(10, DraftConfig::default(), seed, catalog.clone());
        t.start().unwrap();
        let mut drafted: Vec<String> = Vec::new();
        while t.host().is_active() {
            let picker = t.current_picker().unwrap();
            let turn = t.host().session().current_turn().0;
            // Alternate a real card with the random card.
            let index = if turn % 2 == 0 { 0 } else { 200 };
            assert!(t.submit(picker, index).unwrap());
            let picked = t
                .host_events()
                .into_iter()
                .filter_map(|e| match e {
                    DraftEvent::PickFinalized { role, .. } => Some(role),
                    _ => None,
                })
                .collect::<Vec<_>>();
            drafted.extend(picked);

            let count = |f: Faction| {
                drafted
                    .iter()
                    .filter(|r| faction::classify(r) == f)
                    .count()
            };
            assert!(count(Faction::Impostor) <= 1, "seed {seed}: {drafted:?}");
            assert!(count(Faction::NeutralKilling) <= 1, "seed {seed}: {drafted:?}");
            assert!(count(Faction::Neutral) <= 1, "seed {seed}: {drafted:?}");
            for desc in &catalog {
                let n = drafted.iter().filter(|r| **r == desc.name).count();
                assert!(
                    n <= usize::try_from(desc.max_count).unwrap(),
                    "seed {seed}: {} drafted {n} times",
                    desc.name
                );
            }
        }
        assert_eq!(drafted.len(), 10);
    }
}

#[test]
fn three_card_offers_hold_one_impostor_and_one_killer() {
    for seed in 0..30 {
        let mut t = table(4, DraftConfig::default(), seed, crowded_catalog());
        t.start().unwrap();
        let picker = t.current_picker().unwrap();
        let offer = t.offer_for(picker).unwrap();
        let factions: Vec<Faction> = offer.iter().map(|r| faction::classify(r)).collect();
        let impostors = factions.iter().filter(|f| **f == Faction::Impostor).count();
        let killers = factions.iter().filter(|f| **f == Faction::NeutralKilling).count();
        assert_eq!((impostors, killers), (1, 1), "seed {seed}: {offer:?}");
    }
}

#[test]
fn random_card_from_a_follower_draws_from_available() {
    for seed in 0..10 {
        let mut t = table(3, DraftConfig::default(), seed, crowded_catalog());
        t.start().unwrap();
        // Walk to the first follower's turn.
        while t.current_picker() == Some(HOST) {
            t.submit(HOST, 0).unwrap();
        }
        let picker = t.current_picker().unwrap();
        let available = t.host().available();
        let random_card = t.follower(picker).unwrap().random_card_index().unwrap();
        assert_eq!(usize::from(random_card), t.offer_for(picker).unwrap().len());
        assert!(t.submit(picker, random_card).unwrap());
        let role = t
            .host_events()
            .into_iter()
            .find_map(|e| match e {
                DraftEvent::PickFinalized { picker: p, role, .. } if p == picker => Some(role),
                _ => None,
            })
            .unwrap();
        assert!(available.contains(&role), "seed {seed}: {role} not in {available:?}");
    }
}

#[test]
fn timeout_without_random_card_picks_from_the_offer() {
    let config = DraftConfig {
        random_option_enabled: false,
        turn_duration_secs: 3,
        ..DraftConfig::default()
    };
    let catalog = vec![
        role("Sheriff", 1, 50),
        role("Jester", 1, 50),
        role("Crewmate", 1, 50),
    ];
    for seed in 0..20 {
        let mut t = table(2, config.clone(), seed, catalog.clone());
        t.start().unwrap();
        let picker = t.current_picker().unwrap();
        let mut offer = t.offer_for(picker).unwrap();
        offer.sort();
        assert_eq!(offer, vec!["Crewmate", "Jester", "Sheriff"]);

        for _ in 0..3 {
            t.tick(Duration::from_secs(1)).unwrap();
        }
        assert_eq!(t.host().session().current_turn(), TurnNumber(2));
        let role = t
            .host_events()
            .into_iter()
            .find_map(|e| match e {
                DraftEvent::PickFinalized { role, .. } => Some(role),
                _ => None,
            })
            .unwrap();
        assert!(offer.contains(&role), "seed {seed}: timed out into {role}");
    }
}

#[test]
fn duplicate_turn_announcement_changes_nothing() {
    let mut t = table(4, DraftConfig::default(), 99, crowded_catalog());
    t.start().unwrap();
    let picker = t.current_picker().unwrap();
    t.submit(picker, 1).unwrap();

    let announce = t
        .transcript()
        .iter()
        .rev()
        .find(|m| matches!(m, DraftMessage::AnnounceTurn { .. }))
        .cloned()
        .unwrap();
    let before_turn = t.host().session().current_turn();
    let before_recap = t.host().session().recap();
    let sent = t.transcript().len();
    t.host_events();
    for p in ids(4).into_iter().skip(1) {
        t.follower_events(p);
    }

    assert!(!t.redeliver(&announce).unwrap());
    assert!(!t.redeliver(&announce).unwrap());

    assert_eq!(t.host().session().current_turn(), before_turn);
    assert_eq!(t.host().session().recap(), before_recap);
    assert_eq!(t.transcript().len(), sent);
    assert!(t.host_events().is_empty());
    for p in ids(4).into_iter().skip(1) {
        assert!(t.follower_events(p).is_empty());
        assert_eq!(t.follower(p).unwrap().session().current_turn(), before_turn);
    }
}

#[test]
fn stale_announcement_is_ignored_by_followers() {
    let mut t = table(3, DraftConfig::default(), 5, crowded_catalog());
    t.start().unwrap();
    let first = t.transcript()[1].clone();
    let picker = t.current_picker().unwrap();
    t.submit(picker, 0).unwrap();
    assert!(!t.redeliver(&first).unwrap());
    for mirror in t.followers() {
        assert_eq!(mirror.session().current_turn(), TurnNumber(2));
    }
}

#[test]
fn cancel_tears_down_every_follower() {
    let mut t = table(4, DraftConfig::default(), 3, crowded_catalog());
    t.overrides_mut().push(ParticipantId(4), "Mayor");
    t.start().unwrap();
    t.overrides_mut().push(ParticipantId(3), "Jester");
    t.cancel().unwrap();

    assert!(!t.host().is_active());
    assert!(t.overrides_mut().is_empty());
    assert!(matches!(
        t.transcript().last(),
        Some(DraftMessage::Recap { show_recap: false, picks }) if picks.is_empty()
    ));
    for p in ids(4).into_iter().skip(1) {
        let events = t.follower_events(p);
        assert!(events.contains(&DraftEvent::DraftCancelled));
        assert_eq!(events.last(), Some(&DraftEvent::CloseAll));
        assert_eq!(t.follower(p).unwrap().phase(), MirrorPhase::Idle);
    }
    assert!(t.sink().applied().is_empty());
}

#[test]
fn disconnected_participant_is_skipped_at_hand_off() {
    let mut t = table(4, DraftConfig::default(), 12, crowded_catalog());
    t.start().unwrap();
    t.lobby_mut().disconnect(ParticipantId(3));
    pick_through(&mut t, 0).unwrap();
    let applied: Vec<ParticipantId> = t.sink().applied().iter().map(|(p, _, _)| *p).collect();
    assert_eq!(applied.len(), 3);
    assert!(!applied.contains(&ParticipantId(3)));
    assert_eq!(final_recap(&t).len(), 4);
}

#[test]
fn exhausted_pool_still_offers_baseline() {
    let catalog = vec![role("Sheriff", 1, 50)];
    let mut t = table(3, DraftConfig::default(), 1, catalog);
    t.start().unwrap();
    pick_through(&mut t, 0).unwrap();
    let recap = final_recap(&t);
    assert_eq!(recap.iter().filter(|e| e.role == "Sheriff").count(), 1);
    assert_eq!(recap.iter().filter(|e| e.role == BASELINE_ROLE).count(), 2);
}

#[test]
fn same_seed_replays_the_same_draft() {
    let run = |seed| {
        let mut t = table(6, DraftConfig::default(), seed, crowded_catalog());
        t.start().unwrap();
        pick_through(&mut t, 1).unwrap();
        t.transcript().to_vec()
    };
    assert_eq!(run(31), run(31));
}

#[test]
fn renotify_rebuilds_followers_and_reopens_the_turn() {
    let mut t = table(3, DraftConfig::default(), 8, crowded_catalog());
    t.start().unwrap();
    let picker = t.current_picker().unwrap();
    let offer = t.offer_for(picker).unwrap();
    assert!(t.renotify().unwrap());

    let tail = &t.transcript()[t.transcript().len() - 2..];
    assert!(matches!(tail[0], DraftMessage::SlotNotify { .. }));
    assert!(matches!(tail[1], DraftMessage::AnnounceTurn { .. }));
    for mirror in t.followers() {
        assert_eq!(mirror.phase(), MirrorPhase::Drafting);
        assert_eq!(mirror.session().current_turn(), TurnNumber(1));
    }
    assert_eq!(t.offer_for(picker), Some(offer));

    assert!(t.submit(picker, 0).unwrap());
    for mirror in t.followers() {
        assert_eq!(mirror.session().current_turn(), TurnNumber(2));
    }
}

#[test]
fn post_draft_runs_to_teardown_and_requests_start() {
    let config = DraftConfig {
        recap_duration_secs: 2,
        auto_start_game: true,
        auto_start_delay_secs: 1,
        ..DraftConfig::default()
    };
    let mut t = table(2, config, 4, crowded_catalog());
    t.start().unwrap();
    pick_through(&mut t, 0).unwrap();
    assert!(!t.join(ParticipantId(9)));
    t.host_events();

    for _ in 0..3 {
        t.tick(Duration::from_secs(1)).unwrap();
    }
    let events = t.host_events();
    assert!(events.contains(&DraftEvent::GameStartRequested));
    assert!(t.host().post_draft_phase().is_none());
    assert_eq!(
        t.follower(ParticipantId(2)).unwrap().phase(),
        MirrorPhase::Idle
    );
    assert!(t.join(ParticipantId(9)));
    // The game is under way now; another draft is refused.
    assert!(matches!(
        t.start(),
        Err(TableError::Start(StartDraftError::LobbyNotReady))
    ));
}

#[derive(Default)]
struct ScriptedUi {
    shown: Vec<Vec<String>>,
    recaps: usize,
    closes: usize,
}

impl Presenter for ScriptedUi {
    fn show_picker(&mut self, offered: &[String]) {
        self.shown.push(offered.to_vec());
    }
    fn refresh_turn_list(&mut self) {}
    fn show_recap(&mut self, _picks: &[RecapEntry]) {
        self.recaps += 1;
    }
    fn close_all(&mut self) {
        self.closes += 1;
    }
}

#[test]
fn follower_ui_sees_own_offer_and_recap() {
    let mut t = table(2, DraftConfig::default(), 17, crowded_catalog());
    let me = ParticipantId(2);
    let mut ui = ScriptedUi::default();
    t.start().unwrap();
    pick_through(&mut t, 0).unwrap();
    let events = t.follower_events(me);
    route_events(me, &events, &mut ui);
    assert_eq!(ui.shown.len(), 1);
    assert_eq!(ui.recaps, 1);
    assert!(ui.closes >= 1);
}
