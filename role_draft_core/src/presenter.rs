// Routing draft events onto a UI.
//
// `Presenter` is the narrow surface a picker UI exposes. `route_events`
// turns a drained batch of `DraftEvent`s into presenter calls for one local
// participant: the picker is shown only on that participant's own turn and
// closed on everyone else's.

use role_draft_protocol::{ParticipantId, RecapEntry};

use crate::event::DraftEvent;

pub trait Presenter {
    fn show_picker(&mut self, offered: &[String]);
    fn refresh_turn_list(&mut self);
    fn show_recap(&mut self, picks: &[RecapEntry]);
    fn close_all(&mut self);
}

pub fn route_events(local: ParticipantId, events: &[DraftEvent], presenter: &mut dyn Presenter) {
    for event in events {
        match event {
            DraftEvent::SlotsAssigned { .. } | DraftEvent::PickFinalized { .. } => {
                presenter.refresh_turn_list();
            }
            DraftEvent::OfferReady {
                picker, offered, ..
            } => {
                if *picker == local {
                    presenter.show_picker(offered);
                } else {
                    presenter.close_all();
                }
                presenter.refresh_turn_list();
            }
            DraftEvent::DraftComplete { show_recap, picks } => {
                if *show_recap {
                    presenter.show_recap(picks);
                }
            }
            DraftEvent::CloseAll => presenter.close_all(),
            DraftEvent::DraftCancelled
            | DraftEvent::PostDraft(_)
            | DraftEvent::GameStartRequested => {}
        }
    }
}
