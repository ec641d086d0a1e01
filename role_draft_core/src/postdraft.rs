// Post-draft sequencing.
//
// After the last pick (or, on a follower, after the Recap message) the draft
// runs a short fixed sequence: show the recap, optionally wait and request a
// game start, then tear down. `PostDraftSequence` is that sequence as an
// explicit state machine, advanced by the same `tick(elapsed)` calls that
// drive the turn deadline.
//
//   Recap ──(recap_duration)──> MaybeAutoStart ──(auto_start_delay)──> Teardown
//
// A phase with zero length is passed through on the next advance. The
// MaybeAutoStart phase only has a length when auto-start is requested; it is
// otherwise instantaneous. Excess elapsed time carries across phases so a
// single large tick can walk the whole sequence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DraftConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostDraftPhase {
    Recap,
    MaybeAutoStart,
    Teardown,
}

#[derive(Clone, Debug)]
pub struct PostDraftSequence {
    phase: PostDraftPhase,
    remaining: Duration,
    auto_start: bool,
    auto_start_delay: Duration,
}

impl PostDraftSequence {
    /// Start in the Recap phase. Without `show_recap` the phase has no
    /// length.
    pub fn begin(config: &DraftConfig, show_recap: bool, auto_start: bool) -> Self {
        Self {
            phase: PostDraftPhase::Recap,
            remaining: if show_recap {
                config.recap_duration()
            } else {
                Duration::ZERO
            },
            auto_start,
            auto_start_delay: config.auto_start_delay(),
        }
    }

    pub fn phase(&self) -> PostDraftPhase {
        self.phase
    }

    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn is_finished(&self) -> bool {
        self.phase == PostDraftPhase::Teardown
    }

    /// Spend `elapsed`, returning every phase entered along the way in order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<PostDraftPhase> {
        let mut entered = Vec::new();
        let mut budget = elapsed;
        while !self.is_finished() && budget >= self.remaining {
            budget -= self.remaining;
            match self.phase {
                PostDraftPhase::Recap => {
                    self.phase = PostDraftPhase::MaybeAutoStart;
                    self.remaining = if self.auto_start {
                        self.auto_start_delay
                    } else {
                        Duration::ZERO
                    };
                }
                PostDraftPhase::MaybeAutoStart => {
                    self.phase = PostDraftPhase::Teardown;
                    self.remaining = Duration::ZERO;
                }
                PostDraftPhase::Teardown => {}
            }
            entered.push(self.phase);
        }
        if !self.is_finished() {
            self.remaining -= budget;
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DraftConfig {
        DraftConfig {
            recap_duration_secs: 5,
            auto_start_delay_secs: 3,
            ..DraftConfig::default()
        }
    }

    #[test]
    fn walks_phases_in_order() {
        let mut seq = PostDraftSequence::begin(&config(), true, true);
        assert_eq!(seq.phase(), PostDraftPhase::Recap);
        assert!(seq.advance(Duration::from_secs(4)).is_empty());
        assert_eq!(
            seq.advance(Duration::from_secs(1)),
            vec![PostDraftPhase::MaybeAutoStart]
        );
        assert!(seq.advance(Duration::from_secs(2)).is_empty());
        assert_eq!(
            seq.advance(Duration::from_secs(1)),
            vec![PostDraftPhase::Teardown]
        );
        assert!(seq.is_finished());
        assert!(seq.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn no_recap_no_auto_start_finishes_on_first_advance() {
        let mut seq = PostDraftSequence::begin(&config(), false, false);
        assert_eq!(
            seq.advance(Duration::ZERO),
            vec![PostDraftPhase::MaybeAutoStart, PostDraftPhase::Teardown]
        );
    }

    #[test]
    fn one_big_tick_walks_everything() {
        let mut seq = PostDraftSequence::begin(&config(), true, true);
        let entered = seq.advance(Duration::from_secs(60));
        assert_eq!(
            entered,
            vec![PostDraftPhase::MaybeAutoStart, PostDraftPhase::Teardown]
        );
    }

    #[test]
    fn auto_start_delay_skipped_when_disabled() {
        let mut seq = PostDraftSequence::begin(&config(), true, false);
        assert_eq!(
            seq.advance(Duration::from_secs(5)),
            vec![PostDraftPhase::MaybeAutoStart, PostDraftPhase::Teardown]
        );
    }
}
