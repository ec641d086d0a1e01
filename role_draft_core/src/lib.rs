// role_draft_core — the role draft: pool, selection, turns, and replication.
//
// One participant (the host) runs `DraftCoordinator`, the single source of
// truth for a turn-based draft in which every seated participant picks a
// role from a capped, weighted pool. Everyone else runs a `DraftMirror`
// that rebuilds the same session purely from the host's broadcasts
// (`role_draft_protocol`). Only the host draws random numbers
// (`role_draft_prng`), so one seed replays one draft.
//
// Module overview:
// - `faction.rs`:     Faction tags and the name → faction classifier.
// - `pool.rs`:        `RolePool` snapshot built from a `RoleCatalog`, with the
//                     non-assignable denylist and built-in fallback pool.
// - `catalog.rs`:     `JsonRoleCatalog`, role metadata from a JSON array.
// - `registry.rs`:    `RoleRegistry`, interned `RoleId`s and canonical names.
// - `selector.rs`:    Weighted single pick and weighted pick-without-replacement.
// - `config.rs`:      `DraftConfig` (turn length, offer size, caps, post-draft
//                     timings), JSON with defaults.
// - `session.rs`:     `DraftSession` / `PlayerDraftState` data model and the
//                     host's `DraftCounters`.
// - `coordinator.rs`: `DraftCoordinator`, the host state machine.
// - `mirror.rs`:      `DraftMirror`, the follower's replica.
// - `handoff.rs`:     Passing finished picks to the role-assignment sink.
// - `postdraft.rs`:   `PostDraftSequence` (Recap → MaybeAutoStart → Teardown).
// - `event.rs`:       `DraftEvent`, what UIs subscribe to.
// - `presenter.rs`:   `Presenter` trait and `route_events`.
// - `ports.rs`:       Collaborator traits (`Lobby`, `RoleAssignmentSink`,
//                     `ForcedRoleQueue`) and `HostPorts`.
// - `table.rs`:       `LocalTable`, a host plus followers over an in-process
//                     loopback, with in-memory lobby and sink.
//
// Everything is single-threaded and synchronous: the owner calls `tick` on a
// fixed interval and feeds inbound messages one at a time from the same
// thread.

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod event;
pub mod faction;
pub mod handoff;
pub mod mirror;
pub mod pool;
pub mod ports;
pub mod postdraft;
pub mod presenter;
pub mod registry;
pub mod selector;
pub mod session;
pub mod table;

pub use config::DraftConfig;
pub use coordinator::{DraftCoordinator, StartDraftError};
pub use event::DraftEvent;
pub use faction::Faction;
pub use mirror::{DraftMirror, MirrorPhase};
pub use pool::{RoleCatalog, RoleDescriptor, RolePool};
pub use ports::{FifoOverrides, ForcedRoleQueue, HostPorts, Lobby, RoleAssignmentSink};
pub use registry::{RoleId, RoleRegistry};
pub use table::{InMemoryLobby, LocalTable, RecordingSink, TableError};
