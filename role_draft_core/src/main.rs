// Headless draft simulator.
//
// Runs one complete draft on a `LocalTable`: participant 1 hosts, the others
// are followers, and every seat is a bot that picks a random card index
// (the random card included) as soon as it is its turn. `--idle N` makes the
// last N seats never pick, so their turns resolve by timeout. Time advances
// in one-second ticks. The recap is printed at the end, as text or JSON.
//
// Usage:
//   draft-sim [OPTIONS]
//     --players <N>     Seated participants (default: 5)
//     --seed <N>        Host PRNG seed (default: 1)
//     --config <PATH>   Draft config JSON (default: built-in defaults)
//     --roles <PATH>    Role catalog JSON (default: built-in fallback pool)
//     --idle <N>        Seats that never pick (default: 0)
//     --json            Print the recap as JSON
//
// Logging goes to stderr and follows RUST_LOG (default `info`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use role_draft_core::catalog::{CatalogError, JsonRoleCatalog};
use role_draft_core::config::ConfigError;
use role_draft_core::{
    DraftConfig, LocalTable, RoleCatalog, RoleDescriptor, TableError, faction,
};
use role_draft_prng::DraftRng;
use role_draft_protocol::{DraftMessage, ParticipantId, SlotNumber};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_secs(1);

struct SimArgs {
    players: u8,
    seed: u64,
    config: Option<PathBuf>,
    roles: Option<PathBuf>,
    idle: u8,
    json: bool,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            players: 5,
            seed: 1,
            config: None,
            roles: None,
            idle: 0,
            json: false,
        }
    }
}

#[derive(Debug, Error)]
enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("loading role catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("draft ended without a recap")]
    NoRecap,
}

#[derive(Serialize)]
struct SimReport {
    seed: u64,
    picks: Vec<SimPick>,
    handed_off: usize,
}

#[derive(Serialize)]
struct SimPick {
    slot: u8,
    participant: u8,
    role: String,
    faction: faction::Faction,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let report = match run(&args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("draft-sim: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("draft-sim: encoding report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("Draft recap (seed {}):", report.seed);
        for pick in &report.picks {
            println!(
                "  #{:<3} P{:<4} {} ({:?})",
                pick.slot, pick.participant, pick.role, pick.faction
            );
        }
        println!("Handed off {} of {} roles.", report.handed_off, report.picks.len());
    }
}

fn run(args: &SimArgs) -> Result<SimReport, SimError> {
    let config = match &args.config {
        Some(path) => DraftConfig::from_file(path)?,
        None => DraftConfig::default(),
    };
    let catalog: Box<dyn RoleCatalog> = match &args.roles {
        Some(path) => Box::new(JsonRoleCatalog::from_file(path)?),
        None => Box::new(Vec::<RoleDescriptor>::new()),
    };

    let participants: Vec<ParticipantId> = (1..=args.players).map(ParticipantId).collect();
    let idle_from = args.players.saturating_sub(args.idle);
    let mut table = LocalTable::new(ParticipantId(1), &participants, config, args.seed, catalog);
    let mut bots = DraftRng::new(args.seed ^ 0xb07b_07b0_7b07_b07b);

    table.start()?;
    while table.host().is_active() {
        let Some(picker) = table.current_picker() else {
            break;
        };
        if picker.0 > idle_from {
            table.tick(TICK)?;
            continue;
        }
        let offered = table.offer_for(picker).map_or(0, |o| o.len());
        let index = u8::try_from(bots.index(offered + 1)).unwrap_or(u8::MAX);
        if !table.submit(picker, index)? {
            table.tick(TICK)?;
        }
    }
    while table.host().post_draft_phase().is_some() {
        table.tick(TICK)?;
    }

    let seating: BTreeMap<SlotNumber, ParticipantId> = table
        .transcript()
        .iter()
        .find_map(|m| match m {
            DraftMessage::StartDraft { slots, .. } => {
                Some(slots.iter().map(|s| (s.slot, s.participant)).collect())
            }
            _ => None,
        })
        .unwrap_or_default();
    let recap = table
        .transcript()
        .iter()
        .rev()
        .find_map(|m| match m {
            DraftMessage::Recap { picks, .. } if !picks.is_empty() => Some(picks.clone()),
            _ => None,
        })
        .ok_or(SimError::NoRecap)?;

    let picks = recap
        .into_iter()
        .map(|entry| SimPick {
            slot: entry.slot.0,
            participant: seating.get(&entry.slot).map_or(0, |p| p.0),
            faction: faction::classify(&entry.role),
            role: entry.role,
        })
        .collect();
    Ok(SimReport {
        seed: args.seed,
        picks,
        handed_off: table.sink().applied().len(),
    })
}

/// Simple `std::env::args()` matching; exits on bad input.
fn parse_args() -> SimArgs {
    let mut args = SimArgs::default();
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < argv.len() {
        match argv[i].as_str() {
            "--players" => {
                i += 1;
                args.players = argv
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or_else(|| {
                        eprintln!("--players requires a number from 1 to 255");
                        std::process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                args.seed = argv.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires an unsigned integer");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                args.config = Some(argv.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--roles" => {
                i += 1;
                args.roles = Some(argv.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--roles requires a path");
                    std::process::exit(1);
                }));
            }
            "--idle" => {
                i += 1;
                args.idle = argv.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--idle requires a number");
                    std::process::exit(1);
                });
            }
            "--json" => args.json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn print_usage() {
    println!("Usage: draft-sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --players <N>     Seated participants (default: 5)");
    println!("  --seed <N>        Host PRNG seed (default: 1)");
    println!("  --config <PATH>   Draft config JSON (default: built-in defaults)");
    println!("  --roles <PATH>    Role catalog JSON (default: built-in fallback pool)");
    println!("  --idle <N>        Seats that never pick (default: 0)");
    println!("  --json            Print the recap as JSON");
    println!("  --help, -h        Show this help");
}
