//! Desktop walkthrough of the addressing and roster engine.
//!
//! Runs the whole startup-to-persist cycle against in-memory
//! collaborators: define and throw turnouts, migrate a legacy roster,
//! register a dynamically discovered locomotive, and persist everything.
//!
//! Run with: cargo run --example station

use anyhow::Context;
use rs_depot::{
    hal::mock::{MemStorage, MockStatus, MockTrack},
    loco::{DriveMode, TransientEntry},
    roster::{Roster, LEGACY_ROSTER_FILE},
    store::TurnoutStore,
    traits::OlcbNodeMap,
    turnout::TurnoutType,
};

struct ThrottleRequest {
    address: u16,
    mode: DriveMode,
}

impl TransientEntry for ThrottleRequest {
    fn legacy_address(&self) -> u16 {
        self.address
    }
    fn drive_mode(&self) -> DriveMode {
        self.mode
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut storage = MemStorage::new();
    let mut track = MockTrack::new();
    let mut status = MockStatus::new();

    // ---- turnouts -------------------------------------------------------
    let turnouts = TurnoutStore::new();
    turnouts.load(&storage)?;

    turnouts.create_or_update(5, 10, -1, TurnoutType::Left);
    turnouts.create_or_update(6, 11, -1, TurnoutType::Right);
    turnouts.toggle_by_id(5, &mut track, &mut status);

    println!("turnout state: {}", turnouts.get_state(true));
    for line in &status.lines {
        println!("report: {line}");
    }
    for (packet, repeats) in &track.packets {
        println!("packet: {:02X?} x{repeats}", packet.bytes());
    }
    let stored = turnouts.store(&mut storage)?;
    println!("stored {stored} turnouts");

    // ---- roster ---------------------------------------------------------
    storage.seed(
        LEGACY_ROSTER_FILE,
        r#"[{"address": 1234, "description": "Big Boy",
             "idleOnStartup": "true", "defaultOnThrottles": "true"}]"#,
    );

    let roster = Roster::open(&mut storage, OlcbNodeMap)?;
    println!(
        "roster has {} entries (dirty: {}, legacy found: {})",
        roster.len(),
        roster.dirty(),
        roster.legacy_entries_found()
    );

    // a throttle asks for a locomotive the roster has never seen
    let address = roster.add_dynamic_entry(ThrottleRequest {
        address: 3,
        mode: DriveMode::Dcc128,
    });
    let entry = roster
        .get_entry(address)
        .context("entry was just registered")?;
    println!(
        "registered {} (node id 0x{:012X})",
        entry.identifier(),
        entry.traction_node_id(&OlcbNodeMap)
    );

    roster.persist(&mut storage)?;
    println!("roster: {}", roster.roster_json());

    Ok(())
}
