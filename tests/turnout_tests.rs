//! Integration tests for turnout addressing, dispatch and persistence

use rs_depot::{
    hal::mock::{MemStorage, MockStatus, MockTrack},
    packet::{board_address_and_index, AccessoryPacket},
    store::{TurnoutStore, TURNOUTS_FILE},
    turnout::TurnoutType,
};

#[test]
fn derived_addressing_scenario() {
    // Turnout id=5, address=10, index=-1: boardAddress = (10+3)/4 = 3,
    // boardIndex = 10 - 12 + 3 = 1
    let store = TurnoutStore::new();
    let turnout = store.create_or_update(5, 10, -1, TurnoutType::Left);
    assert_eq!(turnout.board_address(), 3);
    assert_eq!(turnout.index(), 1);

    // Toggling to thrown sends the accessory packet for board 3, index 1,
    // activate=1 and reports <H 5 1>
    let mut track = MockTrack::new();
    let mut status = MockStatus::new();
    assert!(store.toggle_by_id(5, &mut track, &mut status));

    assert_eq!(track.last_packet(), Some(AccessoryPacket::encode(3, 1, true)));
    assert_eq!(status.lines, vec!["<H 5 1>"]);
    assert!(store.get_by_id(5).unwrap().is_thrown());
}

#[test]
fn packet_matches_hand_computed_bytes() {
    let (board, index) = board_address_and_index(10);
    let packet = AccessoryPacket::encode(board, index, true);

    // byte0: 10AAAAAA with board 3 in the low six bits
    assert_eq!(packet.byte0(), 0b1000_0011);
    // byte1: ((0 << 4) | (1 << 1) | 1) ^ 0xF8
    assert_eq!(packet.byte1(), 0b0000_0011 ^ 0xF8);
}

#[test]
fn duplicate_addresses_resolve_to_last_inserted() {
    let store = TurnoutStore::new();
    store.create_or_update(1, 10, -1, TurnoutType::Left);
    store.create_or_update(2, 10, -1, TurnoutType::Right);

    // policy verification: lookup scans without short-circuiting
    assert_eq!(store.get_by_address(10).map(|t| t.id()), Some(2));

    // toggle-by-address operates on the same (last) match
    let mut track = MockTrack::new();
    let mut status = MockStatus::new();
    assert!(store.toggle_by_address(10, &mut track, &mut status));
    assert_eq!(status.lines, vec!["<H 2 1>"]);
    assert!(!store.get_by_id(1).unwrap().is_thrown());
}

#[test]
fn create_or_update_never_duplicates_an_id() {
    let store = TurnoutStore::new();
    store.create_or_update(5, 10, -1, TurnoutType::Left);
    let updated = store.create_or_update(5, 30, -1, TurnoutType::Wye);

    assert_eq!(store.len(), 1);
    assert_eq!(updated.address(), 30);
    assert_eq!(updated.kind(), TurnoutType::Wye);
    // board mapping was re-derived: (30+3)/4 = 8, 30 - 32 + 3 = 1
    assert_eq!(updated.board_address(), 8);
    assert_eq!(updated.index(), 1);
}

#[test]
fn full_persistence_cycle() {
    let store = TurnoutStore::new();
    store.create_or_update(1, 4, -1, TurnoutType::Left);
    store.create_or_update(2, 5, -1, TurnoutType::Right);
    store.create_or_update(3, 9, 2, TurnoutType::Multi);

    let mut track = MockTrack::new();
    let mut status = MockStatus::new();
    store.set_by_id(2, true, &mut track, &mut status);

    let mut storage = MemStorage::new();
    assert_eq!(store.store(&mut storage).unwrap(), 3);
    let text = storage.contents(TURNOUTS_FILE).unwrap();
    assert!(text.contains("\"count\":3"));

    // a fresh station restores identical definitions and state
    let restored = TurnoutStore::new();
    assert_eq!(restored.load(&storage).unwrap(), 3);
    assert!(restored.get_by_id(2).unwrap().is_thrown());
    assert!(!restored.get_by_id(1).unwrap().is_thrown());

    let explicit = restored.get_by_id(3).unwrap();
    assert_eq!(explicit.board_address(), 0);
    assert_eq!(explicit.index(), 2);
}

#[test]
fn clear_empties_and_persists() {
    let store = TurnoutStore::new();
    store.create_or_update(1, 4, -1, TurnoutType::Left);

    let mut storage = MemStorage::new();
    store.clear(&mut storage).unwrap();

    assert!(store.is_empty());
    let restored = TurnoutStore::new();
    assert_eq!(restored.load(&storage).unwrap(), 0);
}

#[test]
fn removal_of_missing_entries_is_not_an_error() {
    let store = TurnoutStore::new();
    assert!(!store.remove_by_id(7));
    assert!(!store.remove_by_address(7));
}

#[test]
fn status_listing_reports_every_turnout() {
    let store = TurnoutStore::new();
    store.create_or_update(1, 4, -1, TurnoutType::Left);
    store.create_or_update(2, 8, -1, TurnoutType::Left);

    let mut status = MockStatus::new();
    store.show_status(&mut status);
    assert_eq!(status.lines, vec!["<H 1 4 3 0>", "<H 2 8 3 0>"]);
}
