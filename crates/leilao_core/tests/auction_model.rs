use leilao_core::{
    now_epoch_ms, open_db_in_memory, Auction, AuctionBuilder, AuctionRepository, Bid, Session, User,
    UserRepository, DAY_MS,
};
use uuid::Uuid;

#[test]
fn new_auction_starts_open_unused_and_now() {
    let owner = Uuid::new_v4();
    let before = now_epoch_ms();
    let auction = Auction::new("Geladeira", 800.0, owner);

    assert!(auction.id().is_none());
    assert!(auction.is_active());
    assert!(!auction.is_used());
    assert!(auction.bids().is_empty());
    assert_eq!(auction.owner, owner);
    assert!(auction.created_at >= before);
}

#[test]
fn builder_back_dates_creation() {
    let auction = AuctionBuilder::new(Uuid::new_v4())
        .created_days_ago(10)
        .build();

    assert!(auction.is_older_than(7, now_epoch_ms()));
    assert!(now_epoch_ms() - auction.created_at < 11 * DAY_MS);
}

#[test]
fn user_identity_is_by_id_not_by_fields() {
    let id = Uuid::new_v4();
    let saved = User::with_id(id, "Ana", "ana@email");
    let renamed = User::with_id(id, "Ana Maria", "ana.maria@email");
    let unsaved = User::new("Ana", "ana@email");

    assert!(saved.is_same_entity(&renamed));
    assert!(!saved.is_same_entity(&unsaved));
    assert!(!unsaved.is_same_entity(&unsaved.clone()));
}

#[test]
fn auction_serialization_uses_expected_wire_fields() {
    let owner = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let bidder = Uuid::parse_str("66666666-7777-4888-9999-aaaaaaaaaaaa").unwrap();
    let auction = AuctionBuilder::new(owner)
        .named("carro")
        .initial_value(3200.0)
        .created_at(1_700_000_000_000)
        .bid(1_700_000_360_000, bidder, 3300.0)
        .closed()
        .build();

    let json = serde_json::to_value(&auction).unwrap();
    assert_eq!(json["id"], serde_json::Value::Null);
    assert_eq!(json["name"], "carro");
    assert_eq!(json["initial_value"], 3200.0);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["closed"], true);
    assert_eq!(json["used"], true);
    assert_eq!(json["owner"], owner.to_string());
    assert_eq!(json["bids"][0]["bidder"], bidder.to_string());
    assert_eq!(json["bids"][0]["placed_at"], 1_700_000_360_000_i64);

    let decoded: Auction = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, auction);
    assert_eq!(decoded.bids(), &[Bid::new(1_700_000_360_000, bidder, 3300.0)]);
}

#[test]
fn decoded_auction_with_bids_is_always_used() {
    let mut conn = open_db_in_memory().unwrap();
    let session = Session::begin(&mut conn).unwrap();
    let users = UserRepository::new(&session);
    let auctions = AuctionRepository::new(&session);

    let mut owner = User::new("Ana", "ana@email");
    let mut bidder = User::new("Bezerra", "bezerra@email");
    users.save(&mut owner).unwrap();
    users.save(&mut bidder).unwrap();

    let auction = AuctionBuilder::new(owner.id().unwrap())
        .bid(1, bidder.id().unwrap(), 350.0)
        .build();
    let mut json = serde_json::to_value(&auction).unwrap();
    json["used"] = serde_json::Value::Bool(false);

    let mut decoded: Auction = serde_json::from_value(json).unwrap();
    assert!(decoded.is_used());

    auctions.save(&mut decoded).unwrap();
    assert!(auctions.list_unused().unwrap().is_empty());
}

#[test]
fn decoded_auction_without_bids_keeps_used_flag() {
    let owner = Uuid::new_v4();
    let unused = AuctionBuilder::new(owner).build();
    let marked = AuctionBuilder::new(owner).used().build();

    let unused_json = serde_json::to_value(&unused).unwrap();
    let marked_json = serde_json::to_value(&marked).unwrap();

    assert!(!serde_json::from_value::<Auction>(unused_json).unwrap().is_used());
    assert!(serde_json::from_value::<Auction>(marked_json).unwrap().is_used());
}
