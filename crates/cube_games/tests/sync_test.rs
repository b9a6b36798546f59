//! Tests for the online room protocol, driven through two in-process runtimes.

use cube_games::sync::codec;
use cube_games::{
    EntitlementGate, Event, GameConfig, GameController, GameRuntime, Identity, InMemoryChannel,
    OpenGate, Phase, Plan, RealtimeChannel, RoomCode, SubscriptionGate, SubscriptionStatus,
    SyncAdapter, SyncErrorKind, TextView,
};
use cube_tictactoe::{Board, Coord, Mark};
use serde_json::json;
use std::sync::Arc;

type Client = GameRuntime<TextView<Vec<u8>>>;

fn client(channel: &Arc<InMemoryChannel>, seed: u64) -> Client {
    client_with_gate(channel, Arc::new(OpenGate), None, seed)
}

fn client_with_gate(
    channel: &Arc<InMemoryChannel>,
    gate: Arc<dyn EntitlementGate>,
    identity: Option<Identity>,
    seed: u64,
) -> Client {
    let adapter = SyncAdapter::new(channel.clone(), gate, identity).with_seed(seed);
    GameRuntime::new(
        GameController::with_seed(GameConfig::instant(), seed),
        TextView::new(Vec::new()),
    )
    .with_adapter(adapter)
}

fn coord(l: u8, r: u8, c: u8) -> Coord {
    Coord::new(l, r, c).unwrap()
}

async fn settle(host: &mut Client, guest: &mut Client) {
    while host.settle().await + guest.settle().await > 0 {}
}

fn board_of(client: &Client) -> Board {
    *client.controller().session().unwrap().board()
}

fn stored_board(channel: &InMemoryChannel, room: &RoomCode) -> Board {
    let value = channel.snapshot(&room.record_key()).unwrap();
    codec::decode(&value).record.board
}

async fn connected_pair() -> (Arc<InMemoryChannel>, Client, Client, RoomCode) {
    let channel = Arc::new(InMemoryChannel::new());
    let mut host = client(&channel, 1);
    let mut guest = client(&channel, 2);
    let room = host.create_room("Ann").await.unwrap();
    guest.join_room(&room.as_str().to_lowercase(), " Bob ").await.unwrap();
    settle(&mut host, &mut guest).await;
    (channel, host, guest, room)
}

async fn click(client: &mut Client, l: u8, r: u8, c: u8) {
    assert!(client.handle(Event::CellClicked(coord(l, r, c))).await);
}

#[tokio::test]
async fn test_create_room_publishes_opening_record() {
    let channel = Arc::new(InMemoryChannel::new());
    let mut host = client(&channel, 1);
    let room = host.create_room("  Ann ").await.unwrap();
    host.settle().await;

    let decoded = codec::decode(&channel.snapshot(&room.record_key()).unwrap());
    assert!(decoded.is_clean());
    assert_eq!(decoded.record.player_a_name, "Ann");
    assert!(!decoded.record.peer_joined);
    assert_eq!(decoded.record.board, Board::new());

    assert_eq!(host.controller().phase(), Phase::WaitingForPeer);
    assert!(host.view().last_frame().contains(&format!("Game code: {room}")));
}

#[tokio::test]
async fn test_join_claims_second_mark() {
    let (channel, host, guest, room) = connected_pair().await;

    let stored = codec::decode(&channel.snapshot(&room.record_key()).unwrap()).record;
    assert!(stored.peer_joined);
    assert_eq!(stored.player_b_name, "Bob");

    assert_eq!(host.controller().phase(), Phase::Playing);
    assert_eq!(guest.controller().phase(), Phase::Playing);
    let host_session = host.controller().session().unwrap();
    assert_eq!(host_session.name_of(Mark::B), "Bob");
    assert_eq!(
        *guest.controller().session().unwrap().local_mark(),
        Some(Mark::B)
    );
    assert_eq!(guest.controller().status(), "Ann's turn");
}

#[tokio::test]
async fn test_moves_reach_the_other_client() {
    let (_channel, mut host, mut guest, _room) = connected_pair().await;

    click(&mut host, 1, 1, 1).await;
    settle(&mut host, &mut guest).await;
    assert_eq!(board_of(&guest).get(Coord::CENTER).mark(), Some(Mark::A));
    assert_eq!(guest.controller().status(), "Bob's turn");

    // Host may not move again until the guest has.
    click(&mut host, 0, 0, 0).await;
    assert!(board_of(&host).is_empty(coord(0, 0, 0)));

    click(&mut guest, 0, 0, 0).await;
    settle(&mut host, &mut guest).await;
    assert_eq!(board_of(&host), board_of(&guest));
    assert_eq!(board_of(&host).occupied_count(), 2);
}

async fn play_host_win(host: &mut Client, guest: &mut Client) {
    for (mover, cell) in [
        (0, (0, 1, 1)),
        (1, (0, 0, 0)),
        (0, (1, 1, 1)),
        (1, (0, 0, 1)),
        (0, (2, 1, 1)),
    ] {
        let client = if mover == 0 { &mut *host } else { &mut *guest };
        click(client, cell.0, cell.1, cell.2).await;
        settle(host, guest).await;
    }
}

#[tokio::test]
async fn test_win_is_shown_on_both_clients() {
    let (_channel, mut host, mut guest, _room) = connected_pair().await;
    play_host_win(&mut host, &mut guest).await;

    for client in [&host, &guest] {
        let controller = client.controller();
        assert_eq!(controller.phase(), Phase::GameOver);
        assert_eq!(controller.status(), "Ann wins!");
        assert_eq!(*controller.tally().a_wins(), 1);
        assert!(controller.is_winning_cell(Coord::CENTER));
    }
}

#[tokio::test]
async fn test_play_again_restarts_both_clients() {
    let (_channel, mut host, mut guest, _room) = connected_pair().await;
    play_host_win(&mut host, &mut guest).await;

    assert!(guest.handle(Event::PlayAgain).await);
    settle(&mut host, &mut guest).await;

    for client in [&host, &guest] {
        assert_eq!(client.controller().phase(), Phase::Playing);
        assert_eq!(board_of(client), Board::new());
        assert_eq!(*client.controller().tally().a_wins(), 1);
    }
    assert_eq!(host.controller().status(), "Ann's turn");
}

#[tokio::test]
async fn test_racing_writes_converge_on_last_writer() {
    let (channel, mut host, mut guest, room) = connected_pair().await;
    play_host_win(&mut host, &mut guest).await;

    // Host restarts and moves before the guest has seen either write; the
    // guest's own restart lands last and overwrites the host's move.
    host.handle(Event::PlayAgain).await;
    click(&mut host, 1, 1, 1).await;
    guest.handle(Event::PlayAgain).await;
    settle(&mut host, &mut guest).await;

    let stored = stored_board(&channel, &room);
    assert_eq!(stored, Board::new());
    assert_eq!(board_of(&host), stored);
    assert_eq!(board_of(&guest), stored);
    assert_eq!(
        host.controller().record().unwrap().active_mark,
        guest.controller().record().unwrap().active_mark
    );
}

#[tokio::test]
async fn test_racing_moves_to_different_cells_keep_one() {
    let (channel, mut host, mut guest, room) = connected_pair().await;

    // A second writer for A, still on the opening board, lands after the
    // host's own move and replaces it.
    let mut rival = host.controller().record().unwrap();
    rival.board = rival.board.apply_mark(coord(0, 0, 0), Mark::A);
    rival.active_mark = Mark::B;
    rival.last_move = Some(coord(0, 0, 0));

    click(&mut host, 1, 1, 1).await;
    channel
        .publish(&room.record_key(), codec::encode(&rival))
        .await
        .unwrap();
    settle(&mut host, &mut guest).await;

    let stored = stored_board(&channel, &room);
    assert_eq!(stored.occupied_count(), 1);
    assert_eq!(stored.get(coord(0, 0, 0)).mark(), Some(Mark::A));
    assert!(stored.is_empty(Coord::CENTER));
    for client in [&host, &guest] {
        assert_eq!(board_of(client), stored);
        assert_eq!(client.controller().phase(), Phase::Playing);
        assert_eq!(*client.controller().session().unwrap().active_mark(), Mark::B);
    }

    // Play carries on from the surviving move.
    click(&mut guest, 2, 2, 2).await;
    settle(&mut host, &mut guest).await;
    assert_eq!(board_of(&host), board_of(&guest));
    assert_eq!(board_of(&host).occupied_count(), 2);
}

#[tokio::test]
async fn test_malformed_snapshot_is_defaulted() {
    let (channel, mut host, mut guest, room) = connected_pair().await;

    let row = json!(["A", "-", "-"]);
    let empty = json!(["-", "-", "-"]);
    channel
        .publish(
            &room.record_key(),
            json!({
                "board": [[row, empty, empty], null, [empty, empty, ["B", 7, null]]],
                "activeMark": "A",
                "playerAName": "Ann",
                "playerBName": "Bob",
                "peerJoined": true,
                "outcome": null,
                "lastMove": [2, 2, 0],
            }),
        )
        .await
        .unwrap();
    settle(&mut host, &mut guest).await;

    for client in [&host, &guest] {
        let board = board_of(client);
        assert_eq!(board.get(coord(0, 0, 0)).mark(), Some(Mark::A));
        assert_eq!(board.get(coord(2, 2, 0)).mark(), Some(Mark::B));
        assert!(board.is_empty(coord(2, 2, 1)));
        assert!(board.is_empty(Coord::CENTER));
        assert_eq!(board.occupied_count(), 2);
        assert_eq!(client.controller().phase(), Phase::Playing);
    }
}

#[tokio::test]
async fn test_unknown_room_is_reported() {
    let channel = Arc::new(InMemoryChannel::new());
    let mut guest = client(&channel, 2);

    let err = guest.join_room("ZZZZZZ", "Bob").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::RoomNotFound);
    assert_eq!(guest.controller().phase(), Phase::Menu);
    assert_eq!(guest.controller().status(), "Game not found");
}

#[tokio::test]
async fn test_third_client_is_turned_away() {
    let (channel, _host, _guest, room) = connected_pair().await;
    let mut third = client(&channel, 3);

    let err = third.join_room(room.as_str(), "Cy").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::RoomFull);
    assert_eq!(third.controller().phase(), Phase::Menu);
}

#[tokio::test]
async fn test_input_validation_runs_before_the_channel() {
    let channel = Arc::new(InMemoryChannel::new());
    channel.set_connected(false);
    let mut client = client(&channel, 1);

    let err = client.create_room("   ").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::MissingName);
    assert_eq!(client.controller().status(), "Please enter your name");

    let err = client.join_room("", "Bob").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::MissingRoomCode);
    assert_eq!(client.controller().status(), "Please enter a game code");

    let err = client.create_room("Ann").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::ChannelUnavailable);
    assert_eq!(client.controller().status(), "Connection error");
    assert_eq!(client.controller().phase(), Phase::Menu);
}

#[tokio::test]
async fn test_entitlement_is_required() {
    let channel = Arc::new(InMemoryChannel::new());
    let gate: Arc<dyn EntitlementGate> = Arc::new(SubscriptionGate::new("/checkout"));

    let mut anonymous = client_with_gate(&channel, gate.clone(), None, 1);
    let err = anonymous.create_room("Ann").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::EntitlementDenied { signed_in: false });
    assert_eq!(anonymous.controller().status(), "Sign in to play online");

    let lapsed = Identity::new("u1").with_subscription(Plan::Monthly, SubscriptionStatus::Canceled);
    let mut lapsed = client_with_gate(&channel, gate.clone(), Some(lapsed), 1);
    let err = lapsed.create_room("Ann").await.unwrap_err();
    assert_eq!(err.kind, SyncErrorKind::EntitlementDenied { signed_in: true });
    assert_eq!(lapsed.controller().status(), "Subscribe to play online");

    let trial = Identity::new("u2").with_subscription(Plan::Annual, SubscriptionStatus::Trialing);
    let mut trial = client_with_gate(&channel, gate, Some(trial), 1);
    assert!(trial.create_room("Ann").await.is_ok());
}

#[tokio::test]
async fn test_checkout_url() {
    let gate = SubscriptionGate::new("/api/stripe/create-checkout");
    let identity = Identity::new("user-9");

    let url = gate
        .start_checkout(Some(&identity), Plan::Annual)
        .await
        .unwrap();
    assert_eq!(url, "/api/stripe/create-checkout?plan=annual&user=user-9");
    assert!(gate.start_checkout(None, Plan::Monthly).await.is_err());
    assert!(gate.start_checkout(Some(&identity), Plan::Free).await.is_err());
}

#[tokio::test]
async fn test_leaving_removes_room_and_notifies_peer() {
    let (channel, mut host, mut guest, room) = connected_pair().await;

    assert!(host.handle(Event::BackToMenu).await);
    assert_eq!(channel.snapshot(&room.record_key()), None);
    settle(&mut host, &mut guest).await;

    assert_eq!(host.controller().phase(), Phase::Menu);
    assert_eq!(guest.controller().phase(), Phase::Menu);
    assert_eq!(guest.controller().status(), "Opponent left the game");
}
