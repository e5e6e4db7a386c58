//! Hashing, legality, checkmate and promotion behaviour through the public
//! API.

use tilechess_core::{Color, Move, Piece, PieceType, Square};
use tilechess_engine::{
    generate_moves, is_king_attacked, Game, GameError, Hasher, MoveList, Position,
};

const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

fn play_uci(position: &mut Position, moves: &[&str]) {
    for uci in moves {
        let mv = position
            .legal_moves()
            .iter()
            .copied()
            .find(|m| m.to_uci() == *uci)
            .unwrap_or_else(|| panic!("{uci} not legal"));
        position.apply_move(mv).unwrap();
    }
}

fn play_game(game: &mut Game, moves: &[(&str, &str)]) {
    for (from, to) in moves {
        let mv = game.legal_destinations(sq(from))[&sq(to)];
        game.apply_move(mv).unwrap();
    }
}

#[test]
fn hash_ignores_move_order() {
    let mut a = Position::startpos();
    let mut b = Position::startpos();
    play_uci(&mut a, &["g1f3", "g8f6", "b1c3", "b8c6"]);
    play_uci(&mut b, &["b1c3", "b8c6", "g1f3", "g8f6"]);
    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.to_fen(), b.to_fen());
    assert_eq!(a.hash(), Hasher::hash(&a));
}

#[test]
fn hash_sees_every_feature() {
    let start = Position::startpos();

    let mut e3 = start.clone();
    play_uci(&mut e3, &["e2e3"]);
    let mut e4 = start.clone();
    play_uci(&mut e4, &["e2e4"]);
    assert_ne!(e3.hash(), e4.hash());

    // Same board, with and without an en passant square.
    let with_ep =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    let without_ep =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_ne!(with_ep.hash(), without_ep.hash());
    assert_eq!(with_ep.hash(), e4.hash());

    // Same board, different castle rights.
    let fewer_rights =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kkq - 0 1").unwrap();
    assert_ne!(fewer_rights.hash(), start.hash());
}

#[test]
fn hash_history_tracks_applied_moves() {
    let mut position = Position::startpos();
    let start_hash = position.hash();
    play_uci(&mut position, &["e2e4", "e7e5"]);
    assert_eq!(position.hash_history().len(), 2);
    assert_eq!(position.hash_history()[0], start_hash);
    position.undo().unwrap();
    position.undo().unwrap();
    assert_eq!(position.hash(), start_hash);
    assert!(position.hash_history().is_empty());
}

#[test]
fn legal_moves_are_exactly_the_safe_pseudo_moves() {
    for fen in [
        tilechess_core::Fen::STARTPOS,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        FOOLS_MATE,
    ] {
        let position = Position::from_fen(fen).unwrap();
        let legal = position.legal_moves();
        let mut pseudo = MoveList::new();
        generate_moves(&position, &mut pseudo);

        for &mv in &pseudo {
            let mut scratch = position.clone();
            scratch.apply_move(mv).unwrap();
            let safe = !is_king_attacked(&scratch, position.turn());
            assert_eq!(legal.contains(mv), safe, "{mv} in {fen}");
            assert_eq!(position.is_legal(mv), safe, "{mv} in {fen}");
        }
    }
}

#[test]
fn fools_mate_from_fen() {
    let game = Game::from_fen(FOOLS_MATE).unwrap();
    assert_eq!(game.turn(), Color::White);
    assert!(game.in_check());
    assert!(game.in_checkmate());
    for piece in Piece::ALL {
        for &from in game.position().piece_list(PieceType::new(piece, Color::White)) {
            assert!(
                game.legal_destinations(from).is_empty(),
                "{from} should have no legal moves"
            );
        }
    }
    assert!(game.position().is_checkmate());
    assert_eq!(game.search(3), None);
}

#[test]
fn fools_mate_played_out() {
    let mut game = Game::new();
    play_game(
        &mut game,
        &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
    );
    assert!(game.in_checkmate());
    assert_eq!(game.fen(), FOOLS_MATE);
}

#[test]
fn promotion_waits_for_a_piece() {
    let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = game.fen();

    let destinations = game.legal_destinations(sq("a7"));
    assert_eq!(destinations.len(), 1);
    let pending = destinations[&sq("a8")];
    assert!(pending.is_promotion_pending());

    assert_eq!(game.apply_move(pending), Err(GameError::PromotionPending(pending)));
    assert_eq!(game.pending_promotion(), Some(pending));
    assert_eq!(game.fen(), before);

    // Nothing else can be played while the choice is open.
    let king_move = game.legal_destinations(sq("e1"))[&sq("d1")];
    assert_eq!(game.apply_move(king_move), Err(GameError::PromotionPending(pending)));

    for invalid in [PieceType::Empty, PieceType::WhiteKing, PieceType::WhitePawn] {
        assert_eq!(game.promote(invalid), Err(GameError::InvalidPromotion(invalid)));
        assert_eq!(game.fen(), before);
    }

    game.promote(PieceType::WhiteRook).unwrap();
    assert_eq!(game.pending_promotion(), None);
    assert_eq!(game.tile(sq("a8")), PieceType::WhiteRook);
    assert!(!game.is_piece(sq("a7")));
    assert_eq!(game.turn(), Color::Black);
    assert!(game.in_check());

    let last = game.position().last_move().unwrap();
    assert_eq!(last.promotion(), PieceType::WhiteRook);
    assert_eq!(last.from(), sq("a7"));
    assert_eq!(last.to(), sq("a8"));

    game.undo().unwrap();
    assert_eq!(game.fen(), before);
    assert_eq!(game.tile(sq("a7")), PieceType::WhitePawn);
}

#[test]
fn promotion_colour_follows_the_mover() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/p7/4K3 b - - 0 1").unwrap();
    let pending = game.legal_destinations(sq("a2"))[&sq("a1")];
    assert!(game.apply_move(pending).is_err());
    game.promote(PieceType::WhiteKnight).unwrap();
    assert_eq!(game.tile(sq("a1")), PieceType::BlackKnight);
}

#[test]
fn cancelled_promotion_leaves_the_board_alone() {
    let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = game.fen();
    let pending = game.legal_destinations(sq("a7"))[&sq("a8")];
    assert!(game.apply_move(pending).is_err());

    assert_eq!(game.cancel_promotion(), Some(pending));
    assert_eq!(game.pending_promotion(), None);
    assert_eq!(game.fen(), before);
    assert_eq!(game.tile(sq("a7")), PieceType::WhitePawn);
    assert!(game.position().history().is_empty());
    assert_eq!(game.cancel_promotion(), None);

    // Other moves are accepted again.
    let king_move = game.legal_destinations(sq("e1"))[&sq("d1")];
    game.apply_move(king_move).unwrap();
    assert_eq!(game.turn(), Color::Black);
}

#[test]
fn undo_during_promotion_only_withdraws_the_choice() {
    let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let king_move = game.legal_destinations(sq("e1"))[&sq("d1")];
    game.apply_move(king_move).unwrap();
    let reply = game.legal_destinations(sq("e8"))[&sq("e7")];
    game.apply_move(reply).unwrap();
    let before = game.fen();

    let pending = game.legal_destinations(sq("a7"))[&sq("a8")];
    assert!(game.apply_move(pending).is_err());
    assert_eq!(game.undo(), Ok(pending));
    assert_eq!(game.pending_promotion(), None);
    assert_eq!(game.fen(), before);
    assert_eq!(game.position().history().len(), 2);

    assert_eq!(game.undo(), Ok(reply));
    assert_eq!(game.position().history().len(), 1);
}

#[test]
fn unreachable_promotion_is_illegal() {
    let mut game = Game::from_fen("n3k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let blocked = Move::new(sq("a7"), sq("a8"), PieceType::WhitePawn);
    assert_eq!(game.apply_move(blocked), Err(GameError::IllegalMove(blocked)));
    assert_eq!(game.pending_promotion(), None);
}

#[test]
fn captured_pieces_follow_history() {
    let mut game = Game::new();
    play_game(
        &mut game,
        &[("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("d8", "d5")],
    );
    assert_eq!(
        game.captured_pieces(),
        vec![PieceType::BlackPawn, PieceType::WhitePawn]
    );
    game.undo().unwrap();
    assert_eq!(game.captured_pieces(), vec![PieceType::BlackPawn]);
}
