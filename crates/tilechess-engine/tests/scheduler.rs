//! Searches run through the job scheduler.

use std::sync::mpsc;
use std::time::Duration;

use tilechess_engine::{search, submit_search, EngineConfig, JobScheduler, Position, MATE_SCORE};

const TIMEOUT: Duration = Duration::from_secs(30);

#[test]
fn background_search_finds_mate() {
    let scheduler = JobScheduler::new(2);
    let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let (tx, rx) = mpsc::channel();

    submit_search(&scheduler, &position, 2, move |outcome| {
        let _ = tx.send(outcome);
    });

    let outcome = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
    assert_eq!(outcome.score, MATE_SCORE - 1);
}

#[test]
fn background_search_matches_foreground() {
    let scheduler = JobScheduler::new(1);
    let position =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
    let (tx, rx) = mpsc::channel();

    submit_search(&scheduler, &position, 3, move |outcome| {
        let _ = tx.send(outcome);
    });

    let background = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(background, search::search(&position, 3));
}

#[test]
fn caller_keeps_its_position() {
    let scheduler = JobScheduler::new(1);
    let mut position = Position::startpos();
    let (tx, rx) = mpsc::channel();

    submit_search(&scheduler, &position, 2, move |outcome| {
        let _ = tx.send(outcome);
    });
    // The caller may keep playing on its own copy while the worker searches.
    let mv = position.legal_moves()[0];
    position.apply_move(mv).unwrap();

    let outcome = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(Position::startpos().is_legal(outcome.best_move.unwrap()));
}

#[test]
fn scheduler_from_config() {
    let config = EngineConfig::default();
    let mut scheduler = JobScheduler::with_reserve(config.worker_reserve);
    assert_eq!(scheduler.threads(), config.worker_threads());
    scheduler.shutdown();
    assert!(!scheduler.is_running());
}
