//! 浏览器环境下的引擎测试，使用 `wasm-pack test --headless --firefox` 运行。

#![cfg(target_arch = "wasm32")]

use serde_wasm_bindgen::to_value;
use tictactoe_wasm::{winner_of, Board, Symbol, TicTacToeEngine};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn view(engine: &TicTacToeEngine) -> serde_json::Value {
    let json = engine.view_json().expect("view should serialize");
    serde_json::from_str(&json).expect("view json should parse")
}

#[wasm_bindgen_test]
fn local_game_accepts_moves_and_ignores_repeats() {
    let mut engine = TicTacToeEngine::new(None, None).expect("engine");
    engine
        .start_json(r#"{"mode":"human_vs_human","timing":{"ai_delay_ms":0,"settle_delay_ms":0}}"#)
        .expect("start");

    assert!(engine.play(4));
    assert!(!engine.play(4), "occupied cell is ignored");

    let view = view(&engine);
    assert_eq!(view["cells"][4], "X");
    assert_eq!(view["status"], "Next player: O");
}

#[wasm_bindgen_test]
fn setup_flow_starts_the_series() {
    let mut engine = TicTacToeEngine::new(None, Some(r#"{"ai_delay_ms":0,"settle_delay_ms":0}"#.into()))
        .expect("engine");
    engine
        .setup_json(r#"{"type":"Mode","mode":"human_vs_human"}"#)
        .expect("mode");
    engine
        .setup_json(r#"{"type":"Names","player_one":"Ada","player_two":"Grace"}"#)
        .expect("names");
    let step = engine
        .setup_json(r#"{"type":"Symbol","symbol":"O"}"#)
        .expect("symbol");
    assert!(step.contains("Ready"));
    assert_eq!(view(&engine)["phase"], "RoundInProgress");

    assert!(engine.setup_json(r#"{"type":"Back"}"#).is_err(), "series already running");
}

#[wasm_bindgen_test]
fn reset_returns_to_setup_and_blocks_moves() {
    let mut engine = TicTacToeEngine::new(None, None).expect("engine");
    engine
        .start_json(r#"{"mode":"human_vs_computer","difficulty":"hard"}"#)
        .expect("start");
    assert!(engine.play(0));
    assert!(!engine.play(1), "computer is thinking");

    engine.reset();
    assert_eq!(view(&engine)["phase"], "Setup");
    assert!(!engine.play(0));
    assert!(!engine.jump_to(0));
}

#[wasm_bindgen_test]
fn stateless_winner_reads_js_arrays() {
    let board = Board::from_cells([
        Some(Symbol::O),
        None,
        None,
        Some(Symbol::O),
        None,
        None,
        Some(Symbol::O),
        None,
        None,
    ]);
    let cells = to_value(&board).expect("cells");
    let result = winner_of(cells).expect("winner");
    assert_eq!(result.as_string().as_deref(), Some("O"));
}
