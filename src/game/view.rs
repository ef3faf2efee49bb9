use serde::Serialize;

use super::board::{self, Board, Line, RoundOutcome, Symbol};
use super::config::Mode;
use super::series::{Phase, Series, SeriesOutcome, Side};

/// 每次状态变化后交给渲染层的快照。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameView {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    pub cells: Board,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_symbol: Option<Symbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_winner: Option<String>,
    pub round: u32,
    pub thinking: bool,
    pub current_move: usize,
    pub moves: Vec<MoveEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SideView {
    pub name: String,
    pub symbol: Symbol,
    pub wins: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScoreView {
    pub one: SideView,
    pub two: SideView,
    pub needed_wins: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MoveEntry {
    pub move_index: usize,
    pub label: String,
    pub current: bool,
}

fn move_label(move_index: usize) -> String {
    if move_index > 0 {
        format!("Go to move #{move_index}")
    } else {
        "Go to game start".to_string()
    }
}

impl GameView {
    pub fn from_series(series: &Series) -> Self {
        let config = series.config();
        let outcome = series.round_outcome();
        let in_setup = series.phase() == Phase::Setup;
        let in_round = series.phase() == Phase::RoundInProgress;

        let name_of = |side: Side| {
            config
                .map(|config| match side {
                    Side::One => config.player_one.clone(),
                    Side::Two => config.player_two.clone(),
                })
                .unwrap_or_default()
        };

        let series_winner = match series.outcome() {
            SeriesOutcome::Decided { winner } => Some(name_of(winner)),
            SeriesOutcome::Pending => None,
        };

        let status = if in_setup {
            "Set up a new game".to_string()
        } else if let Some(name) = &series_winner {
            format!("{name} wins the series!")
        } else {
            // 本局结束后回看历史时，显示的仍是本局结果
            let shown = if in_round {
                outcome
            } else {
                board::outcome(series.latest_board())
            };
            match shown {
                RoundOutcome::Win { symbol, .. } => format!("Winner: {symbol}"),
                RoundOutcome::Draw => "It's a draw!".to_string(),
                RoundOutcome::InProgress if series.is_thinking() => {
                    format!("{} is thinking...", name_of(Side::Two))
                }
                RoundOutcome::InProgress if series.is_computer_turn() => {
                    "Go back to one of your turns to keep playing".to_string()
                }
                RoundOutcome::InProgress => format!("Next player: {}", series.next_symbol()),
            }
        };

        let winning_line = match outcome {
            RoundOutcome::Win { line, .. } => Some(line),
            _ => None,
        };

        let next_symbol = (in_round && !outcome.is_decided()).then(|| series.next_symbol());

        let score = config.filter(|config| config.against_computer()).map(|config| {
            let score = series.score();
            let side_view = |side: Side| SideView {
                name: name_of(side),
                symbol: series.symbol_of(side),
                wins: score.wins(side),
            };
            ScoreView {
                one: side_view(Side::One),
                two: side_view(Side::Two),
                needed_wins: config.needed_wins(),
            }
        });

        let moves = if in_setup {
            Vec::new()
        } else {
            (0..series.history().len())
                .map(|move_index| MoveEntry {
                    move_index,
                    label: move_label(move_index),
                    current: move_index == series.current_move(),
                })
                .collect()
        };

        Self {
            phase: series.phase(),
            mode: config.map(|config| config.mode),
            cells: *series.board(),
            status,
            winning_line,
            next_symbol,
            score,
            series_winner,
            round: series.round(),
            thinking: series.is_thinking(),
            current_move: series.current_move(),
            moves,
        }
    }
}
