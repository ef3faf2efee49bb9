//! 游戏核心逻辑模块（棋盘判定、开局配置、系列赛状态机、视图快照）。

pub mod board;
pub mod config;
pub mod series;
pub mod setup;
pub mod view;

pub use board::{
    is_draw, outcome, winner, winning_line, Board, Line, RoundOutcome, Symbol, CELL_COUNT, LINES,
};
pub use config::{Mode, SessionConfig, SetupError, Timing};
pub use series::{
    Phase, Rejection, Scheduled, ScheduledAction, Score, Series, SeriesEvent, SeriesOutcome, Side,
};
pub use setup::{Names, SetupFlow, SetupInput};
pub use view::{GameView, MoveEntry, ScoreView, SideView};
