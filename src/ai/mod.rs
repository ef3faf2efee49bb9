//! 电脑对手：基于规则的落子选择（简单 / 困难两档）。

pub mod heuristic;

pub use heuristic::{easy_move, hard_move, select_move, ComputerPlayer, Difficulty};
