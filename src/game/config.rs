use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::Symbol;
use crate::ai::Difficulty;

const DEFAULT_SERIES_LENGTH: u32 = 3;
const DEFAULT_AI_DELAY_MS: u32 = 500;
const DEFAULT_SETTLE_DELAY_MS: u32 = 1500;

pub const DEFAULT_PLAYER_ONE: &str = "Player 1";
pub const DEFAULT_PLAYER_TWO: &str = "Player 2";
pub const DEFAULT_COMPUTER_NAME: &str = "Computer";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    HumanVsHuman,
    #[default]
    HumanVsComputer,
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human_vs_human" | "hvh" | "pvp" | "local" => Ok(Mode::HumanVsHuman),
            "human_vs_computer" | "hvc" | "pvc" | "computer" | "ai" => {
                Ok(Mode::HumanVsComputer)
            }
            _ => Err(()),
        }
    }
}

/// 延迟动作的节奏（毫秒），0 表示立即执行。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timing {
    #[serde(default = "default_ai_delay")]
    pub ai_delay_ms: u32,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u32,
}

fn default_ai_delay() -> u32 {
    DEFAULT_AI_DELAY_MS
}

fn default_settle_delay() -> u32 {
    DEFAULT_SETTLE_DELAY_MS
}

impl Timing {
    pub fn immediate() -> Self {
        Self {
            ai_delay_ms: 0,
            settle_delay_ms: 0,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ai_delay_ms: DEFAULT_AI_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum SetupError {
    #[error("series length must be at least 1, got {length}")]
    InvalidSeriesLength { length: u32 },
    #[error("input {input} is not accepted while {step}")]
    UnexpectedInput { step: String, input: String },
    #[error("a series is already running; reset first")]
    SeriesAlreadyStarted,
    #[error("malformed input: {message}")]
    Malformed { message: String },
}

/// 一个系列赛的完整配置。首局开始后不可修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_series_length")]
    pub series_length: u32,
    #[serde(default)]
    pub player_one: String,
    #[serde(default)]
    pub player_two: String,
    /// 一号位（人类玩家）所执符号，二号位执另一个。
    #[serde(default)]
    pub human_symbol: Symbol,
    #[serde(default)]
    pub timing: Timing,
}

fn default_series_length() -> u32 {
    DEFAULT_SERIES_LENGTH
}

impl SessionConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            difficulty: Difficulty::default(),
            series_length: DEFAULT_SERIES_LENGTH,
            player_one: String::new(),
            player_two: String::new(),
            human_symbol: Symbol::default(),
            timing: Timing::default(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_series_length(mut self, series_length: u32) -> Self {
        self.series_length = series_length;
        self
    }

    pub fn with_names(mut self, player_one: impl Into<String>, player_two: impl Into<String>) -> Self {
        self.player_one = player_one.into();
        self.player_two = player_two.into();
        self
    }

    pub fn with_human_symbol(mut self, symbol: Symbol) -> Self {
        self.human_symbol = symbol;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// 校验并补全默认名字。
    pub fn validated(mut self) -> Result<Self, SetupError> {
        if self.series_length == 0 {
            return Err(SetupError::InvalidSeriesLength {
                length: self.series_length,
            });
        }
        self.player_one = normalize_name(&self.player_one, DEFAULT_PLAYER_ONE);
        let fallback = match self.mode {
            Mode::HumanVsHuman => DEFAULT_PLAYER_TWO,
            Mode::HumanVsComputer => DEFAULT_COMPUTER_NAME,
        };
        self.player_two = normalize_name(&self.player_two, fallback);
        Ok(self)
    }

    pub fn against_computer(&self) -> bool {
        self.mode == Mode::HumanVsComputer
    }

    /// 赢下系列赛所需局数：`ceil(series_length / 2)`。
    pub fn needed_wins(&self) -> u32 {
        self.series_length.div_ceil(2)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

fn normalize_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
