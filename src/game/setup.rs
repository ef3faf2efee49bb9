//! 开局前的配置流程：每一步是一个枚举变体，统一在 `advance` 中分派。

use serde::{Deserialize, Serialize};

use super::board::Symbol;
use super::config::{Mode, SessionConfig, SetupError, Timing};
use crate::ai::Difficulty;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Names {
    #[serde(default)]
    pub player_one: String,
    #[serde(default)]
    pub player_two: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SetupInput {
    Mode {
        mode: Mode,
    },
    Names {
        player_one: String,
        #[serde(default)]
        player_two: Option<String>,
    },
    Difficulty {
        difficulty: Difficulty,
    },
    SeriesLength {
        length: u32,
    },
    Symbol {
        symbol: Symbol,
    },
    Back,
}

impl SetupInput {
    fn label(&self) -> &'static str {
        match self {
            SetupInput::Mode { .. } => "mode",
            SetupInput::Names { .. } => "names",
            SetupInput::Difficulty { .. } => "difficulty",
            SetupInput::SeriesLength { .. } => "series length",
            SetupInput::Symbol { .. } => "symbol",
            SetupInput::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "step")]
pub enum SetupFlow {
    ChooseMode,
    EnterNames {
        mode: Mode,
    },
    ChooseDifficulty {
        mode: Mode,
        names: Names,
    },
    ChooseSeriesLength {
        mode: Mode,
        names: Names,
        difficulty: Difficulty,
    },
    ChooseSymbol {
        mode: Mode,
        names: Names,
        difficulty: Difficulty,
        series_length: u32,
    },
    Ready {
        config: SessionConfig,
    },
}

impl Default for SetupFlow {
    fn default() -> Self {
        SetupFlow::ChooseMode
    }
}

impl SetupFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            SetupFlow::ChooseMode => "choosing a mode",
            SetupFlow::EnterNames { .. } => "entering names",
            SetupFlow::ChooseDifficulty { .. } => "choosing a difficulty",
            SetupFlow::ChooseSeriesLength { .. } => "choosing a series length",
            SetupFlow::ChooseSymbol { .. } => "choosing a symbol",
            SetupFlow::Ready { .. } => "ready",
        }
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        match self {
            SetupFlow::Ready { config } => Some(config),
            _ => None,
        }
    }

    /// 推进一步。输入不属于当前步骤时返回错误，流程保持不变。
    pub fn advance(&self, input: SetupInput, timing: Timing) -> Result<SetupFlow, SetupError> {
        let next = match (self, input) {
            (_, SetupInput::Back) => self.back(),
            (SetupFlow::ChooseMode, SetupInput::Mode { mode }) => SetupFlow::EnterNames { mode },
            (
                SetupFlow::EnterNames { mode },
                SetupInput::Names {
                    player_one,
                    player_two,
                },
            ) => {
                let names = Names {
                    player_one,
                    player_two: player_two.unwrap_or_default(),
                };
                match mode {
                    Mode::HumanVsComputer => SetupFlow::ChooseDifficulty { mode: *mode, names },
                    // 双人模式没有比分，跳过难度与局数
                    Mode::HumanVsHuman => SetupFlow::ChooseSymbol {
                        mode: *mode,
                        names,
                        difficulty: Difficulty::default(),
                        series_length: 1,
                    },
                }
            }
            (SetupFlow::ChooseDifficulty { mode, names }, SetupInput::Difficulty { difficulty }) => {
                SetupFlow::ChooseSeriesLength {
                    mode: *mode,
                    names: names.clone(),
                    difficulty,
                }
            }
            (
                SetupFlow::ChooseSeriesLength {
                    mode,
                    names,
                    difficulty,
                },
                SetupInput::SeriesLength { length },
            ) => {
                if length == 0 {
                    return Err(SetupError::InvalidSeriesLength { length });
                }
                SetupFlow::ChooseSymbol {
                    mode: *mode,
                    names: names.clone(),
                    difficulty: *difficulty,
                    series_length: length,
                }
            }
            (
                SetupFlow::ChooseSymbol {
                    mode,
                    names,
                    difficulty,
                    series_length,
                },
                SetupInput::Symbol { symbol },
            ) => {
                let config = SessionConfig::new(*mode)
                    .with_names(names.player_one.clone(), names.player_two.clone())
                    .with_difficulty(*difficulty)
                    .with_series_length(*series_length)
                    .with_human_symbol(symbol)
                    .with_timing(timing)
                    .validated()?;
                SetupFlow::Ready { config }
            }
            (step, input) => {
                return Err(SetupError::UnexpectedInput {
                    step: step.step_name().to_string(),
                    input: input.label().to_string(),
                })
            }
        };
        log::debug!("setup: {} -> {}", self.step_name(), next.step_name());
        Ok(next)
    }

    fn back(&self) -> SetupFlow {
        match self {
            SetupFlow::ChooseMode | SetupFlow::EnterNames { .. } => SetupFlow::ChooseMode,
            SetupFlow::ChooseDifficulty { mode, .. } => SetupFlow::EnterNames { mode: *mode },
            SetupFlow::ChooseSeriesLength { mode, names, .. } => SetupFlow::ChooseDifficulty {
                mode: *mode,
                names: names.clone(),
            },
            SetupFlow::ChooseSymbol {
                mode,
                names,
                difficulty,
                ..
            } => match mode {
                Mode::HumanVsComputer => SetupFlow::ChooseSeriesLength {
                    mode: *mode,
                    names: names.clone(),
                    difficulty: *difficulty,
                },
                Mode::HumanVsHuman => SetupFlow::EnterNames { mode: *mode },
            },
            SetupFlow::Ready { config } => SetupFlow::ChooseSymbol {
                mode: config.mode,
                names: Names {
                    player_one: config.player_one.clone(),
                    player_two: config.player_two.clone(),
                },
                difficulty: config.difficulty,
                series_length: config.series_length,
            },
        }
    }
}
