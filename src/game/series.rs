use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{self, Board, RoundOutcome, Symbol, CELL_COUNT};
use super::config::{SessionConfig, SetupError};
use crate::ai::ComputerPlayer;

/// 状态机阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Setup,
    RoundInProgress,
    RoundOver,
    SeriesOver,
}

/// 对阵双方。人机模式下 `One` 是人类、`Two` 是电脑。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub one: u32,
    pub two: u32,
}

impl Score {
    pub fn wins(&self, side: Side) -> u32 {
        match side {
            Side::One => self.one,
            Side::Two => self.two,
        }
    }

    fn award(&mut self, side: Side) {
        match side {
            Side::One => self.one += 1,
            Side::Two => self.two += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SeriesOutcome {
    #[default]
    Pending,
    Decided {
        winner: Side,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduledAction {
    ComputerMove,
    Settle,
}

/// 由某次状态变更产生的延迟动作。
///
/// `epoch` 过期（期间发生过重置或新一局开始）时，`Series::fire` 不做任何事。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scheduled {
    pub epoch: u64,
    pub action: ScheduledAction,
    pub delay_ms: u32,
}

/// 被忽略的玩家操作。界面层静默丢弃，这里保留原因便于日志与测试。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum Rejection {
    #[error("no round is in progress")]
    NotInRound,
    #[error("no series has been started")]
    NoSession,
    #[error("cell {index} is outside the board")]
    OutOfRange { index: usize },
    #[error("cell {index} is already taken")]
    CellOccupied { index: usize },
    #[error("the round on this board is already decided")]
    RoundDecided,
    #[error("it is not the human player's turn")]
    NotYourTurn,
    #[error("the computer is thinking")]
    ComputerThinking,
    #[error("move {index} is not in history (length {len})")]
    OutOfHistory { index: usize, len: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SeriesEvent {
    SeriesStarted { series_length: u32 },
    RoundStarted { round: u32, starter: Symbol },
    MovePlayed { side: Side, symbol: Symbol, index: usize },
    RoundEnded { round: u32, outcome: RoundOutcome, score: Score },
    SeriesWon { winner: Side, score: Score },
    HistoryJumped { move_index: usize },
    SeriesReset,
}

/// 单局与系列赛状态机。
///
/// 轮到谁、本局结果都由历史快照推导，不单独存储。
#[derive(Debug, Clone)]
pub struct Series {
    phase: Phase,
    config: Option<SessionConfig>,
    history: Vec<Board>,
    current_move: usize,
    starter: Symbol,
    round: u32,
    score: Score,
    outcome: SeriesOutcome,
    thinking: bool,
    epoch: u64,
    event_log: Vec<SeriesEvent>,
    computer: ComputerPlayer,
}

impl Default for Series {
    fn default() -> Self {
        Self::new()
    }
}

impl Series {
    pub fn new() -> Self {
        Self::with_computer(ComputerPlayer::new())
    }

    pub fn with_computer(computer: ComputerPlayer) -> Self {
        Self {
            phase: Phase::Setup,
            config: None,
            history: vec![Board::new()],
            current_move: 0,
            starter: Symbol::X,
            round: 0,
            score: Score::default(),
            outcome: SeriesOutcome::Pending,
            thinking: false,
            epoch: 0,
            event_log: Vec::new(),
            computer,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn history(&self) -> &[Board] {
        &self.history
    }

    pub fn current_move(&self) -> usize {
        self.current_move
    }

    pub fn starter(&self) -> Symbol {
        self.starter
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn outcome(&self) -> SeriesOutcome {
        self.outcome
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn events(&self) -> &[SeriesEvent] {
        &self.event_log
    }

    /// 当前显示的快照（可能是历史中的某一步）。
    pub fn board(&self) -> &Board {
        &self.history[self.current_move]
    }

    pub fn latest_board(&self) -> &Board {
        self.history
            .last()
            .unwrap_or_else(|| unreachable!("history always holds the empty board"))
    }

    pub fn x_is_next(&self) -> bool {
        (self.current_move % 2 == 0) == (self.starter == Symbol::X)
    }

    pub fn next_symbol(&self) -> Symbol {
        if self.x_is_next() {
            Symbol::X
        } else {
            Symbol::O
        }
    }

    /// 当前显示快照的本局结果。
    pub fn round_outcome(&self) -> RoundOutcome {
        board::outcome(self.board())
    }

    pub fn side_of(&self, symbol: Symbol) -> Side {
        match &self.config {
            Some(config) if config.human_symbol != symbol => Side::Two,
            _ => Side::One,
        }
    }

    pub fn symbol_of(&self, side: Side) -> Symbol {
        let human = self
            .config
            .as_ref()
            .map(|config| config.human_symbol)
            .unwrap_or_default();
        match side {
            Side::One => human,
            Side::Two => human.opponent(),
        }
    }

    pub fn computer_symbol(&self) -> Option<Symbol> {
        self.config
            .as_ref()
            .filter(|config| config.against_computer())
            .map(|config| config.human_symbol.opponent())
    }

    pub fn is_computer_turn(&self) -> bool {
        self.computer_symbol() == Some(self.next_symbol())
    }

    fn record_event(&mut self, event: SeriesEvent) {
        log::info!("{event:?}");
        self.event_log.push(event);
    }

    fn schedule(&self, action: ScheduledAction) -> Scheduled {
        let timing = self
            .config
            .as_ref()
            .map(|config| config.timing)
            .unwrap_or_default();
        let delay_ms = match action {
            ScheduledAction::ComputerMove => timing.ai_delay_ms,
            ScheduledAction::Settle => timing.settle_delay_ms,
        };
        Scheduled {
            epoch: self.epoch,
            action,
            delay_ms,
        }
    }

    /// 从 Setup 开始一个系列赛。首局由 X 先手。
    pub fn start(&mut self, config: SessionConfig) -> Result<Option<Scheduled>, SetupError> {
        if self.phase != Phase::Setup {
            return Err(SetupError::SeriesAlreadyStarted);
        }
        let config = config.validated()?;
        let series_length = config.series_length;
        self.config = Some(config);
        self.score = Score::default();
        self.outcome = SeriesOutcome::Pending;
        self.starter = Symbol::X;
        self.round = 0;
        self.record_event(SeriesEvent::SeriesStarted { series_length });
        Ok(self.begin_round())
    }

    fn begin_round(&mut self) -> Option<Scheduled> {
        self.epoch += 1;
        self.round += 1;
        self.phase = Phase::RoundInProgress;
        self.history = vec![Board::new()];
        self.current_move = 0;
        self.thinking = false;
        self.record_event(SeriesEvent::RoundStarted {
            round: self.round,
            starter: self.starter,
        });
        self.schedule_computer_turn()
    }

    fn schedule_computer_turn(&mut self) -> Option<Scheduled> {
        if !self.is_computer_turn() {
            return None;
        }
        self.thinking = true;
        Some(self.schedule(ScheduledAction::ComputerMove))
    }

    /// 人类玩家点击格子。
    pub fn play(&mut self, index: usize) -> Result<Option<Scheduled>, Rejection> {
        if self.phase != Phase::RoundInProgress {
            return Err(Rejection::NotInRound);
        }
        if self.thinking {
            return Err(Rejection::ComputerThinking);
        }
        if self.is_computer_turn() {
            return Err(Rejection::NotYourTurn);
        }
        self.commit(index)
    }

    fn commit(&mut self, index: usize) -> Result<Option<Scheduled>, Rejection> {
        if index >= CELL_COUNT {
            return Err(Rejection::OutOfRange { index });
        }
        if self.round_outcome().is_decided() {
            return Err(Rejection::RoundDecided);
        }
        let symbol = self.next_symbol();
        let next = self
            .board()
            .with_move(index, symbol)
            .ok_or(Rejection::CellOccupied { index })?;

        self.history.truncate(self.current_move + 1);
        self.history.push(next);
        self.current_move = self.history.len() - 1;
        self.record_event(SeriesEvent::MovePlayed {
            side: self.side_of(symbol),
            symbol,
            index,
        });
        Ok(self.after_commit())
    }

    fn after_commit(&mut self) -> Option<Scheduled> {
        let outcome = board::outcome(self.latest_board());
        if !outcome.is_decided() {
            return self.schedule_computer_turn();
        }

        self.phase = Phase::RoundOver;
        let scored = self
            .config
            .as_ref()
            .map_or(false, SessionConfig::against_computer);
        if let (true, RoundOutcome::Win { symbol, .. }) = (scored, outcome) {
            let side = self.side_of(symbol);
            self.score.award(side);
        }
        self.record_event(SeriesEvent::RoundEnded {
            round: self.round,
            outcome,
            score: self.score,
        });
        Some(self.schedule(ScheduledAction::Settle))
    }

    /// 执行一个到期的延迟动作，返回它引出的下一个动作。
    pub fn fire(&mut self, scheduled: Scheduled) -> Option<Scheduled> {
        if scheduled.epoch != self.epoch {
            log::debug!(
                "dropping stale {:?} (epoch {} != {})",
                scheduled.action,
                scheduled.epoch,
                self.epoch
            );
            return None;
        }
        match scheduled.action {
            ScheduledAction::ComputerMove => self.computer_move(),
            ScheduledAction::Settle => self.settle(),
        }
    }

    fn computer_move(&mut self) -> Option<Scheduled> {
        if self.phase != Phase::RoundInProgress || !self.thinking {
            return None;
        }
        self.thinking = false;
        let computer = self.computer_symbol()?;
        if !self.is_computer_turn() {
            return None;
        }
        let difficulty = self.config.as_ref()?.difficulty;
        let board = *self.board();
        let index = self.computer.select_move(&board, computer, difficulty);
        match self.commit(index) {
            Ok(next) => next,
            Err(rejection) => {
                log::warn!("computer move {index} rejected: {rejection}");
                None
            }
        }
    }

    fn settle(&mut self) -> Option<Scheduled> {
        if self.phase != Phase::RoundOver {
            return None;
        }
        let config = self.config.as_ref()?;
        if config.against_computer() {
            let needed = config.needed_wins();
            let one = self.score.one >= needed;
            let two = self.score.two >= needed;
            debug_assert!(
                !(one && two),
                "both sides reached {needed} wins at once: {:?}",
                self.score
            );
            let winner = match (one, two) {
                (true, true) if self.score.two > self.score.one => Some(Side::Two),
                (true, _) => Some(Side::One),
                (false, true) => Some(Side::Two),
                (false, false) => None,
            };
            if let Some(winner) = winner {
                self.phase = Phase::SeriesOver;
                self.outcome = SeriesOutcome::Decided { winner };
                self.record_event(SeriesEvent::SeriesWon {
                    winner,
                    score: self.score,
                });
                return None;
            }
        }
        self.starter = self.starter.opponent();
        self.begin_round()
    }

    /// 跳到历史中的某一步，只改变显示，不改历史与比分。
    pub fn jump_to(&mut self, move_index: usize) -> Result<(), Rejection> {
        if self.phase == Phase::Setup {
            return Err(Rejection::NoSession);
        }
        if self.thinking {
            return Err(Rejection::ComputerThinking);
        }
        if move_index >= self.history.len() {
            return Err(Rejection::OutOfHistory {
                index: move_index,
                len: self.history.len(),
            });
        }
        self.current_move = move_index;
        self.record_event(SeriesEvent::HistoryJumped { move_index });
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), Rejection> {
        self.jump_to(0)
    }

    /// 彻底重置回 Setup；未执行的延迟动作全部失效。
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.phase = Phase::Setup;
        self.config = None;
        self.history = vec![Board::new()];
        self.current_move = 0;
        self.starter = Symbol::X;
        self.round = 0;
        self.score = Score::default();
        self.outcome = SeriesOutcome::Pending;
        self.thinking = false;
        self.event_log.clear();
        self.record_event(SeriesEvent::SeriesReset);
    }
}
