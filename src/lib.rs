pub mod ai;
pub mod game;
pub mod utils;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::Function;

pub use ai::{select_move, ComputerPlayer, Difficulty};
pub use game::{
    is_draw, outcome, winner, winning_line, Board, GameView, Line, Mode, MoveEntry, Phase,
    Rejection, RoundOutcome, Scheduled, ScheduledAction, Score, ScoreView, Series, SeriesEvent,
    SeriesOutcome, SessionConfig, SetupError, SetupFlow, SetupInput, Side, SideView, Symbol,
    Timing,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    utils::init_logging(log::LevelFilter::Info);
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

struct Shared {
    series: RefCell<Series>,
    setup: RefCell<SetupFlow>,
    timing: Timing,
    on_change: Option<Function>,
}

impl Shared {
    fn view_json(&self) -> Result<String, JsValue> {
        let view = GameView::from_series(&self.series.borrow());
        serde_json::to_string(&view).map_err(serde_to_js_error)
    }

    /// 回调里可能再次调用引擎，因此调用前不持有任何借用。
    fn notify(&self) {
        let Some(callback) = &self.on_change else {
            return;
        };
        match self.view_json() {
            Ok(json) => {
                if let Err(error) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::error!("render callback failed: {error:?}");
                }
            }
            Err(error) => log::error!("failed to serialize view: {error:?}"),
        }
    }
}

/// 等待延迟后执行动作，并继续执行它引出的后续动作。
fn run_scheduled(shared: &Rc<Shared>, next: Option<Scheduled>) {
    let Some(scheduled) = next else {
        return;
    };
    let shared = Rc::clone(shared);
    spawn_local(async move {
        if scheduled.delay_ms > 0 {
            TimeoutFuture::new(scheduled.delay_ms).await;
        }
        let follow_up = shared.series.borrow_mut().fire(scheduled);
        shared.notify();
        run_scheduled(&shared, follow_up);
    });
}

#[wasm_bindgen]
pub struct TicTacToeEngine {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl TicTacToeEngine {
    /// `on_change` 在每次状态变化后收到视图 JSON；`timing_json` 覆盖默认延迟。
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_change: Option<Function>,
        timing_json: Option<String>,
    ) -> Result<TicTacToeEngine, JsValue> {
        let timing = match timing_json {
            Some(json) => serde_json::from_str(&json).map_err(serde_to_js_error)?,
            None => Timing::default(),
        };
        Ok(TicTacToeEngine {
            shared: Rc::new(Shared {
                series: RefCell::new(Series::new()),
                setup: RefCell::new(SetupFlow::new()),
                timing,
                on_change,
            }),
        })
    }

    pub fn view_json(&self) -> Result<String, JsValue> {
        self.shared.view_json()
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = GameView::from_series(&self.shared.series.borrow());
        to_value(&view).map_err(JsValue::from)
    }

    pub fn setup_step_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&*self.shared.setup.borrow()).map_err(serde_to_js_error)
    }

    /// 推进开局流程；最后一步完成时直接开始系列赛。
    pub fn setup_json(&mut self, input_json: &str) -> Result<String, JsValue> {
        let input: SetupInput = serde_json::from_str(input_json).map_err(serde_to_js_error)?;
        if self.shared.series.borrow().phase() != Phase::Setup {
            return Err(to_js_error(SetupError::SeriesAlreadyStarted));
        }
        let next = self
            .shared
            .setup
            .borrow()
            .advance(input, self.shared.timing)
            .map_err(to_js_error)?;

        let scheduled = match next.config() {
            Some(config) => self
                .shared
                .series
                .borrow_mut()
                .start(config.clone())
                .map_err(to_js_error)?,
            None => None,
        };
        let step = serde_json::to_string(&next).map_err(serde_to_js_error)?;
        *self.shared.setup.borrow_mut() = next;

        self.shared.notify();
        run_scheduled(&self.shared, scheduled);
        Ok(step)
    }

    /// 跳过分步流程，用完整配置直接开始。
    pub fn start_json(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config: SessionConfig = serde_json::from_str(config_json).map_err(serde_to_js_error)?;
        let scheduled = self
            .shared
            .series
            .borrow_mut()
            .start(config)
            .map_err(to_js_error)?;
        self.shared.notify();
        run_scheduled(&self.shared, scheduled);
        Ok(())
    }

    /// 点击格子。无效点击被静默忽略并返回 `false`。
    pub fn play(&mut self, index: usize) -> bool {
        let result = self.shared.series.borrow_mut().play(index);
        match result {
            Ok(scheduled) => {
                self.shared.notify();
                run_scheduled(&self.shared, scheduled);
                true
            }
            Err(rejection) => {
                log::debug!("ignored click on {index}: {rejection}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = "jumpTo")]
    pub fn jump_to(&mut self, move_index: usize) -> bool {
        let result = self.shared.series.borrow_mut().jump_to(move_index);
        self.navigated(result)
    }

    pub fn restart(&mut self) -> bool {
        let result = self.shared.series.borrow_mut().restart();
        self.navigated(result)
    }

    /// 回到开局配置；尚未执行的延迟动作全部作废。
    pub fn reset(&mut self) {
        self.shared.series.borrow_mut().reset();
        *self.shared.setup.borrow_mut() = SetupFlow::new();
        self.shared.notify();
    }

    fn navigated(&self, result: Result<(), Rejection>) -> bool {
        match result {
            Ok(()) => {
                self.shared.notify();
                true
            }
            Err(rejection) => {
                log::debug!("ignored navigation: {rejection}");
                false
            }
        }
    }
}

#[wasm_bindgen(js_name = "winner")]
pub fn winner_of(cells: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(cells).map_err(JsValue::from)?;
    to_value(&winner(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "winningLine")]
pub fn winning_line_of(cells: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(cells).map_err(JsValue::from)?;
    to_value(&winning_line(&board)).map_err(JsValue::from)
}

/// 无状态的选子接口。棋盘已满或已分胜负时会 panic。
#[wasm_bindgen(js_name = "selectMove")]
pub fn select_move_for(
    cells: JsValue,
    computer: &str,
    difficulty: Option<String>,
) -> Result<usize, JsValue> {
    let board: Board = from_value(cells).map_err(JsValue::from)?;
    let computer = Symbol::from_str(computer)
        .map_err(|_| JsValue::from_str(&format!("unknown symbol {computer:?}")))?;
    let difficulty = difficulty
        .as_deref()
        .and_then(|value| Difficulty::from_str(value).ok())
        .unwrap_or_default();
    Ok(ComputerPlayer::new().select_move(&board, computer, difficulty))
}
