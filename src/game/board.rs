use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 棋盘格子数量（3×3，按行优先编号 0–8）。
pub const CELL_COUNT: usize = 9;
/// 中心格。
pub const CENTER: usize = 4;
/// 四个角，按固定扫描顺序排列。
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// 一条获胜连线：三个格子下标。
pub type Line = [usize; 3];

/// 全部 8 条连线，顺序固定：三行、三列、两条对角线。
pub const LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 棋子符号。空格用 `None` 表示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::X
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::X => f.write_str("X"),
            Symbol::O => f.write_str("O"),
        }
    }
}

impl FromStr for Symbol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Symbol::X),
            "O" => Ok(Symbol::O),
            _ => Err(()),
        }
    }
}

/// 单局结果，始终由当前棋盘重新计算，不单独存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RoundOutcome {
    InProgress,
    Win { symbol: Symbol, line: Line },
    Draw,
}

impl RoundOutcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, RoundOutcome::InProgress)
    }
}

/// 3×3 棋盘快照。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Symbol>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Symbol>; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Symbol>; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        index < CELL_COUNT && self.cells[index].is_none()
    }

    /// 返回落子后的新棋盘；目标格已占用或越界时返回 `None`。
    pub fn with_move(&self, index: usize, symbol: Symbol) -> Option<Board> {
        if !self.is_empty_at(index) {
            return None;
        }
        let mut next = *self;
        next.cells[index] = Some(symbol);
        Some(next)
    }

    pub fn move_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// 按升序返回全部空格下标。
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELL_COUNT).filter(|&index| self.cells[index].is_none()).collect()
    }
}

/// 第一条被同一符号占满的连线。
///
/// 正常对局中不可能同时出现两条完成的连线；对于构造出来的异常棋盘，
/// 按 `LINES` 的枚举顺序返回第一条。
pub fn winning_line(board: &Board) -> Option<Line> {
    LINES.iter().copied().find(|&[a, b, c]| {
        let first = board.get(a);
        first.is_some() && first == board.get(b) && first == board.get(c)
    })
}

pub fn winner(board: &Board) -> Option<Symbol> {
    winning_line(board).and_then(|[a, _, _]| board.get(a))
}

/// 无人获胜且棋盘已满。
pub fn is_draw(board: &Board) -> bool {
    winner(board).is_none() && board.is_full()
}

pub fn outcome(board: &Board) -> RoundOutcome {
    match winning_line(board) {
        Some(line) => match board.get(line[0]) {
            Some(symbol) => RoundOutcome::Win { symbol, line },
            None => RoundOutcome::InProgress,
        },
        None if board.is_full() => RoundOutcome::Draw,
        None => RoundOutcome::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Symbol> = Some(Symbol::X);
    const O: Option<Symbol> = Some(Symbol::O);
    const E: Option<Symbol> = None;

    #[test]
    fn top_row_wins_for_x() {
        let board = Board::from_cells([X, X, X, E, E, E, E, E, E]);
        assert_eq!(winner(&board), Some(Symbol::X));
        assert_eq!(winning_line(&board), Some([0, 1, 2]));
        assert_eq!(
            outcome(&board),
            RoundOutcome::Win {
                symbol: Symbol::X,
                line: [0, 1, 2]
            }
        );
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let board = Board::from_cells([X, O, X, O, X, O, O, X, O]);
        assert_eq!(winner(&board), None);
        assert!(is_draw(&board));
        assert_eq!(outcome(&board), RoundOutcome::Draw);
    }

    #[test]
    fn empty_and_partial_boards_are_in_progress() {
        assert_eq!(outcome(&Board::new()), RoundOutcome::InProgress);
        let partial = Board::from_cells([X, O, E, E, X, E, E, E, E]);
        assert_eq!(winner(&partial), None);
        assert!(!is_draw(&partial));
        assert_eq!(partial.empty_cells(), vec![2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn columns_and_diagonals_are_detected() {
        let column = Board::from_cells([E, O, E, E, O, E, X, O, X]);
        assert_eq!(winning_line(&column), Some([1, 4, 7]));
        assert_eq!(winner(&column), Some(Symbol::O));

        let anti_diagonal = Board::from_cells([X, E, O, X, O, E, O, E, X]);
        assert_eq!(winning_line(&anti_diagonal), Some([2, 4, 6]));
    }

    #[test]
    fn malformed_board_reports_first_line_in_order() {
        // 第一行 O、第三行 X，同时成线
        let board = Board::from_cells([O, O, O, E, E, E, X, X, X]);
        assert_eq!(winning_line(&board), Some([0, 1, 2]));
        assert_eq!(winner(&board), Some(Symbol::O));

        let all_x = Board::from_cells([X; CELL_COUNT]);
        assert_eq!(winning_line(&all_x), Some([0, 1, 2]));
    }

    #[test]
    fn winner_is_always_a_symbol_on_the_board() {
        // 穷举所有只含 X 与空格的棋盘
        for mask in 0u32..(1 << CELL_COUNT) {
            let mut cells = [E; CELL_COUNT];
            for (index, cell) in cells.iter_mut().enumerate() {
                if mask & (1 << index) != 0 {
                    *cell = X;
                }
            }
            let board = Board::from_cells(cells);
            let uniform = LINES
                .iter()
                .any(|line| line.iter().all(|&index| board.get(index) == Some(Symbol::X)));
            assert_eq!(winner(&board).is_some(), uniform, "mask {mask:#b}");
            assert_ne!(winner(&board), Some(Symbol::O));
        }
    }

    #[test]
    fn with_move_rejects_occupied_and_out_of_range_cells() {
        let board = Board::new().with_move(4, Symbol::X).expect("center is free");
        assert_eq!(board.get(4), Some(Symbol::X));
        assert_eq!(board.move_count(), 1);
        assert!(board.with_move(4, Symbol::O).is_none());
        assert!(board.with_move(CELL_COUNT, Symbol::O).is_none());
    }

    #[test]
    fn board_serializes_as_flat_cell_array() {
        let board = Board::from_cells([X, E, E, E, O, E, E, E, E]);
        let json = serde_json::to_string(&board).expect("board should serialize");
        assert_eq!(json, r#"["X",null,null,null,"O",null,null,null,null]"#);
    }
}
