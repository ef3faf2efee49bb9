use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::board::{self, Board, Symbol, CENTER, CORNERS, LINES};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

/// 在空格中放下 `symbol` 即可连成一线的第一个下标（按升序扫描）。
fn completing_cell(board: &Board, symbol: Symbol) -> Option<usize> {
    board.empty_cells().into_iter().find(|&index| {
        LINES.iter().filter(|line| line.contains(&index)).any(|line| {
            line.iter()
                .all(|&cell| cell == index || board.get(cell) == Some(symbol))
        })
    })
}

fn assert_playable(board: &Board) {
    assert!(
        board::winner(board).is_none() && !board.is_full(),
        "move selection requires an undecided board with an empty cell"
    );
}

/// 困难档：单步贪心规则，按固定优先级取第一条命中的规则。
///
/// 依次为：自己成线、堵住对手成线、中心、角（0、2、6、8）、最小空格。
/// 这不是极小化极大搜索，并非所有局面都最优。
pub fn hard_move(board: &Board, computer: Symbol, opponent: Symbol) -> usize {
    assert_playable(board);

    if let Some(index) = completing_cell(board, computer) {
        return index;
    }
    if let Some(index) = completing_cell(board, opponent) {
        return index;
    }
    if board.is_empty_at(CENTER) {
        return CENTER;
    }
    if let Some(&corner) = CORNERS.iter().find(|&&corner| board.is_empty_at(corner)) {
        return corner;
    }
    board.empty_cells()[0]
}

/// 简单档：在空格中均匀随机选择。
pub fn easy_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> usize {
    assert_playable(board);
    let empty = board.empty_cells();
    *empty
        .choose(rng)
        .unwrap_or_else(|| unreachable!("playable board has an empty cell"))
}

pub fn select_move<R: Rng + ?Sized>(
    board: &Board,
    computer: Symbol,
    opponent: Symbol,
    difficulty: Difficulty,
    rng: &mut R,
) -> usize {
    match difficulty {
        Difficulty::Easy => easy_move(board, rng),
        Difficulty::Hard => hard_move(board, computer, opponent),
    }
}

/// 电脑玩家，持有自己的随机数发生器。
#[derive(Debug, Clone)]
pub struct ComputerPlayer {
    rng: SmallRng,
}

impl ComputerPlayer {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn select_move(
        &mut self,
        board: &Board,
        computer: Symbol,
        difficulty: Difficulty,
    ) -> usize {
        let index = select_move(board, computer, computer.opponent(), difficulty, &mut self.rng);
        log::debug!("computer ({computer}, {difficulty:?}) selects cell {index}");
        index
    }
}

impl Default for ComputerPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Option<Symbol> = Some(Symbol::X);
    const O: Option<Symbol> = Some(Symbol::O);
    const E: Option<Symbol> = None;

    #[test]
    fn hard_blocks_open_row() {
        let board = Board::from_cells([X, X, E, E, O, E, E, E, E]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 2);
    }

    #[test]
    fn hard_takes_center_on_empty_board() {
        assert_eq!(hard_move(&Board::new(), Symbol::O, Symbol::X), 4);
        assert_eq!(hard_move(&Board::new(), Symbol::X, Symbol::O), 4);
    }

    #[test]
    fn hard_prefers_own_win_over_block() {
        // O 可在 5 连成中行，X 威胁 2
        let board = Board::from_cells([X, X, E, O, O, E, X, E, E]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 5);
    }

    #[test]
    fn hard_scans_corners_in_fixed_order() {
        let board = Board::from_cells([E, E, E, E, X, E, E, E, E]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 0);

        let board = Board::from_cells([O, E, E, E, X, E, E, E, E]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 2);

        let board = Board::from_cells([O, X, E, E, X, E, E, O, E]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 2);
    }

    #[test]
    fn hard_falls_back_to_lowest_empty_cell() {
        // 中心与四角均被占，双方都没有一步成线
        let board = Board::from_cells([O, X, O, E, X, E, X, O, X]);
        assert_eq!(hard_move(&board, Symbol::O, Symbol::X), 3);
        assert_eq!(hard_move(&board, Symbol::X, Symbol::O), 3);
    }

    #[test]
    fn easy_only_picks_empty_cells() {
        let board = Board::from_cells([X, O, X, E, O, E, O, X, E]);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let index = easy_move(&board, &mut rng);
            assert!(board.is_empty_at(index), "picked occupied cell {index}");
        }
    }

    #[test]
    fn seeded_computer_is_deterministic() {
        let board = Board::new();
        let mut first = ComputerPlayer::with_seed(42);
        let mut second = ComputerPlayer::with_seed(42);
        for _ in 0..8 {
            assert_eq!(
                first.select_move(&board, Symbol::O, Difficulty::Easy),
                second.select_move(&board, Symbol::O, Difficulty::Easy)
            );
        }
    }

    #[test]
    #[should_panic(expected = "undecided board")]
    fn selecting_on_full_board_panics() {
        let board = Board::from_cells([X, O, X, O, X, O, O, X, O]);
        hard_move(&board, Symbol::O, Symbol::X);
    }

    #[test]
    #[should_panic(expected = "undecided board")]
    fn selecting_on_won_board_panics() {
        let board = Board::from_cells([X, X, X, O, O, E, E, E, E]);
        let mut rng = SmallRng::seed_from_u64(1);
        easy_move(&board, &mut rng);
    }

    #[test]
    fn difficulty_parses_leniently() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
