use std::str::FromStr;

use derive_more::Display;
use smallvec::SmallVec;
use thiserror::Error;

use crate::space::Heuristic;

/// Width and height of the board.
pub const SIDE: usize = 3;
/// Number of cells on the board, blank included.
pub const TILES: usize = SIDE * SIDE;
/// The tile value used for the blank.
pub const BLANK: u8 = 0;
/// Boards reachable from any given board, half of the `9!` tile permutations.
pub const REACHABLE_STATES: usize = 181_440;

pub type MoveCount = u32;

/// Converts a linear index into `(row, col)`.
#[inline(always)]
#[must_use]
pub const fn coordinates(index: usize) -> (usize, usize) {
    (index / SIDE, index % SIDE)
}

/// Converts `(row, col)` into a linear index.
#[inline(always)]
#[must_use]
pub const fn linear_index(row: usize, col: usize) -> usize {
    row * SIDE + col
}

/// A move of the blank tile.
///
/// The declaration order is the order in which successors are generated.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Move {
    #[display("↑")]
    Up, // row--
    #[display("↓")]
    Down, // row++
    #[display("←")]
    Left, // col--
    #[display("→")]
    Right, // col++
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    #[inline(always)]
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        #[rustfmt::skip]
        let d = match self {
            Move::Up    => (-1,  0),
            Move::Down  => ( 1,  0),
            Move::Left  => ( 0, -1),
            Move::Right => ( 0,  1),
        };
        d
    }

    #[must_use]
    pub const fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    /// Where the blank lands when moved from `(row, col)`, if it stays on the
    /// board.
    #[inline(always)]
    #[must_use]
    pub fn target(self, row: usize, col: usize) -> Option<(usize, usize)> {
        let (dr, dc) = self.delta();
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        (row < SIDE && col < SIDE).then_some((row, col))
    }
}

/// Problems with the tiles handed to us.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Expected 9 tiles, found {0}.")]
    WrongTileCount(usize),
    #[error("Tile {0} is out of range, tiles go from 0 to 8.")]
    TileOutOfRange(u8),
    #[error("Tile {0} appears more than once.")]
    DuplicateTile(u8),
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
    #[error("Goal {goal:?} is unreachable from {start:?}, their parities differ.")]
    UnreachableGoal { start: Board, goal: Board },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Invalid puzzle input. {0}")]
    InvalidPuzzleInput(#[from] InputError),
    /// Broken internal assumption. Points at a defect in the caller.
    #[error("Invariant violated. {0}")]
    InvariantViolation(String),
}

/// A 3x3 configuration of the tiles `0..=8`, `0` being the blank.
///
/// Only built through validating constructors, so every `Board` holds each
/// tile exactly once.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    tiles: [u8; TILES],
}

impl Board {
    pub fn new(tiles: [u8; TILES]) -> Result<Board, InputError> {
        let mut seen = [false; TILES];
        for t in tiles {
            let slot = seen
                .get_mut(t as usize)
                .ok_or(InputError::TileOutOfRange(t))?;
            if *slot {
                return Err(InputError::DuplicateTile(t));
            }
            *slot = true;
        }

        Ok(Board { tiles })
    }

    /// Tiles in order with the blank at the bottom-right corner.
    #[must_use]
    pub const fn solved() -> Board {
        Board {
            tiles: [1, 2, 3, 4, 5, 6, 7, 8, BLANK],
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn tiles(&self) -> [u8; TILES] {
        self.tiles
    }

    /// Linear position of the blank.
    #[inline(always)]
    pub fn index_of_blank(&self) -> Result<usize, PuzzleError> {
        self.tiles
            .iter()
            .position(|&t| t == BLANK)
            .ok_or_else(|| PuzzleError::InvariantViolation(format!("{self:?} has no blank tile")))
    }

    pub fn blank_coordinates(&self) -> Result<(usize, usize), PuzzleError> {
        Ok(coordinates(self.index_of_blank()?))
    }

    #[must_use]
    pub fn tile_coordinates(&self, value: u8) -> Option<(usize, usize)> {
        self.tiles.iter().position(|&t| t == value).map(coordinates)
    }

    /// Moves the blank one cell in `direction`.
    ///
    /// Moving the blank off the board is a caller defect.
    pub fn apply_move(&self, direction: Move) -> Result<Board, PuzzleError> {
        let blank = self.index_of_blank()?;
        let (row, col) = coordinates(blank);
        let (row, col) = direction.target(row, col).ok_or_else(|| {
            PuzzleError::InvariantViolation(format!(
                "moving the blank {direction:?} takes it off {self:?}"
            ))
        })?;

        Ok(self.swap_blank(blank, linear_index(row, col)))
    }

    #[inline(always)]
    fn swap_blank(&self, blank: usize, target: usize) -> Board {
        debug_assert_eq!(self.tiles[blank], BLANK);
        let mut tiles = self.tiles;
        tiles.swap(blank, target);
        Board { tiles }
    }

    /// Boards one blank move away, in `Move::ALL` order.
    ///
    /// There are 2 in the corners, 3 on the edges and 4 in the centre.
    pub fn neighbours(&self) -> Result<SmallVec<[(Board, Move); 4]>, PuzzleError> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("StateExpansion");

        let blank = self.index_of_blank()?;
        let (row, col) = coordinates(blank);

        let mut v = SmallVec::<[(Board, Move); 4]>::new();
        for m in Move::ALL {
            if let Some((new_row, new_col)) = m.target(row, col) {
                v.push((self.swap_blank(blank, linear_index(new_row, new_col)), m));
            }
        }
        Ok(v)
    }

    /// Pairs of tiles out of order, ignoring the blank.
    #[must_use]
    pub fn inversions(&self) -> usize {
        let tiles: SmallVec<[u8; TILES]> =
            self.tiles.iter().copied().filter(|&t| t != BLANK).collect();

        let mut inversions = 0;
        for (i, a) in tiles.iter().enumerate() {
            inversions += tiles[i + 1..].iter().filter(|&&b| b < *a).count();
        }
        inversions
    }

    /// Whether the inversion count is even.
    ///
    /// With an odd width, blank moves never change it.
    #[must_use]
    pub fn has_even_parity(&self) -> bool {
        self.inversions() % 2 == 0
    }

    /// Whether some sequence of blank moves turns `other` into `self`.
    #[must_use]
    pub fn is_reachable_from(&self, other: &Board) -> bool {
        self.has_even_parity() == other.has_even_parity()
    }

    /// Walks the blank randomly for `steps` moves from `goal`.
    ///
    /// The walk never undoes its previous move, and the result is always
    /// reachable from `goal`.
    pub fn scramble<R: rand::Rng>(goal: &Board, r: &mut R, steps: usize) -> Result<Board, PuzzleError> {
        let mut board = *goal;
        let mut last: Option<Move> = None;

        for _ in 0..steps {
            let options: SmallVec<[(Board, Move); 4]> = board
                .neighbours()?
                .into_iter()
                .filter(|(_, m)| Some(m.opposite()) != last)
                .collect();
            debug_assert!(!options.is_empty());

            let (next, m) = options[r.random_range(0..options.len())];
            board = next;
            last = Some(m);
        }

        Ok(board)
    }
}

impl std::convert::TryFrom<[u8; TILES]> for Board {
    type Error = InputError;

    fn try_from(tiles: [u8; TILES]) -> Result<Self, Self::Error> {
        Board::new(tiles)
    }
}

impl std::convert::TryFrom<&[u8]> for Board {
    type Error = InputError;

    fn try_from(tiles: &[u8]) -> Result<Self, Self::Error> {
        let tiles: [u8; TILES] = tiles
            .try_into()
            .map_err(|_| InputError::WrongTileCount(tiles.len()))?;
        Board::new(tiles)
    }
}

/// Parses boards like `"283164075"`, `"2 8 3 1 6 4 0 7 5"` or `"283/164/_75"`.
impl FromStr for Board {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tiles = SmallVec::<[u8; TILES]>::new();
        for ch in s.chars() {
            match ch {
                '0'..='9' => tiles.push(ch as u8 - b'0'),
                '_' => tiles.push(BLANK),
                ',' | '/' | '[' | ']' => {}
                ch if ch.is_whitespace() => {}
                ch => return Err(InputError::InvalidCharacter(ch)),
            }
        }

        Board::try_from(tiles.as_slice())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Board(")?;
        for (i, row) in self.tiles.chunks_exact(SIDE).enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            for t in row {
                write!(f, "{t}")?;
            }
        }
        write!(f, ")")
    }
}

/// Three rows of three tiles.
///
/// The alternate form (`{:#}`) draws the blank as `_`.
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, row) in self.tiles.chunks_exact(SIDE).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, &t) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                if t == BLANK && f.alternate() {
                    write!(f, "_")?;
                } else {
                    write!(f, "{t}")?;
                }
            }
        }
        Ok(())
    }
}

/// Estimates nothing, turning A* into uniform-cost search.
#[derive(Debug)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {}

/// Tiles out of place, the blank excluded.
#[derive(Debug)]
pub struct MisplacedTiles;

impl Heuristic for MisplacedTiles {
    #[inline(always)]
    fn h(state: &Board, goal: &Board) -> MoveCount {
        state
            .tiles
            .iter()
            .zip(goal.tiles.iter())
            .filter(|&(&s, &g)| s != g && s != BLANK)
            .count() as MoveCount
    }
}

/// Sum of the grid distances of every tile to its goal cell.
#[derive(Debug)]
pub struct ManhattanDistance;

impl Heuristic for ManhattanDistance {
    #[inline(always)]
    fn h(state: &Board, goal: &Board) -> MoveCount {
        let mut goal_index = [0usize; TILES];
        for (i, &t) in goal.tiles.iter().enumerate() {
            goal_index[t as usize] = i;
        }

        let mut distance = 0usize;
        for (i, &t) in state.tiles.iter().enumerate() {
            if t == BLANK {
                continue;
            }
            let (row, col) = coordinates(i);
            let (goal_row, goal_col) = coordinates(goal_index[t as usize]);
            distance += row.abs_diff(goal_row) + col.abs_diff(goal_col);
        }
        distance as MoveCount
    }
}

/// A heuristic picked at run time.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, clap::ValueEnum)]
pub enum HeuristicKind {
    #[display("h1 (misplaced tiles)")]
    Misplaced,
    #[display("h2 (Manhattan distance)")]
    Manhattan,
    #[display("h0 (zero)")]
    Zero,
}

impl HeuristicKind {
    #[must_use]
    pub fn h(self, state: &Board, goal: &Board) -> MoveCount {
        match self {
            HeuristicKind::Misplaced => MisplacedTiles::h(state, goal),
            HeuristicKind::Manhattan => ManhattanDistance::h(state, goal),
            HeuristicKind::Zero => ZeroHeuristic::h(state, goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn parse_boards() {
        let expected = Board::new([2, 8, 3, 1, 6, 4, 0, 7, 5]).unwrap();
        assert_eq!(board("283164075"), expected);
        assert_eq!(board("2 8 3 1 6 4 0 7 5"), expected);
        assert_eq!(board("283/164/_75"), expected);
        assert_eq!(board("[2, 8, 3, 1, 6, 4, 0, 7, 5]"), expected);
        assert_eq!(
            Board::try_from([1u8, 2, 3, 4, 5, 6, 7, 8, 0]),
            Ok(Board::solved())
        );
    }

    #[test]
    fn reject_invalid_boards() {
        assert_eq!("12345678".parse::<Board>(), Err(InputError::WrongTileCount(8)));
        assert_eq!("1234567801".parse::<Board>(), Err(InputError::WrongTileCount(10)));
        assert_eq!("123456789".parse::<Board>(), Err(InputError::TileOutOfRange(9)));
        assert_eq!("123456781".parse::<Board>(), Err(InputError::DuplicateTile(1)));
        assert_eq!("1234x6780".parse::<Board>(), Err(InputError::InvalidCharacter('x')));
        assert_eq!(
            Board::new([0, 1, 2, 3, 4, 5, 6, 7, 42]),
            Err(InputError::TileOutOfRange(42))
        );
        assert_eq!(
            Board::try_from(&[0u8, 1, 2][..]),
            Err(InputError::WrongTileCount(3))
        );
    }

    #[test]
    fn display_rows() {
        let b = board("283164075");
        assert_eq!(
            format!("{b}"),
            indoc! {"
                2 8 3
                1 6 4
                0 7 5"}
        );
        assert_eq!(
            format!("{b:#}"),
            indoc! {"
                2 8 3
                1 6 4
                _ 7 5"}
        );
        assert_eq!(format!("{b:?}"), "Board(283/164/075)");
    }

    #[test]
    fn blank_position() {
        assert_eq!(board("283164075").index_of_blank(), Ok(6));
        assert_eq!(board("283164075").blank_coordinates(), Ok((2, 0)));
        assert_eq!(Board::solved().index_of_blank(), Ok(8));
        assert_eq!(board("123804765").blank_coordinates(), Ok((1, 1)));
        assert_eq!(board("123804765").tile_coordinates(8), Some((1, 0)));
        assert_eq!(board("123804765").tile_coordinates(9), None);
    }

    #[test]
    fn moves() {
        let b = board("123804765");
        assert_eq!(b.apply_move(Move::Up), Ok(board("103824765")));
        assert_eq!(b.apply_move(Move::Down), Ok(board("123864705")));
        assert_eq!(b.apply_move(Move::Left), Ok(board("123084765")));
        assert_eq!(b.apply_move(Move::Right), Ok(board("123840765")));

        for m in Move::ALL {
            assert_eq!(b.apply_move(m).unwrap().apply_move(m.opposite()), Ok(b));
        }
    }

    #[test]
    fn moving_off_the_board_is_an_invariant_violation() {
        let corner = Board::solved();
        assert!(matches!(
            corner.apply_move(Move::Down),
            Err(PuzzleError::InvariantViolation(_))
        ));
        assert!(matches!(
            corner.apply_move(Move::Right),
            Err(PuzzleError::InvariantViolation(_))
        ));
        assert!(corner.apply_move(Move::Up).is_ok());
    }

    #[test]
    fn neighbours_depend_on_the_blank() {
        // Corners, edges and the centre.
        for (s, n) in [
            ("012345678", 2),
            ("102345678", 3),
            ("120345678", 2),
            ("123045678", 3),
            ("123405678", 4),
            ("123450678", 3),
            ("123456078", 2),
            ("123456708", 3),
            ("123456780", 2),
        ] {
            let b = board(s);
            let neighbours = b.neighbours().unwrap();
            assert_eq!(neighbours.len(), n, "{b:?}");
            for (next, m) in neighbours {
                assert_eq!(b.apply_move(m), Ok(next));
                assert!(Board::new(next.tiles()).is_ok());
            }
        }
    }

    #[test]
    fn neighbours_follow_move_order() {
        let moves: Vec<Move> = board("123804765")
            .neighbours()
            .unwrap()
            .into_iter()
            .map(|(_, m)| m)
            .collect();
        assert_eq!(moves, Move::ALL.to_vec());
    }

    #[test]
    fn parity() {
        assert_eq!(Board::solved().inversions(), 0);
        assert_eq!(board("283164075").inversions(), 11);
        assert_eq!(board("123804765").inversions(), 7);
        assert_eq!(board("724506831").inversions(), 16);

        assert!(board("123804765").is_reachable_from(&board("283164075")));
        assert!(Board::solved().is_reachable_from(&board("724506831")));
        // Swapping two tiles flips the parity.
        assert!(!board("213456780").is_reachable_from(&Board::solved()));
    }

    #[test]
    fn scramble_stays_reachable() {
        let goal = Board::solved();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let start = Board::scramble(&goal, &mut rng, 50).unwrap();
            assert!(start.is_reachable_from(&goal));
            assert!(goal.is_reachable_from(&start));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(Board::scramble(&goal, &mut rng, 0), Ok(goal));
    }

    #[test]
    fn scramble_is_seeded() {
        let goal = Board::solved();
        let a = Board::scramble(&goal, &mut ChaCha8Rng::seed_from_u64(7), 30).unwrap();
        let b = Board::scramble(&goal, &mut ChaCha8Rng::seed_from_u64(7), 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn heuristics_on_known_boards() {
        let start = board("283164075");
        let goal = board("123804765");
        assert_eq!(MisplacedTiles::h(&start, &goal), 5);
        assert_eq!(ManhattanDistance::h(&start, &goal), 6);
        assert_eq!(ZeroHeuristic::h(&start, &goal), 0);

        let start = board("724506831");
        let goal = Board::solved();
        assert_eq!(MisplacedTiles::h(&start, &goal), 6);
        assert_eq!(ManhattanDistance::h(&start, &goal), 14);
    }

    #[test]
    fn heuristics_ignore_the_blank() {
        // Only the blank and tile 8 swapped places.
        let start = board("123456708");
        let goal = Board::solved();
        assert_eq!(MisplacedTiles::h(&start, &goal), 1);
        assert_eq!(ManhattanDistance::h(&start, &goal), 1);
    }

    #[test]
    fn heuristics_vanish_on_the_goal() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let s = Board::scramble(&Board::solved(), &mut rng, 40).unwrap();
            for kind in [HeuristicKind::Misplaced, HeuristicKind::Manhattan, HeuristicKind::Zero] {
                assert_eq!(kind.h(&s, &s), 0, "{kind} on {s:?}");
            }
        }
    }

    #[test]
    fn manhattan_dominates_misplaced() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            let a = Board::scramble(&Board::solved(), &mut rng, 60).unwrap();
            let b = Board::scramble(&a, &mut rng, 25).unwrap();
            assert!(ManhattanDistance::h(&a, &b) >= MisplacedTiles::h(&a, &b));
            assert!(ManhattanDistance::h(&b, &a) >= MisplacedTiles::h(&b, &a));
        }
    }

    #[test]
    fn heuristics_change_by_at_most_one_per_move() {
        let goal = Board::solved();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let s = Board::scramble(&goal, &mut rng, 30).unwrap();
            for (n, _) in s.neighbours().unwrap() {
                for kind in [HeuristicKind::Misplaced, HeuristicKind::Manhattan] {
                    let (hs, hn) = (kind.h(&s, &goal), kind.h(&n, &goal));
                    assert!(hs.abs_diff(hn) <= 1, "{kind}: {s:?}={hs} {n:?}={hn}");
                }
            }
        }
    }
}
