use crate::problems::eight_puzzle::Board;
use crate::problems::eight_puzzle::Move;
use crate::problems::eight_puzzle::MoveCount;
use crate::problems::eight_puzzle::PuzzleError;

const MAX_ACTIONS_DISPLAYED: usize = 20;

/// A goal-directed heuristic.
///
/// Implementations must be pure, the search calls them once per generated
/// node and expects the same answer for the same boards.
pub trait Heuristic: std::fmt::Debug {
    fn h(_state: &Board, _goal: &Board) -> MoveCount {
        0
    }
}

/// A board along a path, with the move that led to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub board: Board,
    /// `None` on the first step.
    pub action: Option<Move>,
    /// Moves made so far.
    pub g: MoveCount,
}

/// The boards visited from a start to a goal, start first.
///
/// An empty path stands for "no solution".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    #[inline(always)]
    pub fn new_from_start(start: Board) -> Self {
        Self {
            steps: vec![PathStep {
                board: start,
                action: None,
                g: 0,
            }],
        }
    }

    #[inline(always)]
    pub(crate) fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    #[inline(always)]
    pub fn empty() -> Self {
        Self { steps: vec![] }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of boards, start and end included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline(always)]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn start(&self) -> Option<&Board> {
        self.steps.first().map(|s| &s.board)
    }
    pub fn end(&self) -> Option<&Board> {
        self.steps.last().map(|s| &s.board)
    }

    /// The final `g(n)`.
    pub fn cost(&self) -> Option<MoveCount> {
        self.steps.last().map(|s| s.g)
    }

    pub fn actions(&self) -> impl Iterator<Item = Move> + '_ {
        self.steps.iter().filter_map(|s| s.action)
    }

    /// Appends the board reached by moving the blank in `action`.
    pub fn append(&mut self, action: Move) -> Result<(), PuzzleError> {
        let last = self.steps.last().ok_or_else(|| {
            PuzzleError::InvariantViolation("can't extend an empty path".to_string())
        })?;
        let board = last.board.apply_move(action)?;
        let g = last.g + 1;
        self.steps.push(PathStep {
            board,
            action: Some(action),
            g,
        });
        Ok(())
    }

    /// Checks every step follows from the previous one.
    ///
    /// Empty paths are fine.
    pub fn is_valid(&self) -> bool {
        let Some(first) = self.steps.first() else {
            return true;
        };
        if first.action.is_some() || first.g != 0 {
            return false;
        }

        self.steps.windows(2).all(|w| {
            let (prev, next) = (&w[0], &w[1]);
            next.g == prev.g + 1
                && next
                    .action
                    .is_some_and(|a| prev.board.apply_move(a).ok() == Some(next.board))
        })
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.start(), self.end(), self.cost()) {
            (Some(start), Some(end), Some(cost)) => {
                write!(f, "Path({cost}, {start:?}:")?;
                for a in self.actions().take(MAX_ACTIONS_DISPLAYED) {
                    write!(f, "{a}")?;
                }
                if self.len() > MAX_ACTIONS_DISPLAYED + 1 {
                    write!(f, "…")?;
                }
                write!(f, ":{end:?})")
            }
            _ => write!(f, "Path()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn empty_path() {
        let p = Path::empty();
        assert!(p.is_empty());
        assert!(p.is_valid());
        assert_eq!(p.cost(), None);
        assert_eq!(p.start(), None);
        assert_eq!(format!("{p}"), "Path()");
    }

    #[test]
    fn build_path() {
        let mut p = Path::new_from_start(board("123804765"));
        p.append(Move::Up).unwrap();
        p.append(Move::Left).unwrap();

        assert!(p.is_valid());
        assert_eq!(p.len(), 3);
        assert_eq!(p.cost(), Some(2));
        assert_eq!(p.start(), Some(&board("123804765")));
        assert_eq!(p.end(), Some(&board("013824765")));
        assert_eq!(p.actions().collect::<Vec<_>>(), vec![Move::Up, Move::Left]);
        assert_eq!(format!("{p}"), "Path(2, Board(123/804/765):↑←:Board(013/824/765))");
    }

    #[test]
    fn cannot_walk_off_the_board() {
        let mut p = Path::new_from_start(board("012345678"));
        assert!(p.append(Move::Up).is_err());
        assert_eq!(p.len(), 1);
        assert!(Path::empty().append(Move::Up).is_err());
    }

    #[test]
    fn detect_broken_paths() {
        let start = board("123804765");
        let skip = Path::from_steps(vec![
            PathStep {
                board: start,
                action: None,
                g: 0,
            },
            PathStep {
                board: board("013824765"),
                action: Some(Move::Up),
                g: 1,
            },
        ]);
        assert!(!skip.is_valid());

        let miscounted = Path::from_steps(vec![
            PathStep {
                board: start,
                action: None,
                g: 0,
            },
            PathStep {
                board: board("103824765"),
                action: Some(Move::Up),
                g: 2,
            },
        ]);
        assert!(!miscounted.is_valid());
    }
}
